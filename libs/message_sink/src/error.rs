use std::time::Duration;

/// Context information for a delivery attempt to aid in debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendContext {
    /// Size of the request body in bytes
    pub payload_size: usize,
    /// Correlation ID for tracing, if available
    pub correlation_id: Option<String>,
}

impl SendContext {
    pub fn new(payload_size: usize) -> Self {
        Self {
            payload_size,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }
}

/// Why a single delivery attempt failed
///
/// Every variant is terminal for the record: nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Could not resolve host for {endpoint}: {detail}")]
    UnresolvedHost { endpoint: String, detail: String },

    #[error("Connection refused by {endpoint}")]
    ConnectionRefused { endpoint: String },

    #[error("Timed out after {timeout:?} delivering to {endpoint}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("Endpoint answered {status} (size: {size}B, id: {correlation_id:?})",
            size = context.payload_size,
            correlation_id = context.correlation_id)]
    NonSuccessStatus {
        status: u16,
        body: String,
        context: SendContext,
    },

    #[error("Transport fault delivering to {endpoint}: {detail}")]
    Transport { endpoint: String, detail: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl DeliveryError {
    /// Short stable label for structured logging and stats
    pub fn kind(&self) -> &'static str {
        match self {
            DeliveryError::InvalidEndpoint { .. } => "invalid_endpoint",
            DeliveryError::UnresolvedHost { .. } => "unresolved_host",
            DeliveryError::ConnectionRefused { .. } => "connection_refused",
            DeliveryError::Timeout { .. } => "timeout",
            DeliveryError::NonSuccessStatus { .. } => "non_success_status",
            DeliveryError::Transport { .. } => "transport",
            DeliveryError::ClientBuild(_) => "client_build",
        }
    }

    /// Whether the request never got an HTTP response
    pub fn is_network_fault(&self) -> bool {
        matches!(
            self,
            DeliveryError::UnresolvedHost { .. }
                | DeliveryError::ConnectionRefused { .. }
                | DeliveryError::Timeout { .. }
                | DeliveryError::Transport { .. }
        )
    }

    /// Status code of a rejected request
    pub fn status(&self) -> Option<u16> {
        match self {
            DeliveryError::NonSuccessStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        DeliveryError::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn non_success_status(status: u16, body: impl Into<String>, context: SendContext) -> Self {
        DeliveryError::NonSuccessStatus {
            status,
            body: body.into(),
            context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_formatting_includes_context() {
        let err = DeliveryError::non_success_status(
            500,
            "boom",
            SendContext::new(72).with_correlation_id("+15551234567@1700000000000"),
        );
        let text = err.to_string();
        assert!(text.contains("500"));
        assert!(text.contains("72B"));
        assert!(text.contains("+15551234567@1700000000000"));
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_network_fault());
    }

    #[test]
    fn test_network_faults() {
        let err = DeliveryError::ConnectionRefused {
            endpoint: "http://127.0.0.1:9/".to_string(),
        };
        assert!(err.is_network_fault());
        assert_eq!(err.kind(), "connection_refused");
        assert_eq!(err.status(), None);
    }
}
