use crate::error::SendContext;

/// Content type of every forwarded body
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// One outbound body, ready to send
///
/// Owned by the background task that delivers it and dropped after the single
/// attempt, whatever the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub payload: Vec<u8>,
    pub content_type: &'static str,
    /// Free-form tag carried into logs and errors
    pub correlation_id: Option<String>,
}

impl DeliveryRequest {
    /// A JSON body
    pub fn json(payload: Vec<u8>) -> Self {
        Self {
            payload,
            content_type: JSON_CONTENT_TYPE,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn size(&self) -> usize {
        self.payload.len()
    }

    pub fn context(&self) -> SendContext {
        let context = SendContext::new(self.size());
        match &self.correlation_id {
            Some(id) => context.with_correlation_id(id.clone()),
            None => context,
        }
    }
}

/// Successful delivery: a 2xx answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
    /// Response body as text, kept for logging
    pub body: String,
}
