//! HTTP delivery to the forwarding endpoint
//!
//! One POST per request, no retry. The client keeps no idle connections, so
//! every attempt opens its own and releases it when the response is dropped,
//! on success and failure alike.

use std::error::Error as StdError;
use std::io;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::error::DeliveryError;
use crate::metadata::SinkMetadata;
use crate::request::{DeliveryReceipt, DeliveryRequest};
use crate::MessageSink;

/// Connect and read bounds for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryTimeouts {
    pub connect: Duration,
    /// Bound on the whole request once connected
    pub read: Duration,
}

impl Default for DeliveryTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            read: Duration::from_secs(5),
        }
    }
}

/// Sink that POSTs each body to a fixed endpoint
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: Url,
    timeouts: DeliveryTimeouts,
}

impl HttpSink {
    pub fn new(endpoint: &str, timeouts: DeliveryTimeouts) -> Result<Self, DeliveryError> {
        let url = Url::parse(endpoint)
            .map_err(|e| DeliveryError::invalid_endpoint(endpoint, e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DeliveryError::invalid_endpoint(
                endpoint,
                format!("unsupported scheme {:?}", url.scheme()),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.read)
            .pool_max_idle_per_host(0)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| DeliveryError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: url,
            timeouts,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeouts(&self) -> DeliveryTimeouts {
        self.timeouts
    }

    /// Map a transport error onto the delivery outcome vocabulary
    fn classify(&self, err: &reqwest::Error) -> DeliveryError {
        let endpoint = self.endpoint.to_string();

        if err.is_timeout() || has_io_kind(err, io::ErrorKind::TimedOut) {
            let timeout = if err.is_connect() {
                self.timeouts.connect
            } else {
                self.timeouts.read
            };
            return DeliveryError::Timeout { endpoint, timeout };
        }
        if has_io_kind(err, io::ErrorKind::ConnectionRefused) {
            return DeliveryError::ConnectionRefused { endpoint };
        }
        if is_dns_failure(err) {
            return DeliveryError::UnresolvedHost {
                endpoint,
                detail: error_chain(err),
            };
        }
        DeliveryError::Transport {
            endpoint,
            detail: error_chain(err),
        }
    }
}

#[async_trait]
impl MessageSink for HttpSink {
    async fn deliver(&self, request: DeliveryRequest) -> Result<DeliveryReceipt, DeliveryError> {
        let context = request.context();
        let started = Instant::now();

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, request.content_type)
            .body(request.payload)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(&e))?;

        debug!(
            endpoint = %self.endpoint,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            size = context.payload_size,
            "Delivery attempt answered"
        );

        if status.is_success() {
            Ok(DeliveryReceipt {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(DeliveryError::non_success_status(status.as_u16(), body, context))
        }
    }

    fn metadata(&self) -> SinkMetadata {
        SinkMetadata::new("http-forwarder", "http").with_endpoint(self.endpoint.as_str())
    }
}

fn sources<'a>(err: &'a reqwest::Error) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err as &(dyn StdError + 'static)), |&e| e.source())
}

fn has_io_kind(err: &reqwest::Error, kind: io::ErrorKind) -> bool {
    sources(err).any(|e| {
        e.downcast_ref::<io::Error>()
            .is_some_and(|io_err| io_err.kind() == kind)
    })
}

/// Resolver failures surface as a connect error whose chain names DNS
fn is_dns_failure(err: &reqwest::Error) -> bool {
    err.is_connect()
        && sources(err).any(|e| {
            let text = e.to_string();
            text.starts_with("dns error")
                || text.contains("failed to lookup address")
                || text.contains("Name or service not known")
                || text.contains("No address associated")
        })
}

fn error_chain(err: &reqwest::Error) -> String {
    sources(err)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_endpoint() {
        let err = HttpSink::new("not a url", DeliveryTimeouts::default()).unwrap_err();
        assert_eq!(err.kind(), "invalid_endpoint");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = HttpSink::new("ftp://10.0.2.16/sms", DeliveryTimeouts::default()).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_metadata_names_endpoint() {
        let sink = HttpSink::new("http://10.0.2.16:8080/sms", DeliveryTimeouts::default()).unwrap();
        let metadata = sink.metadata();
        assert_eq!(metadata.sink_type, "http");
        assert_eq!(metadata.endpoint.as_deref(), Some("http://10.0.2.16:8080/sms"));
        assert_eq!(sink.timeouts().connect, Duration::from_secs(5));
    }
}
