/// Information about a sink for monitoring/debugging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkMetadata {
    /// Human-readable sink name
    pub name: String,

    /// Sink type (http, collector, failing, etc.)
    pub sink_type: String,

    /// Delivery endpoint if applicable
    pub endpoint: Option<String>,
}

impl SinkMetadata {
    /// Create new metadata with name and type
    pub fn new(name: impl Into<String>, sink_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink_type: sink_type.into(),
            endpoint: None,
        }
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}
