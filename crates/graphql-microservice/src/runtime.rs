/// Details of a service that started listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ready {
    pub label: String,
    pub port: u16,
    pub path: String,
    /// `localhost:<port><path>`
    pub endpoint: String,
}

/// Hooks into the lifecycle of a listening service.
pub trait ServerRuntime: Send + Sync + 'static {
    /// Called when the server is bound and accepting connections
    fn on_ready(&self, _ready: &Ready) {}
}

impl ServerRuntime for () {}
