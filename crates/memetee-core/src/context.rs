/// Runtime context for a single incoming request
///
/// Populated by the server's request-context middleware and consumed by
/// rate limiting and the contact notifier (which records the sender IP).
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Best-effort client IP (proxy headers first, then the socket peer)
    pub client_ip: Option<String>,
}

impl RequestContext {
    /// Create a context with no client information
    pub const fn empty() -> Self {
        Self { client_ip: None }
    }

    /// Client identifier for rate limiting
    ///
    /// Falls back to a fixed sentinel when no IP could be determined, so
    /// anonymous traffic still shares one window instead of bypassing it.
    pub fn client_id(&self) -> &str {
        self.client_ip.as_deref().unwrap_or("unknown")
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::empty()
    }
}
