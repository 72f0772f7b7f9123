use std::time::Duration;
use crate::router::RouteTable;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 4096;
pub const DEFAULT_MAX_CONNECTIONS: usize = 1024;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// How accepted connections are run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// One task per connection, capped at `max_connections` in flight.
    #[default]
    PerConnectionWorker,
    /// The accept loop waits for each connection to finish before accepting the next.
    Inline,
}

/// Everything the listener and the connection handlers need.
///
/// Only `ServerBuilder` can create one, and there are no setters: once the
/// server is built the config is shared behind an `Arc` and never changes.
pub struct ServerConfig {
    pub(crate) bind_address: String,
    pub(crate) port: u16,
    pub(crate) concurrency: ConcurrencyMode,
    pub(crate) max_request_bytes: usize,
    pub(crate) max_connections: usize,
    pub(crate) read_timeout: Option<Duration>,
    pub(crate) routes: RouteTable,
}

impl ServerConfig {
    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn concurrency(&self) -> ConcurrencyMode {
        self.concurrency
    }

    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}
