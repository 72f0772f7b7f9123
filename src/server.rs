use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::Semaphore;
use tokio::task::spawn;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{
    ConcurrencyMode,
    ServerConfig,
    DEFAULT_BIND_ADDRESS,
    DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MAX_REQUEST_BYTES,
    DEFAULT_PORT,
    DEFAULT_READ_TIMEOUT,
};
use crate::connection::Connection;
use crate::dispatcher::{Dispatcher, Handler};
use crate::error::ServerError;
use crate::http_type::Method;
use crate::router::RouteTable;

pub struct ServerBuilder {
    host: Option<String>,
    port: Option<u16>,
    concurrency: ConcurrencyMode,
    max_request_bytes: usize,
    max_connections: usize,
    read_timeout: Option<Duration>,
    routes: Vec<(Method, String, Handler)>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        ServerBuilder {
            host: None,
            port: None,
            concurrency: ConcurrencyMode::default(),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            routes: Vec::new(),
        }
    }
}

impl ServerBuilder {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(&mut self, host: impl Into<String>) -> &mut Self {
        self.host.replace(host.into());
        self
    }

    pub fn port(&mut self, port: u16) -> &mut Self {
        self.port.replace(port);
        self
    }

    pub fn concurrency(&mut self, mode: ConcurrencyMode) -> &mut Self {
        self.concurrency = mode;
        self
    }

    pub fn max_request_bytes(&mut self, max: usize) -> &mut Self {
        self.max_request_bytes = max;
        self
    }

    /// Upper bound on connection tasks in flight. Ignored in inline mode.
    pub fn max_connections(&mut self, max: usize) -> &mut Self {
        self.max_connections = max;
        self
    }

    /// `None` lets a silent client hold its worker forever.
    pub fn read_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.read_timeout = timeout;
        self
    }

    /// Registers a route. Validation is deferred to `build`.
    pub fn add(&mut self, method: Method, path: &str, handler: Handler) -> &mut Self {
        self.routes.push((method, path.to_string(), handler));
        self
    }

    pub fn build(self) -> anyhow::Result<Server> {
        if self.max_request_bytes == 0 {
            anyhow::bail!("max_request_bytes must be greater than zero");
        }
        if self.max_connections == 0 {
            anyhow::bail!("max_connections must be greater than zero");
        }

        let mut routes = RouteTable::new();
        for (method, path, handler) in self.routes {
            routes.add(method, &path, handler)
                .with_context(|| format!("failed to register {method} {path}"))?;
        }

        let config = ServerConfig {
            bind_address: self.host.unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            concurrency: self.concurrency,
            max_request_bytes: self.max_request_bytes,
            max_connections: self.max_connections,
            read_timeout: self.read_timeout,
            routes,
        };

        Ok(Server { config: Arc::new(config) })
    }
}

pub struct Server {
    config: Arc<ServerConfig>,
}

impl Server {

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds the configured address. A failure here is fatal for the server and
    /// is logged before it is returned.
    pub async fn bind(self) -> Result<Listener, ServerError> {
        let addr = self.config.socket_addr();
        let bound = TcpListener::bind(addr.as_str())
            .await
            .and_then(|listener| listener.local_addr().map(|local| (listener, local)));

        let (inner, local_addr) = match bound {
            Ok(bound) => bound,
            Err(source) => {
                let err = ServerError::Bind { addr, source };
                error!(error = %err, "fatal: server can not start");
                return Err(err);
            }
        };

        info!(
            address = %local_addr,
            concurrency = ?self.config.concurrency(),
            routes = self.config.routes().len(),
            "listener bound"
        );

        Ok(Listener {
            inner,
            local_addr,
            connection_limit: Arc::new(Semaphore::new(self.config.max_connections())),
            dispatcher: Arc::new(Dispatcher::new(self.config.clone())),
            config: self.config,
        })
    }

    /// Binds and serves until the process exits.
    pub async fn serve(self) -> anyhow::Result<()> {
        let listener = self.bind().await?;
        listener.run().await;
        Ok(())
    }
}

pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
    connection_limit: Arc<Semaphore>,
    dispatcher: Arc<Dispatcher>,
    config: Arc<ServerConfig>,
}

impl Listener {

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn run(self) {
        self.run_until(CancellationToken::new()).await
    }

    /// The accept loop. Accept failures are logged and skipped; only
    /// cancelling `shutdown` ends the loop. Connections already handed to a
    /// worker are left to finish on their own.
    pub async fn run_until(self, shutdown: CancellationToken) {
        let mode = self.config.concurrency();
        let mut incoming = TcpListenerStream::new(self.inner);

        loop {
            // 워커 수 제한: accept 전에 permit부터 잡는다.
            let permit = match mode {
                ConcurrencyMode::PerConnectionWorker => {
                    let acquire = self.connection_limit.clone().acquire_owned();
                    select! {
                        _ = shutdown.cancelled() => break,
                        permit = acquire => match permit {
                            Ok(permit) => Some(permit),
                            Err(_) => break,
                        },
                    }
                }
                ConcurrencyMode::Inline => None,
            };

            let next = select! {
                _ = shutdown.cancelled() => break,
                next = incoming.next() => next,
            };

            let stream = match next {
                Some(Ok(stream)) => stream,
                Some(Err(e)) => {
                    warn!(error = %ServerError::Accept(e), "accept failed, continuing");
                    continue;
                }
                None => break,
            };

            let peer_addr = match stream.peer_addr() {
                Ok(addr) => addr,
                Err(e) => {
                    warn!(error = %e, "dropping connection without a peer address");
                    continue;
                }
            };
            debug!(%peer_addr, "connection accepted");

            let conn = Connection::new(stream, peer_addr);
            let dispatcher = self.dispatcher.clone();
            let worker = spawn(async move {
                dispatcher.dispatch(conn).await;
                drop(permit);
            });

            if mode == ConcurrencyMode::Inline {
                // inline 모드에서도 task 경계를 두어 handler의 panic이 accept loop를 죽이지 않게 한다.
                if let Err(e) = worker.await {
                    error!(%peer_addr, error = %e, "connection handler panicked");
                }
            }
        }

        info!(address = %self.local_addr, "listener stopped");
    }
}
