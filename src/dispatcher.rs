use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::error::ParseError;
use crate::http_object::HttpRequest;
use crate::http_status::HttpStatus;
use crate::mime_type::MimeType;
use crate::parser::parse_request;

const OVERSIZE_LINGER: Duration = Duration::from_millis(500);

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// A route handler. It gets the parsed request and the open connection and is
/// the only one that writes a response for a matched route.
///
/// ```ignore
/// fn hello(_req: HttpRequest, conn: &mut Connection) -> HandlerFuture<'_> {
///     Box::pin(async move {
///         conn.write_response(HttpStatus::OK, "hello", MimeType::TextPlain).await?;
///         Ok(())
///     })
/// }
/// ```
pub type Handler = for<'a> fn(HttpRequest, &'a mut Connection) -> HandlerFuture<'a>;

/// Runs parse -> match -> handler for one connection and closes it afterwards.
pub struct Dispatcher {
    config: Arc<ServerConfig>,
}

impl Dispatcher {
    pub fn new(config: Arc<ServerConfig>) -> Dispatcher {
        Dispatcher { config }
    }

    // spawn에 넘기는 Future는 'static이어야 하므로 호출부는 Arc<Dispatcher>를 소유한 채로 부른다.
    pub async fn dispatch(&self, mut conn: Connection) {
        let peer_addr = conn.peer_addr();
        if let Err(e) = self.exchange(&mut conn).await {
            warn!(%peer_addr, error = %format!("{e:#}"), "request ended with an error");
        }
        conn.close().await;
    }

    async fn exchange(&self, conn: &mut Connection) -> Result<()> {
        let raw = match conn
            .read_request(self.config.max_request_bytes(), self.config.read_timeout())
            .await
        {
            Ok(raw) if raw.is_empty() => {
                debug!(peer_addr = %conn.peer_addr(), "peer closed before sending a request");
                return Ok(());
            }
            Ok(raw) => raw,
            Err(e) => return self.reject(conn, e).await,
        };

        let mut req = match parse_request(&raw) {
            Ok(req) => req,
            Err(e) => return self.reject(conn, e).await,
        };

        let Some(found) = self.config.routes().find(req.method, &req.path) else {
            info!(method = %req.method, path = %req.path, status = 404, "no matching route");
            let body = format!("No route for {}", req.path);
            conn.write_response(HttpStatus::NotFound, body, MimeType::TextPlain)
                .await
                .context("failed to write 404 response")?;
            return Ok(());
        };

        debug!(method = %req.method, path = %req.path, route = found.route.pattern(), "dispatching");
        let handler = found.route.handler();
        req.set_params(found.params);
        handler(req, conn).await.context("handler failed")
    }

    async fn reject(&self, conn: &mut Connection, err: ParseError) -> Result<()> {
        let (status, body) = rejection(&err);

        warn!(peer_addr = %conn.peer_addr(), status = status.code(), error = %err, "rejecting request");
        conn.write_response(status, body, MimeType::TextPlain)
            .await
            .with_context(|| format!("failed to write {} response", status.code()))?;

        // 한 번의 read로 다 읽지 못한 나머지가 소켓에 남아 있다.
        if matches!(err, ParseError::PayloadTooLarge { .. }) {
            conn.linger(OVERSIZE_LINGER).await;
        }
        Ok(())
    }
}

/// Status and plain-text body sent for a request that never reached the router.
fn rejection(err: &ParseError) -> (HttpStatus, String) {
    match err {
        ParseError::PayloadTooLarge { .. } => (HttpStatus::PayloadTooLarge, err.to_string()),
        ParseError::Timeout => (HttpStatus::RequestTimeout, err.to_string()),
        _ => (HttpStatus::BadRequest, format!("Invalid request header: {err}")),
    }
}
