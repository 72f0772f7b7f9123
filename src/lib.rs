//! A small HTTP/1.1 request-serving engine.
//!
//! Each accepted connection carries exactly one request: it is read in a
//! single bounded read, parsed, matched against the route table, handed to the
//! route's handler and closed.
//!
//! ```ignore
//! use micro_route_server::{Connection, HandlerFuture, HttpRequest, HttpStatus, Method, MimeType, ServerBuilder};
//!
//! fn user(req: HttpRequest, conn: &mut Connection) -> HandlerFuture<'_> {
//!     Box::pin(async move {
//!         let id = req.param("id").unwrap_or_default();
//!         conn.write_response(HttpStatus::OK, format!("user {id}"), MimeType::TextPlain).await?;
//!         Ok(())
//!     })
//! }
//!
//! let mut builder = ServerBuilder::new();
//! builder.host("127.0.0.1").port(8080).add(Method::GET, "/user/:id", user);
//! builder.build()?.serve().await?;
//! ```

pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod http_object;
pub mod http_status;
pub mod http_type;
pub mod logging;
pub mod mime_type;
pub mod parser;
pub mod router;
pub mod server;

pub use config::{ConcurrencyMode, ServerConfig};
pub use connection::Connection;
pub use dispatcher::{Handler, HandlerFuture};
pub use error::{ParseError, RouteError, ServerError};
pub use http_object::HttpRequest;
pub use http_status::HttpStatus;
pub use http_type::Method;
pub use mime_type::MimeType;
pub use server::{Listener, Server, ServerBuilder};
