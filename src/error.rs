use std::io;
use thiserror::Error;

use crate::http_type::Method;

/// Why a single request could not be turned into an `HttpRequest`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read request: {0}")]
    Read(#[source] io::Error),

    #[error("timed out waiting for request bytes")]
    Timeout,

    #[error("request exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    #[error("missing path or method in request line")]
    MissingPathOrMethod,
}

/// Listener level failures. Only `Bind` stops the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to accept connection: {0}")]
    Accept(#[source] io::Error),
}

/// Rejected route registrations, reported by `ServerBuilder::build`.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid path: {0}. path should start with '/'")]
    InvalidPattern(String),

    #[error("empty capture name in pattern {0}")]
    EmptyCaptureName(String),

    #[error("routes can not be registered for an unsupported method")]
    UnsupportedMethod,

    #[error("{method} {pattern} is already registered")]
    Duplicate { method: Method, pattern: String },
}
