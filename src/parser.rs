use std::time::Duration;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tokio_util::io::read_buf;
use tracing::debug;

use crate::error::ParseError;
use crate::http_object::{HttpRequest, HttpRequestBuilder};
use crate::http_type::Method;

/// Performs the one read a connection gets.
///
/// The read is capped at `max_request_bytes + 1` so an oversize request can be
/// told apart from one that exactly fills the limit. There is no retry and no
/// second read: whatever arrived in this call is the whole request. An empty
/// result means the peer closed without sending anything.
pub async fn read_request<R>(reader: &mut R,
                             max_request_bytes: usize,
                             read_timeout: Option<Duration>) -> Result<Bytes, ParseError>
where
    R: AsyncRead + Unpin,
{
    let limit = max_request_bytes.saturating_add(1);
    let mut buf = BytesMut::with_capacity(limit);
    let mut limited = reader.take(limit as u64);

    let read = read_buf(&mut limited, &mut buf);
    let read_size = match read_timeout {
        Some(duration) => timeout(duration, read).await.map_err(|_| ParseError::Timeout)?,
        None => read.await,
    }
    .map_err(ParseError::Read)?;

    if read_size > max_request_bytes {
        return Err(ParseError::PayloadTooLarge { limit: max_request_bytes });
    }

    debug!(read_size, "request bytes read");
    Ok(buf.freeze())
}

/// Turns raw request bytes into an `HttpRequest` with empty `params`.
///
/// Lines are split on `\n` with a trailing `\r` dropped. The request line is
/// split on single spaces. Header lines without a `:` are skipped.
pub fn parse_request(raw: &Bytes) -> Result<HttpRequest, ParseError> {
    let mut builder = HttpRequestBuilder::new();
    let mut lines = raw.split(|b| *b == b'\n');
    let mut consumed = 0usize;

    let request_line = lines.next().unwrap_or_default();
    consumed += request_line.len() + 1;
    let (method, path, version) = parse_request_line(&line_text(request_line))?;
    builder.method(method).path(path).version(version);

    let mut body_start = None;
    for line in lines {
        consumed += line.len() + 1;
        let text = line_text(line);
        if text.is_empty() {
            body_start = Some(consumed.min(raw.len()));
            break;
        }

        match text.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                builder.header(key.trim(), value.trim());
            }
            _ => continue,
        }
    }

    if let Some(start) = body_start {
        builder.body(raw.slice(start..));
    }

    builder.build().map_err(|_| ParseError::MissingPathOrMethod)
}

fn line_text(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() < 2 {
        return Err(ParseError::MalformedRequestLine(line.to_string()));
    }

    let (method, path) = (tokens[0], tokens[1]);
    if method.is_empty() || path.is_empty() {
        return Err(ParseError::MissingPathOrMethod);
    }
    let version = tokens.get(2).copied().unwrap_or_default();

    Ok((Method::from_token(method), path.to_string(), version.to_string()))
}
