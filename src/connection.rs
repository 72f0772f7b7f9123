use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::ParseError;
use crate::http_status::status_line;
use crate::mime_type::MimeType;
use crate::parser;

/// Exclusive owner of one accepted socket.
///
/// The socket is closed by `close()` on the normal path and by `Drop` when the
/// task handling it unwinds, so no exit path leaves it open.
pub struct Connection {
    stream: TcpStream,
    peer_addr: SocketAddr,
}

impl Connection {

    pub fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Self { stream, peer_addr }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub(crate) async fn read_request(&mut self,
                                     max_request_bytes: usize,
                                     read_timeout: Option<Duration>) -> Result<Bytes, ParseError> {
        parser::read_request(&mut self.stream, max_request_bytes, read_timeout).await
    }

    // HTTP/1.1 200 OK
    // Content-Type: text/plain
    // Content-Length: 13
    //
    // Hello, World!
    /// Writes a complete response in a single write. The connection stays open;
    /// closing it is up to whoever owns the exchange.
    pub async fn write_response(&mut self,
                                status: impl Into<u16>,
                                body: impl AsRef<[u8]>,
                                content_type: MimeType) -> io::Result<()> {
        let encoded = encode_response(status.into(), body.as_ref(), content_type);
        self.stream.write_all(&encoded).await?;
        self.stream.flush().await
    }

    /// Half-closes the socket and discards what the peer still sends, for at
    /// most `limit`. A socket closed with unread input is reset by the kernel,
    /// and the reset can drop a response the peer has not read yet.
    pub(crate) async fn linger(&mut self, limit: Duration) {
        if self.stream.shutdown().await.is_err() {
            return;
        }

        let mut scratch = [0u8; 1024];
        let stream = &mut self.stream;
        let drain = async move {
            while let Ok(n) = stream.read(&mut scratch).await {
                if n == 0 {
                    break;
                }
            }
        };
        if timeout(limit, drain).await.is_err() {
            debug!(peer_addr = %self.peer_addr, "peer kept sending after the response");
        }
    }

    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!(peer_addr = %self.peer_addr, error = %e, "shutdown after response failed");
        }
    }
}

/// Status line, `Content-Type`, `Content-Length`, blank line, body. Nothing else.
pub fn encode_response(status: u16, body: &[u8], content_type: MimeType) -> Bytes {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
        status_line(status),
        content_type.as_str(),
        body.len()
    );

    let mut buf = BytesMut::with_capacity(head.len() + body.len());
    buf.put_slice(head.as_bytes());
    buf.put_slice(body);
    buf.freeze()
}
