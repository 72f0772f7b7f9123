//! End-to-end tests: a real listener on 127.0.0.1:0 and raw requests over TCP.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use micro_route_server::{
    ConcurrencyMode,
    Connection,
    HandlerFuture,
    HttpRequest,
    HttpStatus,
    Method,
    MimeType,
    ServerBuilder,
    ServerError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn stop(self) {
        self.shutdown.cancel();
        self.handle.await.unwrap();
    }
}

async fn start(builder: ServerBuilder) -> TestServer {
    let listener = builder.build().unwrap().bind().await.unwrap();
    let addr = listener.local_addr();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(listener.run_until(shutdown.clone()));
    TestServer { addr, shutdown, handle }
}

fn base(mode: ConcurrencyMode) -> ServerBuilder {
    let mut builder = ServerBuilder::new();
    builder
        .host("127.0.0.1")
        .port(0)
        .concurrency(mode)
        .read_timeout(Some(Duration::from_secs(2)));
    builder
}

async fn send(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("server did not close the connection")
        .unwrap();
    String::from_utf8(response).unwrap()
}

fn body(response: &str) -> &str {
    match response.find("\r\n\r\n") {
        Some(pos) => &response[pos + 4..],
        None => "",
    }
}

fn index(_req: HttpRequest, conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async move {
        conn.write_response(HttpStatus::OK, "index", MimeType::TextPlain).await?;
        Ok(())
    })
}

fn user(req: HttpRequest, conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async move {
        let body = format!("user={} params={}", req.param("id").unwrap_or("-"), req.params.len());
        conn.write_response(HttpStatus::OK, body, MimeType::TextPlain).await?;
        Ok(())
    })
}

fn user_me(req: HttpRequest, conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async move {
        let body = format!("me params={}", req.params.len());
        conn.write_response(HttpStatus::OK, body, MimeType::TextPlain).await?;
        Ok(())
    })
}

fn content_type(req: HttpRequest, conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async move {
        let value = req.header("content-type").unwrap_or("none").to_string();
        conn.write_response(HttpStatus::OK, value, MimeType::TextPlain).await?;
        Ok(())
    })
}

fn echo(req: HttpRequest, conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async move {
        conn.write_response(HttpStatus::Created, &req.body, MimeType::ApplicationJson).await?;
        Ok(())
    })
}

fn silent(_req: HttpRequest, _conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async { Ok(()) })
}

fn failing(_req: HttpRequest, _conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async { Err(anyhow::anyhow!("handler gave up")) })
}

fn explode() -> anyhow::Result<()> {
    panic!("handler exploded")
}

fn panicking(_req: HttpRequest, _conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async { explode() })
}

static SLOW_IN_FLIGHT: AtomicUsize = AtomicUsize::new(0);
static SLOW_PEAK: AtomicUsize = AtomicUsize::new(0);

fn slow(_req: HttpRequest, conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async move {
        let now = SLOW_IN_FLIGHT.fetch_add(1, Ordering::SeqCst) + 1;
        SLOW_PEAK.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        SLOW_IN_FLIGHT.fetch_sub(1, Ordering::SeqCst);
        conn.write_response(HttpStatus::OK, "slow", MimeType::TextPlain).await?;
        Ok(())
    })
}

static INLINE_IN_FLIGHT: AtomicUsize = AtomicUsize::new(0);
static INLINE_PEAK: AtomicUsize = AtomicUsize::new(0);

fn slow_inline(_req: HttpRequest, conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async move {
        let now = INLINE_IN_FLIGHT.fetch_add(1, Ordering::SeqCst) + 1;
        INLINE_PEAK.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        INLINE_IN_FLIGHT.fetch_sub(1, Ordering::SeqCst);
        conn.write_response(HttpStatus::OK, "slow", MimeType::TextPlain).await?;
        Ok(())
    })
}

#[tokio::test]
async fn templated_route_receives_params() {
    let mut builder = base(ConcurrencyMode::PerConnectionWorker);
    builder.add(Method::GET, "/", index).add(Method::GET, "/user/:id", user);
    let server = start(builder).await;

    let response = send(server.addr, b"GET /user/42 HTTP/1.1\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert_eq!(body(&response), "user=42 params=1");

    server.stop().await;
}

#[tokio::test]
async fn no_routes_yields_404_naming_path() {
    let server = start(base(ConcurrencyMode::PerConnectionWorker)).await;

    let response = send(server.addr, b"GET /anything HTTP/1.1\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"), "{response}");
    assert!(body(&response).contains("/anything"));

    server.stop().await;
}

#[tokio::test]
async fn exact_route_wins_over_templated() {
    let mut builder = base(ConcurrencyMode::PerConnectionWorker);
    builder.add(Method::GET, "/user/:id", user).add(Method::GET, "/user/me", user_me);
    let server = start(builder).await;

    let response = send(server.addr, b"GET /user/me HTTP/1.1\r\n\r\n").await;
    assert_eq!(body(&response), "me params=0");

    server.stop().await;
}

#[tokio::test]
async fn extra_segment_is_not_found() {
    let mut builder = base(ConcurrencyMode::PerConnectionWorker);
    builder.add(Method::GET, "/user/:id", user);
    let server = start(builder).await;

    let response = send(server.addr, b"GET /user/123/extra HTTP/1.1\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"), "{response}");

    server.stop().await;
}

#[tokio::test]
async fn malformed_request_line_is_400() {
    let server = start(base(ConcurrencyMode::PerConnectionWorker)).await;

    let response = send(server.addr, b"GARBAGE\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{response}");
    assert!(response.contains("Content-Type: text/plain\r\n"));
    assert!(body(&response).starts_with("Invalid request header"));

    server.stop().await;
}

#[tokio::test]
async fn headers_are_case_insensitive() {
    let mut builder = base(ConcurrencyMode::PerConnectionWorker);
    builder.add(Method::POST, "/ct", content_type);
    let server = start(builder).await;

    let response = send(server.addr, b"POST /ct HTTP/1.1\r\nCONTENT-TYPE: text/plain\r\n\r\n").await;
    assert_eq!(body(&response), "text/plain");

    server.stop().await;
}

#[tokio::test]
async fn content_length_matches_body() {
    let mut builder = base(ConcurrencyMode::PerConnectionWorker);
    builder.add(Method::POST, "/echo", echo);
    let server = start(builder).await;

    let response = send(server.addr, "POST /echo HTTP/1.1\r\n\r\n{\"name\":\"ünï\"}".as_bytes()).await;
    let payload = "{\"name\":\"ünï\"}";
    assert!(response.starts_with("HTTP/1.1 201 Created\r\n"), "{response}");
    assert!(response.contains(&format!("Content-Length: {}\r\n\r\n", payload.len())));
    assert_eq!(body(&response), payload);

    server.stop().await;
}

#[tokio::test]
async fn oversize_request_is_413() {
    let mut builder = base(ConcurrencyMode::PerConnectionWorker);
    builder.max_request_bytes(32).add(Method::GET, "/", index);
    let server = start(builder).await;

    let response = send(server.addr, b"GET / HTTP/1.1\r\nX-Padding: aaaaaaaaaaaaaaaaaaaaaaaa\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 413 Payload Too Large\r\n"), "{response}");

    server.stop().await;
}

#[tokio::test]
async fn silent_client_gets_408() {
    let mut builder = base(ConcurrencyMode::PerConnectionWorker);
    builder.read_timeout(Some(Duration::from_millis(100)));
    let server = start(builder).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 408 Request Timeout\r\n"), "{response}");

    server.stop().await;
}

#[tokio::test]
async fn handler_that_writes_nothing_still_closes() {
    let mut builder = base(ConcurrencyMode::PerConnectionWorker);
    builder.add(Method::GET, "/silent", silent).add(Method::GET, "/fail", failing);
    let server = start(builder).await;

    assert_eq!(send(server.addr, b"GET /silent HTTP/1.1\r\n\r\n").await, "");
    assert_eq!(send(server.addr, b"GET /fail HTTP/1.1\r\n\r\n").await, "");

    server.stop().await;
}

#[tokio::test]
async fn inline_mode_survives_panicking_handler() {
    let mut builder = base(ConcurrencyMode::Inline);
    builder.add(Method::GET, "/boom", panicking).add(Method::GET, "/", index);
    let server = start(builder).await;

    assert_eq!(send(server.addr, b"GET /boom HTTP/1.1\r\n\r\n").await, "");
    let response = send(server.addr, b"GET / HTTP/1.1\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");

    server.stop().await;
}

#[tokio::test]
async fn worker_limit_caps_concurrency() {
    let mut builder = base(ConcurrencyMode::PerConnectionWorker);
    builder.max_connections(2).add(Method::GET, "/slow", slow);
    let server = start(builder).await;

    let clients: Vec<_> = (0..6)
        .map(|_| tokio::spawn(send(server.addr, b"GET /slow HTTP/1.1\r\n\r\n")))
        .collect();
    for client in clients {
        assert_eq!(body(&client.await.unwrap()), "slow");
    }
    // 6개가 동시에 들어오므로 permit 두 개가 모두 쓰여야 한다.
    assert_eq!(SLOW_PEAK.load(Ordering::SeqCst), 2);

    server.stop().await;
}

#[tokio::test]
async fn inline_mode_handles_one_connection_at_a_time() {
    let mut builder = base(ConcurrencyMode::Inline);
    builder.add(Method::GET, "/slow", slow_inline);
    let server = start(builder).await;

    let clients: Vec<_> = (0..4)
        .map(|_| tokio::spawn(send(server.addr, b"GET /slow HTTP/1.1\r\n\r\n")))
        .collect();
    for client in clients {
        assert_eq!(body(&client.await.unwrap()), "slow");
    }
    assert_eq!(INLINE_PEAK.load(Ordering::SeqCst), 1);

    server.stop().await;
}

#[tokio::test]
async fn bind_failure_is_reported() {
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();

    let mut builder = base(ConcurrencyMode::PerConnectionWorker);
    builder.port(port);
    let err = builder.build().unwrap().bind().await.err().unwrap();
    assert!(matches!(err, ServerError::Bind { .. }));
}

#[tokio::test]
async fn invalid_route_fails_build() {
    let mut builder = base(ConcurrencyMode::PerConnectionWorker);
    builder.add(Method::GET, "no-slash", index);
    assert!(builder.build().is_err());
}
