use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use micro_route_server::{
    logging,
    ConcurrencyMode,
    Connection,
    HandlerFuture,
    HttpRequest,
    HttpStatus,
    Method,
    MimeType,
    ServerBuilder,
};

#[derive(Parser, Debug)]
#[command(name = "micro-route-server", about = "Serves a few demo routes over HTTP/1.1")]
struct Args {
    #[arg(long, env = "SERVER_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(long, env = "SERVER_PORT", default_value_t = 8080)]
    port: u16,

    #[arg(long, env = "SERVER_MAX_REQUEST_BYTES", default_value_t = 4096)]
    max_request_bytes: usize,

    #[arg(long, env = "SERVER_MAX_CONNECTIONS", default_value_t = 1024)]
    max_connections: usize,

    /// Handle each connection on the accept loop instead of a separate task.
    #[arg(long, env = "SERVER_INLINE")]
    inline: bool,

    /// 0 disables the read deadline.
    #[arg(long, env = "SERVER_READ_TIMEOUT_SECS", default_value_t = 30)]
    read_timeout_secs: u64,
}

fn index(_req: HttpRequest, conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async move {
        conn.write_response(HttpStatus::OK, "<h1>Hello, World!</h1>", MimeType::TextHtml).await?;
        Ok(())
    })
}

fn user(req: HttpRequest, conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async move {
        let id = req.param("id").unwrap_or_default();
        let body = format!("{{\"id\":\"{id}\"}}");
        conn.write_response(HttpStatus::OK, body, MimeType::ApplicationJson).await?;
        Ok(())
    })
}

fn echo(req: HttpRequest, conn: &mut Connection) -> HandlerFuture<'_> {
    Box::pin(async move {
        let content_type = req.header("content-type").map(MimeType::lookup).unwrap_or_default();
        conn.write_response(HttpStatus::OK, &req.body, content_type).await?;
        Ok(())
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(logging::DEFAULT_FILTER);
    let args = Args::parse();

    let read_timeout = match args.read_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let concurrency = if args.inline {
        ConcurrencyMode::Inline
    } else {
        ConcurrencyMode::PerConnectionWorker
    };

    let mut builder = ServerBuilder::new();
    builder
        .host(args.host)
        .port(args.port)
        .concurrency(concurrency)
        .max_request_bytes(args.max_request_bytes)
        .max_connections(args.max_connections)
        .read_timeout(read_timeout)
        .add(Method::GET, "/", index)
        .add(Method::GET, "/user/:id", user)
        .add(Method::POST, "/echo", echo);

    builder.build()?.serve().await
}
