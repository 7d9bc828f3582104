use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use lunchmenu_server::{ServerConfig, StartupError, build_pipeline, server};
use std::error::Error;
use std::io;
use std::sync::Arc;
use tower::Service;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(e) = run().await {
        error!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;
    let pipeline = build_pipeline(&config)?;
    let app = server::create_app(Arc::new(pipeline));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Lunch menu server listening on http://{} (HTTP/1.1 + HTTP/2)", config.bind_addr);
    info!("Cache directory: {}", config.cache_dir.display());
    info!("Menu page: {}", config.menu_url);

    // Use hyper's auto-negotiating server to support both HTTP/1.1 and HTTP/2
    let conn_builder = ConnBuilder::new(hyper_util::rt::TokioExecutor::new());

    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };
        debug!("New connection from: {}", addr);
        let io = TokioIo::new(stream);
        let app = app.clone();
        let conn_builder = conn_builder.clone();

        tokio::spawn(async move {
            let service = hyper::service::service_fn(move |req| app.clone().call(req));
            if let Err(err) = conn_builder.serve_connection(io, service).await {
                // Peers hanging up mid-connection is routine
                let is_normal_close = err
                    .source()
                    .and_then(|e| e.downcast_ref::<io::Error>())
                    .map(|io_err| {
                        matches!(
                            io_err.kind(),
                            io::ErrorKind::ConnectionReset
                                | io::ErrorKind::BrokenPipe
                                | io::ErrorKind::UnexpectedEof
                        )
                    })
                    .unwrap_or(false);

                if is_normal_close {
                    debug!("Connection from {} closed normally", addr);
                } else {
                    error!("Error serving connection from {}: {}", addr, err);
                }
            }
        });
    }
}
