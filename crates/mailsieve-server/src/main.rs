//! MailSieve - POP3 filtering proxy entry point

use anyhow::Result;
use mailsieve_common::config::Config;
use mailsieve_core::{AcceptAll, LineTransport, Pop3Client, Pop3Server, ProxyHandler};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(&config.logging.filter);

    info!("Starting MailSieve POP3 proxy...");
    info!(
        "Upstream POP3 server is {}:{}",
        config.upstream.host, config.upstream.port
    );

    let listener = TcpListener::bind(&config.proxy.bind).await?;
    info!("Listening on {}", config.proxy.bind);

    let config = Arc::new(config);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, addr)) => {
                        let config = config.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, addr, config).await;
                        });
                    }
                    Err(e) => {
                        error!("Accept error: {}", e);
                    }
                }
            }
        }
    }

    info!("MailSieve shutdown complete");
    Ok(())
}

/// Handles a single accepted connection: dial the upstream server, then
/// run the proxying POP3 session until the client quits.
async fn handle_connection(stream: TcpStream, addr: SocketAddr, config: Arc<Config>) {
    info!("New connection from {}", addr);

    let mut local = LineTransport::new(stream);

    let upstream = match Pop3Client::connect(&config.upstream.host, config.upstream.port).await {
        Ok(upstream) => upstream,
        Err(e) => {
            error!(
                "Cannot reach upstream {}:{}: {}",
                config.upstream.host, config.upstream.port, e
            );
            let _ = local
                .send_line("-ERR MailSieve cannot reach the upstream server")
                .await;
            let _ = local.shutdown().await;
            return;
        }
    };

    let handler = ProxyHandler::new(upstream, AcceptAll);
    let server = Pop3Server::new(local, handler, &config.proxy.server_name);
    if let Err(e) = server.run().await {
        error!("Connection error from {}: {}", addr, e);
    }

    info!("Connection closed for {}", addr);
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(filter)
        .init();
}
