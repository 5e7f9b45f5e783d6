//! POP3 server role
//!
//! Services the session with the local mail client: greeting, command
//! read-loop, and shutdown on QUIT. Everything except QUIT is delegated
//! to a [`CommandHandler`], which is where proxying and filtering are
//! wired in.

use crate::net::LineTransport;
use async_trait::async_trait;
use mailsieve_common::Result;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

/// Reply produced by a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A single status line, sent verbatim.
    Line(String),
    /// A status line followed by data lines and a terminating `.`.
    /// Data lines are dot-stuffed on the wire.
    Multi { status: String, lines: Vec<String> },
}

/// Handles the command lines of one local POP3 session.
#[async_trait]
pub trait CommandHandler: Send {
    /// Produces the reply for one command line.
    ///
    /// QUIT never reaches the handler; the server acknowledges it and
    /// shuts the connection down itself.
    async fn handle(&mut self, line: &str) -> Reply;

    /// Called once when the local client quits, before the final
    /// acknowledgment is sent.
    async fn quit(&mut self) {}
}

/// Minimal handler: acknowledges every command with `+OK <line>`.
pub struct EchoHandler;

#[async_trait]
impl CommandHandler for EchoHandler {
    async fn handle(&mut self, line: &str) -> Reply {
        Reply::Line(format!("+OK {}", line))
    }
}

/// A POP3 server servicing one accepted connection.
pub struct Pop3Server<S, H> {
    transport: LineTransport<S>,
    handler: H,
    greeting: String,
}

impl<S, H> Pop3Server<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    H: CommandHandler,
{
    /// Creates a server over an accepted transport.
    pub fn new(transport: LineTransport<S>, handler: H, server_name: &str) -> Self {
        Self {
            transport,
            handler,
            greeting: format!("+OK {} ready.", server_name),
        }
    }

    /// Runs the session to completion: greeting, then one command per
    /// loop iteration until QUIT or the peer disconnects.
    pub async fn run(mut self) -> Result<()> {
        self.transport.send_line(&self.greeting).await?;

        loop {
            let line = match self.transport.receive_line().await? {
                Some(line) => line,
                None => {
                    info!("Client disconnected");
                    return Ok(());
                }
            };

            // commands are matched case-insensitively
            if line.to_uppercase() == "QUIT" {
                self.handler.quit().await;
                self.transport.send_line("+OK Everything done.").await?;
                self.transport.shutdown().await?;
                return Ok(());
            }

            match self.handler.handle(&line).await {
                Reply::Line(status) => self.transport.send_line(&status).await?,
                Reply::Multi { status, lines } => {
                    self.transport.send_line(&status).await?;
                    for data in &lines {
                        if data.starts_with('.') {
                            self.transport.send_line(&format!(".{}", data)).await?;
                        } else {
                            self.transport.send_line(data).await?;
                        }
                    }
                    self.transport.send_line(".").await?;
                }
            }
        }
    }
}
