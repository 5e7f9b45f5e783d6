//! Upstream relay handler
//!
//! Wires the server role to a real POP3 session: commands from the local
//! mail client are forwarded upstream and their replies relayed back.
//! RETR is the interception point where the retrieved message is parsed
//! and handed to the message filter before delivery.

use super::client::Pop3Client;
use super::server::{CommandHandler, Reply};
use crate::filter::{FilterAction, MessageFilter};
use crate::mime::Message;
use async_trait::async_trait;
use mailsieve_common::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{error, warn};

/// Relays a local POP3 session to an already-connected upstream session,
/// inspecting retrieved messages in transit.
pub struct ProxyHandler<F, S> {
    upstream: Pop3Client<S>,
    filter: F,
}

impl<F, S> ProxyHandler<F, S>
where
    F: MessageFilter,
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Creates a handler around a connected upstream client.
    pub fn new(upstream: Pop3Client<S>, filter: F) -> Self {
        Self { upstream, filter }
    }

    /// Forwards a command verbatim and relays the single-line reply.
    async fn forward(&mut self, line: &str) -> Reply {
        match self.upstream.exchange(line).await {
            Ok(status) => Reply::Line(status),
            Err(e) => relay_error(e),
        }
    }

    /// Retrieves a message upstream, parses it, runs it through the
    /// filter and relays the (possibly replaced) text.
    async fn retrieve_inspected(&mut self, id: u32) -> Reply {
        let text = match self.upstream.retrieve(id).await {
            Ok(text) => text,
            Err(e) => return relay_error(e),
        };

        let message = Message::parse(text);
        let text = match self.filter.inspect(&message).await {
            FilterAction::Deliver => message.into_text(),
            FilterAction::Replace(replacement) => replacement,
        };

        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        Reply::Multi {
            status: format!("+OK {} octets", wire_octets(&lines)),
            lines,
        }
    }
}

/// The message size as the local client will receive it: each line is
/// dot-stuffed and CRLF-terminated on the wire.
fn wire_octets(lines: &[String]) -> usize {
    lines
        .iter()
        .map(|l| l.len() + 2 + usize::from(l.starts_with('.')))
        .sum()
}

/// A protocol-level upstream failure carries the raw status line, which
/// is relayed as-is; transport-level failures become a local `-ERR`.
fn relay_error(e: Error) -> Reply {
    match e {
        Error::Server(status) => Reply::Line(status),
        e => {
            error!("Upstream failure: {}", e);
            Reply::Line("-ERR Upstream server unavailable".to_string())
        }
    }
}

#[async_trait]
impl<F, S> CommandHandler for ProxyHandler<F, S>
where
    F: MessageFilter,
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn handle(&mut self, line: &str) -> Reply {
        let (word, arg) = match line.split_once(' ') {
            Some((word, arg)) => (word.to_uppercase(), arg.trim()),
            None => (line.trim().to_uppercase(), ""),
        };

        match word.as_str() {
            "USER" | "PASS" | "NOOP" | "DELE" => self.forward(line).await,

            "LIST" if arg.is_empty() => match self.upstream.list().await {
                Ok(sizes) => Reply::Multi {
                    status: "+OK scan listing follows".to_string(),
                    lines: sizes
                        .iter()
                        .map(|(id, size)| format!("{} {}", id, size))
                        .collect(),
                },
                Err(e) => relay_error(e),
            },

            "UIDL" if arg.is_empty() => match self.upstream.list_unique_ids().await {
                Ok(uids) => Reply::Multi {
                    status: "+OK unique-id listing follows".to_string(),
                    lines: uids
                        .iter()
                        .map(|(id, uid)| format!("{} {}", id, uid))
                        .collect(),
                },
                Err(e) => relay_error(e),
            },

            // LIST/UIDL with an argument are single-line exchanges
            "LIST" | "UIDL" => self.forward(line).await,

            "RETR" => match arg.parse() {
                Ok(id) => self.retrieve_inspected(id).await,
                // let the upstream produce its own error for a bad id
                Err(_) => self.forward(line).await,
            },

            // anything we do not relay is acknowledged as-is
            _ => Reply::Line(format!("+OK {}", line)),
        }
    }

    async fn quit(&mut self) {
        if let Err(e) = self.upstream.logout().await {
            warn!("Upstream logout failed: {}", e);
        }
        if let Err(e) = self.upstream.shutdown().await {
            warn!("Upstream shutdown failed: {}", e);
        }
    }
}
