//! POP3 client role
//!
//! Drives an outbound session against a real POP3 server. The protocol is
//! strictly sequential: each operation sends one command and consumes its
//! reply before the next may be issued, which `&mut self` enforces.

use crate::net::{self, LineTransport};
use mailsieve_common::{Error, Result};
use std::collections::BTreeMap;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::error;

/// Success rule for POP3 replies: success iff the line starts with `+OK`.
/// Anything else, including `-ERR` and malformed replies, is a failure
/// carrying the raw line as its only diagnostic.
fn is_ok(line: &str) -> bool {
    line.starts_with("+OK")
}

/// A POP3 mail client.
pub struct Pop3Client<S> {
    transport: LineTransport<S>,
}

impl Pop3Client<TcpStream> {
    /// Connects to the given POP3 server and consumes its greeting.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let transport = net::connect(host, port).await?;
        Self::handshake(transport).await
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Pop3Client<S> {
    /// Completes the session setup over an already-open transport by
    /// reading and discarding exactly one line (the server greeting).
    pub async fn handshake(mut transport: LineTransport<S>) -> Result<Self> {
        transport
            .receive_line()
            .await?
            .ok_or(Error::ConnectionClosed)?;
        Ok(Self { transport })
    }

    async fn receive(&mut self) -> Result<String> {
        self.transport
            .receive_line()
            .await?
            .ok_or(Error::ConnectionClosed)
    }

    /// Sends a command line and reads the single-line reply.
    pub async fn exchange(&mut self, line: &str) -> Result<String> {
        self.transport.send_line(line).await?;
        let reply = self.receive().await?;
        if is_ok(&reply) {
            Ok(reply)
        } else {
            Err(Error::Server(reply))
        }
    }

    /// Logs in with the given credentials.
    ///
    /// Sends `USER`; if that is rejected the operation fails immediately
    /// and `PASS` is never sent.
    pub async fn login(&mut self, user: &str, password: &str) -> Result<String> {
        self.transport.send_line(&format!("USER {}", user)).await?;
        let reply = self.receive().await?;
        if !is_ok(&reply) {
            return Err(Error::Server(reply));
        }
        self.exchange(&format!("PASS {}", password)).await
    }

    /// Logs out from the server.
    pub async fn logout(&mut self) -> Result<String> {
        self.exchange("QUIT").await
    }

    /// Sends a NOOP to the server.
    pub async fn noop(&mut self) -> Result<String> {
        self.exchange("NOOP").await
    }

    /// Marks the given message for deletion.
    pub async fn delete(&mut self, id: u32) -> Result<String> {
        self.exchange(&format!("DELE {}", id)).await
    }

    /// Lists all messages and their sizes in octets.
    pub async fn list(&mut self) -> Result<BTreeMap<u32, u64>> {
        self.exchange("LIST").await?;
        let mut sizes = BTreeMap::new();
        for (id, value) in self.read_listing().await? {
            match value.parse() {
                Ok(size) => {
                    sizes.insert(id, size);
                }
                Err(_) => error!("Malformed LIST entry for message {}: {}", id, value),
            }
        }
        Ok(sizes)
    }

    /// Lists all messages and their unique identifiers.
    pub async fn list_unique_ids(&mut self) -> Result<BTreeMap<u32, String>> {
        self.exchange("UIDL").await?;
        Ok(self.read_listing().await?.into_iter().collect())
    }

    /// Reads multi-line listing entries up to the lone `.` terminator.
    ///
    /// Each entry is split at the first space or, failing that, the first
    /// tab. Entries with no separator or an unparsable message number are
    /// logged and skipped; the listing as a whole still succeeds.
    async fn read_listing(&mut self) -> Result<Vec<(u32, String)>> {
        let mut entries = Vec::new();
        loop {
            let line = self.receive().await?;
            if line == "." {
                break;
            }

            let Some(at) = line.find(' ').or_else(|| line.find('\t')) else {
                error!("Malformed listing entry: {}", line);
                continue;
            };
            let (key, value) = line.split_at(at);
            match key.parse() {
                Ok(id) => entries.push((id, value[1..].to_string())),
                Err(_) => error!("Malformed listing entry: {}", line),
            }
        }
        Ok(entries)
    }

    /// Retrieves a message, reversing the dot-stuffing applied on the
    /// wire: a data line starting with `.` has exactly one leading dot
    /// removed.
    pub async fn retrieve(&mut self, id: u32) -> Result<String> {
        self.exchange(&format!("RETR {}", id)).await?;
        let mut lines = Vec::new();
        loop {
            let line = self.receive().await?;
            if line == "." {
                break;
            }
            match line.strip_prefix('.') {
                Some(rest) => lines.push(rest.to_string()),
                None => lines.push(line),
            }
        }
        Ok(lines.join("\r\n"))
    }

    /// Shuts the session's transport down.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.transport.shutdown().await
    }
}
