//! Line-oriented transport
//!
//! Turns an unreliable byte stream into discrete protocol lines,
//! tolerating arbitrary fragmentation and coalescing by the underlying
//! socket. No protocol knowledge lives here.

use mailsieve_common::Result;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

/// Size of the fixed receive buffer. Lines longer than this are still
/// supported; the overflow accumulates in the partial-line buffer.
const BUFFER_SIZE: usize = 1024;

/// Buffered line reader/writer over a byte stream.
///
/// Generic over the stream so protocol code runs over a `TcpStream` in
/// production and a `tokio::io::duplex` pair in tests. At most one receive
/// and one send may be outstanding at a time, which `&mut self` enforces.
pub struct LineTransport<S> {
    stream: S,
    buffer: [u8; BUFFER_SIZE],
    /// Start of unread bytes in `buffer`.
    consumed: usize,
    /// End of valid bytes in `buffer`.
    /// Invariant: `consumed <= filled <= BUFFER_SIZE`.
    filled: usize,
    /// Partial line carried over from earlier buffer loads.
    partial: Vec<u8>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> LineTransport<S> {
    /// Wraps an already-connected stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: [0; BUFFER_SIZE],
            consumed: 0,
            filled: 0,
            partial: Vec::new(),
        }
    }

    /// Receives the next complete line.
    ///
    /// The `\n` terminator and an optional preceding `\r` are stripped.
    /// Returns `Ok(None)` when the peer has closed the connection
    /// (zero-length read); no further lines will ever arrive after that.
    pub async fn receive_line(&mut self) -> Result<Option<String>> {
        loop {
            // scan the unread window for the terminator
            if let Some(pos) = self.buffer[self.consumed..self.filled]
                .iter()
                .position(|&b| b == b'\n')
            {
                let end = self.consumed + pos;
                let mut raw = std::mem::take(&mut self.partial);
                raw.extend_from_slice(&self.buffer[self.consumed..end]);
                if raw.last() == Some(&b'\r') {
                    raw.pop();
                }

                self.consumed = end + 1;
                if self.consumed == self.filled {
                    // buffer exhausted, the next load starts at offset 0
                    self.consumed = 0;
                    self.filled = 0;
                }

                let line = String::from_utf8_lossy(&raw).into_owned();
                info!("<< {}", line);
                return Ok(Some(line));
            }

            // no terminator in the buffered bytes: stash the unmatched
            // tail and request more from the socket
            self.partial
                .extend_from_slice(&self.buffer[self.consumed..self.filled]);
            self.consumed = 0;
            self.filled = 0;

            let read = self.stream.read(&mut self.buffer).await?;
            if read == 0 {
                // peer closed the connection
                return Ok(None);
            }
            self.filled = read;
        }
    }

    /// Sends a line, appending the `\r\n` protocol terminator.
    ///
    /// The whole payload is written before this returns; partial writes
    /// are retried by `write_all`.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        info!(">> {}", line);

        let mut payload = Vec::with_capacity(line.len() + 2);
        payload.extend_from_slice(line.as_bytes());
        payload.extend_from_slice(b"\r\n");

        self.stream.write_all(&payload).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Orderly two-way close of the underlying stream.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_receive_single_line() {
        let (local, mut remote) = duplex(BUFFER_SIZE);
        let mut transport = LineTransport::new(local);

        remote.write_all(b"+OK ready\r\n").await.unwrap();

        let line = transport.receive_line().await.unwrap();
        assert_eq!(line.as_deref(), Some("+OK ready"));
    }

    #[tokio::test]
    async fn test_receive_coalesced_lines() {
        let (local, mut remote) = duplex(BUFFER_SIZE);
        let mut transport = LineTransport::new(local);

        // two lines arriving in a single segment
        remote.write_all(b"first\r\nsecond\r\n").await.unwrap();

        assert_eq!(
            transport.receive_line().await.unwrap().as_deref(),
            Some("first")
        );
        assert_eq!(
            transport.receive_line().await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn test_receive_fragmented_line() {
        let (local, mut remote) = duplex(BUFFER_SIZE);
        let mut transport = LineTransport::new(local);

        let writer = tokio::spawn(async move {
            remote.write_all(b"+OK par").await.unwrap();
            remote.flush().await.unwrap();
            tokio::task::yield_now().await;
            remote.write_all(b"tial re").await.unwrap();
            remote.flush().await.unwrap();
            tokio::task::yield_now().await;
            remote.write_all(b"ad\r\n").await.unwrap();
            remote
        });

        let line = transport.receive_line().await.unwrap();
        assert_eq!(line.as_deref(), Some("+OK partial read"));
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_receive_terminator_split_across_reads() {
        let (local, mut remote) = duplex(BUFFER_SIZE);
        let mut transport = LineTransport::new(local);

        let writer = tokio::spawn(async move {
            remote.write_all(b"split\r").await.unwrap();
            remote.flush().await.unwrap();
            tokio::task::yield_now().await;
            remote.write_all(b"\nnext\r\n").await.unwrap();
            remote
        });

        assert_eq!(
            transport.receive_line().await.unwrap().as_deref(),
            Some("split")
        );
        assert_eq!(
            transport.receive_line().await.unwrap().as_deref(),
            Some("next")
        );
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_receive_line_longer_than_buffer() {
        let (local, mut remote) = duplex(BUFFER_SIZE);
        let mut transport = LineTransport::new(local);

        let long = "x".repeat(BUFFER_SIZE * 3 + 17);
        let payload = format!("{}\r\n", long);
        let writer = tokio::spawn(async move {
            remote.write_all(payload.as_bytes()).await.unwrap();
            remote
        });

        let line = transport.receive_line().await.unwrap();
        assert_eq!(line.as_deref(), Some(long.as_str()));
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_receive_bare_lf() {
        let (local, mut remote) = duplex(BUFFER_SIZE);
        let mut transport = LineTransport::new(local);

        remote.write_all(b"no carriage return\n").await.unwrap();

        let line = transport.receive_line().await.unwrap();
        assert_eq!(line.as_deref(), Some("no carriage return"));
    }

    #[tokio::test]
    async fn test_peer_close_yields_none() {
        let (local, remote) = duplex(BUFFER_SIZE);
        let mut transport = LineTransport::new(local);

        drop(remote);

        assert!(transport.receive_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_line_appends_terminator() {
        let (local, mut remote) = duplex(BUFFER_SIZE);
        let mut transport = LineTransport::new(local);

        transport.send_line("USER alice").await.unwrap();

        let mut buf = [0u8; 32];
        let n = remote.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"USER alice\r\n");
    }

    #[tokio::test]
    async fn test_send_line_larger_than_peer_window() {
        // a tiny duplex window forces the write path to handle
        // partial-send conditions
        let (local, mut remote) = duplex(16);
        let mut transport = LineTransport::new(local);

        let line = "y".repeat(200);
        let expected = format!("{}\r\n", line);

        let reader = tokio::spawn(async move {
            let mut received = Vec::new();
            let mut buf = [0u8; 16];
            while received.len() < 202 {
                let n = remote.read(&mut buf).await.unwrap();
                received.extend_from_slice(&buf[..n]);
            }
            received
        });

        transport.send_line(&line).await.unwrap();
        let received = reader.await.unwrap();
        assert_eq!(received, expected.as_bytes());
    }
}
