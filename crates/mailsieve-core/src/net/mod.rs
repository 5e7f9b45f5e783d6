//! Networking primitives
//!
//! The line transport plus the outbound connector. The inbound side has no
//! separate type: an accepted `TcpStream` is wrapped with
//! [`LineTransport::new`] by the accept loop, after which the server role
//! sends its greeting.

pub mod transport;

pub use transport::LineTransport;

use mailsieve_common::{Error, Result};
use tokio::net::{lookup_host, TcpStream};
use tracing::{info, warn};

/// Opens a transport to a remote host and port.
///
/// The name is resolved to its candidate addresses and each is tried in
/// order; the first successful connection wins.
pub async fn connect(host: &str, port: u16) -> Result<LineTransport<TcpStream>> {
    let mut last_err = None;

    for addr in lookup_host((host, port)).await? {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                info!("Connected to {} ({})", host, addr);
                return Ok(LineTransport::new(stream));
            }
            Err(e) => {
                warn!("Connection attempt to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(match last_err {
        Some(e) => Error::Io(e),
        None => Error::Connect(format!("{}:{} did not resolve to any address", host, port)),
    })
}
