//! POP3 protocol state machines
//!
//! Client role (outbound, toward the real server), server role (inbound,
//! toward the local mail client), and the proxy handler that connects
//! the two.

pub mod client;
pub mod proxy;
pub mod server;

pub use client::Pop3Client;
pub use proxy::ProxyHandler;
pub use server::{CommandHandler, EchoHandler, Pop3Server, Reply};
