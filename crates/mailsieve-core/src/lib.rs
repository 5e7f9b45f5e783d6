//! MailSieve Core - POP3 proxy and message parsing
//!
//! This crate provides the core functionality for MailSieve: the line
//! transport, the POP3 client and server state machines, the MIME message
//! parser, and the message inspection seam.

pub mod filter;
pub mod mime;
pub mod net;
pub mod pop3;

pub use filter::{AcceptAll, FilterAction, MessageFilter};
pub use mime::{FieldType, Message, MessageHeader, MessageHeaderField, MessageNode};
pub use net::LineTransport;
pub use pop3::{CommandHandler, EchoHandler, Pop3Client, Pop3Server, ProxyHandler, Reply};
