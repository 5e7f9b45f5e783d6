//! MIME message parsing
//!
//! A pure, synchronous, recursive parser that turns message text into a
//! header/body or header/children tree. No I/O, fully deterministic, and
//! it never fails: missing or malformed pieces degrade the result instead
//! of aborting.

pub mod field;
pub mod header;
pub mod message;
pub mod node;

pub use field::{FieldType, MessageHeaderField};
pub use header::MessageHeader;
pub use message::Message;
pub use node::{Content, MessageNode, MAX_DEPTH};
