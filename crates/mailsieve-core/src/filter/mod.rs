//! Message inspection seam
//!
//! The proxy hands every retrieved message to a [`MessageFilter`] before
//! relaying it. Scoring and classification live behind this trait in
//! external collaborators; the core only produces the parsed tree.

use crate::mime::Message;
use async_trait::async_trait;

/// What to do with an inspected message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    /// Relay the message unchanged.
    Deliver,
    /// Relay the given text instead of the original message.
    Replace(String),
}

/// Inspects parsed messages in transit.
#[async_trait]
pub trait MessageFilter: Send + Sync {
    async fn inspect(&self, message: &Message) -> FilterAction;
}

/// Pass-through filter: delivers everything unchanged.
pub struct AcceptAll;

#[async_trait]
impl MessageFilter for AcceptAll {
    async fn inspect(&self, _message: &Message) -> FilterAction {
        FilterAction::Deliver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_accept_all_delivers() {
        let message = Message::parse("Subject: Hi\r\n\r\nHello");
        assert_eq!(AcceptAll.inspect(&message).await, FilterAction::Deliver);
    }
}
