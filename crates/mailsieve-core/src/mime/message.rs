//! Parsed messages

use super::node::MessageNode;

/// A retrieved message: the original text and its parsed root node.
///
/// Built once per retrieval; immutable afterwards. There is no guarantee
/// that the parsed tree can be re-serialized back to the original wire
/// form, which is why the text is kept alongside it.
#[derive(Debug, Clone)]
pub struct Message {
    text: String,
    root: MessageNode,
}

impl Message {
    /// Parses a message text.
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let root = MessageNode::parse(&text);
        Self { text, root }
    }

    /// The message's original text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The message's root node.
    pub fn root(&self) -> &MessageNode {
        &self.root
    }

    /// Consumes the message, returning the original text.
    pub fn into_text(self) -> String {
        self.text
    }
}
