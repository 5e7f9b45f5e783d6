//! Message tree nodes
//!
//! Recursive decomposition of a message into a header plus either an
//! opaque body or an ordered list of child nodes. Parsing never fails;
//! anything unparsable degrades to an opaque leaf.

use super::field::{FieldType, MessageHeaderField};
use super::header::MessageHeader;

/// Maximum multipart nesting depth. Parts nested deeper than this are
/// parsed as opaque leaves to bound recursion on adversarial input.
pub const MAX_DEPTH: usize = 16;

/// A node's content: a body and children are mutually exclusive.
#[derive(Debug, Clone)]
pub enum Content {
    /// Opaque body text (possibly empty).
    Leaf(String),
    /// Ordered child nodes of a multipart message.
    Multipart(Vec<MessageNode>),
}

/// One node of a parsed message tree.
#[derive(Debug, Clone)]
pub struct MessageNode {
    header: MessageHeader,
    content: Content,
}

impl MessageNode {
    /// Parses a node from message text. Accepts both `\n` and `\r\n`
    /// line endings.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        Self::parse_lines(&lines, 0)
    }

    fn parse_lines(lines: &[&str], depth: usize) -> Self {
        let (header, body_start) = parse_header(lines);
        let content = match boundary_of(&header) {
            Some(boundary) if depth < MAX_DEPTH => {
                Content::Multipart(parse_parts(&lines[body_start..], &boundary, depth))
            }
            _ => Content::Leaf(lines[body_start..].join("\r\n")),
        };
        Self { header, content }
    }

    /// The node's header.
    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// The node's content.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// The node's body, or None if the node has children.
    pub fn body(&self) -> Option<&str> {
        match &self.content {
            Content::Leaf(body) => Some(body),
            Content::Multipart(_) => None,
        }
    }

    /// The node's children; empty if the node has a body.
    pub fn children(&self) -> &[MessageNode] {
        match &self.content {
            Content::Leaf(_) => &[],
            Content::Multipart(children) => children,
        }
    }

    /// The body of the first header field with the given name.
    pub fn field_body(&self, name: &str) -> Option<&str> {
        self.header.field_body(name)
    }

    /// The body of the first header field of the given type.
    pub fn field_body_of_type(&self, field_type: FieldType) -> Option<&str> {
        self.header.field_body_of_type(field_type)
    }
}

/// Reads header lines up to the blank separator (or end of input) and
/// returns the header plus the index of the first body line. Lines
/// starting with a space or tab continue the current logical line,
/// space-joined.
fn parse_header(lines: &[&str]) -> (MessageHeader, usize) {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];
        idx += 1;

        if line.is_empty() {
            // end of header
            break;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            // folded header field
            current.push(' ');
            current.push_str(line.trim());
        } else {
            if !current.is_empty() {
                fields.push(MessageHeaderField::parse(&current));
            }
            current = line.trim_end().to_string();
        }
    }

    if !current.is_empty() {
        fields.push(MessageHeaderField::parse(&current));
    }

    (MessageHeader::new(fields), idx)
}

/// Finds the multipart boundary declared by the header, if any.
///
/// The first Content-Type field whose body claims `multipart` wins;
/// scanning stops there whether or not a boundary can be extracted from
/// it. An empty extracted value counts as no boundary.
fn boundary_of(header: &MessageHeader) -> Option<String> {
    let field = header.fields_by_type(FieldType::ContentType).find(|f| {
        f.body()
            .is_some_and(|b| b.to_ascii_lowercase().contains("multipart"))
    })?;
    extract_boundary(field.body()?)
}

fn extract_boundary(body: &str) -> Option<String> {
    let chars: Vec<char> = body.chars().collect();
    let after = find_ci(&chars, "boundary")? + "boundary".len();

    // the value starts after the following '=' if present, or right
    // after the parameter name if absent
    let mut start = match (after..chars.len()).find(|&i| chars[i] == '=') {
        Some(eq) => eq + 1,
        None => after,
    };
    while start < chars.len() && chars[start].is_whitespace() {
        start += 1;
    }
    if start >= chars.len() {
        return None;
    }

    let value: String = if chars[start] == '"' {
        // quoted value: ends at the first unescaped quote; an escaped
        // quote is retained verbatim, no unescaping is performed
        start += 1;
        let mut end = start;
        while end < chars.len() {
            if chars[end] == '\\' && end + 1 < chars.len() && chars[end + 1] == '"' {
                end += 1;
            } else if chars[end] == '"' {
                break;
            }
            end += 1;
        }
        chars[start..end].iter().collect()
    } else {
        // unquoted value: runs to the next ';' or end of field
        let mut end = start;
        while end < chars.len() && chars[end] != ';' {
            end += 1;
        }
        chars[start..end].iter().collect()
    };

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Case-insensitive substring search over chars.
fn find_ci(chars: &[char], needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.len() > chars.len() {
        return None;
    }
    (0..=chars.len() - needle.len()).find(|&i| {
        chars[i..i + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

/// Splits a multipart body into child nodes.
///
/// Everything before the opening `--<boundary>` is preamble and
/// discarded; `--<boundary>` closes the pending part and starts the next;
/// `--<boundary>--` ends the scan with trailing lines discarded. A
/// pending part left by a missing closing delimiter is still emitted.
fn parse_parts(lines: &[&str], boundary: &str, depth: usize) -> Vec<MessageNode> {
    let open = format!("--{}", boundary);
    let close = format!("--{}--", boundary);

    let mut iter = lines.iter();
    for line in iter.by_ref() {
        if *line == open {
            break;
        }
    }

    let mut children = Vec::new();
    let mut part: Vec<&str> = Vec::new();
    for line in iter {
        if *line == open {
            flush_part(&mut part, &mut children, depth);
        } else if *line == close {
            break;
        } else {
            part.push(line);
        }
    }
    flush_part(&mut part, &mut children, depth);

    children
}

fn flush_part(part: &mut Vec<&str>, children: &mut Vec<MessageNode>, depth: usize) {
    // a part with no text at all is not a child
    if part.iter().any(|l| !l.is_empty()) {
        children.push(MessageNode::parse_lines(part, depth + 1));
    }
    part.clear();
}
