//! Message header fields

/// Well known header field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    To,
    From,
    ContentType,
    Bcc,
    Cc,
    Subject,
    Date,
    Other,
}

impl FieldType {
    /// Maps a field name to its type by exact case-insensitive match.
    fn of(name: &str) -> FieldType {
        if name.eq_ignore_ascii_case("To") {
            FieldType::To
        } else if name.eq_ignore_ascii_case("From") {
            FieldType::From
        } else if name.eq_ignore_ascii_case("Content-Type") {
            FieldType::ContentType
        } else if name.eq_ignore_ascii_case("BCC") {
            FieldType::Bcc
        } else if name.eq_ignore_ascii_case("CC") {
            FieldType::Cc
        } else if name.eq_ignore_ascii_case("Subject") {
            FieldType::Subject
        } else if name.eq_ignore_ascii_case("Date") {
            FieldType::Date
        } else {
            FieldType::Other
        }
    }
}

/// One logical header field.
#[derive(Debug, Clone)]
pub struct MessageHeaderField {
    name: String,
    body: Option<String>,
    field_type: FieldType,
}

impl MessageHeaderField {
    /// Parses a logical header line: split at the first colon into a
    /// trimmed name and trimmed body. A line with no colon yields a field
    /// with that name and no body.
    pub fn parse(line: &str) -> Self {
        let (name, body) = match line.find(':') {
            Some(colon) => (
                line[..colon].trim().to_string(),
                Some(line[colon + 1..].trim().to_string()),
            ),
            None => (line.trim().to_string(), None),
        };

        let field_type = FieldType::of(&name);
        Self {
            name,
            body,
            field_type,
        }
    }

    /// The field's name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's body, if the line had a colon.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// The field's type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
}
