//! Message headers

use super::field::{FieldType, MessageHeaderField};
use std::collections::HashMap;

/// An ordered sequence of header fields plus a by-type index.
///
/// Insertion order is preserved and duplicate names are allowed. The
/// index has multimap semantics: zero, one, or many fields per type.
#[derive(Debug, Clone)]
pub struct MessageHeader {
    fields: Vec<MessageHeaderField>,
    by_type: HashMap<FieldType, Vec<usize>>,
}

impl MessageHeader {
    /// Builds a header from parsed fields. The by-type index is
    /// constructed once here; the header is immutable afterwards.
    pub fn new(fields: Vec<MessageHeaderField>) -> Self {
        let mut by_type: HashMap<FieldType, Vec<usize>> = HashMap::new();
        for (i, field) in fields.iter().enumerate() {
            by_type.entry(field.field_type()).or_default().push(i);
        }
        Self { fields, by_type }
    }

    /// All fields in insertion order.
    pub fn fields(&self) -> &[MessageHeaderField] {
        &self.fields
    }

    /// All fields with the given name, matched case-insensitively.
    pub fn fields_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a MessageHeaderField> {
        self.fields
            .iter()
            .filter(move |f| f.name().eq_ignore_ascii_case(name))
    }

    /// The body of the first field with the given name, or None if there
    /// is no such field.
    pub fn field_body(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
            .and_then(|f| f.body())
    }

    /// All fields of the given type, in insertion order.
    pub fn fields_by_type(&self, field_type: FieldType) -> impl Iterator<Item = &MessageHeaderField> {
        self.by_type
            .get(&field_type)
            .into_iter()
            .flatten()
            .map(move |&i| &self.fields[i])
    }

    /// The body of the first field of the given type, or None if there
    /// is no such field.
    pub fn field_body_of_type(&self, field_type: FieldType) -> Option<&str> {
        self.fields_by_type(field_type).next().and_then(|f| f.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(lines: &[&str]) -> MessageHeader {
        MessageHeader::new(lines.iter().map(|l| MessageHeaderField::parse(l)).collect())
    }

    #[test]
    fn test_lookup_by_name_is_case_insensitive() {
        let header = header(&["Subject: Greetings", "From: alice@foo.com"]);
        assert_eq!(header.field_body("subject"), Some("Greetings"));
        assert_eq!(header.field_body("SUBJECT"), Some("Greetings"));
        assert_eq!(header.field_body("X-Missing"), None);
    }

    #[test]
    fn test_field_body_outlives_the_name_lookup() {
        let header = header(&["Subject: Greetings"]);
        let body = {
            let name = String::from("subject");
            header.field_body(&name)
        };
        assert_eq!(body, Some("Greetings"));
    }

    #[test]
    fn test_duplicate_fields_keep_order() {
        let header = header(&[
            "Received: from a",
            "Received: from b",
            "Received: from c",
        ]);
        let bodies: Vec<_> = header
            .fields_by_name("Received")
            .filter_map(|f| f.body())
            .collect();
        assert_eq!(bodies, vec!["from a", "from b", "from c"]);
        // first-match lookup
        assert_eq!(header.field_body("received"), Some("from a"));
    }

    #[test]
    fn test_lookup_by_type_multimap() {
        let header = header(&["To: bob@foo.com", "CC: carol@foo.com", "cc: dave@foo.com"]);
        let ccs: Vec<_> = header
            .fields_by_type(FieldType::Cc)
            .filter_map(|f| f.body())
            .collect();
        assert_eq!(ccs, vec!["carol@foo.com", "dave@foo.com"]);
        assert_eq!(header.field_body_of_type(FieldType::To), Some("bob@foo.com"));
        assert_eq!(header.field_body_of_type(FieldType::Bcc), None);
    }
}
