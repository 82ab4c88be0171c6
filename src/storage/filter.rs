//! Equality filters for `find`

use super::value::{Document, StoredValue};

/// Conjunction of top-level field equality conditions.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, StoredValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `field == value` condition.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<StoredValue>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(phone: &str) -> Document {
        let mut d = Document::new();
        d.insert("phone".into(), StoredValue::from(phone));
        d.insert("rating".into(), StoredValue::from(4i64));
        d
    }

    #[test]
    fn test_empty_filter_matches_all() {
        assert!(Filter::new().matches(&doc("555")));
        assert!(Filter::new().matches(&Document::new()));
    }

    #[test]
    fn test_all_conditions_must_hold() {
        let filter = Filter::new().eq("phone", "555").eq("rating", 4i64);
        assert!(filter.matches(&doc("555")));
        assert!(!filter.matches(&doc("556")));
    }

    #[test]
    fn test_missing_field_does_not_match() {
        let filter = Filter::new().eq("email", "a@b.co");
        assert!(!filter.matches(&doc("555")));
    }
}
