//! Element attributes
//!
//! The attribute map is the only configuration surface a widget has. Every
//! accessor here is permissive: a missing or malformed value resolves to the
//! caller's default instead of an error.
//!
//! Widgets declare the attributes they observe as an enum implementing
//! [`AttributeKey`]. Mutations are delivered to the widget as a typed
//! [`AttributeChange`], so a widget matches on variants rather than on raw
//! attribute names.
//!
//! # Example
//!
//! ```rust
//! use lumen_core::attributes::AttributeMap;
//!
//! let mut attrs = AttributeMap::new();
//! attrs.set("duration", "90");
//! attrs.set("autostart", "");
//!
//! assert_eq!(attrs.parse_or::<u64>("duration", 0), 90);
//! assert!(attrs.has("autostart"));
//! assert_eq!(attrs.parse_or::<u64>("missing", 7), 7);
//! ```

use std::fmt::Debug;
use std::str::FromStr;

use indexmap::IndexMap;
use smallvec::SmallVec;

/// A closed set of attribute names observed by one widget
pub trait AttributeKey: Copy + Debug + PartialEq + Eq + Send + 'static {
    /// Every observed attribute
    fn all() -> &'static [Self];

    /// The attribute name as written in markup
    fn name(&self) -> &'static str;

    /// Map a raw attribute name back to its key
    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|key| key.name() == name)
    }

    /// Observed attribute names, in declaration order
    fn observed() -> SmallVec<[&'static str; 16]> {
        Self::all().iter().map(|key| key.name()).collect()
    }
}

/// A mutation of one observed attribute
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeChange<K: AttributeKey> {
    pub key: K,
    pub old: Option<String>,
    pub new: Option<String>,
}

impl<K: AttributeKey> AttributeChange<K> {
    /// True when the attribute was added or removed (flag toggles)
    pub fn presence_changed(&self) -> bool {
        self.old.is_some() != self.new.is_some()
    }
}

/// Insertion-ordered attribute storage
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: IndexMap<String, String>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }

    /// Set an attribute, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), value.into())
    }

    /// Remove an attribute, returning the previous value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Boolean attribute semantics: present means true, whatever the value
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Non-empty string value, or the default
    pub fn string_or(&self, name: &str, default: &str) -> String {
        match self.get(name) {
            Some(value) if !value.trim().is_empty() => value.to_string(),
            _ => default.to_string(),
        }
    }

    /// Non-empty string value
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.trim().is_empty())
    }

    /// Parse a value, falling back to the default on absence or parse failure
    pub fn parse_or<T: FromStr>(&self, name: &str, default: T) -> T {
        self.get(name)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Comma separated list, trimmed, empty entries dropped
    pub fn list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum TestAttr {
        Label,
        Open,
    }

    impl AttributeKey for TestAttr {
        fn all() -> &'static [Self] {
            &[TestAttr::Label, TestAttr::Open]
        }

        fn name(&self) -> &'static str {
            match self {
                TestAttr::Label => "label",
                TestAttr::Open => "open",
            }
        }
    }

    #[test]
    fn test_key_lookup() {
        assert_eq!(TestAttr::from_name("open"), Some(TestAttr::Open));
        assert_eq!(TestAttr::from_name("unknown"), None);
        assert_eq!(TestAttr::observed().as_slice(), &["label", "open"]);
    }

    #[test]
    fn test_malformed_number_falls_back() {
        let attrs = AttributeMap::from_pairs([("duration", "ten"), ("delay", " 5 ")]);
        assert_eq!(attrs.parse_or::<u64>("duration", 0), 0);
        assert_eq!(attrs.parse_or::<u64>("delay", 0), 5);
        assert_eq!(attrs.parse_or::<i64>("missing", -1), -1);
    }

    #[test]
    fn test_flag_and_strings() {
        let mut attrs = AttributeMap::new();
        attrs.set("outline", "");
        attrs.set("label", "  ");

        assert!(attrs.has("outline"));
        assert!(!attrs.has("open"));
        assert_eq!(attrs.string_or("label", "fallback"), "fallback");
        assert_eq!(attrs.non_empty("label"), None);
    }

    #[test]
    fn test_list_and_order() {
        let mut attrs = AttributeMap::from_pairs([("format", "hours, ,minutes,seconds ")]);
        assert_eq!(attrs.list("format"), vec!["hours", "minutes", "seconds"]);

        attrs.set("b", "2");
        attrs.set("a", "1");
        let names: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["format", "b", "a"]);

        assert_eq!(attrs.remove("b"), Some("2".to_string()));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_presence_changed() {
        let added = AttributeChange {
            key: TestAttr::Open,
            old: None,
            new: Some(String::new()),
        };
        let edited = AttributeChange {
            key: TestAttr::Label,
            old: Some("a".into()),
            new: Some("b".into()),
        };
        assert!(added.presence_changed());
        assert!(!edited.presence_changed());
    }
}
