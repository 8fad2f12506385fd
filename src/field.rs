//! Field descriptors: one configuration key with its type, default,
//! validation rules and documentation.

use std::fmt;

use crate::types::{FieldType, Value};

/// Custom predicate run by [`validate`](crate::validate::validate). The error
/// message is wrapped with the field name by the caller.
pub type ValidateFn = fn(&Value) -> Result<(), String>;

/// Structural rules a string field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateTag {
    /// Must look like a path to a file (not a directory, no NUL bytes).
    FilePath,
    /// Must parse as an absolute URL with a host.
    Url,
}

impl ValidateTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidateTag::FilePath => "filepath",
            ValidateTag::Url => "url",
        }
    }
}

impl fmt::Display for ValidateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single configuration field and all of its metadata.
///
/// Built with [`Field::new`] and the chained setters, then handed to a
/// [`Registry`](crate::Registry). Fields are not mutated after registration.
#[derive(Debug, Clone)]
pub struct Field {
    /// Dotted key, e.g. `log.level`.
    pub name: String,
    /// Display category used by `config describe`.
    pub group: String,
    pub field_type: FieldType,
    pub default: Option<Value>,
    /// One-line summary, also used as the flag help.
    pub description: String,
    /// Longer documentation shown by `config describe`.
    pub docstring: String,
    pub example: String,
    /// Hidden fields are listed only on request and never get a `set` flag.
    pub hidden: bool,
    pub shorthand: Option<char>,
    pub valid_values: Vec<Value>,
    pub validate_tag: Option<ValidateTag>,
    pub validate_fn: Option<ValidateFn>,
    /// Deprecation message, if the field is on its way out.
    pub deprecated: Option<String>,
}

impl Field {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            group: String::new(),
            field_type,
            default: None,
            description: String::new(),
            docstring: String::new(),
            example: String::new(),
            hidden: false,
            shorthand: None,
            valid_values: Vec::new(),
            validate_tag: None,
            validate_fn: None,
            deprecated: None,
        }
    }

    pub fn group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }

    /// Set the default. `None` leaves the field without one, so it reads as
    /// unset until some layer provides a value.
    pub fn default_value<V: Into<Value>>(mut self, value: Option<V>) -> Self {
        self.default = value.map(Into::into);
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    pub fn docstring(mut self, text: &str) -> Self {
        self.docstring = text.to_string();
        self
    }

    pub fn example(mut self, text: &str) -> Self {
        self.example = text.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn shorthand(mut self, c: char) -> Self {
        self.shorthand = Some(c);
        self
    }

    pub fn valid_values<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.valid_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate_tag(mut self, tag: ValidateTag) -> Self {
        self.validate_tag = Some(tag);
        self
    }

    pub fn validate_fn(mut self, f: ValidateFn) -> Self {
        self.validate_fn = Some(f);
        self
    }

    pub fn deprecated(mut self, message: &str) -> Self {
        self.deprecated = Some(message.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_field_has_no_rules() {
        let f = Field::new("log.level", FieldType::String);
        assert_eq!(f.name, "log.level");
        assert!(f.default.is_none());
        assert!(f.valid_values.is_empty());
        assert!(f.validate_tag.is_none());
        assert!(f.validate_fn.is_none());
        assert!(!f.hidden);
    }

    #[test]
    fn setters_chain() {
        let f = Field::new("log.level", FieldType::String)
            .group("Application")
            .default_value(Some("info"))
            .valid_values(["debug", "info"])
            .hidden()
            .deprecated("use logging.level");
        assert_eq!(f.group, "Application");
        assert_eq!(f.default, Some(Value::String("info".into())));
        assert_eq!(f.valid_values.len(), 2);
        assert!(f.hidden);
        assert_eq!(f.deprecated.as_deref(), Some("use logging.level"));
    }

    #[test]
    fn default_none_stays_absent() {
        let f = Field::new("proxy.all", FieldType::String).default_value::<&str>(None);
        assert!(f.default.is_none());
    }

    #[test]
    fn tag_names() {
        assert_eq!(ValidateTag::FilePath.to_string(), "filepath");
        assert_eq!(ValidateTag::Url.to_string(), "url");
    }
}
