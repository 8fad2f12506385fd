//! Field validation: allowed-value sets, structural tags and custom
//! predicates, plus the built-in predicates used by the field catalog.

use crate::error::ConfappError;
use crate::field::{Field, ValidateTag};
use crate::file::file_extension;
use crate::types::{Value, parse_duration};

/// Extensions accepted for the config file, matched case-insensitively.
pub const CONFIG_FILE_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "toml", "hcl", "env"];

/// Check a candidate value against `field`'s declared constraints.
///
/// Rules, in order:
///
/// 1. `None` is always valid.
/// 2. A non-empty `valid_values` set decides alone: the candidate, coerced to
///    the field's type, must be a member.
/// 3. Otherwise the structural tag runs, then the custom predicate. Both run
///    when both are declared.
pub fn validate(field: &Field, value: Option<&Value>) -> Result<(), ConfappError> {
    let Some(value) = value else {
        return Ok(());
    };

    if !field.valid_values.is_empty() {
        let is_member = value
            .coerce(field.field_type)
            .is_ok_and(|candidate| field.valid_values.contains(&candidate));
        if is_member {
            return Ok(());
        }
        return Err(ConfappError::NotAllowed {
            key: field.name.clone(),
            allowed: format_values(&field.valid_values),
        });
    }

    if let Some(tag) = field.validate_tag {
        check_tag(tag, value).map_err(|reason| ConfappError::Validation {
            key: field.name.clone(),
            reason,
        })?;
    }

    if let Some(predicate) = field.validate_fn {
        predicate(value).map_err(|reason| ConfappError::Validation {
            key: field.name.clone(),
            reason,
        })?;
    }

    Ok(())
}

/// Render a value set as `[a, b, c]`.
pub fn format_values(values: &[Value]) -> String {
    let items: Vec<String> = values.iter().map(Value::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Apply a structural tag. Empty strings pass; tags only apply to strings.
fn check_tag(tag: ValidateTag, value: &Value) -> Result<(), String> {
    let Value::String(s) = value else {
        return Err(format!(
            "{tag} rule applies to string values, found {}",
            value.field_type()
        ));
    };
    if s.is_empty() {
        return Ok(());
    }

    match tag {
        ValidateTag::FilePath => {
            if s.contains('\0') {
                return Err("must be a valid file path (contains a NUL byte)".into());
            }
            if s.ends_with('/') || s.ends_with(std::path::MAIN_SEPARATOR) {
                return Err(format!("must be a valid file path, not a directory: {s}"));
            }
            Ok(())
        }
        ValidateTag::Url => {
            let url = url::Url::parse(s).map_err(|e| format!("must be a valid URL: {e}"))?;
            if !url.has_host() {
                return Err(format!("must be a valid URL with a host: {s}"));
            }
            Ok(())
        }
    }
}

/// The config file path must name a file with a supported extension.
/// An empty path is allowed and means "no config file".
pub fn validate_config_file(value: &Value) -> Result<(), String> {
    let Value::String(path) = value else {
        return Err("config file path must be a string".into());
    };
    if path.is_empty() {
        return Ok(());
    }

    let Some(ext) = file_extension(path) else {
        return Err("config file must have an extension".into());
    };

    if !CONFIG_FILE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(format!(
            "unsupported file extension: {ext} (supported: {})",
            CONFIG_FILE_EXTENSIONS.join(", ")
        ));
    }
    Ok(())
}

/// Numbers are seconds; strings must be duration expressions like `1h30m`.
pub fn validate_duration(value: &Value) -> Result<(), String> {
    match value {
        Value::Int(_) | Value::Float(_) | Value::Duration(_) => Ok(()),
        Value::String(s) if s.is_empty() => Ok(()),
        Value::String(s) => parse_duration(s).map(|_| ()),
        Value::Bool(_) => Err("duration must be a string or numeric value".into()),
    }
}
