//! Config operations: listing, describing, and the result types.
//!
//! Provides the logic behind `config list` and `config describe`, plus the
//! `ConfigResult` enum that callers use to display results. Rendering is
//! plain text; the binary decides where it goes.

use std::fmt::{self, Write as _};
use std::path::PathBuf;

use crate::error::ConfappError;
use crate::field::Field;
use crate::registry::group_sorted;
use crate::store::ValueStore;
use crate::validate::format_values;

const NOT_SET: &str = "<not set>";

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// `(name, value)` pairs in registry order. `width` is the column the
    /// names are padded to.
    Listing {
        entries: Vec<(String, String)>,
        width: usize,
    },
    /// Rendered `config describe` output.
    Description(String),
    /// Values written by `config set` and the file they were saved to.
    Saved {
        path: PathBuf,
        entries: Vec<(String, String)>,
    },
    /// `config set` was called without any field flag.
    NothingToSet,
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Listing { entries, width } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key:<width$} = {value}")?;
                }
                Ok(())
            }
            ConfigResult::Description(text) => f.write_str(text),
            ConfigResult::Saved { path, entries } => {
                for (key, value) in entries {
                    writeln!(f, "Set {key} = {value}")?;
                }
                write!(f, "Configuration saved to {}", path.display())
            }
            ConfigResult::NothingToSet => f.write_str("Nothing to set"),
        }
    }
}

/// Registry fields matching any of `prefixes`, hidden ones only on request.
fn select<'a, S: AsRef<str>>(
    store: &'a ValueStore,
    prefixes: &[S],
    hidden: bool,
) -> Result<Vec<&'a Field>, ConfappError> {
    let fields: Vec<&Field> = store
        .registry()
        .by_prefix(prefixes)
        .into_iter()
        .filter(|f| hidden || !f.hidden)
        .collect();
    if fields.is_empty() {
        return Err(ConfappError::NoFieldsFound);
    }
    Ok(fields)
}

/// Resolved `name = value` pairs for the selected fields.
pub fn list_values<S: AsRef<str>>(
    store: &ValueStore,
    prefixes: &[S],
    hidden: bool,
) -> Result<ConfigResult, ConfappError> {
    let fields = select(store, prefixes, hidden)?;
    let width = fields.iter().map(|f| f.name.len()).max().unwrap_or(0) + 1;

    let mut entries = Vec::with_capacity(fields.len());
    for field in fields {
        let display = match store.read(&field.name)? {
            Some(value) => value.to_string(),
            None => NOT_SET.to_string(),
        };
        entries.push((field.name.clone(), display));
    }

    Ok(ConfigResult::Listing { entries, width })
}

/// Full metadata for the selected fields, grouped and sorted.
pub fn describe_fields<S: AsRef<str>>(
    store: &ValueStore,
    prefixes: &[S],
    hidden: bool,
) -> Result<ConfigResult, ConfappError> {
    let fields = select(store, prefixes, hidden)?;

    let mut out = String::new();
    for (group, fields) in group_sorted(fields) {
        let _ = writeln!(out, "\n{group}");
        for field in fields {
            describe_field(&mut out, store, field)?;
        }
        out.push('\n');
    }

    Ok(ConfigResult::Description(out))
}

fn describe_field(out: &mut String, store: &ValueStore, field: &Field) -> Result<(), ConfappError> {
    match &field.deprecated {
        Some(msg) => {
            let _ = writeln!(out, "\n  {} (deprecated: {msg})", field.name);
        }
        None => {
            let _ = writeln!(out, "\n  {}", field.name);
        }
    }

    if !field.description.is_empty() {
        let _ = writeln!(out, "    {}", field.description);
    }
    let _ = writeln!(out, "    Type: {}", field.field_type);

    if let Some(value) = store.read(&field.name)?
        && field.default.as_ref() != Some(&value)
    {
        match store.source(&field.name) {
            Some(source) => {
                let _ = writeln!(out, "    Value: {value} (from {source})");
            }
            None => {
                let _ = writeln!(out, "    Value: {value}");
            }
        }
    }

    if let Some(default) = &field.default {
        let _ = writeln!(out, "    Default: {default}");
    }
    if !field.valid_values.is_empty() {
        let _ = writeln!(out, "    Valid values: {}", format_values(&field.valid_values));
    }
    if let Some(tag) = field.validate_tag {
        let _ = writeln!(out, "    Validation: {tag}");
    }
    if !field.example.is_empty() {
        let _ = writeln!(out, "    Example: {}", field.example);
    }
    if !field.docstring.is_empty() {
        out.push_str("    Doc:\n");
        for line in field.docstring.lines() {
            let _ = writeln!(out, "      {line}");
        }
    }
    Ok(())
}
