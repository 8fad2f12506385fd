//! Config file loading.
//!
//! The file's extension is the only format discriminator. Every format is
//! parsed into the same nested `toml::Table` document, which the store then
//! reads by dotted key.
//!
//! A missing file is not an error: it simply contributes no values. Any other
//! I/O failure, or content that does not parse, is.

use std::fmt;
use std::path::Path;

use toml::Table;

use crate::dotted::set_nested;
use crate::env::env_key;
use crate::error::ConfappError;
use crate::registry::Registry;

/// Serialization formats a config file can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
    Toml,
    Hcl,
    /// Plain `KEY=value` lines.
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(FileFormat::Yaml),
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "hcl" => Some(FileFormat::Hcl),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfappError> {
        file_extension(&path.to_string_lossy())
            .and_then(|ext| Self::from_extension(&ext))
            .ok_or_else(|| ConfappError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Yaml => "yaml",
            FileFormat::Json => "json",
            FileFormat::Toml => "toml",
            FileFormat::Hcl => "hcl",
            FileFormat::Env => "env",
        };
        f.write_str(name)
    }
}

/// Lowercased extension of the last path component, without the dot.
///
/// A leading dot counts, so `.env` has the extension `env`.
pub fn file_extension(path: &str) -> Option<String> {
    let name = Path::new(path).file_name()?.to_str()?;
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Read and parse the config file at `path`.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_config_file(path: &Path, registry: &Registry) -> Result<Option<Table>, ConfappError> {
    let format = FileFormat::from_path(path)?;
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfappError::IoError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    parse_document(format, &content, path, registry).map(Some)
}

/// Parse `content` in `format` into a nested document.
///
/// `registry` is only consulted for `.env` files, whose flat `LOG_LEVEL` keys
/// are mapped back to dotted field names.
pub fn parse_document(
    format: FileFormat,
    content: &str,
    path: &Path,
    registry: &Registry,
) -> Result<Table, ConfappError> {
    let parse_err = |reason: String| ConfappError::ParseError {
        path: path.to_path_buf(),
        reason,
    };

    if content.trim().is_empty() {
        return Ok(Table::new());
    }

    let json = match format {
        FileFormat::Toml => return toml::from_str(content).map_err(|e| parse_err(e.to_string())),
        FileFormat::Env => return dotenv_to_table(content, registry).map_err(parse_err),
        FileFormat::Yaml => serde_yaml::from_str::<serde_json::Value>(content)
            .map_err(|e| parse_err(e.to_string()))?,
        FileFormat::Json => serde_json::from_str::<serde_json::Value>(content)
            .map_err(|e| parse_err(e.to_string()))?,
        FileFormat::Hcl => hcl::from_str::<serde_json::Value>(content)
            .map_err(|e| parse_err(e.to_string()))?,
    };

    match json {
        serde_json::Value::Object(map) => Ok(json_object_to_table(map)),
        serde_json::Value::Null => Ok(Table::new()),
        other => Err(parse_err(format!(
            "expected a mapping at the top level, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_object_to_table(map: serde_json::Map<String, serde_json::Value>) -> Table {
    map.into_iter()
        .filter_map(|(k, v)| json_to_toml(v).map(|v| (k, v)))
        .collect()
}

/// Convert a JSON value to TOML. `null` has no TOML form and is dropped, which
/// leaves the key unset.
fn json_to_toml(value: serde_json::Value) -> Option<toml::Value> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(toml::Value::Boolean(b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(toml::Value::Integer(i)),
            None => n.as_f64().map(toml::Value::Float),
        },
        serde_json::Value::String(s) => Some(toml::Value::String(s)),
        serde_json::Value::Array(items) => Some(toml::Value::Array(
            items.into_iter().filter_map(json_to_toml).collect(),
        )),
        serde_json::Value::Object(map) => Some(toml::Value::Table(json_object_to_table(map))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "mapping",
    }
}

/// `LOG_LEVEL=debug` becomes `{log = {level = "debug"}}` when `log.level` is
/// registered. Unknown keys are kept, lowercased, at the top level.
fn dotenv_to_table(content: &str, registry: &Registry) -> Result<Table, String> {
    let mut table = Table::new();
    for item in dotenvy::from_read_iter(content.as_bytes()) {
        let (key, value) = item.map_err(|e| e.to_string())?;
        let upper = key.to_uppercase();
        let dotted = registry
            .iter()
            .find(|f| env_key("", &f.name) == upper)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| key.to_lowercase());
        set_nested(&mut table, &dotted, toml::Value::String(value));
    }
    Ok(table)
}
