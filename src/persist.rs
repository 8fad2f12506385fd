//! Config persistence: encode the settings document in the file's format and
//! write it, creating parent directories as needed.
//!
//! TOML files that already have content are patched in place with `toml_edit`
//! so user comments and formatting survive a save.

use std::path::Path;

use toml::Table;

use crate::dotted::flatten_table;
use crate::env::env_key;
use crate::error::ConfappError;
use crate::file::FileFormat;

/// Serialize `settings` as a fresh document in `format`.
pub fn encode_document(
    format: FileFormat,
    settings: &Table,
    path: &Path,
) -> Result<String, ConfappError> {
    let ser_err = |reason: String| ConfappError::SerializeError {
        path: path.to_path_buf(),
        reason,
    };

    match format {
        FileFormat::Toml => toml::to_string(settings).map_err(|e| ser_err(e.to_string())),
        FileFormat::Json => serde_json::to_string_pretty(settings)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| ser_err(e.to_string())),
        FileFormat::Yaml => serde_yaml::to_string(settings).map_err(|e| ser_err(e.to_string())),
        FileFormat::Hcl => hcl::to_string(settings).map_err(|e| ser_err(e.to_string())),
        FileFormat::Env => Ok(encode_dotenv(settings)),
    }
}

/// One `LOG_LEVEL=debug` line per leaf, quoting values that need it.
fn encode_dotenv(settings: &Table) -> String {
    let mut out = String::new();
    for (key, value) in flatten_table(settings) {
        let raw = match value {
            toml::Value::String(s) => s,
            other => other.to_string(),
        };
        out.push_str(&env_key("", &key));
        out.push('=');
        out.push_str(&quote_dotenv(&raw));
        out.push('\n');
    }
    out
}

fn quote_dotenv(raw: &str) -> String {
    let plain = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.,:/@+".contains(c));
    if plain {
        return raw.to_string();
    }
    let escaped = raw.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Pure function: patch every leaf of `settings` into the TOML `content`.
///
/// Keys already in the document keep their position and surrounding comments.
/// Missing intermediate tables are created.
pub fn patch_toml_document(
    content: &str,
    settings: &Table,
    path: &Path,
) -> Result<String, ConfappError> {
    let mut doc: toml_edit::DocumentMut =
        content
            .parse()
            .map_err(|e: toml_edit::TomlError| ConfappError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

    for (key, value) in flatten_table(settings) {
        let parsed: toml_edit::Value =
            value
                .to_string()
                .parse()
                .map_err(|e: toml_edit::TomlError| ConfappError::SerializeError {
                    path: path.to_path_buf(),
                    reason: format!("{key}: {e}"),
                })?;

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key.as_str()),
        };

        let mut current: &mut toml_edit::Item = doc.as_item_mut();
        for segment in parents.into_iter().flat_map(|p| p.split('.')) {
            if !current.get(segment).is_some_and(|item| item.is_table_like()) {
                current[segment] = toml_edit::Item::Table(toml_edit::Table::new());
            }
            current = &mut current[segment];
        }
        current[leaf] = toml_edit::value(parsed);
    }

    Ok(doc.to_string())
}

/// I/O wrapper: encodes `settings` for `path` and writes it.
pub fn write_config_file(
    path: &Path,
    format: FileFormat,
    settings: &Table,
) -> Result<(), ConfappError> {
    let existing = match std::fs::read_to_string(path) {
        Ok(c) => Some(c),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(ConfappError::IoError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let new_content = match (format, existing) {
        (FileFormat::Toml, Some(content)) if !content.trim().is_empty() => {
            patch_toml_document(&content, settings, path)?
        }
        _ => encode_document(format, settings, path)?,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ConfappError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, &new_content).map_err(|e| ConfappError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dotted::{set_nested, table_get};
    use crate::file::parse_document;
    use crate::fixtures::test::sample_registry;
    use std::fs;
    use tempfile::TempDir;

    fn settings() -> Table {
        let mut t = Table::new();
        set_nested(&mut t, "log.level", toml::Value::String("debug".into()));
        set_nested(&mut t, "update.auto", toml::Value::Boolean(true));
        set_nested(&mut t, "update.period", toml::Value::String("1h".into()));
        set_nested(&mut t, "server.port", toml::Value::Integer(9000));
        t
    }

    fn reparse(format: FileFormat, content: &str) -> Table {
        parse_document(format, content, Path::new("/test"), &sample_registry()).unwrap()
    }

    #[test]
    fn every_format_reads_back() {
        for format in [
            FileFormat::Yaml,
            FileFormat::Json,
            FileFormat::Toml,
            FileFormat::Hcl,
            FileFormat::Env,
        ] {
            let encoded = encode_document(format, &settings(), Path::new("/test")).unwrap();
            let table = reparse(format, &encoded);
            assert_eq!(
                table_get(&table, "log.level").and_then(|v| v.as_str()),
                Some("debug"),
                "{format}: {encoded}"
            );
            assert_eq!(
                table_get(&table, "update.period").and_then(|v| v.as_str()),
                Some("1h"),
                "{format}"
            );
        }
    }

    #[test]
    fn json_is_pretty_with_trailing_newline() {
        let encoded = encode_document(FileFormat::Json, &settings(), Path::new("/t")).unwrap();
        assert!(encoded.starts_with("{\n"));
        assert!(encoded.ends_with("}\n"));
    }

    #[test]
    fn dotenv_lines() {
        let mut t = Table::new();
        set_nested(&mut t, "log.level", toml::Value::String("warn".into()));
        set_nested(&mut t, "update.auto", toml::Value::Boolean(false));
        set_nested(&mut t, "note", toml::Value::String("two words \"q\"".into()));
        let encoded = encode_dotenv(&t);
        assert!(encoded.contains("LOG_LEVEL=warn\n"));
        assert!(encoded.contains("UPDATE_AUTO=false\n"));
        assert!(encoded.contains("NOTE=\"two words \\\"q\\\"\"\n"));

        let table = reparse(FileFormat::Env, &encoded);
        assert_eq!(table["note"].as_str(), Some("two words \"q\""));
    }

    #[test]
    fn dotenv_quotes_empty_and_urls_stay_plain() {
        assert_eq!(quote_dotenv(""), "\"\"");
        assert_eq!(
            quote_dotenv("http://user:pw@proxy:3128"),
            "http://user:pw@proxy:3128"
        );
        assert_eq!(quote_dotenv("a#b"), "\"a#b\"");
    }

    #[test]
    fn patch_existing_key_keeps_comments() {
        let content = "# my settings\n[log]\n# chatty\nlevel = \"info\"\nformat = \"text\"\n";
        let mut t = Table::new();
        set_nested(&mut t, "log.level", toml::Value::String("debug".into()));
        let result = patch_toml_document(content, &t, Path::new("/t")).unwrap();
        assert!(result.contains("# my settings"));
        assert!(result.contains("# chatty"));
        assert!(result.contains("level = \"debug\""));
        assert!(result.contains("format = \"text\""));
    }

    #[test]
    fn patch_adds_missing_tables() {
        let result =
            patch_toml_document("environment = \"prod\"\n", &settings(), Path::new("/t")).unwrap();
        let table: Table = toml::from_str(&result).unwrap();
        assert_eq!(table["environment"].as_str(), Some("prod"));
        assert_eq!(table["server"]["port"].as_integer(), Some(9000));
        assert_eq!(table["update"]["auto"].as_bool(), Some(true));
    }

    #[test]
    fn patch_replaces_scalar_in_the_way() {
        let mut t = Table::new();
        set_nested(&mut t, "log.level", toml::Value::String("warn".into()));
        let result = patch_toml_document("log = \"flat\"\n", &t, Path::new("/t")).unwrap();
        let table: Table = toml::from_str(&result).unwrap();
        assert_eq!(table["log"]["level"].as_str(), Some("warn"));
    }

    #[test]
    fn patch_invalid_document_is_parse_error() {
        let err = patch_toml_document("[[[", &settings(), Path::new("/t")).unwrap_err();
        assert!(matches!(err, ConfappError::ParseError { .. }));
    }

    #[test]
    fn write_creates_parent_dirs_and_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("dir").join("config.yaml");

        write_config_file(&path, FileFormat::Yaml, &settings()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let table = reparse(FileFormat::Yaml, &content);
        assert_eq!(table["server"]["port"].as_integer(), Some(9000));
    }

    #[test]
    fn write_toml_patches_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "# keep me\n[log]\nlevel = \"info\"\n").unwrap();

        write_config_file(&path, FileFormat::Toml, &settings()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# keep me"));
        assert!(content.contains("level = \"debug\""));
    }

    #[test]
    fn write_overwrites_other_formats() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{\"log\": {\"level\": \"info\"}}").unwrap();

        write_config_file(&path, FileFormat::Json, &settings()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let table = reparse(FileFormat::Json, &content);
        assert_eq!(table["log"]["level"].as_str(), Some("debug"));
    }
}
