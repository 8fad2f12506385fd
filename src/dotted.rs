//! Dotted key paths over nested `toml::Table` documents.
//!
//! `("log.level", "debug")` lives at `{log = {level = "debug"}}`. Every config
//! file format is parsed into and written from this nested shape.

use toml::{Table, Value};

/// Insert `value` at `dotted_key`, creating intermediate tables as needed.
/// A non-table value sitting on the path is replaced by a table.
pub fn set_nested(table: &mut Table, dotted_key: &str, value: Value) {
    let (path, leaf) = split_key(dotted_key);
    let mut current = table;

    if let Some(path) = path {
        for segment in path.split('.') {
            let entry = current
                .entry(segment)
                .or_insert_with(|| Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            match entry {
                Value::Table(next) => current = next,
                _ => return,
            }
        }
    }

    current.insert(leaf.to_string(), value);
}

/// Navigate a `toml::Table` by dotted key path (e.g. `"log.level"`).
pub fn table_get<'a>(table: &'a Table, dotted_key: &str) -> Option<&'a Value> {
    let (path, leaf) = split_key(dotted_key);

    let tbl = match path {
        Some(path) => {
            let mut current = table;
            for segment in path.split('.') {
                current = current.get(segment)?.as_table()?;
            }
            current
        }
        None => table,
    };

    tbl.get(leaf)
}

/// All leaf values as `(dotted_key, value)` pairs, depth first, in table order.
pub fn flatten_table(table: &Table) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    collect_leaves(table, "", &mut out);
    out
}

fn collect_leaves(table: &Table, prefix: &str, out: &mut Vec<(String, Value)>) {
    for (key, value) in table {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(sub) => collect_leaves(sub, &dotted, out),
            leaf => out.push((dotted, leaf.clone())),
        }
    }
}

fn split_key(dotted_key: &str) -> (Option<&str>, &str) {
    match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_key() {
        let mut table = Table::new();
        set_nested(&mut table, "environment", Value::String("dev".into()));
        assert_eq!(table["environment"].as_str().unwrap(), "dev");
    }

    #[test]
    fn nested_key() {
        let mut table = Table::new();
        set_nested(&mut table, "log.level", Value::String("debug".into()));
        let log = table["log"].as_table().unwrap();
        assert_eq!(log["level"].as_str().unwrap(), "debug");
    }

    #[test]
    fn deep_nesting() {
        let mut table = Table::new();
        set_nested(&mut table, "a.b.c.d", Value::Integer(42));
        assert_eq!(table["a"]["b"]["c"]["d"].as_integer().unwrap(), 42);
    }

    #[test]
    fn siblings_share_a_table() {
        let mut table = Table::new();
        set_nested(&mut table, "log.level", Value::String("warn".into()));
        set_nested(&mut table, "log.format", Value::String("json".into()));
        let log = table["log"].as_table().unwrap();
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn scalar_on_path_is_replaced() {
        let mut table = Table::new();
        set_nested(&mut table, "log", Value::String("flat".into()));
        set_nested(&mut table, "log.level", Value::String("info".into()));
        assert_eq!(table["log"]["level"].as_str().unwrap(), "info");
    }

    #[test]
    fn last_write_wins() {
        let mut table = Table::new();
        set_nested(&mut table, "update.auto", Value::Boolean(false));
        set_nested(&mut table, "update.auto", Value::Boolean(true));
        assert!(table["update"]["auto"].as_bool().unwrap());
    }

    #[test]
    fn table_get_flat_and_nested() {
        let table: Table = toml::from_str("environment = \"prod\"\n[log]\nlevel = \"warn\"").unwrap();
        assert_eq!(table_get(&table, "environment").unwrap().as_str(), Some("prod"));
        assert_eq!(table_get(&table, "log.level").unwrap().as_str(), Some("warn"));
    }

    #[test]
    fn table_get_missing() {
        let table: Table = toml::from_str("[log]\nlevel = \"warn\"").unwrap();
        assert!(table_get(&table, "log.format").is_none());
        assert!(table_get(&table, "proxy.all").is_none());
        assert!(table_get(&table, "log.level.extra").is_none());
    }

    #[test]
    fn flatten_produces_dotted_leaves() {
        let table: Table =
            toml::from_str("environment = \"dev\"\n[log]\nlevel = \"info\"\nformat = \"text\"")
                .unwrap();
        let mut keys: Vec<String> = flatten_table(&table).into_iter().map(|(k, _)| k).collect();
        keys.sort();
        assert_eq!(keys, ["environment", "log.format", "log.level"]);
    }
}
