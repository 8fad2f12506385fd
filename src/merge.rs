use toml::Table;

/// Deep-merge `overlay` on top of `base`.
///
/// Tables present on both sides merge recursively; for anything else the
/// overlay's value wins. `save()` uses this to lay the registry's settings
/// over the file's existing content, so keys the registry does not know
/// survive a save.
pub fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(toml::Value::Table(base_tbl)), toml::Value::Table(overlay_tbl)) => {
                base.insert(key, toml::Value::Table(deep_merge(base_tbl, overlay_tbl)));
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(toml_str: &str) -> Table {
        toml_str.parse::<Table>().unwrap()
    }

    #[test]
    fn disjoint_keys_merge() {
        let merged = deep_merge(table(r#"environment = "prod""#), table("retries = 3"));
        assert_eq!(merged["environment"].as_str().unwrap(), "prod");
        assert_eq!(merged["retries"].as_integer().unwrap(), 3);
    }

    #[test]
    fn same_scalar_key_overlay_wins() {
        let merged = deep_merge(table(r#"environment = "dev""#), table(r#"environment = "prod""#));
        assert_eq!(merged["environment"].as_str().unwrap(), "prod");
    }

    #[test]
    fn nested_tables_recurse() {
        let base = table(
            r#"
            [log]
            level = "info"
            format = "text"
            "#,
        );
        let overlay = table(
            r#"
            [log]
            level = "debug"
            "#,
        );
        let merged = deep_merge(base, overlay);
        let log = merged["log"].as_table().unwrap();
        assert_eq!(log["level"].as_str().unwrap(), "debug");
        assert_eq!(log["format"].as_str().unwrap(), "text");
    }

    #[test]
    fn unknown_keys_in_base_survive() {
        let base = table(
            r#"
            legacy = true
            [log]
            level = "info"
            rotate = "daily"
            "#,
        );
        let overlay = table(
            r#"
            [log]
            level = "warn"
            "#,
        );
        let merged = deep_merge(base, overlay);
        assert!(merged["legacy"].as_bool().unwrap());
        assert_eq!(merged["log"]["rotate"].as_str().unwrap(), "daily");
        assert_eq!(merged["log"]["level"].as_str().unwrap(), "warn");
    }

    #[test]
    fn overlay_scalar_replaces_table() {
        let base = table(
            r#"
            [proxy]
            all = "http://proxy:3128"
            "#,
        );
        let merged = deep_merge(base, table(r#"proxy = "none""#));
        assert_eq!(merged["proxy"].as_str().unwrap(), "none");
    }

    #[test]
    fn empty_sides() {
        let t = table("retries = 3");
        assert_eq!(deep_merge(t.clone(), Table::new()), t);
        assert_eq!(deep_merge(Table::new(), t.clone()), t);
    }
}
