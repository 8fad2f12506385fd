#[cfg(test)]
pub mod test {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use crate::field::Field;
    use crate::fields::{self, CONFIG};
    use crate::registry::Registry;
    use crate::store::{StoreInput, ValueStore};
    use crate::types::{FieldType, Value};

    pub const GROUP_SERVER: &str = "Server";

    /// The application catalog plus an int and a float field, so every value
    /// type has a registered field.
    pub fn sample_registry() -> Registry {
        let mut registry = fields::registry();
        registry.add([
            Field::new("server.port", FieldType::Int)
                .group(GROUP_SERVER)
                .default_value(Some(8080i64))
                .description("Port to listen on."),
            Field::new("server.ratio", FieldType::Float)
                .group(GROUP_SERVER)
                .description("Share of traffic to sample."),
        ]);
        registry
    }

    /// Global fields with no default config path, so tests never touch the
    /// real user config directory.
    pub fn sample_globals() -> Vec<Field> {
        vec![
            fields::config_field().default_value::<&str>(None),
            fields::verbose_field(),
        ]
    }

    pub fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn sample_input(env_pairs: &[(&str, &str)]) -> StoreInput {
        StoreInput {
            registry: sample_registry(),
            globals: sample_globals(),
            env_prefix: Some(fields::ENV_PREFIX.to_string()),
            env_vars: env(env_pairs),
            overrides: Vec::new(),
        }
    }

    pub fn sample_store(env_pairs: &[(&str, &str)]) -> ValueStore {
        ValueStore::init(sample_input(env_pairs)).unwrap()
    }

    /// Write `content` to `dir/name` and load a store pointed at it.
    pub fn store_with_file(
        dir: &TempDir,
        name: &str,
        content: &str,
        env_pairs: &[(&str, &str)],
    ) -> (ValueStore, PathBuf) {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        let mut input = sample_input(env_pairs);
        input
            .overrides
            .push((CONFIG.into(), Value::from(path.to_string_lossy().into_owned())));
        (ValueStore::init(input).unwrap(), path)
    }

    #[test]
    fn sample_registry_covers_every_type() {
        let reg = sample_registry();
        for ty in [
            FieldType::String,
            FieldType::Bool,
            FieldType::Int,
            FieldType::Float,
            FieldType::Duration,
        ] {
            assert!(reg.iter().any(|f| f.field_type == ty), "{ty}");
        }
    }

    #[test]
    fn sample_store_has_no_config_file() {
        assert!(sample_store(&[]).config_path().is_none());
    }
}
