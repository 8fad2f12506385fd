use std::collections::HashMap;

/// Environment variable name for a field: `PREFIX_` followed by the field name
/// uppercased, with `.` replaced by `_`.
///
/// `env_key("CONFAPP", "log.level")` is `CONFAPP_LOG_LEVEL`. An empty prefix
/// yields just the transformed name.
pub fn env_key(prefix: &str, name: &str) -> String {
    let key = name.replace('.', "_").to_uppercase();
    if prefix.is_empty() {
        key
    } else {
        format!("{}_{key}", prefix.to_uppercase())
    }
}

/// Snapshot of the environment variables visible to the store.
///
/// Takes an iterator so tests can pass synthetic data instead of
/// `std::env::vars()`. Empty values are treated as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvLayer {
    prefix: Option<String>,
    vars: HashMap<String, String>,
}

impl EnvLayer {
    /// `prefix: None` disables env lookups entirely. An empty prefix keeps
    /// every variable, so fields map to bare names like `LOG_LEVEL`.
    pub fn new(prefix: Option<&str>, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let Some(prefix) = prefix else {
            return Self::default();
        };
        let needle = if prefix.is_empty() {
            String::new()
        } else {
            format!("{}_", prefix.to_uppercase())
        };
        let vars = vars
            .into_iter()
            .filter(|(key, value)| key.starts_with(&needle) && !value.is_empty())
            .collect();
        Self {
            prefix: Some(prefix.to_string()),
            vars,
        }
    }

    /// Raw env value for a dotted field name, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        self.vars.get(&env_key(prefix, name)).map(String::as_str)
    }

    /// The variable name consulted for `name`, for messages.
    pub fn key_for(&self, name: &str) -> Option<String> {
        self.prefix.as_deref().map(|p| env_key(p, name))
    }
}
