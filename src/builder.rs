use tracing::debug;

use crate::error::ConfappError;
use crate::field::Field;
use crate::fields;
use crate::ops::{self, ConfigResult};
use crate::registry::Registry;
use crate::store::{StoreInput, ValueStore};
use crate::types::{ConfigAction, Value};

/// Entry point for building a confapp configuration context.
pub struct Confapp;

impl Confapp {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }
}

/// Builder for the layered value store.
///
/// Nothing is read until [`load()`](Self::load); the returned
/// [`ConfigContext`] is the only way to reach a store, so an uninitialized
/// store cannot be read or written.
pub struct ContextBuilder {
    registry: Option<Registry>,
    globals: Option<Vec<Field>>,
    env_prefix: Option<String>,
    env_enabled: bool,
    env_vars: Option<Vec<(String, String)>>,
    overrides: Vec<(String, Value)>,
}

impl ContextBuilder {
    fn new() -> Self {
        Self {
            registry: None,
            globals: None,
            env_prefix: None,
            env_enabled: true,
            env_vars: None,
            overrides: Vec::new(),
        }
    }

    /// Replace the field catalog (default: [`fields::registry`]).
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the global fields (default: [`fields::global_fields`]).
    pub fn globals(mut self, globals: Vec<Field>) -> Self {
        self.globals = Some(globals);
        self
    }

    /// Override the environment variable prefix (default: `CONFAPP`). An empty
    /// prefix reads bare names such as `LOG_LEVEL`.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Use these variables instead of the process environment.
    pub fn env_vars(mut self, vars: Vec<(String, String)>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// Add a CLI override. `None` values are ignored (useful for optional clap args).
    pub fn cli_override<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.overrides.push((key.to_string(), v.into()));
        }
        self
    }

    /// Shorthand for overriding the `config` field.
    pub fn config_file(self, path: &str) -> Self {
        self.cli_override(fields::CONFIG, Some(path))
    }

    /// Resolve the effective env prefix (None if env disabled).
    fn effective_env_prefix(&self) -> Option<String> {
        if !self.env_enabled {
            return None;
        }
        Some(
            self.env_prefix
                .clone()
                .unwrap_or_else(|| fields::ENV_PREFIX.to_string()),
        )
    }

    fn build_input(self) -> StoreInput {
        let env_prefix = self.effective_env_prefix();
        let env_vars = match (&env_prefix, self.env_vars) {
            (None, _) => Vec::new(),
            (Some(_), Some(vars)) => vars,
            (Some(_), None) => std::env::vars().collect(),
        };

        StoreInput {
            registry: self.registry.unwrap_or_else(fields::registry),
            globals: self.globals.unwrap_or_else(fields::global_fields),
            env_prefix,
            env_vars,
            overrides: self.overrides,
        }
    }

    /// Seed defaults, apply overrides, resolve and load the config file.
    pub fn load(self) -> Result<ConfigContext, ConfappError> {
        let store = ValueStore::init(self.build_input())?;
        Ok(ConfigContext { store })
    }
}

/// A ready configuration: the registry and the resolved store.
#[derive(Debug)]
pub struct ConfigContext {
    store: ValueStore,
}

impl ConfigContext {
    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ValueStore {
        &mut self.store
    }

    pub fn registry(&self) -> &Registry {
        self.store.registry()
    }

    /// Handle a `ConfigAction` (list / describe / set).
    ///
    /// `Set` writes each pair in order and stops at the first error, before
    /// anything is saved. Hidden fields cannot be set this way.
    pub fn handle(&mut self, action: &ConfigAction) -> Result<ConfigResult, ConfappError> {
        match action {
            ConfigAction::List { prefixes, hidden } => {
                ops::list_values(&self.store, prefixes.as_slice(), *hidden)
            }
            ConfigAction::Describe { prefixes, hidden } => {
                ops::describe_fields(&self.store, prefixes.as_slice(), *hidden)
            }
            ConfigAction::Set { values } => {
                if values.is_empty() {
                    return Ok(ConfigResult::NothingToSet);
                }

                let mut entries = Vec::with_capacity(values.len());
                for (key, raw) in values {
                    let field = self
                        .registry()
                        .get(key)
                        .ok_or_else(|| ConfappError::KeyNotFound(key.clone()))?;
                    if field.hidden {
                        return Err(ConfappError::HiddenField(key.clone()));
                    }
                    debug!(key = %key, value = %raw, "setting");
                    self.store.write(key, raw.as_str())?;
                    entries.push((key.clone(), raw.clone()));
                }

                let path = self.store.save()?;
                Ok(ConfigResult::Saved { path, entries })
            }
        }
    }
}
