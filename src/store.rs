//! The layered value store.
//!
//! Four sparse layers, highest priority first:
//!
//! 1. overrides: explicit CLI flags and [`ValueStore::write`]
//! 2. environment: `PREFIX_LOG_LEVEL` for `log.level`
//! 3. config file: the nested document loaded at init
//! 4. defaults: every field's declared default
//!
//! A read takes the first layer holding the key and coerces the raw value to
//! the field's declared type. Nothing is merged ahead of time, so a key
//! removed from one layer falls through to the next on the following read.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use toml::Table;
use tracing::{debug, warn};

use crate::dotted::{flatten_table, set_nested, table_get};
use crate::env::EnvLayer;
use crate::error::ConfappError;
use crate::field::Field;
use crate::fields::CONFIG;
use crate::file::{FileFormat, load_config_file};
use crate::merge::deep_merge;
use crate::persist::write_config_file;
use crate::registry::Registry;
use crate::types::{FieldType, TypeMismatch, Value};
use crate::validate::validate;

/// Which layer a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Override,
    Env,
    File,
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Override => "override",
            Source::Env => "env",
            Source::File => "file",
            Source::Default => "default",
        };
        f.write_str(name)
    }
}

/// Everything [`ValueStore::init`] needs. Env vars are passed in rather than
/// read from the process so tests can use synthetic data.
pub(crate) struct StoreInput {
    pub registry: Registry,
    /// Fields resolved like any other but never listed or persisted.
    pub globals: Vec<Field>,
    /// `None` disables the env layer.
    pub env_prefix: Option<String>,
    pub env_vars: Vec<(String, String)>,
    /// `(field name, value)` pairs for the override layer, applied in order.
    pub overrides: Vec<(String, Value)>,
}

/// Resolved configuration state. Only a successfully initialized store exists,
/// so every method here operates on ready state.
#[derive(Debug, Clone)]
pub struct ValueStore {
    registry: Registry,
    globals: Vec<Field>,
    overrides: HashMap<String, Value>,
    env: EnvLayer,
    file: Table,
    defaults: HashMap<String, Value>,
    config_path: Option<PathBuf>,
}

impl ValueStore {
    pub(crate) fn init(input: StoreInput) -> Result<Self, ConfappError> {
        let defaults = input
            .registry
            .iter()
            .chain(input.globals.iter())
            .filter_map(|f| f.default.clone().map(|d| (f.name.clone(), d)))
            .collect();

        let env = EnvLayer::new(input.env_prefix.as_deref(), input.env_vars);
        if let Some(prefix) = &input.env_prefix {
            debug!(prefix = %prefix, "environment layer enabled");
        }

        let mut store = Self {
            registry: input.registry,
            globals: input.globals,
            overrides: HashMap::new(),
            env,
            file: Table::new(),
            defaults,
            config_path: None,
        };

        for (name, value) in input.overrides {
            store.write(&name, value)?;
        }

        store.load_file()?;
        Ok(store)
    }

    /// Resolve the `config` field and load the file it names, if any.
    fn load_file(&mut self) -> Result<(), ConfappError> {
        let Some(field) = self.globals.iter().find(|f| f.name == CONFIG) else {
            return Ok(());
        };
        let Some(value) = self.read(CONFIG)? else {
            return Ok(());
        };
        validate(field, Some(&value))?;

        let path = value.to_string();
        if path.is_empty() {
            return Ok(());
        }
        let path = PathBuf::from(path);

        match load_config_file(&path, &self.registry)? {
            Some(table) => {
                debug!(path = %path.display(), "loaded config file");
                self.file = table;
            }
            None => debug!(path = %path.display(), "config file not found, starting empty"),
        }
        self.config_path = Some(path);

        for (key, _) in flatten_table(&self.file) {
            if self.field(&key).is_none() {
                warn!(key = %key, "unknown key in config file");
            }
        }
        Ok(())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Path of the config file in use. `None` when `config` resolved empty.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    fn field(&self, name: &str) -> Option<&Field> {
        self.registry
            .get(name)
            .or_else(|| self.globals.iter().find(|f| f.name == name))
    }

    /// The highest-priority layer that holds `name`.
    pub fn source(&self, name: &str) -> Option<Source> {
        if self.overrides.contains_key(name) {
            Some(Source::Override)
        } else if self.env.get(name).is_some() {
            Some(Source::Env)
        } else if table_get(&self.file, name).is_some() {
            Some(Source::File)
        } else if self.defaults.contains_key(name) {
            Some(Source::Default)
        } else {
            None
        }
    }

    /// Resolve `name` through the layers, coerced to the field's type.
    ///
    /// Returns `Ok(None)` for unknown names and for keys no layer holds. A
    /// value that does not coerce is an [`ConfappError::InvalidValue`]
    /// naming where it came from.
    pub fn read(&self, name: &str) -> Result<Option<Value>, ConfappError> {
        let Some(field) = self.field(name) else {
            return Ok(None);
        };
        let invalid = |reason: String| ConfappError::InvalidValue {
            key: name.to_string(),
            reason,
        };

        let value = match self.source(name) {
            None => return Ok(None),
            Some(Source::Override) => self.overrides.get(name).cloned(),
            Some(Source::Default) => self.defaults.get(name).cloned(),
            Some(Source::Env) => match self.env.get(name) {
                Some(raw) => Some(Value::parse(field.field_type, raw).map_err(|e| {
                    let var = self.env.key_for(name).unwrap_or_default();
                    invalid(format!("{e} (from {var})"))
                })?),
                None => None,
            },
            Some(Source::File) => match table_get(&self.file, name) {
                Some(raw) => Some(
                    Value::from_toml(field.field_type, raw)
                        .map_err(|e| invalid(format!("{e} (from config file)")))?,
                ),
                None => None,
            },
        };
        Ok(value)
    }

    fn read_typed<T: Default>(
        &self,
        name: &str,
        expected: FieldType,
        get: fn(&Value) -> Result<T, TypeMismatch>,
    ) -> Result<T, ConfappError> {
        let mismatch = |source: TypeMismatch| ConfappError::TypeMismatch {
            key: name.to_string(),
            source,
        };
        if let Some(field) = self.field(name)
            && field.field_type != expected
        {
            return Err(mismatch(TypeMismatch {
                expected,
                found: field.field_type,
            }));
        }
        match self.read(name)? {
            Some(value) => get(&value).map_err(mismatch),
            None => Ok(T::default()),
        }
    }

    /// `""` when unset.
    pub fn read_string(&self, name: &str) -> Result<String, ConfappError> {
        self.read_typed(name, FieldType::String, |v| v.as_str().map(str::to_string))
    }

    pub fn read_bool(&self, name: &str) -> Result<bool, ConfappError> {
        self.read_typed(name, FieldType::Bool, Value::as_bool)
    }

    pub fn read_int(&self, name: &str) -> Result<i64, ConfappError> {
        self.read_typed(name, FieldType::Int, Value::as_int)
    }

    pub fn read_float(&self, name: &str) -> Result<f64, ConfappError> {
        self.read_typed(name, FieldType::Float, Value::as_float)
    }

    pub fn read_duration(&self, name: &str) -> Result<Duration, ConfappError> {
        self.read_typed(name, FieldType::Duration, Value::as_duration)
    }

    /// Validate `value` against the field's rules, coerce it to the field's
    /// type and store it in the override layer. On error nothing changes.
    pub fn write(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ConfappError> {
        let field = self
            .field(name)
            .ok_or_else(|| ConfappError::KeyNotFound(name.to_string()))?;
        let value = value.into();

        validate(field, Some(&value))?;
        let coerced = value
            .coerce(field.field_type)
            .map_err(|reason| ConfappError::InvalidValue {
                key: name.to_string(),
                reason,
            })?;

        debug!(key = %name, value = %coerced, "override set");
        self.overrides.insert(name.to_string(), coerced);
        Ok(())
    }

    /// Resolved values of every registered field that has one, as a nested
    /// document. Global fields are left out.
    pub fn settings(&self) -> Result<Table, ConfappError> {
        let mut table = Table::new();
        for field in &self.registry {
            if let Some(value) = self.read(&field.name)? {
                set_nested(&mut table, &field.name, value.to_toml());
            }
        }
        Ok(table)
    }

    /// Write the resolved settings to the config file, in the format its
    /// extension names. Keys the file held that no field claims are kept.
    pub fn save(&self) -> Result<PathBuf, ConfappError> {
        let path = self.config_path.as_ref().ok_or(ConfappError::NoConfigFile)?;
        let format = FileFormat::from_path(path)?;
        let document = deep_merge(self.file.clone(), self.settings()?);

        write_config_file(path, format, &document)?;
        debug!(path = %path.display(), %format, "saved config file");
        Ok(path.clone())
    }
}
