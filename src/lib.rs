//! Typed, layered configuration for Rust command-line applications.
//!
//! confapp keeps every configuration key in a [`Registry`] of [`Field`]
//! descriptors: name, type, default, validation rules and documentation live
//! in one place. Everything else derives from that registry: the values the
//! [`ValueStore`] resolves, the flags of `config set`, and the output of
//! `config list` and `config describe`.
//!
//! ```ignore
//! let mut ctx = Confapp::builder()
//!     .registry(fields::registry())
//!     .env_prefix("CONFAPP")
//!     .load()?;
//!
//! let level = ctx.store().read_string("log.level")?;
//! ctx.store_mut().write("log.level", "debug")?;
//! ctx.store().save()?;
//! ```
//!
//! # Layer precedence
//!
//! ```text
//! Defaults              Field::default
//!        ↑ overridden by
//! Config file           --config / CONFAPP_CONFIG, format picked by extension
//!        ↑ overridden by
//! Environment vars      CONFAPP_LOG_LEVEL for `log.level`
//!        ↑ overridden by
//! Overrides             cli_override() and ValueStore::write()
//! ```
//!
//! Layers are sparse. A key missing from one layer falls through to the next,
//! and a key missing everywhere reads as "not set" rather than as an error.
//!
//! # Fields and values
//!
//! A field's declared [`FieldType`] is metadata; the value itself is a
//! [`Value`], a tagged union over string, bool, int, float and duration.
//! Values coming from strings (env vars, CLI flags, `.env` files) are coerced
//! to the declared type on read. Typed accessors such as
//! [`ValueStore::read_bool`] fail with [`TypeMismatch`] instead of guessing.
//!
//! # Validation
//!
//! [`ValueStore::write`] runs [`validate::validate`] before touching any
//! state. A field may restrict itself to a set of valid values, a structural
//! tag ([`ValidateTag::FilePath`], [`ValidateTag::Url`]) or a custom
//! predicate. A rejected write leaves the previous value in place.
//!
//! # Config files
//!
//! The extension picks the format: `yaml`/`yml`, `json`, `toml`, `hcl` or
//! `env`. A missing file at startup is fine; `save()` creates it, along with
//! any missing parent directories. Existing TOML files are patched in place
//! with `toml_edit`, so comments survive a `config set`.
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) builds the
//! `config list|describe|set` command tree from the registry, one
//! `--<field.name>` flag per visible field, and turns parsed matches into a
//! framework-agnostic [`ConfigAction`].

pub mod error;
pub mod fields;
pub mod types;
pub mod validate;

mod builder;
#[cfg(feature = "clap")]
pub mod cli;
mod dotted;
mod env;
mod field;
mod file;
pub(crate) mod merge;
mod ops;
mod persist;
mod registry;
mod store;

#[cfg(test)]
mod fixtures;

pub use builder::{ConfigContext, Confapp, ContextBuilder};
pub use error::ConfappError;
pub use field::{Field, ValidateFn, ValidateTag};
pub use file::FileFormat;
pub use ops::ConfigResult;
pub use registry::{Registry, group_sorted};
pub use store::{Source, ValueStore};
pub use types::{ConfigAction, FieldType, TypeMismatch, Value};
