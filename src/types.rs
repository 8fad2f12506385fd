use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Declared type of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Bool,
    Int,
    Float,
    Duration,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Duration => "duration",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by the [`Value`] accessors when the variant is not the one asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} value, found {found}")]
pub struct TypeMismatch {
    pub expected: FieldType,
    pub found: FieldType,
}

/// A configuration value, tagged with its type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Duration(Duration),
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::String(_) => FieldType::String,
            Value::Bool(_) => FieldType::Bool,
            Value::Int(_) => FieldType::Int,
            Value::Float(_) => FieldType::Float,
            Value::Duration(_) => FieldType::Duration,
        }
    }

    fn mismatch(&self, expected: FieldType) -> TypeMismatch {
        TypeMismatch {
            expected,
            found: self.field_type(),
        }
    }

    pub fn as_str(&self) -> Result<&str, TypeMismatch> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch(FieldType::String)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, TypeMismatch> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch(FieldType::Bool)),
        }
    }

    pub fn as_int(&self) -> Result<i64, TypeMismatch> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.mismatch(FieldType::Int)),
        }
    }

    pub fn as_float(&self) -> Result<f64, TypeMismatch> {
        match self {
            Value::Float(f) => Ok(*f),
            other => Err(other.mismatch(FieldType::Float)),
        }
    }

    pub fn as_duration(&self) -> Result<Duration, TypeMismatch> {
        match self {
            Value::Duration(d) => Ok(*d),
            other => Err(other.mismatch(FieldType::Duration)),
        }
    }

    /// Parse a raw string (env var, CLI flag, `.env` entry) as `ty`.
    pub fn parse(ty: FieldType, raw: &str) -> Result<Value, String> {
        match ty {
            FieldType::String => Ok(Value::String(raw.to_string())),
            FieldType::Bool => parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| format!("invalid bool: {raw:?} (expected true or false)")),
            FieldType::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| format!("invalid int {raw:?}: {e}")),
            FieldType::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| format!("invalid float {raw:?}: {e}")),
            FieldType::Duration => parse_duration(raw).map(Value::Duration),
        }
    }

    /// Convert a candidate value to the declared type `ty`.
    ///
    /// Strings are parsed, ints widen to floats, and plain numbers become
    /// durations in seconds. Scalars convert to strings. Anything else is an
    /// error.
    pub fn coerce(&self, ty: FieldType) -> Result<Value, String> {
        match (self, ty) {
            (v, ty) if v.field_type() == ty => Ok(v.clone()),
            (Value::String(s), ty) => Value::parse(ty, s),
            (v, FieldType::String) => Ok(Value::String(v.to_string())),
            (Value::Int(i), FieldType::Float) => Ok(Value::Float(*i as f64)),
            (Value::Float(f), FieldType::Int) => whole_int(*f).map(Value::Int),
            (Value::Int(i), FieldType::Duration) => u64::try_from(*i)
                .map(|secs| Value::Duration(Duration::from_secs(secs)))
                .map_err(|_| format!("negative duration: {i}")),
            (Value::Float(f), FieldType::Duration) => seconds(*f).map(Value::Duration),
            (v, ty) => Err(v.mismatch(ty).to_string()),
        }
    }

    /// Build a value of type `ty` from a parsed document value.
    pub fn from_toml(ty: FieldType, value: &toml::Value) -> Result<Value, String> {
        let raw = match value {
            toml::Value::String(s) => Value::String(s.clone()),
            toml::Value::Boolean(b) => Value::Bool(*b),
            toml::Value::Integer(i) => Value::Int(*i),
            toml::Value::Float(f) => Value::Float(*f),
            toml::Value::Datetime(d) => Value::String(d.to_string()),
            toml::Value::Array(_) => return Err(format!("expected {ty} value, found array")),
            toml::Value::Table(_) => return Err(format!("expected {ty} value, found table")),
        };
        raw.coerce(ty)
    }

    /// Document form used when persisting. Durations are written as
    /// humantime strings (`15m`, `1h 30m`).
    pub fn to_toml(&self) -> toml::Value {
        match self {
            Value::String(s) => toml::Value::String(s.clone()),
            Value::Bool(b) => toml::Value::Boolean(*b),
            Value::Int(i) => toml::Value::Integer(*i),
            Value::Float(f) => toml::Value::Float(*f),
            Value::Duration(d) => {
                toml::Value::String(humantime::format_duration(*d).to_string())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Duration(d) => write!(f, "{}", humantime::format_duration(*d)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn seconds(f: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(f).map_err(|e| format!("invalid duration: {f} seconds ({e})"))
}

/// Whole floats inside the `i64` range. `i64::MAX as f64` rounds up to 2^63,
/// so the upper bound is exclusive.
fn whole_int(f: f64) -> Result<i64, String> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(f as i64)
    } else {
        Err(format!("{f} is not an integer in range"))
    }
}

/// Parse a duration expression (`1h30m`, `15m`, `10s`) or a bare number of
/// seconds (`10`, `2.5`).
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<f64>() {
        return seconds(secs);
    }
    humantime::parse_duration(raw)
        .map_err(|_| format!("invalid duration format: {raw} (examples: 1h30m, 15m, 10s)"))
}

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Print `name = value` for fields matching any prefix.
    List { prefixes: Vec<String>, hidden: bool },
    /// Print full metadata for fields matching any prefix.
    Describe { prefixes: Vec<String>, hidden: bool },
    /// Write each `(name, raw value)` pair, then save.
    Set { values: Vec<(String, String)> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        assert_eq!(Value::from("x").as_str().unwrap(), "x");
        assert!(Value::from(true).as_bool().unwrap());
        assert_eq!(Value::from(3i64).as_int().unwrap(), 3);
        assert_eq!(Value::from(1.5).as_float().unwrap(), 1.5);
        assert_eq!(
            Value::from(Duration::from_secs(60)).as_duration().unwrap(),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn accessor_mismatch_reports_both_types() {
        let err = Value::from("debug").as_bool().unwrap_err();
        assert_eq!(err.expected, FieldType::Bool);
        assert_eq!(err.found, FieldType::String);
        assert_eq!(err.to_string(), "expected bool value, found string");
    }

    #[test]
    fn parse_bool_variants() {
        assert_eq!(Value::parse(FieldType::Bool, "TRUE").unwrap(), Value::Bool(true));
        assert_eq!(Value::parse(FieldType::Bool, "0").unwrap(), Value::Bool(false));
        assert!(Value::parse(FieldType::Bool, "maybe").is_err());
    }

    #[test]
    fn parse_int_and_float() {
        assert_eq!(Value::parse(FieldType::Int, " 42 ").unwrap(), Value::Int(42));
        assert!(Value::parse(FieldType::Int, "4.2").is_err());
        assert_eq!(Value::parse(FieldType::Float, "4.2").unwrap(), Value::Float(4.2));
    }

    #[test]
    fn parse_duration_expressions() {
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("10").unwrap(), Duration::from_secs(10));
        assert!(parse_duration("not-a-duration").is_err());
        assert!(parse_duration("-5").is_err());
    }

    #[test]
    fn oversized_durations_are_errors() {
        let err = parse_duration("1e20").unwrap_err();
        assert!(err.starts_with("invalid duration: 100000000000000000000 seconds"));
        assert!(Value::Float(1e20).coerce(FieldType::Duration).is_err());
        assert!(Value::parse(FieldType::Duration, "1e20").is_err());
        assert!(parse_duration("inf").is_err());
        assert!(parse_duration("NaN").is_err());
    }

    #[test]
    fn float_to_int_rejects_out_of_range() {
        assert_eq!(Value::Float(42.0).coerce(FieldType::Int).unwrap(), Value::Int(42));
        assert_eq!(Value::Float(-3.0).coerce(FieldType::Int).unwrap(), Value::Int(-3));
        assert!(Value::Float(1e30).coerce(FieldType::Int).is_err());
        assert!(Value::Float(-1e30).coerce(FieldType::Int).is_err());
        assert!(Value::Float(9_223_372_036_854_775_808.0).coerce(FieldType::Int).is_err());
        assert!(Value::Float(f64::NAN).coerce(FieldType::Int).is_err());
        assert!(Value::Float(2.5).coerce(FieldType::Int).is_err());
    }

    #[test]
    fn coerce_widens_and_converts() {
        assert_eq!(Value::Int(2).coerce(FieldType::Float).unwrap(), Value::Float(2.0));
        assert_eq!(
            Value::Int(10).coerce(FieldType::Duration).unwrap(),
            Value::Duration(Duration::from_secs(10))
        );
        assert_eq!(
            Value::Bool(true).coerce(FieldType::String).unwrap(),
            Value::String("true".into())
        );
        assert!(Value::Bool(true).coerce(FieldType::Int).is_err());
        assert!(Value::Int(-1).coerce(FieldType::Duration).is_err());
    }

    #[test]
    fn from_toml_rejects_tables() {
        let table = toml::Value::Table(toml::Table::new());
        assert!(Value::from_toml(FieldType::String, &table).is_err());
        let s = toml::Value::String("1h".into());
        assert_eq!(
            Value::from_toml(FieldType::Duration, &s).unwrap(),
            Value::Duration(Duration::from_secs(3600))
        );
    }

    #[test]
    fn durations_display_and_persist_as_humantime() {
        let d = Value::Duration(Duration::from_secs(5400));
        assert_eq!(d.to_string(), "1h 30m");
        assert_eq!(d.to_toml(), toml::Value::String("1h 30m".into()));
        // The persisted form parses back to the same value.
        assert_eq!(Value::from_toml(FieldType::Duration, &d.to_toml()).unwrap(), d);
    }
}
