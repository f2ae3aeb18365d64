//! Coercion of raw remote strings into declared property types
//!
//! Nacos stores every entry as text. A [`Coercer`] turns that text into the
//! type a property was declared with:
//! - [`RawCoercer`] keeps the string as-is (no declared type)
//! - [`ScalarCoercer`] parses through `FromStr`
//! - [`FlagCoercer`] accepts the usual spellings of a boolean
//! - [`StructuredCoercer`] decodes JSON or YAML with serde, optionally checking
//!   a JSON Schema first

use crate::contract::CoercionError;
use jsonschema::Validator;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::type_name;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

/// Converts a raw remote value into `T`
pub trait Coercer<T>: Send + Sync {
    /// Coerce `raw` or explain why it does not fit
    fn coerce(&self, raw: &str) -> Result<T, CoercionError>;

    /// Name of the produced type, used in errors and metadata
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// Returns the raw string unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCoercer;

impl Coercer<String> for RawCoercer {
    fn coerce(&self, raw: &str) -> Result<String, CoercionError> {
        Ok(raw.to_string())
    }
}

/// Parses scalars (integers, floats, addresses, ...) with `FromStr`
pub struct ScalarCoercer<T>(PhantomData<fn() -> T>);

impl<T> Default for ScalarCoercer<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T> Coercer<T> for ScalarCoercer<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn coerce(&self, raw: &str) -> Result<T, CoercionError> {
        raw.trim().parse::<T>().map_err(|e| CoercionError::Parse {
            type_name: type_name::<T>(),
            reason: e.to_string(),
        })
    }
}

/// Lenient boolean parsing: true/false, 1/0, yes/no, on/off, t/f, y/n
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagCoercer;

impl Coercer<bool> for FlagCoercer {
    fn coerce(&self, raw: &str) -> Result<bool, CoercionError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
            "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
            other => Err(CoercionError::Parse {
                type_name: "bool",
                reason: format!("'{}' is not a recognised boolean", other),
            }),
        }
    }
}

/// Encoding of a structured remote value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    fn as_str(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Decodes a JSON or YAML document into `T`
///
/// Field-level defaults come from the type's own serde attributes
/// (`#[serde(default)]`). When a schema is attached, the document is parsed to
/// a JSON value and validated before it is decoded.
pub struct StructuredCoercer<T> {
    format: Format,
    schema: Option<Value>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StructuredCoercer<T> {
    /// JSON decoding without schema
    pub fn json() -> Self {
        Self::new(Format::Json)
    }

    /// YAML decoding without schema
    pub fn yaml() -> Self {
        Self::new(Format::Yaml)
    }

    /// Decoding in the given format, without schema
    pub fn new(format: Format) -> Self {
        Self {
            format,
            schema: None,
            _marker: PhantomData,
        }
    }

    /// Validate documents against `schema` before decoding
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Document format this coercer decodes
    pub fn format(&self) -> Format {
        self.format
    }

    fn decode_error(&self, reason: impl Display) -> CoercionError {
        CoercionError::Decode {
            format: self.format.as_str(),
            type_name: type_name::<T>(),
            reason: reason.to_string(),
        }
    }

    fn decode_str<D: DeserializeOwned>(&self, raw: &str) -> Result<D, CoercionError> {
        match self.format {
            Format::Json => serde_json::from_str(raw).map_err(|e| self.decode_error(e)),
            Format::Yaml => serde_yaml::from_str(raw).map_err(|e| self.decode_error(e)),
        }
    }
}

impl<T> Coercer<T> for StructuredCoercer<T>
where
    T: DeserializeOwned,
{
    fn coerce(&self, raw: &str) -> Result<T, CoercionError> {
        match &self.schema {
            Some(schema) => {
                let value: Value = self.decode_str(raw)?;
                validate_against_schema(&value, schema)?;
                serde_json::from_value(value).map_err(|e| self.decode_error(e))
            }
            None => self.decode_str(raw),
        }
    }
}

/// Validate a decoded value against a JSON Schema
pub fn validate_against_schema(data: &Value, schema: &Value) -> Result<(), CoercionError> {
    let validator = Validator::new(schema).map_err(|e| CoercionError::InvalidSchema {
        reason: e.to_string(),
    })?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();
    if !errors.is_empty() {
        return Err(CoercionError::SchemaValidation { errors });
    }

    Ok(())
}
