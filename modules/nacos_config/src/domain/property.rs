//! Property descriptors
//!
//! A [`ConfigProperty`] names one remote entry (data ID and group), the type
//! its value is coerced to, and what to return when the entry cannot be
//! fetched. Descriptors are immutable once registered on a class.

use super::coercion::{Coercer, FlagCoercer, RawCoercer, ScalarCoercer, StructuredCoercer};
use crate::contract::{CoercionError, ConfigKey, PropertyMeta};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

/// Fallback for a property whose remote value is unavailable
pub enum DefaultValue<T> {
    /// Returned as a clone on every fallback
    Static(T),
    /// Called on every fallback, so time-varying defaults stay fresh
    Factory(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> DefaultValue<T> {
    /// Produce the value for one access
    pub fn produce(&self) -> T {
        match self {
            Self::Static(value) => value.clone(),
            Self::Factory(factory) => factory(),
        }
    }
}

impl<T> Clone for DefaultValue<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Self::Static(value) => Self::Static(value.clone()),
            Self::Factory(factory) => Self::Factory(Arc::clone(factory)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DefaultValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Declaration of one configuration item
pub struct ConfigProperty<T> {
    key: ConfigKey,
    default: Option<DefaultValue<T>>,
    coercer: Arc<dyn Coercer<T>>,
}

impl ConfigProperty<String> {
    /// Property without a declared type: the raw string is returned
    pub fn raw(data_id: impl Into<String>) -> Self {
        Self::with_coercer(data_id, RawCoercer)
    }
}

impl ConfigProperty<bool> {
    /// Boolean property with lenient parsing (`yes`, `on`, `1`, ...)
    pub fn flag(data_id: impl Into<String>) -> Self {
        Self::with_coercer(data_id, FlagCoercer)
    }
}

impl<T> ConfigProperty<T>
where
    T: FromStr + 'static,
    T::Err: Display,
{
    /// Scalar property parsed with `FromStr`
    pub fn scalar(data_id: impl Into<String>) -> Self {
        Self::with_coercer(data_id, ScalarCoercer::<T>::default())
    }
}

impl<T> ConfigProperty<T>
where
    T: DeserializeOwned + 'static,
{
    /// Structured property stored as JSON
    pub fn structured(data_id: impl Into<String>) -> Self {
        Self::with_coercer(data_id, StructuredCoercer::<T>::json())
    }

    /// Structured property stored as YAML
    pub fn yaml(data_id: impl Into<String>) -> Self {
        Self::with_coercer(data_id, StructuredCoercer::<T>::yaml())
    }

    /// Structured JSON property validated against `schema` before decoding
    pub fn structured_with_schema(data_id: impl Into<String>, schema: Value) -> Self {
        Self::with_coercer(data_id, StructuredCoercer::<T>::json().with_schema(schema))
    }
}

impl<T> ConfigProperty<T> {
    /// Property with a custom coercer
    pub fn with_coercer(data_id: impl Into<String>, coercer: impl Coercer<T> + 'static) -> Self {
        Self {
            key: ConfigKey::new(data_id),
            default: None,
            coercer: Arc::new(coercer),
        }
    }

    /// Read from `group` instead of `DEFAULT_GROUP`
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.key.group = group.into();
        self
    }

    /// Fixed fallback value
    pub fn default_value(mut self, value: T) -> Self {
        self.default = Some(DefaultValue::Static(value));
        self
    }

    /// Fallback computed on every access that needs it
    pub fn default_with<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Factory(Arc::new(factory)));
        self
    }

    pub fn key(&self) -> &ConfigKey {
        &self.key
    }

    pub fn data_id(&self) -> &str {
        &self.key.data_id
    }

    pub fn group_name(&self) -> &str {
        &self.key.group
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn type_name(&self) -> &'static str {
        self.coercer.type_name()
    }

    pub fn default(&self) -> Option<&DefaultValue<T>> {
        self.default.as_ref()
    }

    /// Run the declared coercion on a fetched value
    pub fn coerce(&self, raw: &str) -> Result<T, CoercionError> {
        self.coercer.coerce(raw)
    }

    pub fn meta(&self) -> PropertyMeta {
        PropertyMeta {
            key: self.key.clone(),
            type_name: self.type_name(),
            has_default: self.has_default(),
        }
    }
}

impl<T: Clone> ConfigProperty<T> {
    /// Evaluate the default, if any
    pub fn default_value_now(&self) -> Option<T> {
        self.default.as_ref().map(DefaultValue::produce)
    }
}

impl<T: Clone> Clone for ConfigProperty<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            default: self.default.clone(),
            coercer: Arc::clone(&self.coercer),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ConfigProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigProperty")
            .field("key", &self.key)
            .field("type", &self.type_name())
            .field("default", &self.default)
            .finish()
    }
}

/// Type-erased view of a registered property
pub(crate) trait DeclaredProperty: Send + Sync {
    fn meta(&self) -> PropertyMeta;

    fn as_any(&self) -> &dyn Any;
}

impl<T> DeclaredProperty for ConfigProperty<T>
where
    T: Send + Sync + 'static,
{
    fn meta(&self) -> PropertyMeta {
        ConfigProperty::meta(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
