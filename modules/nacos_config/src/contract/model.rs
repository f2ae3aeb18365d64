//! Shared models for configuration properties

use std::fmt;

/// Group used when a property does not name one
pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";

/// Address of one configuration entry inside a namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    /// Remote key (Nacos data ID)
    pub data_id: String,
    /// Group partition
    pub group: String,
}

impl ConfigKey {
    /// Key in [`DEFAULT_GROUP`]
    pub fn new(data_id: impl Into<String>) -> Self {
        Self {
            data_id: data_id.into(),
            group: DEFAULT_GROUP.to_string(),
        }
    }

    /// Key in an explicit group
    pub fn with_group(data_id: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            data_id: data_id.into(),
            group: group.into(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.data_id)
    }
}

/// Metadata about a declared property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMeta {
    /// Remote key and group
    pub key: ConfigKey,
    /// Rust type the value is coerced to
    pub type_name: &'static str,
    /// Whether a default covers fetch failures
    pub has_default: bool,
}
