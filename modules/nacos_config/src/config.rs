//! Connection configuration for the Nacos client

use figment::{
    value::{Dict, Map, Value},
    Figment, Metadata, Profile, Provider,
};
use serde::Deserialize;
use std::env::{self, VarError};
use std::time::Duration;

/// Prefix of the environment variables read by [`ConnectionConfig::from_env`]
pub const ENV_PREFIX: &str = "NACOS_";

/// Variable suffix and the field it fills
const ENV_FIELDS: &[(&str, &str)] = &[
    ("SERVER", "server_address"),
    ("NAMESPACE_ID", "namespace_id"),
    ("USERNAME", "username"),
    ("PASSWORD", "password"),
    ("TIMEOUT", "timeout"),
];

/// Nacos connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Comma-separated server addresses (`NACOS_SERVER`)
    #[serde(default)]
    pub server_address: Option<String>,

    /// Namespace (tenant) ID (`NACOS_NAMESPACE_ID`)
    #[serde(default)]
    pub namespace_id: Option<String>,

    /// Login user, for servers with auth enabled (`NACOS_USERNAME`)
    #[serde(default)]
    pub username: Option<String>,

    /// Login password (`NACOS_PASSWORD`)
    #[serde(default)]
    pub password: Option<String>,

    /// Per-request timeout (`NACOS_TIMEOUT`, e.g. "5s")
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server_address: None,
            namespace_id: None,
            username: None,
            password: None,
            timeout: default_timeout(),
        }
    }
}

impl ConnectionConfig {
    /// Read `NACOS_*` variables from the process environment
    pub fn from_env() -> Result<Self, figment::Error> {
        Figment::new().merge(NacosEnv).extract()
    }

    /// Whether the minimum needed to construct a client is present
    pub fn is_complete(&self) -> bool {
        present(&self.server_address) && present(&self.namespace_id)
    }

    /// Drop empty values, which count as unset
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.server_address,
            &mut self.namespace_id,
            &mut self.username,
            &mut self.password,
        ] {
            if !present(field) {
                *field = None;
            }
        }
        self
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn default_timeout() -> Duration {
    Duration::from_secs(3)
}

/// Known `NACOS_*` variables, passed through as plain strings
///
/// figment's `Env` provider parses values, which turns a namespace id such as
/// `0042` into the number 42.
struct NacosEnv;

impl Provider for NacosEnv {
    fn metadata(&self) -> Metadata {
        Metadata::named("NACOS_* environment variables")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut dict = Dict::new();
        for (suffix, field) in ENV_FIELDS {
            let name = format!("{ENV_PREFIX}{suffix}");
            match env::var(&name) {
                Ok(value) if value.is_empty() => {}
                Ok(value) => {
                    dict.insert(field.to_string(), Value::from(value));
                }
                Err(VarError::NotPresent) => {}
                Err(e) => return Err(figment::Error::from(format!("{name}: {e}"))),
            }
        }

        let mut data = Map::new();
        data.insert(Profile::Default, dict);
        Ok(data)
    }
}
