//! Binding of a configuration class to its remote client
//!
//! Strategies are tried in order and the first one that applies wins:
//! 1. an explicit client handle
//! 2. explicit server address and namespace
//! 3. `NACOS_*` environment variables
//!
//! When none applies the class is left unbound; the error is raised later, by
//! the first access that has no default to fall back to.

use crate::config::ConnectionConfig;
use crate::contract::{ConfigClient, ConfigError};
use crate::infra::nacos::NacosClient;
use std::fmt;
use std::sync::Arc;

/// Class-level options supplied when a configuration class is declared
#[derive(Clone, Default)]
pub struct ClassOptions {
    /// Ready-made client; takes precedence over everything else
    pub client: Option<Arc<dyn ConfigClient>>,
    /// Explicit connection parameters
    pub connection: ConnectionConfig,
}

impl fmt::Debug for ClassOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassOptions")
            .field("client", &self.client.as_ref().map(|_| ".."))
            .field("server_address", &self.connection.server_address)
            .field("namespace_id", &self.connection.namespace_id)
            .field("username", &self.connection.username)
            .finish_non_exhaustive()
    }
}

/// Which strategy produced a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    ExplicitClient,
    ExplicitConnection,
    Environment,
}

impl fmt::Display for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ExplicitClient => "explicit client",
            Self::ExplicitConnection => "explicit connection",
            Self::Environment => "environment",
        };
        f.write_str(name)
    }
}

/// The client backing every property of one configuration class
#[derive(Clone)]
pub struct ConfigClassBinding {
    client: Arc<dyn ConfigClient>,
    namespace_id: Option<String>,
    source: BindingSource,
}

impl ConfigClassBinding {
    pub fn new(client: Arc<dyn ConfigClient>, source: BindingSource) -> Self {
        let namespace_id = client.namespace_id().map(str::to_string);
        Self {
            client,
            namespace_id,
            source,
        }
    }

    pub fn client(&self) -> &Arc<dyn ConfigClient> {
        &self.client
    }

    pub fn namespace_id(&self) -> Option<&str> {
        self.namespace_id.as_deref()
    }

    pub fn source(&self) -> BindingSource {
        self.source
    }
}

impl fmt::Debug for ConfigClassBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigClassBinding")
            .field("namespace_id", &self.namespace_id)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// One step of the resolution chain
pub trait ResolveStrategy: Send + Sync {
    /// `Ok(None)` means the strategy does not apply to these options
    fn resolve(&self, options: &ClassOptions) -> Result<Option<ConfigClassBinding>, ConfigError>;
}

/// Use the client handle passed to the class as-is
pub struct ExplicitClient;

impl ResolveStrategy for ExplicitClient {
    fn resolve(&self, options: &ClassOptions) -> Result<Option<ConfigClassBinding>, ConfigError> {
        Ok(options
            .client
            .as_ref()
            .map(|client| ConfigClassBinding::new(Arc::clone(client), BindingSource::ExplicitClient)))
    }
}

/// Build a Nacos client from the class's server address and namespace
pub struct ExplicitConnection;

impl ResolveStrategy for ExplicitConnection {
    fn resolve(&self, options: &ClassOptions) -> Result<Option<ConfigClassBinding>, ConfigError> {
        connect(&options.connection, BindingSource::ExplicitConnection)
    }
}

/// Build a Nacos client from `NACOS_*` environment variables
pub struct Environment;

impl ResolveStrategy for Environment {
    fn resolve(&self, _options: &ClassOptions) -> Result<Option<ConfigClassBinding>, ConfigError> {
        let connection = ConnectionConfig::from_env().map_err(|e| ConfigError::InvalidConnection {
            reason: format!("cannot read NACOS_* environment: {}", e),
        })?;
        connect(&connection, BindingSource::Environment)
    }
}

fn connect(
    connection: &ConnectionConfig,
    source: BindingSource,
) -> Result<Option<ConfigClassBinding>, ConfigError> {
    let connection = connection.clone().normalized();
    if !connection.is_complete() {
        return Ok(None);
    }

    let client = NacosClient::new(&connection).map_err(|e| ConfigError::InvalidConnection {
        reason: e.to_string(),
    })?;
    Ok(Some(ConfigClassBinding::new(Arc::new(client), source)))
}

/// Ordered list of strategies
pub struct BindingResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl BindingResolver {
    /// Explicit client, then explicit connection, then environment
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(ExplicitClient),
            Box::new(ExplicitConnection),
            Box::new(Environment),
        ])
    }

    /// Like [`standard`](Self::standard) but never reads the environment
    pub fn without_environment() -> Self {
        Self::new(vec![Box::new(ExplicitClient), Box::new(ExplicitConnection)])
    }

    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// First binding any strategy produces, or `None`
    pub fn resolve(&self, options: &ClassOptions) -> Result<Option<ConfigClassBinding>, ConfigError> {
        for strategy in &self.strategies {
            if let Some(binding) = strategy.resolve(options)? {
                return Ok(Some(binding));
            }
        }
        Ok(None)
    }
}

impl Default for BindingResolver {
    fn default() -> Self {
        Self::standard()
    }
}
