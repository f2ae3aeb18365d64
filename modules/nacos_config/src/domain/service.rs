//! Configuration classes and property resolution

use super::property::{ConfigProperty, DeclaredProperty};
use super::resolver::{BindingResolver, BindingSource, ClassOptions, ConfigClassBinding};
use crate::contract::{ClientError, ConfigClient, ConfigError, PropertyMeta};
use indexmap::IndexMap;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Declares a configuration class: its connection options and properties
pub struct ConfigClassBuilder {
    name: String,
    options: ClassOptions,
    resolver: BindingResolver,
    properties: Vec<Arc<dyn DeclaredProperty>>,
}

impl ConfigClassBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: ClassOptions::default(),
            resolver: BindingResolver::standard(),
            properties: Vec::new(),
        }
    }

    /// Use this client for every property, ignoring all other options
    pub fn client(mut self, client: Arc<dyn ConfigClient>) -> Self {
        self.options.client = Some(client);
        self
    }

    pub fn server_address(mut self, server_address: impl Into<String>) -> Self {
        self.options.connection.server_address = Some(server_address.into());
        self
    }

    pub fn namespace_id(mut self, namespace_id: impl Into<String>) -> Self {
        self.options.connection.namespace_id = Some(namespace_id.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.options.connection.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.options.connection.password = Some(password.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.connection.timeout = timeout;
        self
    }

    /// Replace the resolution chain (e.g. to skip environment lookup)
    pub fn resolver(mut self, resolver: BindingResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Register a property under its data ID
    pub fn property<T>(mut self, property: ConfigProperty<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.properties.push(Arc::new(property));
        self
    }

    /// Resolve the binding and freeze the class
    pub fn build(self) -> Result<ConfigClass, ConfigError> {
        let mut properties = IndexMap::with_capacity(self.properties.len());
        for property in self.properties {
            let name = property.meta().key.data_id;
            if properties.contains_key(&name) {
                return Err(ConfigError::DuplicateProperty {
                    class: self.name,
                    name,
                });
            }
            properties.insert(name, property);
        }

        let binding = self.resolver.resolve(&self.options)?;
        match &binding {
            Some(binding) => tracing::info!(
                class = %self.name,
                source = %binding.source(),
                namespace_id = binding.namespace_id().unwrap_or(""),
                properties = properties.len(),
                "Config class bound"
            ),
            None => tracing::info!(
                class = %self.name,
                properties = properties.len(),
                "Config class has no client; only defaults will be served"
            ),
        }

        Ok(ConfigClass {
            inner: Arc::new(ClassInner {
                name: self.name,
                binding,
                properties,
            }),
        })
    }
}

struct ClassInner {
    name: String,
    binding: Option<ConfigClassBinding>,
    properties: IndexMap<String, Arc<dyn DeclaredProperty>>,
}

/// A declared configuration class
///
/// Cheap to clone; clones share the binding and the property registry.
/// Values are never cached: each access asks the server again.
#[derive(Clone)]
pub struct ConfigClass {
    inner: Arc<ClassInner>,
}

impl ConfigClass {
    pub fn builder(name: impl Into<String>) -> ConfigClassBuilder {
        ConfigClassBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The resolved binding, or `None` when no strategy applied
    pub fn binding(&self) -> Option<&ConfigClassBinding> {
        self.inner.binding.as_ref()
    }

    pub fn binding_source(&self) -> Option<BindingSource> {
        self.inner.binding.as_ref().map(ConfigClassBinding::source)
    }

    /// Registered properties, in declaration order
    pub fn properties(&self) -> impl Iterator<Item = PropertyMeta> + '_ {
        self.inner.properties.values().map(|p| p.meta())
    }

    /// An instance view; reads resolve exactly like reads on the class
    pub fn instance(&self) -> ConfigInstance {
        ConfigInstance {
            class: self.clone(),
        }
    }

    /// Current value of a registered property
    pub async fn get<T>(&self, name: &str) -> Result<T, ConfigError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let property = self.property::<T>(name)?;
        self.value(property).await
    }

    /// Registered descriptor for `name`, typed as `T`
    pub fn property<T>(&self, name: &str) -> Result<&ConfigProperty<T>, ConfigError>
    where
        T: Send + Sync + 'static,
    {
        let declared =
            self.inner
                .properties
                .get(name)
                .ok_or_else(|| ConfigError::UnknownProperty {
                    class: self.inner.name.clone(),
                    name: name.to_string(),
                })?;

        declared
            .as_any()
            .downcast_ref::<ConfigProperty<T>>()
            .ok_or_else(|| ConfigError::PropertyTypeMismatch {
                name: name.to_string(),
                declared: declared.meta().type_name,
                expected: type_name::<T>(),
            })
    }

    /// Current value of `property`, resolved against this class's binding
    ///
    /// The descriptor does not have to be registered on the class.
    pub async fn value<T>(&self, property: &ConfigProperty<T>) -> Result<T, ConfigError>
    where
        T: Clone,
    {
        let Some(binding) = self.inner.binding.as_ref() else {
            return property
                .default_value_now()
                .ok_or_else(|| ConfigError::ConfigurationMissing {
                    class: self.inner.name.clone(),
                    data_id: property.data_id().to_string(),
                });
        };

        let key = property.key();
        tracing::debug!(class = %self.inner.name, key = %key, "Fetching config value");

        let fetched = match binding.client().get_config(&key.data_id, &key.group).await {
            Ok(raw) if raw.is_empty() => Err(ClientError::NotFound {
                data_id: key.data_id.clone(),
                group: key.group.clone(),
            }),
            other => other,
        };

        match fetched {
            Ok(raw) => property.coerce(&raw).map_err(|source| ConfigError::TypeCoercion {
                data_id: key.data_id.clone(),
                source,
            }),
            Err(error) => match property.default_value_now() {
                Some(value) => {
                    if error.is_not_found() {
                        tracing::debug!(class = %self.inner.name, key = %key, "Config value absent, using default");
                    } else {
                        tracing::warn!(
                            class = %self.inner.name,
                            key = %key,
                            error = %error,
                            "Config fetch failed, using default"
                        );
                    }
                    Ok(value)
                }
                None => Err(ConfigError::RemoteFetch {
                    data_id: key.data_id.clone(),
                    group: key.group.clone(),
                    source: error,
                }),
            },
        }
    }
}

impl fmt::Debug for ConfigClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigClass")
            .field("name", &self.inner.name)
            .field("binding", &self.inner.binding)
            .field("properties", &self.inner.properties.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Instance-level view of a [`ConfigClass`]
#[derive(Debug, Clone)]
pub struct ConfigInstance {
    class: ConfigClass,
}

impl ConfigInstance {
    pub fn class(&self) -> &ConfigClass {
        &self.class
    }

    pub async fn get<T>(&self, name: &str) -> Result<T, ConfigError>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.class.get(name).await
    }

    pub async fn value<T>(&self, property: &ConfigProperty<T>) -> Result<T, ConfigError>
    where
        T: Clone,
    {
        self.class.value(property).await
    }
}
