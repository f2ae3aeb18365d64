//! Nacos Config
//!
//! Declarative, strongly-typed configuration properties backed by a Nacos
//! configuration server. A configuration class registers a set of
//! [`ConfigProperty`] descriptors; every access fetches the current remote
//! value, coerces it to the declared type, and falls back to the property's
//! default when the remote entry cannot be fetched.
//!
//! ```rust,no_run
//! use nacos_config::{ConfigClass, ConfigProperty};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Clone, Deserialize)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! # async fn run() -> Result<(), nacos_config::ConfigError> {
//! let config = ConfigClass::builder("AppConfig")
//!     .server_address("127.0.0.1:8848")
//!     .namespace_id("dev")
//!     .property(ConfigProperty::<i64>::scalar("test_key").group("group1").default_value(1))
//!     .property(ConfigProperty::<User>::structured("test_json"))
//!     .build()?;
//!
//! let limit: i64 = config.get("test_key").await?;
//! let user: User = config.get("test_json").await?;
//! # let _ = (limit, user);
//! # Ok(())
//! # }
//! ```

// Public exports
pub mod contract;
pub use contract::{
    client::ConfigClient,
    error::{ClientError, CoercionError, ConfigError},
    ConfigKey, PropertyMeta, DEFAULT_GROUP,
};

pub mod config;
pub use config::ConnectionConfig;

pub mod domain;
pub use domain::{
    BindingResolver, BindingSource, ConfigClass, ConfigClassBinding, ConfigClassBuilder,
    ConfigInstance, ConfigProperty, DefaultValue,
};

pub mod infra;
pub use infra::{memory::MemoryConfigClient, nacos::NacosClient};
