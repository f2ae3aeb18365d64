//! Contract layer - the client seam and the types shared across layers
//!
//! Remote config clients implement [`client::ConfigClient`]; everything a
//! caller sees when an access fails lives in [`error`].

pub mod client;
pub mod error;
pub mod model;

pub use client::ConfigClient;
pub use error::{ClientError, CoercionError, ConfigError};
pub use model::{ConfigKey, PropertyMeta, DEFAULT_GROUP};
