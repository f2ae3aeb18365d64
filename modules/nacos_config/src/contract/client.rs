//! Remote config client trait
//!
//! This trait is the only thing the resolution layer knows about the
//! configuration server. Implementations own their connection, credentials
//! and namespace.

use super::error::ClientError;
use async_trait::async_trait;

/// Read access to a remote configuration service
#[async_trait]
pub trait ConfigClient: Send + Sync {
    /// Fetch the raw content of one configuration entry.
    ///
    /// A missing entry is reported as [`ClientError::NotFound`].
    async fn get_config(&self, data_id: &str, group: &str) -> Result<String, ClientError>;

    /// Namespace this client reads from, if it is scoped to one
    fn namespace_id(&self) -> Option<&str>;
}
