//! In-process config client for offline use and tests

use crate::contract::{ClientError, ConfigClient, ConfigKey};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Config client serving entries from a map
#[derive(Debug, Default)]
pub struct MemoryConfigClient {
    namespace_id: Option<String>,
    entries: RwLock<HashMap<ConfigKey, String>>,
    fetches: AtomicUsize,
}

impl MemoryConfigClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(namespace_id: impl Into<String>) -> Self {
        Self {
            namespace_id: Some(namespace_id.into()),
            ..Self::default()
        }
    }

    /// Create or replace an entry
    pub fn publish(&self, data_id: &str, group: &str, content: impl Into<String>) {
        self.entries
            .write()
            .insert(ConfigKey::with_group(data_id, group), content.into());
    }

    /// Remove an entry, returning its content
    pub fn remove(&self, data_id: &str, group: &str) -> Option<String> {
        self.entries
            .write()
            .remove(&ConfigKey::with_group(data_id, group))
    }

    /// Number of `get_config` calls served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ConfigClient for MemoryConfigClient {
    async fn get_config(&self, data_id: &str, group: &str) -> Result<String, ClientError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.entries
            .read()
            .get(&ConfigKey::with_group(data_id, group))
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                data_id: data_id.to_string(),
                group: group.to_string(),
            })
    }

    fn namespace_id(&self) -> Option<&str> {
        self.namespace_id.as_deref()
    }
}
