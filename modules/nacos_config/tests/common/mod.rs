//! Shared mock clients for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use nacos_config::{ClientError, ConfigClient, ConfigKey};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// What the mock answers for one key
#[derive(Clone)]
pub enum Reply {
    Value(String),
    Unreachable,
    Unauthorized,
}

/// Config client answering from a script, recording every request
pub struct MockConfigClient {
    namespace_id: Option<String>,
    replies: RwLock<HashMap<ConfigKey, Reply>>,
    requests: RwLock<Vec<ConfigKey>>,
}

impl MockConfigClient {
    pub fn new(namespace_id: &str) -> Arc<Self> {
        Arc::new(Self {
            namespace_id: Some(namespace_id.to_string()),
            replies: RwLock::new(HashMap::new()),
            requests: RwLock::new(Vec::new()),
        })
    }

    pub fn set(&self, data_id: &str, group: &str, reply: Reply) {
        self.replies
            .write()
            .insert(ConfigKey::with_group(data_id, group), reply);
    }

    pub fn set_value(&self, data_id: &str, group: &str, value: &str) {
        self.set(data_id, group, Reply::Value(value.to_string()));
    }

    pub fn requests(&self) -> Vec<ConfigKey> {
        self.requests.read().clone()
    }
}

#[async_trait]
impl ConfigClient for MockConfigClient {
    async fn get_config(&self, data_id: &str, group: &str) -> Result<String, ClientError> {
        let key = ConfigKey::with_group(data_id, group);
        self.requests.write().push(key.clone());

        match self.replies.read().get(&key).cloned() {
            Some(Reply::Value(value)) => Ok(value),
            Some(Reply::Unreachable) => Err(ClientError::Transport {
                address: "http://10.255.255.1:8848".to_string(),
                reason: "connection refused".to_string(),
            }),
            Some(Reply::Unauthorized) => Err(ClientError::Unauthorized {
                reason: "token expired".to_string(),
            }),
            None => Err(ClientError::NotFound {
                data_id: data_id.to_string(),
                group: group.to_string(),
            }),
        }
    }

    fn namespace_id(&self) -> Option<&str> {
        self.namespace_id.as_deref()
    }
}
