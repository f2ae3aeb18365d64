//! Nacos config client over the v1 open API
//!
//! Reads go to `GET /nacos/v1/cs/configs`. When credentials are configured
//! the client logs in through `POST /nacos/v1/auth/login` on first use and
//! keeps the access token until shortly before it expires.

use super::dto::LoginResponse;
use crate::config::ConnectionConfig;
use crate::contract::{ClientError, ConfigClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use reqwest::StatusCode;
use std::fmt;
use url::Url;

const CONFIGS_PATH: &str = "nacos/v1/cs/configs";
const LOGIN_PATH: &str = "nacos/v1/auth/login";
const MAX_TOKEN_TTL_SECS: u64 = 7 * 24 * 3600;

/// Credentials for servers with auth enabled
#[derive(Clone)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    refresh_at: DateTime<Utc>,
}

/// Nacos client bound to one namespace
pub struct NacosClient {
    http: reqwest::Client,
    servers: Vec<Url>,
    namespace_id: Option<String>,
    credentials: Option<Credentials>,
    token: RwLock<Option<AccessToken>>,
}

impl NacosClient {
    /// Build a client; no request is made until the first fetch
    pub fn new(config: &ConnectionConfig) -> Result<Self, ClientError> {
        let raw = config.server_address.as_deref().unwrap_or_default();
        let servers = parse_server_addresses(raw)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                address: raw.to_string(),
                reason: e.to_string(),
            })?;

        let credentials = config.username.as_ref().map(|username| Credentials {
            username: username.clone(),
            password: config.password.clone().unwrap_or_default(),
        });

        Ok(Self {
            http,
            servers,
            namespace_id: config.namespace_id.clone(),
            credentials,
            token: RwLock::new(None),
        })
    }

    /// Server base URLs, in failover order
    pub fn servers(&self) -> &[Url] {
        &self.servers
    }

    fn cached_token(&self) -> Option<String> {
        self.token
            .read()
            .as_ref()
            .filter(|token| token.refresh_at > Utc::now())
            .map(|token| token.value.clone())
    }

    async fn access_token(&self, server: &Url) -> Result<Option<String>, ClientError> {
        let Some(credentials) = &self.credentials else {
            return Ok(None);
        };
        if let Some(token) = self.cached_token() {
            return Ok(Some(token));
        }

        let token = self.login(server, credentials).await?;
        let value = token.value.clone();
        *self.token.write() = Some(token);
        Ok(Some(value))
    }

    async fn login(&self, server: &Url, credentials: &Credentials) -> Result<AccessToken, ClientError> {
        let url = endpoint(server, LOGIN_PATH)?;
        let response = self
            .http
            .post(url)
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| request_error(server, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| request_error(server, e))?;
        match status {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ClientError::Unauthorized { reason: body });
            }
            other => {
                return Err(ClientError::Status {
                    address: display_address(server),
                    status: other.as_u16(),
                    body,
                });
            }
        }

        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Unauthorized {
                reason: format!("unreadable login response: {}", e),
            })?;

        // Refresh once 90% of the lifetime has passed
        let ttl = login.token_ttl.min(MAX_TOKEN_TTL_SECS) as i64;
        let refresh_at = Utc::now() + chrono::Duration::seconds(ttl - ttl / 10);
        tracing::debug!(
            server = %display_address(server),
            username = %credentials.username,
            ttl_secs = login.token_ttl,
            "Logged in to Nacos"
        );

        Ok(AccessToken {
            value: login.access_token,
            refresh_at,
        })
    }

    async fn fetch_from(&self, server: &Url, data_id: &str, group: &str) -> Result<String, ClientError> {
        let token = self.access_token(server).await?;

        let mut query: Vec<(&str, &str)> = vec![("dataId", data_id), ("group", group)];
        if let Some(namespace_id) = self.namespace_id.as_deref() {
            query.push(("tenant", namespace_id));
        }
        if let Some(token) = token.as_deref() {
            query.push(("accessToken", token));
        }

        let response = self
            .http
            .get(endpoint(server, CONFIGS_PATH)?)
            .query(&query)
            .send()
            .await
            .map_err(|e| request_error(server, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| request_error(server, e))?;
        match status {
            StatusCode::OK => Ok(body),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound {
                data_id: data_id.to_string(),
                group: group.to_string(),
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                // Token may have been revoked; log in again next time
                self.token.write().take();
                Err(ClientError::Unauthorized { reason: body })
            }
            other => Err(ClientError::Status {
                address: display_address(server),
                status: other.as_u16(),
                body,
            }),
        }
    }
}

#[async_trait]
impl ConfigClient for NacosClient {
    async fn get_config(&self, data_id: &str, group: &str) -> Result<String, ClientError> {
        let mut last_error = None;

        for server in &self.servers {
            match self.fetch_from(server, data_id, group).await {
                Err(e @ (ClientError::Transport { .. } | ClientError::Timeout { .. })) => {
                    tracing::debug!(
                        server = %display_address(server),
                        error = %e,
                        "Nacos server unreachable, trying next"
                    );
                    last_error = Some(e);
                }
                other => return other,
            }
        }

        Err(last_error.unwrap_or_else(|| ClientError::InvalidAddress {
            address: String::new(),
            reason: "no server address configured".to_string(),
        }))
    }

    fn namespace_id(&self) -> Option<&str> {
        self.namespace_id.as_deref()
    }
}

impl fmt::Debug for NacosClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NacosClient")
            .field("servers", &self.servers.iter().map(display_address).collect::<Vec<_>>())
            .field("namespace_id", &self.namespace_id)
            .field(
                "username",
                &self.credentials.as_ref().map(|c| c.username.as_str()),
            )
            .finish_non_exhaustive()
    }
}

/// Split a comma-separated address list into base URLs
///
/// Entries without a scheme are taken as plain `http`. Paths are kept, so a
/// server behind a reverse proxy prefix still resolves.
pub fn parse_server_addresses(raw: &str) -> Result<Vec<Url>, ClientError> {
    let mut servers = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let candidate = if entry.contains("://") {
            entry.to_string()
        } else {
            format!("http://{}", entry)
        };

        let mut url = Url::parse(&candidate).map_err(|e| ClientError::InvalidAddress {
            address: entry.to_string(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidAddress {
                address: entry.to_string(),
                reason: "not a base URL".to_string(),
            });
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        servers.push(url);
    }

    if servers.is_empty() {
        return Err(ClientError::InvalidAddress {
            address: raw.to_string(),
            reason: "no server address configured".to_string(),
        });
    }
    Ok(servers)
}

fn endpoint(server: &Url, path: &str) -> Result<Url, ClientError> {
    server.join(path).map_err(|e| ClientError::InvalidAddress {
        address: display_address(server),
        reason: e.to_string(),
    })
}

fn display_address(server: &Url) -> String {
    server.as_str().trim_end_matches('/').to_string()
}

fn request_error(server: &Url, error: reqwest::Error) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout {
            address: display_address(server),
        }
    } else {
        ClientError::Transport {
            address: display_address(server),
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_address() {
        let servers = parse_server_addresses("127.0.0.1:8848").unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].as_str(), "http://127.0.0.1:8848/");
        assert_eq!(
            endpoint(&servers[0], CONFIGS_PATH).unwrap().as_str(),
            "http://127.0.0.1:8848/nacos/v1/cs/configs"
        );
    }

    #[test]
    fn test_parse_address_list() {
        let servers =
            parse_server_addresses("10.0.0.1:8848, https://nacos.internal/proxy ,").unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(
            endpoint(&servers[1], CONFIGS_PATH).unwrap().as_str(),
            "https://nacos.internal/proxy/nacos/v1/cs/configs"
        );
    }

    #[test]
    fn test_parse_rejects_empty_and_malformed() {
        assert!(matches!(
            parse_server_addresses(" , "),
            Err(ClientError::InvalidAddress { .. })
        ));
        assert!(matches!(
            parse_server_addresses("http://[::1"),
            Err(ClientError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_debug_hides_password() {
        let client = NacosClient::new(&ConnectionConfig {
            server_address: Some("127.0.0.1:8848".to_string()),
            namespace_id: Some("dev".to_string()),
            username: Some("nacos".to_string()),
            password: Some("s3cret".to_string()),
            ..Default::default()
        })
        .unwrap();
        let rendered = format!("{:?}", client);
        assert!(rendered.contains("nacos"));
        assert!(!rendered.contains("s3cret"));
    }
}
