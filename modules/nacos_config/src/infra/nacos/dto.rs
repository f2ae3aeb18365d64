//! Wire DTOs for the Nacos open API

use serde::Deserialize;

/// Body of `POST /nacos/v1/auth/login`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Token passed as `accessToken` on later requests
    pub access_token: String,

    /// Token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl: u64,
}

fn default_token_ttl() -> u64 {
    18_000
}
