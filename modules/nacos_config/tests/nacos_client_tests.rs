//! Integration tests for the Nacos HTTP client against a mock server

use httpmock::prelude::*;
use nacos_config::{
    ClientError, ConfigClass, ConfigClient, ConfigError, ConfigProperty, ConnectionConfig,
    NacosClient,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

fn connection(server_address: String) -> ConnectionConfig {
    ConnectionConfig {
        server_address: Some(server_address),
        namespace_id: Some("ns-1".to_string()),
        timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

fn secured(server: &MockServer) -> ConnectionConfig {
    let mut config = connection(server.base_url());
    config.username = Some("nacos".to_string());
    config.password = Some("nacos".to_string());
    config
}

#[tokio::test]
async fn test_get_config_sends_namespace_as_tenant() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/nacos/v1/cs/configs")
                .query_param("dataId", "test_key")
                .query_param("group", "group1")
                .query_param("tenant", "ns-1");
            then.status(200).body("1234");
        })
        .await;

    let client = NacosClient::new(&connection(server.base_url())).unwrap();
    assert_eq!(client.namespace_id(), Some("ns-1"));
    assert_eq!(client.get_config("test_key", "group1").await.unwrap(), "1234");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/nacos/v1/cs/configs");
            then.status(404).body("config data not exist");
        })
        .await;

    let client = NacosClient::new(&connection(server.base_url())).unwrap();
    let err = client.get_config("missing", "DEFAULT_GROUP").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_server_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/nacos/v1/cs/configs");
            then.status(500).body("boom");
        })
        .await;

    let client = NacosClient::new(&connection(server.base_url())).unwrap();
    match client.get_config("test_key", "DEFAULT_GROUP").await.unwrap_err() {
        ClientError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("Expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_token_is_reused() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/nacos/v1/auth/login");
            then.status(200).json_body(json!({
                "accessToken": "token-abc",
                "tokenTtl": 18000,
                "globalAdmin": false
            }));
        })
        .await;
    let fetch = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/nacos/v1/cs/configs")
                .query_param("accessToken", "token-abc");
            then.status(200).body("secured");
        })
        .await;

    let client = NacosClient::new(&secured(&server)).unwrap();

    assert_eq!(client.get_config("a", "DEFAULT_GROUP").await.unwrap(), "secured");
    assert_eq!(client.get_config("b", "DEFAULT_GROUP").await.unwrap(), "secured");
    login.assert_hits_async(1).await;
    fetch.assert_hits_async(2).await;
}

#[tokio::test]
async fn test_login_again_after_token_lifetime() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/nacos/v1/auth/login");
            then.status(200).json_body(json!({
                "accessToken": "short-lived",
                "tokenTtl": 1
            }));
        })
        .await;
    let fetch = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/nacos/v1/cs/configs")
                .query_param("accessToken", "short-lived");
            then.status(200).body("secured");
        })
        .await;

    let client = NacosClient::new(&secured(&server)).unwrap();
    assert_eq!(client.get_config("a", "DEFAULT_GROUP").await.unwrap(), "secured");
    login.assert_hits_async(1).await;

    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(client.get_config("a", "DEFAULT_GROUP").await.unwrap(), "secured");
    login.assert_hits_async(2).await;
    fetch.assert_hits_async(2).await;
}

#[tokio::test]
async fn test_denied_fetch_drops_cached_token() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/nacos/v1/auth/login");
            then.status(200).json_body(json!({
                "accessToken": "token-abc",
                "tokenTtl": 18000
            }));
        })
        .await;
    let mut denied = server
        .mock_async(|when, then| {
            when.method(GET).path("/nacos/v1/cs/configs");
            then.status(403).body("token invalid!");
        })
        .await;

    let client = NacosClient::new(&secured(&server)).unwrap();
    let err = client.get_config("a", "DEFAULT_GROUP").await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized { .. }));
    login.assert_hits_async(1).await;

    denied.delete_async().await;
    let fetch = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/nacos/v1/cs/configs")
                .query_param("accessToken", "token-abc");
            then.status(200).body("secured");
        })
        .await;

    assert_eq!(client.get_config("a", "DEFAULT_GROUP").await.unwrap(), "secured");
    login.assert_hits_async(2).await;
    fetch.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_rejected_login() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/nacos/v1/auth/login");
            then.status(403).body("unknown user!");
        })
        .await;

    let mut config = connection(server.base_url());
    config.username = Some("nacos".to_string());
    config.password = Some("wrong".to_string());
    let client = NacosClient::new(&config).unwrap();

    let err = client.get_config("a", "DEFAULT_GROUP").await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_failover_to_next_server() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/nacos/v1/cs/configs");
            then.status(200).body("from second");
        })
        .await;

    // Port 9 (discard) on loopback refuses connections
    let addresses = format!("127.0.0.1:9,{}", server.base_url());
    let client = NacosClient::new(&connection(addresses)).unwrap();
    assert_eq!(client.servers().len(), 2);
    assert_eq!(
        client.get_config("test_key", "DEFAULT_GROUP").await.unwrap(),
        "from second"
    );
}

#[tokio::test]
async fn test_all_servers_unreachable() {
    let client = NacosClient::new(&connection("127.0.0.1:9".to_string())).unwrap();
    let err = client.get_config("test_key", "DEFAULT_GROUP").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport { .. } | ClientError::Timeout { .. }
    ));
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct User {
    name: String,
    age: u32,
}

#[tokio::test]
async fn test_config_class_over_http() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/nacos/v1/cs/configs")
                .query_param("dataId", "test_key")
                .query_param("group", "group1");
            then.status(200).body("1234");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/nacos/v1/cs/configs")
                .query_param("dataId", "test_json");
            then.status(200).body(r#"{"name":"bob","age":18}"#);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/nacos/v1/cs/configs")
                .query_param("dataId", "test_default");
            then.status(404);
        })
        .await;

    let config = ConfigClass::builder("HttpConfig")
        .server_address(server.base_url())
        .namespace_id("ns-1")
        .property(ConfigProperty::<i64>::scalar("test_key").group("group1"))
        .property(ConfigProperty::<User>::structured("test_json"))
        .property(ConfigProperty::<User>::structured("test_default").default_value(User {
            name: "jack".to_string(),
            age: 22,
        }))
        .property(ConfigProperty::raw("no_default"))
        .build()
        .unwrap();

    assert_eq!(config.get::<i64>("test_key").await.unwrap() + 1, 1235);
    assert_eq!(config.get::<User>("test_json").await.unwrap().name, "bob");
    assert_eq!(config.get::<User>("test_default").await.unwrap().age, 22);

    let err = config.get::<String>("no_default").await.unwrap_err();
    assert!(matches!(err, ConfigError::RemoteFetch { .. }));
}
