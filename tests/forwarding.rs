//! 后端端到端测试：真实监听端口 + wiremock 模拟上游组件

use reqwest::StatusCode;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use icos_shell::config::BackendConfig;
use icos_shell::domain::Controller;
use icos_shell::server;

const TOKEN: &str = "tok-e2e";

fn config_for(upstream: &str) -> BackendConfig {
    let mut config = BackendConfig::default();
    config.components.job_manager.server = upstream.to_string();
    config.components.aggregator.server = upstream.to_string();
    config.components.intelligence.server = upstream.to_string();
    config.components.keycloak.server = upstream.to_string();
    config
}

async fn spawn_backend(config: BackendConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, config, std::future::pending()));
    addr
}

/// 一个无人监听的地址
fn dead_upstream() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn url(addr: SocketAddr, route: &str) -> String {
    format!("http://{}/api/v3{}", addr, route)
}

#[tokio::test]
async fn test_healthcheck() {
    let addr = spawn_backend(config_for(&dead_upstream())).await;

    let resp = reqwest::get(url(addr, "/healthcheck")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "icos-shell-backend");
}

#[tokio::test]
async fn test_create_deployment_forwards_yaml_and_status() {
    let upstream = MockServer::start().await;
    let manifest = "name: app\n---\nname: sidecar\n";
    Mock::given(method("POST"))
        .and(path("/jobmanager/groups"))
        .and(header("authorization", "Bearer tok-e2e"))
        .and(header("content-type", "application/x-yaml"))
        .and(body_string(manifest))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 11, "name": "app"})))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = spawn_backend(config_for(&upstream.uri())).await;
    let resp = reqwest::Client::new()
        .post(url(addr, "/deployment/"))
        .header("api_key", TOKEN)
        .json(&json!({"content": manifest}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"id": 11, "name": "app"}));
}

#[tokio::test]
async fn test_list_deployments_empty_body_is_array() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobmanager/groups"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&upstream)
        .await;

    let addr = spawn_backend(config_for(&upstream.uri())).await;
    let resp = reqwest::Client::new()
        .get(url(addr, "/deployment/"))
        .header("x-api-key", TOKEN)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_upstream_not_found_is_surfaced() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobmanager/groups/999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such group"))
        .mount(&upstream)
        .await;

    let addr = spawn_backend(config_for(&upstream.uri())).await;
    let resp = reqwest::Client::new()
        .get(url(addr, "/deployment/999"))
        .header("api_key", TOKEN)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "unexpected_status");
    assert_eq!(body["message"], "unexpected status code 404");
    assert_eq!(body["details"], "no such group");
}

#[tokio::test]
async fn test_start_and_stop_use_action_paths() {
    let upstream = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/jobmanager/groups/start/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("PUT"))
        .and(path("/jobmanager/groups/stop/5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = spawn_backend(config_for(&upstream.uri())).await;
    let client = reqwest::Client::new();

    let start = client
        .put(url(addr, "/deployment/5/start"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(start.status(), StatusCode::OK);

    let stop = client
        .put(url(addr, "/deployment/5/stop"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(stop.status(), StatusCode::OK);
    assert_eq!(stop.json::<Value>().await.unwrap(), json!({}));
}

#[tokio::test]
async fn test_missing_token_never_reaches_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let addr = spawn_backend(config_for(&upstream.uri())).await;
    let client = reqwest::Client::new();

    for route in ["/deployment/", "/deployment/1", "/resource/", "/metrics/get"] {
        let resp = client.get(url(addr, route)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "route {}", route);
    }
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let addr = spawn_backend(config_for(&dead_upstream())).await;
    let client = reqwest::Client::new();

    for route in ["/deployment/", "/resource/", "/metrics/get"] {
        let resp = client
            .get(url(addr, route))
            .header("api_key", TOKEN)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY, "route {}", route);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "connect_error");
    }
}

#[tokio::test]
async fn test_train_metrics_forwards_raw_descriptor() {
    let upstream = MockServer::start().await;
    let descriptor = r#"{"model":"cpu","steps":10}"#;
    Mock::given(method("POST"))
        .and(path("/train"))
        .and(body_string(descriptor))
        .respond_with(ResponseTemplate::new(200).set_body_string("training started"))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = spawn_backend(config_for(&upstream.uri())).await;
    let resp = reqwest::Client::new()
        .post(url(addr, "/metrics/train"))
        .header("api_key", TOKEN)
        .json(&json!({"content": descriptor}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!("training started"));
}

#[tokio::test]
async fn test_login_exchanges_password_for_token() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/realms/icos/protocol/openid-connect/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "jwt-1", "expires_in": 300})),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = spawn_backend(config_for(&upstream.uri())).await;
    let resp = reqwest::Client::new()
        .get(url(addr, "/user/login"))
        .query(&[("username", "alice"), ("password", "pw")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!("jwt-1"));
}

#[tokio::test]
async fn test_controller_registry_lifecycle() {
    let addr = spawn_backend(config_for(&dead_upstream())).await;
    let client = reqwest::Client::new();

    let empty = client.get(url(addr, "/controller/")).send().await.unwrap();
    assert_eq!(empty.status(), StatusCode::NO_CONTENT);

    let controller = Controller::new("ctrl-1", "http://ctrl-1:8080");
    let unauthenticated = client
        .post(url(addr, "/controller/"))
        .json(&controller)
        .send()
        .await
        .unwrap();
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

    let created = client
        .post(url(addr, "/controller/"))
        .header("api_key", TOKEN)
        .json(&controller)
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);

    let duplicate = client
        .post(url(addr, "/controller/"))
        .header("api_key", TOKEN)
        .json(&controller)
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let listed: Vec<Controller> = client
        .get(url(addr, "/controller/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed, vec![controller]);
}

#[tokio::test]
async fn test_encoded_separators_in_deployment_id_are_rejected() {
    let upstream = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hit": "upstream"})))
        .expect(0)
        .mount(&upstream)
        .await;

    let addr = spawn_backend(config_for(&upstream.uri())).await;
    let client = reqwest::Client::new();

    let traversal = client
        .delete(url(addr, "/deployment/..%2F..%2Fadmin%2Fusers"))
        .header("api_key", TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(traversal.status(), StatusCode::BAD_REQUEST);
    let body: Value = traversal.json().await.unwrap();
    assert_eq!(body["error"], "bad_request");

    for route in ["/deployment/1%3Fforce=true", "/deployment/1%23frag/start", "/deployment/a%5Cb/stop"] {
        let method = if route.ends_with("start") || route.ends_with("stop") {
            reqwest::Method::PUT
        } else {
            reqwest::Method::GET
        };
        let resp = client
            .request(method, url(addr, route))
            .header("api_key", TOKEN)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "route {}", route);
    }
}

#[tokio::test]
async fn test_metrics_get_empty_body_is_array() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = spawn_backend(config_for(&upstream.uri())).await;
    let resp = reqwest::Client::new()
        .get(url(addr, "/metrics/get"))
        .header("api_key", TOKEN)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn test_invalid_bodies_are_bad_request() {
    let upstream = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&upstream)
        .await;

    let addr = spawn_backend(config_for(&upstream.uri())).await;
    let client = reqwest::Client::new();

    let cases = [
        ("/deployment/", json!({"manifest": "name: app\n"})),
        ("/controller/", json!({"name": "c1", "address": "http://c1", "region": "eu"})),
        ("/controller/", json!({"name": "c1"})),
    ];

    for (route, body) in cases {
        let resp = client
            .post(url(addr, route))
            .header("api_key", TOKEN)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {}", body);

        let envelope: Value = resp.json().await.unwrap();
        assert_eq!(envelope["error"], "bad_request", "body {}", body);
    }

    let listed = client.get(url(addr, "/controller/")).send().await.unwrap();
    assert_eq!(listed.status(), StatusCode::NO_CONTENT);
}
