use std::sync::Arc;

use api_ingress::{ApiIngress, ApiIngressConfig};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::{get, post},
    Router,
};
use modkit::{Module, ModuleCtxBuilder, RestHostModule, StatefulModule};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt;
use tower_cookies::{Cookie, Cookies};

fn ctx() -> modkit::ModuleCtx {
    ModuleCtxBuilder::new(CancellationToken::new())
        .build()
        .for_module("api_ingress")
}

async fn set_cookie(cookies: Cookies) -> &'static str {
    cookies.add(Cookie::new("probe", "1"));
    "set"
}

async fn echo(body: String) -> String {
    body
}

/// prepare → feature routes → finalize, the way the registry drives a host.
fn host_router(host: &ApiIngress) -> Router {
    let ctx = ctx();
    let router = host.rest_prepare(&ctx, Router::new()).unwrap();
    let router = router
        .route("/cookie", get(set_cookie))
        .route("/echo", post(echo));
    host.rest_finalize(&ctx, router).unwrap()
}

async fn json_of(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_routes_are_mounted() {
    let app = host_router(&ApiIngress::default());

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_of(resp).await["status"], "healthy");

    let resp = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_paths_get_the_json_envelope() {
    let resp = host_router(&ApiIngress::default())
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_of(resp).await,
        json!({ "success": false, "message": "Not found" })
    );
}

#[tokio::test]
async fn cookie_layer_is_installed() {
    let resp = host_router(&ApiIngress::default())
        .oneshot(Request::builder().uri("/cookie").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("probe=1"));
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let host = ApiIngress::new(ApiIngressConfig {
        body_limit_bytes: 8,
        ..Default::default()
    });
    let resp = host_router(&host)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header(header::CONTENT_LENGTH, "32")
                .body(Body::from("x".repeat(32)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn cors_headers_follow_config() {
    let preflight = || {
        Request::builder()
            .method("OPTIONS")
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    };

    let open = ApiIngress::new(ApiIngressConfig {
        cors_enabled: true,
        ..Default::default()
    });
    let resp = host_router(&open).oneshot(preflight()).await.unwrap();
    assert!(resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let closed = host_router(&ApiIngress::default())
        .oneshot(preflight())
        .await
        .unwrap();
    assert!(!closed
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn module_config_is_read_on_init() {
    let mut modules = std::collections::HashMap::new();
    modules.insert(
        "api_ingress".to_string(),
        json!({ "config": { "bind_addr": "0.0.0.0:9999", "cors_enabled": true } }),
    );
    let ctx = ModuleCtxBuilder::new(CancellationToken::new())
        .with_config_provider(Arc::new(modules))
        .build()
        .for_module("api_ingress");

    let host = ApiIngress::default();
    host.init(&ctx).await.unwrap();
    let cfg = host.get_config();
    assert_eq!(cfg.bind_addr, "0.0.0.0:9999");
    assert!(cfg.cors_enabled);
    assert_eq!(cfg.timeout_secs, 30);
}

#[tokio::test]
async fn serves_until_cancelled() {
    let host = ApiIngress::new(ApiIngressConfig {
        bind_addr: "127.0.0.1:0".into(),
        ..Default::default()
    });
    let _ = host_router(&host);

    let cancel = CancellationToken::new();
    host.start(cancel.clone()).await.unwrap();
    let addr = host.local_addr().unwrap();

    let resp = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");

    cancel.cancel();
    host.stop(cancel).await.unwrap();
    assert!(reqwest::get(format!("http://{addr}/healthz")).await.is_err());
}

#[tokio::test]
async fn invalid_bind_address_fails_start() {
    let host = ApiIngress::new(ApiIngressConfig {
        bind_addr: "not-an-address".into(),
        ..Default::default()
    });
    let err = host.start(CancellationToken::new()).await.unwrap_err();
    assert!(err.to_string().contains("Invalid bind address"));
}
