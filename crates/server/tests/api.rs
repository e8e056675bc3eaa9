use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{request::Parts, Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::access::API_KEY_HEADER;
use server::routes::build_router;
use server::session::{SessionResolver, SessionUser};
use server::state::AppState;
use service::errors::ServiceError;
use service::principal::CredentialHasher;
use service::tenant_config::{set_tenant_config, TenantConfiguration, UserAuditConfiguration, TENANT_CONFIG_HEADER};
use service::userverify::LogCodeSender;

// Trusts `x-test-user` / `x-test-disabled` so policy chains can be driven from tests.
struct HeaderSessions;

#[async_trait]
impl SessionResolver for HeaderSessions {
    async fn resolve(&self, req: &Parts, _tenant: &TenantConfiguration) -> Result<Option<SessionUser>, ServiceError> {
        let Some(user_id) = req.headers.get("x-test-user").and_then(|v| v.to_str().ok()) else {
            return Ok(None);
        };
        Ok(Some(SessionUser { user_id: user_id.to_string(), disabled: req.headers.contains_key("x-test-disabled") }))
    }
}

fn tenant(id: Uuid) -> TenantConfiguration {
    TenantConfiguration {
        tenant_id: id,
        app_name: "demo".into(),
        api_key: "api-demo".into(),
        master_key: "master-demo".into(),
        auth_record_keys: vec![vec!["username".into()], vec!["email".into()]],
        user_audit: UserAuditConfiguration { pw_min_length: 8, pw_digit_required: true, ..Default::default() },
        ..Default::default()
    }
}

fn app(db: DatabaseConnection) -> Router {
    let state = AppState {
        db,
        hasher: CredentialHasher::low_cost(),
        sessions: Arc::new(HeaderSessions),
        code_sender: Arc::new(LogCodeSender),
        request_timeout: Duration::from_secs(5),
    };
    build_router(state, CorsLayer::very_permissive())
}

fn offline_app() -> Router {
    app(DatabaseConnection::Disconnected)
}

fn post(path: &str, cfg: Option<&TenantConfiguration>, key: Option<&str>, body: Value) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    if let Some(cfg) = cfg {
        set_tenant_config(req.headers_mut(), cfg).unwrap();
    }
    if let Some(key) = key {
        req.headers_mut().insert(API_KEY_HEADER, key.parse().unwrap());
    }
    req
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let resp = offline_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "ok");
}

#[tokio::test]
async fn missing_tenant_header_is_a_decode_failure() {
    let resp = offline_app().oneshot(post("/auth/login", None, Some("api-demo"), json!({}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v = body_json(resp).await;
    assert_eq!(v["error"]["name"], "DecodeError");
    assert_eq!(v["error"]["message"], "internal error");
}

#[tokio::test]
async fn requests_without_a_valid_key_are_denied() {
    let cfg = tenant(Uuid::new_v4());
    for key in [None, Some("wrong")] {
        let resp = offline_app().oneshot(post("/auth/login", Some(&cfg), key, json!({}))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let v = body_json(resp).await;
        assert_eq!(v["error"]["info"]["reason"], "no_access_key");
    }
}

#[tokio::test]
async fn admin_routes_need_the_master_key() {
    let cfg = tenant(Uuid::new_v4());
    let req = post("/admin/principals/by_email", Some(&cfg), Some("api-demo"), json!({"email": "a@x.io"}));
    let resp = offline_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"]["info"]["reason"], "master_key_required");
}

#[tokio::test]
async fn user_routes_need_an_enabled_session() {
    let cfg = tenant(Uuid::new_v4());
    let body = json!({"old_password": "x", "password": "y"});

    let resp = offline_app()
        .oneshot(post("/auth/change_password", Some(&cfg), Some("api-demo"), body.clone()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"]["info"]["reason"], "not_authenticated");

    let mut req = post("/verify_request", Some(&cfg), Some("api-demo"), json!({"record_key": "email"}));
    req.headers_mut().insert("x-test-user", "u1".parse().unwrap());
    req.headers_mut().insert("x-test-disabled", "1".parse().unwrap());
    let resp = offline_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"]["info"]["reason"], "user_disabled");
}

#[tokio::test]
async fn signup_rejects_weak_password_before_touching_the_store() {
    let cfg = tenant(Uuid::new_v4());
    let body = json!({"auth_data": {"username": "alice"}, "password": "short"});
    let resp = offline_app().oneshot(post("/auth/signup", Some(&cfg), Some("api-demo"), body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["error"]["name"], "PolicyViolation");
}

#[tokio::test]
async fn signup_rejects_unusable_auth_data() {
    let cfg = tenant(Uuid::new_v4());
    let body = json!({"auth_data": {"phone": "123"}, "password": "Passw0rd-long"});
    let resp = offline_app().oneshot(post("/auth/signup", Some(&cfg), Some("api-demo"), body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signup_rejects_an_oversized_identifier_by_name() {
    let cfg = tenant(Uuid::new_v4());
    let long: String = (0..300).map(|_| Uuid::new_v4().to_string()).collect();
    let body = json!({"auth_data": {"username": long}, "password": "Passw0rd-long"});
    // offline store: a 400 here means the request never reached the index
    let resp = offline_app().oneshot(post("/auth/signup", Some(&cfg), Some("api-demo"), body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = body_json(resp).await;
    assert_eq!(v["error"]["name"], "InvalidArgument");
    assert_eq!(v["error"]["info"]["arguments"], json!(["username"]));
}

#[tokio::test]
async fn verify_request_test_needs_the_master_key() {
    let cfg = tenant(Uuid::new_v4());
    let body = json!({"record_key": "email", "record_value": "ops@example.com", "provider_settings": {"name": "smtp"}});

    let resp = offline_app()
        .oneshot(post("/verify_request/test", Some(&cfg), Some("api-demo"), body.clone()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"]["info"]["reason"], "master_key_required");

    let resp = offline_app()
        .oneshot(post("/verify_request/test", Some(&cfg), Some("master-demo"), body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["result"], "OK");
}

#[tokio::test]
async fn verify_request_test_rejects_unknown_providers() {
    let cfg = tenant(Uuid::new_v4());
    let body = json!({"record_key": "phone", "record_value": "+15005550009", "provider_settings": {"name": "fax"}});
    let resp = offline_app()
        .oneshot(post("/verify_request/test", Some(&cfg), Some("master-demo"), body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"]["info"]["arguments"], json!(["provider_settings.name"]));
}

#[tokio::test]
async fn malformed_json_is_an_invalid_argument() {
    let cfg = tenant(Uuid::new_v4());
    let mut req = post("/auth/login", Some(&cfg), Some("api-demo"), json!({}));
    *req.body_mut() = Body::from("{not json");
    let resp = offline_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

async fn setup_db() -> Option<DatabaseConnection> {
    let db = models::db::connect_for_tests().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}

#[tokio::test]
async fn signup_login_and_change_password_against_postgres() -> anyhow::Result<()> {
    let Some(db) = setup_db().await else { return Ok(()) };
    let suffix = Uuid::new_v4();
    let cfg = service::tenant_service::create_tenant(
        &db,
        &format!("flow-{suffix}"),
        &format!("flow-{suffix}.example.com"),
        &tenant(Uuid::nil()),
    )
    .await?;
    let email = format!("{suffix}@x.io");
    let app = app(db);

    let signup = json!({"auth_data": {"username": format!("u-{suffix}"), "email": email}, "password": "Passw0rd-long"});
    let resp = app.clone().oneshot(post("/auth/signup", Some(&cfg), Some("api-demo"), signup.clone())).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await;
    let user_id = created["user_id"].as_str().unwrap_or_default().to_string();
    assert_eq!(created["principal_ids"].as_array().map(|a| a.len()), Some(2));

    let resp = app.clone().oneshot(post("/auth/signup", Some(&cfg), Some("api-demo"), signup)).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let login = |password: &str| json!({"auth_data": {"email": email}, "password": password});
    let resp = app.clone().oneshot(post("/auth/login", Some(&cfg), Some("api-demo"), login("Passw0rd-long"))).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["user_id"], user_id.as_str());

    let resp = app.clone().oneshot(post("/auth/login", Some(&cfg), Some("api-demo"), login("wrong-Passw0rd"))).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let by_email = post("/admin/principals/by_email", Some(&cfg), Some("master-demo"), json!({"email": email}));
    let resp = app.clone().oneshot(by_email).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let principals = body_json(resp).await;
    assert_eq!(principals.as_array().map(|a| a.len()), Some(1));
    assert!(principals[0].get("hashed_password").is_none());

    let mut change = post(
        "/auth/change_password",
        Some(&cfg),
        Some("api-demo"),
        json!({"old_password": "Passw0rd-long", "password": "N3w-Passw0rd"}),
    );
    change.headers_mut().insert("x-test-user", user_id.parse()?);
    let resp = app.clone().oneshot(change).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.clone().oneshot(post("/auth/login", Some(&cfg), Some("api-demo"), login("N3w-Passw0rd"))).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}
