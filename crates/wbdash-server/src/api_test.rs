use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use tower::ServiceExt;
use wbdash_core::{build_summaries, parse_catalog, OrdersByKey, Snapshot, StocksByKey};

const CATALOG: &str = r#"
products:
  - code: "Y299."
    external_id: "300568253"
    name: "Сим карта безлимитный интернет для телефона"
  - code: "B499."
    external_id: "300618360"
    name: "Сим карта безлимитный интернет для всех устройств"
"#;

struct TestApp {
    router: Router,
    cache: Arc<SummaryCache>,
    _static_dir: tempfile::TempDir,
}

fn test_app(session: SessionState) -> TestApp {
    test_app_with_limit(session, default_rate_limit_state())
}

fn test_app_with_limit(session: SessionState, rate_limit: RateLimitState) -> TestApp {
    let static_dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        static_dir.path().join("index.html"),
        "<!doctype html><title>dashboard</title>",
    )
    .expect("write index");
    std::fs::write(static_dir.path().join("app.js"), "console.log(1);").expect("write js");

    let cache = Arc::new(SummaryCache::new());
    let router = build_app(
        AppState {
            cache: Arc::clone(&cache),
            session,
            static_dir: static_dir.path().to_path_buf(),
        },
        rate_limit,
    );
    TestApp {
        router,
        cache,
        _static_dir: static_dir,
    }
}

fn gated() -> SessionState {
    SessionState::new("hunter2", "test-secret")
}

fn publish_catalog(cache: &SummaryCache) {
    let catalog = parse_catalog(CATALOG).expect("catalog");
    let summaries = build_summaries(
        &catalog,
        &OrdersByKey::new(),
        &StocksByKey::new(),
        Utc::now().date_naive(),
    );
    cache.publish(Snapshot::new(
        Utc::now(),
        summaries,
        vec![serde_json::json!({ "id": "WB-GI-1" })],
    ));
}

fn request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("request")
}

fn post_login(password: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("password={password}")))
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

/// Logs in and returns the `name=value` part of the session cookie.
async fn login_cookie(app: &TestApp) -> String {
    let response = app
        .router
        .clone()
        .oneshot(post_login("hunter2"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FOUND);
    let set_cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .expect("ascii cookie");
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

#[tokio::test]
async fn health_is_public_and_reports_never_refreshed() {
    let app = test_app(gated());
    let response = app.router.oneshot(request("/health")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["updated_at"].is_null());
}

#[tokio::test]
async fn health_reports_last_publish_time() {
    let app = test_app(gated());
    publish_catalog(&app.cache);

    let json = json_body(app.router.oneshot(request("/health")).await.expect("response")).await;
    assert!(json["updated_at"].is_string());
}

#[tokio::test]
async fn summary_requires_session() {
    let app = test_app(gated());
    let response = app
        .router
        .oneshot(request("/summary?codes=Y299."))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "unauthorized");
    assert!(json["meta"]["request_id"].is_string());
    assert!(json["meta"]["timestamp"].is_string());
}

#[tokio::test]
async fn unauthorized_body_echoes_caller_request_id() {
    let app = test_app(gated());
    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/summary")
                .header("x-request-id", "req-401")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["meta"]["request_id"], "req-401");
}

#[tokio::test]
async fn unauthenticated_requests_do_not_spend_rate_limit() {
    let app = test_app_with_limit(gated(), RateLimitState::new(1, Duration::from_secs(60)));
    publish_catalog(&app.cache);

    for _ in 0..3 {
        let response = app
            .router
            .clone()
            .oneshot(request("/summary"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let cookie = login_cookie(&app).await;
    let response = app
        .router
        .clone()
        .oneshot(get_with_cookie("/summary?codes=Y299.", &cookie))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .oneshot(get_with_cookie("/summary?codes=Y299.", &cookie))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "rate_limited");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn index_redirects_to_login_without_session() {
    let app = test_app(gated());
    let response = app.router.oneshot(request("/")).await.expect("response");

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn wrong_password_is_rejected_with_form() {
    let app = test_app(gated());
    let response = app
        .router
        .oneshot(post_login("nope"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn login_then_summary_returns_requested_order() {
    let app = test_app(gated());
    publish_catalog(&app.cache);
    let cookie = login_cookie(&app).await;

    let response = app
        .router
        .clone()
        .oneshot(get_with_cookie("/summary?codes=B499.,UNKNOWN,Y299.", &cookie))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let rows = json.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["code"], "B499.");
    assert_eq!(rows[1]["code"], "Y299.");
    assert_eq!(rows[1]["wb_id"], "300568253");
    assert_eq!(rows[1]["dailyOrders"].as_array().map(Vec::len), Some(30));
    assert_eq!(rows[1]["totalQty30"], 0);
    assert_eq!(rows[1]["revenue30"], 0);
}

#[tokio::test]
async fn summary_without_codes_is_empty_list() {
    let app = test_app(SessionState::disabled());
    publish_catalog(&app.cache);

    let json = json_body(app.router.oneshot(request("/summary")).await.expect("response")).await;
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn supplies_pass_through_raw_objects() {
    let app = test_app(SessionState::disabled());
    publish_catalog(&app.cache);

    let json = json_body(app.router.oneshot(request("/supplies")).await.expect("response")).await;
    assert_eq!(json, serde_json::json!([{ "id": "WB-GI-1" }]));
}

#[tokio::test]
async fn index_is_served_with_session() {
    let app = test_app(gated());
    let cookie = login_cookie(&app).await;

    let response = app
        .router
        .clone()
        .oneshot(get_with_cookie("/", &cookie))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn static_assets_are_public() {
    let app = test_app(gated());
    let response = app
        .router
        .oneshot(request("/static/app.js"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn forged_cookie_is_rejected() {
    let app = test_app(gated());
    let response = app
        .router
        .oneshot(get_with_cookie(
            "/summary?codes=Y299.",
            "wbdash_session=1700000000.abc.deadbeef",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_expires_cookie() {
    let app = test_app(gated());
    let response = app.router.oneshot(request("/logout")).await.expect("response");

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/login");
    let set_cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .expect("ascii cookie");
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn unknown_route_returns_json_not_found() {
    let app = test_app(gated());
    let response = app
        .router
        .oneshot(request("/api/v2/nothing"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_found");
    assert!(json["meta"]["request_id"].is_string());
}

#[test]
fn api_error_unauthorized_maps_to_401() {
    let response = ApiError::new("req-1", "unauthorized", "login required").into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
