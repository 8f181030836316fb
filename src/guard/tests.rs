//! Tests for the session guard

use super::*;
use crate::auth::Credential;
use crate::config::ScanConfig;
use crate::store::{CredentialStore, MemoryStore, SharedStore};
use chrono::Utc;
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, COOKIE, REFERER};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> ScanConfig {
    ScanConfig {
        base_url: base_url.to_string(),
        ..ScanConfig::default()
    }
}

fn make_token(valid_for_secs: i64) -> String {
    #[derive(serde::Serialize)]
    struct Claims {
        sub: String,
        exp: i64,
    }
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &Claims {
            sub: "scanner".to_string(),
            exp: Utc::now().timestamp() + valid_for_secs,
        },
        &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

/// Guard over a target that must never see a login call.
fn offline_guard() -> (SessionGuard, SharedStore) {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let guard = SessionGuard::with_store(test_config("http://target:8080"), store.clone()).unwrap();
    (guard, store)
}

/// Guard pointed at a wiremock server that answers logins.
fn mock_guard(server: &MockServer) -> (SessionGuard, SharedStore) {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let guard = SessionGuard::with_store(test_config(&server.uri()), store.clone()).unwrap();
    (guard, store)
}

async fn mount_login(server: &MockServer, token: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "token": token
        })))
        .expect(calls)
        .mount(server)
        .await;
}

// ============================================================================
// Request path
// ============================================================================

#[tokio::test]
async fn test_out_of_scope_request_unmodified() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let mut headers = HeaderMap::new();
    let outcome = guard
        .before_send("http://elsewhere:9090/api", &mut headers)
        .await
        .unwrap();

    assert_eq!(outcome, InjectOutcome::OutOfScope);
    assert!(headers.is_empty());
}

#[tokio::test]
async fn test_login_endpoint_request_unmodified() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let mut headers = HeaderMap::new();
    let outcome = guard
        .before_send("http://target:8080/login", &mut headers)
        .await
        .unwrap();

    assert_eq!(outcome, InjectOutcome::LoginEndpoint);
    assert!(headers.is_empty());
}

#[tokio::test]
async fn test_inject_with_cached_credential() {
    let (guard, store) = offline_guard();
    let token = make_token(3600);
    store.set(Credential::from_token(token.clone())).await;

    let mut headers = HeaderMap::new();
    let outcome = guard
        .before_send("http://target:8080/api/users", &mut headers)
        .await
        .unwrap();

    assert_eq!(outcome, InjectOutcome::Injected);
    assert_eq!(
        headers.get(AUTHORIZATION).unwrap(),
        &format!("Bearer {token}")
    );
    assert_eq!(headers.get(COOKIE).unwrap(), &format!("token={token}"));
    assert_eq!(headers.get(REFERER).unwrap(), "http://target:8080");
}

#[tokio::test]
async fn test_injection_is_idempotent() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let url = "http://target:8080/api/users";
    let mut once = HeaderMap::new();
    guard.before_send(url, &mut once).await.unwrap();

    let mut twice = once.clone();
    guard.before_send(url, &mut twice).await.unwrap();

    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_existing_token_cookie_untouched() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_static("token=preexisting"));
    guard
        .before_send("http://target:8080/api", &mut headers)
        .await
        .unwrap();

    assert_eq!(headers.get(COOKIE).unwrap(), "token=preexisting");
}

#[tokio::test]
async fn test_token_cookie_after_other_entries_untouched() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_static("session=abc; token=preexisting"),
    );
    guard
        .before_send("http://target:8080/api", &mut headers)
        .await
        .unwrap();

    assert_eq!(headers.get(COOKIE).unwrap(), "session=abc; token=preexisting");
}

#[tokio::test]
async fn test_token_appended_to_unrelated_cookie() {
    let (guard, store) = offline_guard();
    let token = make_token(3600);
    store.set(Credential::from_token(token.clone())).await;

    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_static("session=abc"));
    guard
        .before_send("http://target:8080/api", &mut headers)
        .await
        .unwrap();

    assert_eq!(
        headers.get(COOKIE).unwrap(),
        &format!("session=abc; token={token}")
    );
}

#[tokio::test]
async fn test_mytoken_cookie_does_not_suppress_mirror() {
    let (guard, store) = offline_guard();
    let token = make_token(3600);
    store.set(Credential::from_token(token.clone())).await;

    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_static("mytoken=1"));
    guard
        .before_send("http://target:8080/api", &mut headers)
        .await
        .unwrap();

    assert_eq!(
        headers.get(COOKIE).unwrap(),
        &format!("mytoken=1; token={token}")
    );
}

#[tokio::test]
async fn test_existing_referer_kept() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let mut headers = HeaderMap::new();
    headers.insert(REFERER, HeaderValue::from_static("http://target:8080/home"));
    guard
        .before_send("http://target:8080/api", &mut headers)
        .await
        .unwrap();

    assert_eq!(headers.get(REFERER).unwrap(), "http://target:8080/home");
}

#[tokio::test]
async fn test_empty_store_triggers_login() {
    let server = MockServer::start().await;
    let token = make_token(3600);
    mount_login(&server, &token, 1).await;

    let (guard, _store) = mock_guard(&server);
    let url = format!("{}/api/users", server.uri());

    let mut headers = HeaderMap::new();
    let outcome = guard.before_send(&url, &mut headers).await.unwrap();

    assert_eq!(outcome, InjectOutcome::Injected);
    assert_eq!(
        headers.get(AUTHORIZATION).unwrap(),
        &format!("Bearer {token}")
    );
}

#[tokio::test]
async fn test_short_stored_token_treated_as_absent() {
    let server = MockServer::start().await;
    let token = make_token(3600);
    mount_login(&server, &token, 1).await;

    let (guard, store) = mock_guard(&server);
    store.set(Credential::from_token("short")).await;

    let mut headers = HeaderMap::new();
    let outcome = guard
        .before_send(&format!("{}/api", server.uri()), &mut headers)
        .await
        .unwrap();

    assert_eq!(outcome, InjectOutcome::Injected);
    assert_eq!(
        headers.get(AUTHORIZATION).unwrap(),
        &format!("Bearer {token}")
    );
}

#[tokio::test]
async fn test_expiring_credential_refreshed_proactively() {
    let server = MockServer::start().await;
    let fresh = make_token(3600);
    mount_login(&server, &fresh, 1).await;

    let (guard, store) = mock_guard(&server);
    // inside the 30 second refresh margin
    store.set(Credential::from_token(make_token(10))).await;

    let mut headers = HeaderMap::new();
    guard
        .before_send(&format!("{}/api", server.uri()), &mut headers)
        .await
        .unwrap();

    assert_eq!(
        headers.get(AUTHORIZATION).unwrap(),
        &format!("Bearer {fresh}")
    );
}

#[tokio::test]
async fn test_login_failure_degrades_to_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (guard, store) = mock_guard(&server);
    let mut headers = HeaderMap::new();
    let outcome = guard
        .before_send(&format!("{}/api", server.uri()), &mut headers)
        .await
        .unwrap();

    assert_eq!(outcome, InjectOutcome::Unauthenticated);
    assert!(headers.get(AUTHORIZATION).is_none());
    assert!(store.get().await.is_none());
}

#[tokio::test]
async fn test_concurrent_refreshes_collapse_into_one_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(serde_json::json!({
                    "success": true,
                    "token": make_token(3600)
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (guard, _store) = mock_guard(&server);
    let url = format!("{}/api", server.uri());

    let mut h1 = HeaderMap::new();
    let mut h2 = HeaderMap::new();
    let mut h3 = HeaderMap::new();
    let mut h4 = HeaderMap::new();
    let (r1, r2, r3, r4) = tokio::join!(
        guard.before_send(&url, &mut h1),
        guard.before_send(&url, &mut h2),
        guard.before_send(&url, &mut h3),
        guard.before_send(&url, &mut h4),
    );

    for outcome in [r1, r2, r3, r4] {
        assert_eq!(outcome.unwrap(), InjectOutcome::Injected);
    }
    assert_eq!(h1.get(AUTHORIZATION), h2.get(AUTHORIZATION));
    assert_eq!(h1.get(AUTHORIZATION), h3.get(AUTHORIZATION));
    assert_eq!(h1.get(AUTHORIZATION), h4.get(AUTHORIZATION));
}

// ============================================================================
// Response path
// ============================================================================

#[tokio::test]
async fn test_401_clears_store() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let outcome = guard
        .after_receive(
            "http://target:8080/api",
            StatusCode::UNAUTHORIZED,
            &HeaderMap::new(),
        )
        .await;

    assert_eq!(
        outcome,
        ResponseOutcome::Invalidated(InvalidationReason::Rejected { status: 401 })
    );
    assert!(store.get().await.is_none());
}

#[tokio::test]
async fn test_403_clears_store() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let outcome = guard
        .after_receive(
            "http://target:8080/api",
            StatusCode::FORBIDDEN,
            &HeaderMap::new(),
        )
        .await;

    assert_eq!(
        outcome,
        ResponseOutcome::Invalidated(InvalidationReason::Rejected { status: 403 })
    );
    assert!(store.get().await.is_none());
}

#[tokio::test]
async fn test_out_of_scope_401_ignored() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let outcome = guard
        .after_receive(
            "http://elsewhere:9090/api",
            StatusCode::UNAUTHORIZED,
            &HeaderMap::new(),
        )
        .await;

    assert_eq!(outcome, ResponseOutcome::OutOfScope);
    assert!(store.get().await.is_some());
}

#[tokio::test]
async fn test_login_endpoint_401_exempt() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let outcome = guard
        .after_receive(
            "http://target:8080/login",
            StatusCode::UNAUTHORIZED,
            &HeaderMap::new(),
        )
        .await;

    assert_eq!(outcome, ResponseOutcome::LoginEndpoint);
    assert!(store.get().await.is_some());
}

#[tokio::test]
async fn test_login_redirect_clears_store() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let mut headers = HeaderMap::new();
    headers.insert("location", HeaderValue::from_static("/login"));
    let outcome = guard
        .after_receive("http://target:8080/api", StatusCode::FOUND, &headers)
        .await;

    assert_eq!(
        outcome,
        ResponseOutcome::Invalidated(InvalidationReason::LoginRedirect {
            location: "/login".to_string()
        })
    );
    assert!(store.get().await.is_none());
}

#[tokio::test]
async fn test_ordinary_redirect_keeps_store() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let mut headers = HeaderMap::new();
    headers.insert("location", HeaderValue::from_static("/dashboard"));
    let outcome = guard
        .after_receive("http://target:8080/api", StatusCode::FOUND, &headers)
        .await;

    assert_eq!(outcome, ResponseOutcome::Kept);
    assert!(store.get().await.is_some());
}

#[tokio::test]
async fn test_redirect_without_location_keeps_store() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let outcome = guard
        .after_receive("http://target:8080/api", StatusCode::FOUND, &HeaderMap::new())
        .await;

    assert_eq!(outcome, ResponseOutcome::Kept);
    assert!(store.get().await.is_some());
}

#[tokio::test]
async fn test_success_status_keeps_store() {
    let (guard, store) = offline_guard();
    store.set(Credential::from_token(make_token(3600))).await;

    let outcome = guard
        .after_receive("http://target:8080/api", StatusCode::OK, &HeaderMap::new())
        .await;

    assert_eq!(outcome, ResponseOutcome::Kept);
    assert!(store.get().await.is_some());
}

#[tokio::test]
async fn test_invalidation_then_exactly_one_login() {
    let server = MockServer::start().await;
    let token = make_token(3600);
    mount_login(&server, &token, 1).await;

    let (guard, store) = mock_guard(&server);
    store.set(Credential::from_token(make_token(3600))).await;
    let url = format!("{}/api", server.uri());

    let outcome = guard
        .after_receive(&url, StatusCode::UNAUTHORIZED, &HeaderMap::new())
        .await;
    assert!(matches!(outcome, ResponseOutcome::Invalidated(_)));

    // next eligible request re-authenticates once, then injects
    let mut headers = HeaderMap::new();
    let outcome = guard.before_send(&url, &mut headers).await.unwrap();
    assert_eq!(outcome, InjectOutcome::Injected);
    assert_eq!(
        headers.get(AUTHORIZATION).unwrap(),
        &format!("Bearer {token}")
    );
}

// ============================================================================
// Interceptor seam
// ============================================================================

#[tokio::test]
async fn test_guard_through_interceptor_trait() {
    let (guard, store) = offline_guard();
    let token = make_token(3600);
    store.set(Credential::from_token(token.clone())).await;
    let interceptor: Arc<dyn Interceptor> = Arc::new(guard);

    let mut headers = HeaderMap::new();
    let outcome = interceptor
        .before_send("http://target:8080/api", &mut headers)
        .await
        .unwrap();
    assert_eq!(outcome, InjectOutcome::Injected);

    let outcome = interceptor
        .after_receive(
            "http://target:8080/api",
            StatusCode::UNAUTHORIZED,
            &HeaderMap::new(),
        )
        .await;
    assert!(matches!(outcome, ResponseOutcome::Invalidated(_)));
    assert!(store.get().await.is_none());
}
