use chrono::Utc;
use latchkey::api;
use latchkey::application_impl::*;
use latchkey::application_port::*;
use latchkey::domain_port::*;
use latchkey::infra_memory::*;
use serde_json::{Value, json};
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;

struct PlainHasher;

#[async_trait::async_trait]
impl CredentialHasher for PlainHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain:{password}"))
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AuthError> {
        Ok(password_hash == format!("plain:{password}"))
    }
}

fn auth_service() -> Arc<dyn AuthService> {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let codec = Arc::new(
        JwtTokenCodec::try_new(TokenConfig::new(b"http-secret".to_vec()), clock.clone()).unwrap(),
    );
    let store = Arc::new(MemoryRevocationStore::new(clock.clone()));
    let sessions = Arc::new(RealSessionService::new(codec, store, clock.clone()));
    Arc::new(RealAuthService::new(
        Arc::new(MemoryPrincipalStore::new()),
        Arc::new(MemoryLoginHistoryRepo::new()),
        Arc::new(PlainHasher),
        sessions,
        clock,
    ))
}

fn body(resp: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(resp.body()).unwrap()
}

#[tokio::test]
async fn account_flow_over_http() {
    let filter = warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes_for(auth_service()))
        .recover(api::v1::recover_error);

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/register")
        .json(&json!({ "email": "alice@example.com", "password": "hunter22" }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(&resp)["data"]["email"], "alice@example.com");

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/register")
        .json(&json!({ "email": "alice@example.com", "password": "hunter22" }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&resp)["error"]["code"], "EmailTaken");

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/login")
        .header("user-agent", "integration-test")
        .json(&json!({ "email": "alice@example.com", "password": "hunter22" }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let tokens = body(&resp)["data"].clone();
    assert_eq!(tokens["token_type"], "bearer");
    let access = tokens["access_token"].as_str().unwrap().to_string();
    let refresh = tokens["refresh_token"].as_str().unwrap().to_string();

    let resp = warp::test::request()
        .method("GET")
        .path("/api/v1/user/history")
        .header("authorization", format!("Bearer {access}"))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body(&resp)["data"]["history"][0]["user_agent"],
        "integration-test"
    );

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/refresh")
        .json(&json!({ "refresh_token": refresh }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/refresh")
        .json(&json!({ "refresh_token": refresh }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&resp)["error"]["code"], "InvalidCredentials");

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/logout")
        .header("authorization", format!("Bearer {access}"))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = warp::test::request()
        .method("PUT")
        .path("/api/v1/user/update")
        .header("authorization", format!("Bearer {access}"))
        .json(&json!({ "email": "alice@example.org" }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_or_malformed_bearer_is_unauthorized() {
    let filter = api::v1::routes_for(auth_service()).recover(api::v1::recover_error);

    let resp = warp::test::request()
        .method("GET")
        .path("/user/history")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = warp::test::request()
        .method("GET")
        .path("/user/history")
        .header("authorization", "Basic abc")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&resp)["error"]["code"], "InvalidToken");
}

#[tokio::test]
async fn forged_token_is_rejected_before_body_parsing() {
    let filter = api::v1::routes_for(auth_service()).recover(api::v1::recover_error);

    let resp = warp::test::request()
        .method("PUT")
        .path("/user/update")
        .header("authorization", "Bearer garbage")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&resp)["error"]["code"], "InvalidCredentials");
}

#[tokio::test]
async fn wrong_content_type_is_a_bad_request() {
    let filter = api::v1::routes_for(auth_service()).recover(api::v1::recover_error);

    let resp = warp::test::request()
        .method("POST")
        .path("/login")
        .header("content-type", "text/plain")
        .body(r#"{"email":"alice@example.com","password":"hunter22"}"#)
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&resp)["error"]["code"], "InvalidRequest");
}
