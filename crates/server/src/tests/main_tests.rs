use super::*;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    response::Response,
};
use impersonation::ImpersonationClaims;
use secrecy::SecretString;
use serde_json::{json, Value};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::ImpersonateResponse,
};
use tower::ServiceExt;
use url::Url;

const SECRET: &str = "super-secret-jwt-signing-key";

fn test_app(secret: Option<&str>) -> Router {
    let tokens = TokenService::new(ImpersonationConfig {
        secret: secret.map(SecretString::from),
        issuer: Url::parse("https://project.supabase.co").expect("issuer"),
    });
    build_router(Arc::new(AppState {
        tokens: Arc::new(tokens),
        default_expires_in: "24h".to_string(),
    }))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn impersonate_body() -> Value {
    json!({
        "impersonated_user_id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
        "impersonated_user_email": "gerant@bar.test",
        "impersonated_user_role": "gerant",
        "bar_id": "0f8fad5b-d9cb-469f-a165-70867728950e",
        "expires_in": "2h"
    })
}

#[tokio::test]
async fn healthz_reports_ok() {
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = test_app(None).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn issued_token_verifies_through_the_api() {
    let app = test_app(Some(SECRET));

    let response = app
        .clone()
        .oneshot(post_json("/impersonate", impersonate_body()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let issued: ImpersonateResponse = read_json(response).await;
    assert!(issued.expires_at > chrono::Utc::now());

    let response = app
        .oneshot(post_json("/impersonate/verify", json!({ "token": issued.token })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let claims: ImpersonationClaims = read_json(response).await;
    assert_eq!(claims.email, "gerant@bar.test");
    assert_eq!(claims.role, "gerant");
    assert_eq!(claims.iss, "https://project.supabase.co");
    assert!(claims.is_impersonation());
    assert_eq!(
        claims.app_metadata.bar_id.map(|id| id.to_string()).as_deref(),
        Some("0f8fad5b-d9cb-469f-a165-70867728950e")
    );
    assert_eq!(claims.exp - claims.iat, 2 * 3600);
}

#[tokio::test]
async fn missing_ids_are_rejected() {
    let mut body = impersonate_body();
    body.as_object_mut().expect("object").remove("bar_id");

    let response = test_app(Some(SECRET))
        .oneshot(post_json("/impersonate", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn unparseable_fields_are_validation_errors() {
    let app = test_app(Some(SECRET));
    let mut bad_id = impersonate_body();
    bad_id["impersonated_user_id"] = json!("not-a-uuid");
    let mut empty_role = impersonate_body();
    empty_role["impersonated_user_role"] = json!("  ");

    for body in [bad_id, empty_role] {
        let response = app
            .clone()
            .oneshot(post_json("/impersonate", body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let err: ApiError = read_json(response).await;
        assert_eq!(err.code, ErrorCode::Validation);
    }

    let response = app
        .oneshot(post_json("/impersonate/verify", json!({ "jwt": "a.b.c" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_secret_is_a_server_error() {
    let response = test_app(None)
        .oneshot(post_json("/impersonate", impersonate_body()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Internal);
    assert_eq!(err.message, "JWT_SECRET not configured");
}

#[tokio::test]
async fn malformed_expiry_is_a_validation_error() {
    let mut body = impersonate_body();
    body["expires_in"] = json!("soon");

    let response = test_app(Some(SECRET))
        .oneshot(post_json("/impersonate", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expiry_beyond_the_calendar_is_a_validation_error() {
    let mut body = impersonate_body();
    body["expires_in"] = json!("1000000000d");

    let response = test_app(Some(SECRET))
        .oneshot(post_json("/impersonate", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn forged_token_is_unauthorized() {
    let forger = TokenService::new(ImpersonationConfig {
        secret: Some(SecretString::from("someone-else")),
        issuer: Url::parse("https://project.supabase.co").expect("issuer"),
    });
    let grant = impersonation::ImpersonationGrant::new(
        "7c9e6679-7425-40de-944b-e07fc1f90ae7".parse().expect("user id"),
        "x@bar.test",
        shared::domain::RoleName::new("serveur").expect("role"),
    );
    let forged = forger.issue(&grant).expect("forged");

    let response = test_app(Some(SECRET))
        .oneshot(post_json("/impersonate/verify", json!({ "token": forged.token })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Unauthorized);
}
