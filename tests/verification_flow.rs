//! Verification Flow Integration Tests
//!
//! Drives the full router (http layers + auth middleware + handler) with
//! tokens signed by test keys.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use receiving_service::{
    app::build_router,
    config::Config,
    services::auth::{
        TokenVerifier,
        events::TracingEventSink,
        keys::StaticKeySource,
        verifier::VerifierPolicy,
    },
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const AUDIENCE: &str = "https://svc-b.example";
const TRUSTED_PEM: &str = include_str!("fixtures/trusted_rsa.pem");
const UNTRUSTED_PEM: &str = include_str!("fixtures/untrusted_rsa.pem");
const JWKS: &str = include_str!("fixtures/jwks.json");

fn router(debug: bool) -> Router {
    let config = Config::from_lookup(|key| match key {
        "EXPECTED_AUDIENCE" => Some(AUDIENCE.to_string()),
        "DEBUG" => Some(debug.to_string()),
        _ => None,
    })
    .unwrap();

    let verifier = TokenVerifier::new(
        Arc::new(StaticKeySource::from_json(JWKS).unwrap()),
        Arc::new(TracingEventSink),
        VerifierPolicy::default(),
    );
    let state = AppState::new(Arc::new(verifier), AUDIENCE, config.debug);

    build_router(state, &config)
}

fn claims() -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "aud": AUDIENCE,
        "iss": "https://accounts.google.com",
        "email": "caller@project.iam.gserviceaccount.com",
        "iat": now,
        "exp": now + 3600,
    })
}

fn sign(pem: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some("trusted-key-1".to_string());
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    jsonwebtoken::encode(&header, claims, &key).unwrap()
}

fn stripped(claims: &Value) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{}.{}.SIGNATURE_REMOVED_BY_GOOGLE",
        engine.encode(br#"{"alg":"RS256","kid":"trusted-key-1","typ":"JWT"}"#),
        engine.encode(claims.to_string())
    )
}

async fn get(router: Router, headers: &[(&str, String)]) -> (StatusCode, Value) {
    let mut request = Request::builder().uri("/api/v1/credentials");
    for (name, value) in headers {
        request = request.header(*name, value);
    }

    let response = router
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_needs_no_token() {
    let response = router(false)
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn signed_authorization_header_is_accepted() {
    let token = sign(TRUSTED_PEM, &claims());
    let (status, body) = get(router(false), &[("authorization", format!("Bearer {token}"))]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Credentials: caller@project.iam.gserviceaccount.com"
    );
    assert_eq!(body["verification"], "strict");
    assert_eq!(body["signature_verified_here"], true);
}

#[tokio::test]
async fn stripped_serverless_header_is_accepted() {
    let token = stripped(&json!({
        "aud": AUDIENCE,
        "iss": "accounts.google.com",
        "email": "caller@project.iam.gserviceaccount.com",
    }));
    let (status, body) = get(
        router(false),
        &[("x-serverless-authorization", format!("Bearer {token}"))],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "caller@project.iam.gserviceaccount.com");
    assert_eq!(body["verification"], "lenient");
    assert_eq!(body["signature_verified_here"], false);
}

#[tokio::test]
async fn serverless_header_governs_when_both_are_sent() {
    let valid = sign(TRUSTED_PEM, &claims());
    let mut wrong_audience = claims();
    wrong_audience["aud"] = json!("https://svc-c.example");

    let (status, _) = get(
        router(false),
        &[
            ("authorization", format!("Bearer {valid}")),
            (
                "x-serverless-authorization",
                format!("Bearer {}", stripped(&wrong_audience)),
            ),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn every_failure_looks_the_same_to_clients() {
    let untrusted = sign(UNTRUSTED_PEM, &claims());
    let mut no_email = claims();
    no_email.as_object_mut().unwrap().remove("email");

    let cases: Vec<Vec<(&str, String)>> = vec![
        vec![],
        vec![("authorization", "Bearer".to_string())],
        vec![("authorization", "Basic dXNlcjpwYXNz".to_string())],
        vec![("authorization", format!("Bearer {untrusted}"))],
        vec![(
            "x-serverless-authorization",
            format!("Bearer {}", stripped(&no_email)),
        )],
    ];

    for headers in cases {
        let (status, body) = get(router(false), &headers).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({"error": {"code": "UNAUTHORIZED", "message": "unauthorized"}})
        );
    }
}

#[tokio::test]
async fn debug_mode_echoes_failure_detail() {
    let (status, body) = get(
        router(true),
        &[("authorization", "Digest abc".to_string())],
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"]["message"],
        "unsupported authentication type: Digest"
    );
}

#[tokio::test]
async fn unauthorized_response_advertises_bearer() {
    let response = router(false)
        .oneshot(
            Request::builder()
                .uri("/api/v1/credentials")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
}
