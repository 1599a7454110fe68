//! HTTP Server & Routing Integration Tests

mod helpers;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use voicecheck_api::{build_router, AppState};
use voicecheck_core::Analyzer;

use helpers::{encode, steady_tone_wav, test_app_state, TEST_API_KEY};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn detect_request(auth: Option<&str>, body: Value) -> Request<Body> {
    let body = body.to_string();
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/detect")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len());
    if let Some(value) = auth {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(body)).unwrap()
}

fn bearer() -> String {
    format!("Bearer {}", TEST_API_KEY)
}

#[tokio::test]
async fn test_root_lists_languages() {
    let app = build_router(test_app_state());
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["endpoint"], "/detect");
    assert_eq!(body["rule_set"], "advanced");
    assert_eq!(
        body["supported_languages"],
        json!(["tamil", "english", "hindi", "malayalam", "telugu"])
    );
}

#[tokio::test]
async fn test_health_reports_rule_set() {
    let app = build_router(AppState::new(Analyzer::basic(), TEST_API_KEY));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "voicecheck-api");
    assert_eq!(body["rule_set"], "basic");
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_missing_authorization_is_401() {
    let app = build_router(test_app_state());
    let response = app
        .oneshot(detect_request(None, json!({"audio_base64": "AAAA"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_wrong_key_is_401() {
    for auth in [
        "Bearer wrong-key".to_string(),
        format!("bearer {}", TEST_API_KEY),
        TEST_API_KEY.to_string(),
    ] {
        let app = build_router(test_app_state());
        let response = app
            .oneshot(detect_request(Some(&auth), json!({"audio_base64": "AAAA"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "auth = {}", auth);
    }
}

#[tokio::test]
async fn test_auth_checked_before_body() {
    let app = build_router(test_app_state());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/detect")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = build_router(test_app_state());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/detect")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, bearer())
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_base64_is_400() {
    let app = build_router(test_app_state());
    let response = app
        .oneshot(detect_request(
            Some(&bearer()),
            json!({"audio_base64": "not base64 at all!!", "language": "english"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Invalid base64 encoding");
}

#[tokio::test]
async fn test_unsupported_language_rejected_before_decoding() {
    // The audio is invalid too; the language error must win
    let app = build_router(test_app_state());
    let response = app
        .oneshot(detect_request(
            Some(&bearer()),
            json!({"audio_base64": "%%%", "language": "french"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Unsupported language"), "{}", message);
}

#[tokio::test]
async fn test_undecodable_audio_is_500() {
    let app = build_router(test_app_state());
    let response = app
        .oneshot(detect_request(
            Some(&bearer()),
            json!({"audio_base64": encode(b"this is not an audio file")}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "PROCESSING_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Processing error:"));
}

#[tokio::test]
async fn test_clip_over_duration_limit_is_500() {
    let analyzer = Analyzer::advanced().with_max_duration(1.0).unwrap();
    let app = build_router(AppState::new(analyzer, TEST_API_KEY));
    let response = app
        .oneshot(detect_request(
            Some(&bearer()),
            json!({"audio_base64": encode(&steady_tone_wav(2.0))}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "PROCESSING_ERROR");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("Clip too long"), "{}", message);
}

#[tokio::test]
async fn test_steady_tone_detected_as_ai() {
    let app = build_router(test_app_state());
    let response = app
        .oneshot(detect_request(
            Some(&bearer()),
            json!({"audio_base64": encode(&steady_tone_wav(2.0)), "language": "Tamil"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["classification"], "AI_GENERATED");
    assert_eq!(body["language"], "tamil");
    assert!(body["confidence"].as_f64().unwrap() >= 0.85);
    assert!(body["explanation"]
        .as_str()
        .unwrap()
        .contains("AI-generated characteristics"));
}

#[tokio::test]
async fn test_language_defaults_to_english() {
    let app = build_router(test_app_state());
    let response = app
        .oneshot(detect_request(
            Some(&bearer()),
            json!({"audio_base64": encode(&steady_tone_wav(1.0)), "language": null}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["language"], "english");
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let state = test_app_state().with_max_body_bytes(1024);
    let app = build_router(state);
    let response = app
        .oneshot(detect_request(
            Some(&bearer()),
            json!({"audio_base64": encode(&steady_tone_wav(1.0))}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = build_router(test_app_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "https://example.org")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
