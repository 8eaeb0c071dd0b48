//! HTTP-level behavior of `/contact`, `/health` and `/`.

mod support;

use std::time::Duration;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;

use contact_relay::mail::Mailer;
use contact_relay::state::AppState;
use support::{
    body_json, get, mailer, post_json, served_app, test_app, Behavior, ScriptedTransport,
    VALID_BODY,
};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_missing_field_returns_400_without_sending() {
    let transport = ScriptedTransport::new("smtp-a", Behavior::Succeed);

    for field in ["name", "email", "phone", "businessType", "message"] {
        let mut body: serde_json::Value = serde_json::from_str(VALID_BODY).unwrap();
        body.as_object_mut().unwrap().remove(field);

        let app = test_app(mailer(&[transport.clone()], TIMEOUT));
        let response = app
            .oneshot(post_json("/contact", &body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(body["missing"], json!([field]));
    }

    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_empty_field_returns_400() {
    let transport = ScriptedTransport::new("smtp-a", Behavior::Succeed);
    let app = test_app(mailer(&[transport.clone()], TIMEOUT));

    let response = app
        .oneshot(post_json(
            "/contact",
            r#"{"name":"","email":"a@b.com","phone":"1","businessType":"x","message":"hi"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_malformed_body_returns_400() {
    let transport = ScriptedTransport::new("smtp-a", Behavior::Succeed);
    let app = test_app(mailer(&[transport.clone()], TIMEOUT));

    let response = app
        .oneshot(post_json("/contact", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid request body");
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_second_transport_delivers_and_third_is_untouched() {
    let first = ScriptedTransport::new("smtp-implicit-465", Behavior::Fail);
    let second = ScriptedTransport::new("smtp-starttls-587", Behavior::Succeed);
    let third = ScriptedTransport::new("smtp-opportunistic-25", Behavior::Succeed);
    let app = test_app(mailer(
        &[first.clone(), second.clone(), third.clone()],
        TIMEOUT,
    ));

    let response = app.oneshot(post_json("/contact", VALID_BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "success": true,
            "message": "Email sent successfully",
            "provider": "smtp-starttls-587",
        })
    );
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 1);
    assert_eq!(third.calls(), 0);

    let sent = second.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "owner@example.com");
    assert_eq!(
        sent[0].text,
        "Name: A\nEmail: a@b.com\nPhone: 1\nBusiness Type: x\n\nMessage:\nhi"
    );
}

#[tokio::test]
async fn test_all_transports_failing_returns_500() {
    let transports = [
        ScriptedTransport::new("resend", Behavior::Fail),
        ScriptedTransport::new("smtp-starttls-587", Behavior::Fail),
    ];
    let app = test_app(mailer(&transports, TIMEOUT));

    let response = app.oneshot(post_json("/contact", VALID_BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to send email");
    assert!(body["suggestion"].is_string());
    // Which transport failed stays in the logs.
    assert!(!body.to_string().contains("refused"));

    for transport in &transports {
        assert_eq!(transport.calls(), 1);
    }
}

#[tokio::test]
async fn test_unconfigured_returns_500_not_configured() {
    let app = test_app(Mailer::unconfigured());

    let response = app.oneshot(post_json("/contact", VALID_BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Email service not configured");
}

#[tokio::test]
async fn test_identical_submissions_send_twice() {
    let transport = ScriptedTransport::new("smtp-a", Behavior::Succeed);
    let app = test_app(mailer(&[transport.clone()], TIMEOUT));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/contact", VALID_BODY))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(transport.calls(), 2);
    assert_eq!(transport.sent().len(), 2);
}

#[tokio::test]
async fn test_health_reports_email_readiness() {
    let ready = test_app(mailer(
        &[ScriptedTransport::new("smtp-a", Behavior::Succeed)],
        TIMEOUT,
    ));
    let response = ready.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["emailReady"], true);
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    assert!(body["timestamp"].as_i64().unwrap() > 0);

    let unconfigured = test_app(Mailer::unconfigured());
    let response = unconfigured.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["emailReady"], false);
}

#[tokio::test]
async fn test_index_lists_transports_in_order() {
    let app = test_app(mailer(
        &[
            ScriptedTransport::new("smtp-implicit-465", Behavior::Succeed),
            ScriptedTransport::new("smtp-starttls-587", Behavior::Succeed),
        ],
        TIMEOUT,
    ));

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "running");
    assert_eq!(
        body["transports"],
        json!([
            { "id": "smtp-implicit-465", "kind": "smtp" },
            { "id": "smtp-starttls-587", "kind": "smtp" },
        ])
    );
}

#[tokio::test]
async fn test_panicking_transport_returns_generic_500() {
    let transport = ScriptedTransport::new("smtp-broken", Behavior::Panic);
    let app = test_app(mailer(&[transport.clone()], TIMEOUT));

    let response = app.oneshot(post_json("/contact", VALID_BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body, json!({ "error": "Internal server error", "code": 500 }));
    assert!(!body.to_string().contains("socket state"));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_chain_answers_before_request_timeout() {
    // 4 x 5s of hanging attempts is longer than the configured default on its own.
    let transports = [
        ScriptedTransport::new("resend", Behavior::Hang),
        ScriptedTransport::new("smtp-implicit-465", Behavior::Hang),
        ScriptedTransport::new("smtp-starttls-587", Behavior::Hang),
        ScriptedTransport::new("smtp-opportunistic-25", Behavior::Hang),
    ];
    let app = served_app(mailer(&transports, TIMEOUT));

    let response = app.oneshot(post_json("/contact", VALID_BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to send email");
    assert!(body["suggestion"].is_string());
    for transport in &transports {
        assert_eq!(transport.calls(), 1);
    }
}

#[tokio::test]
async fn test_request_timeout_covers_worst_case_delivery() {
    let transports = [
        ScriptedTransport::new("a", Behavior::Succeed),
        ScriptedTransport::new("b", Behavior::Succeed),
        ScriptedTransport::new("c", Behavior::Succeed),
    ];
    let state = AppState::new(support::test_config(), mailer(&transports, TIMEOUT));

    assert_eq!(state.mailer.worst_case_delivery(), Duration::from_secs(15));
    assert!(state.request_timeout() > state.mailer.worst_case_delivery());
}
