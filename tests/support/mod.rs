//! Shared helpers for integration tests: scripted transports and a ready-made app.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;

use contact_relay::config::Config;
use contact_relay::mail::{
    ContactEnvelope, Mailer, OutgoingEmail, Transport, TransportError, TransportKind,
};
use contact_relay::state::AppState;

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Succeed,
    Fail,
    /// Never answers within any reasonable timeout.
    Hang,
    /// Blows up mid-send.
    Panic,
}

/// Transport whose result is fixed up front and which records what it was given.
pub struct ScriptedTransport {
    id: String,
    behavior: Behavior,
    calls: AtomicUsize,
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl ScriptedTransport {
    pub fn new(id: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Smtp
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => {
                self.sent.lock().unwrap().push(email.clone());
                Ok(())
            }
            Behavior::Fail => Err(TransportError::Connection(format!(
                "{} refused connection",
                self.id
            ))),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
            Behavior::Panic => panic!("{} lost its socket state", self.id),
        }
    }
}

pub fn envelope() -> ContactEnvelope {
    ContactEnvelope {
        to: "owner@example.com".to_string(),
        subject: "New Contact Form Submission".to_string(),
    }
}

pub fn mailer(transports: &[Arc<ScriptedTransport>], attempt_timeout: Duration) -> Mailer {
    let primaries = transports
        .iter()
        .map(|t| t.clone() as Arc<dyn Transport>)
        .collect();
    Mailer::new(envelope(), primaries, None, attempt_timeout)
}

pub fn test_config() -> Config {
    Config::from_vars(|_| None).expect("defaults are valid")
}

pub fn test_app(mailer: Mailer) -> axum::Router {
    contact_relay::api::create_router(AppState::new(test_config(), mailer))
}

/// The router with tracing, CORS and the whole-request timeout, as served.
pub fn served_app(mailer: Mailer) -> axum::Router {
    contact_relay::api::create_app(AppState::new(test_config(), mailer))
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub const VALID_BODY: &str =
    r#"{"name":"A","email":"a@b.com","phone":"1","businessType":"x","message":"hi"}"#;
