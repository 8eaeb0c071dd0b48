pub mod message;
pub mod policy;
pub mod resend;
pub mod smtp;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

pub use message::{ContactEnvelope, OutgoingEmail};
pub use policy::{AttemptOutcome, DeliveryAttempt, DeliveryOutcome, Mailer};
pub use resend::ResendTransport;
pub use smtp::SmtpTransport;

/// Broad class of a transport, reported by `GET /`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Api,
    Smtp,
}

/// Something that can hand one email to the outside world.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Stable identifier, reported back to the caller on success.
    fn id(&self) -> &str;

    fn kind(&self) -> TransportKind;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), TransportError>;
}

/// Why a single transport attempt failed. Only ever logged, never shown to callers.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("smtp error: {0}")]
    Smtp(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Connection(format!("request timed out: {}", err))
        } else {
            TransportError::Connection(err.to_string())
        }
    }
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        TransportError::Smtp(err.to_string())
    }
}

impl From<lettre::error::Error> for TransportError {
    fn from(err: lettre::error::Error) -> Self {
        TransportError::InvalidMessage(err.to_string())
    }
}
