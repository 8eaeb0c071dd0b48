use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{OutgoingEmail, Transport, TransportError, TransportKind};

pub const RESEND_TRANSPORT_ID: &str = "resend";

/// Transactional email over the Resend HTTP API
#[derive(Clone)]
pub struct ResendTransport {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

impl ResendTransport {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            from: from.into(),
        })
    }

    fn payload<'a>(&'a self, email: &'a OutgoingEmail) -> Payload<'a> {
        Payload {
            from: &self.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            text: &email.text,
            html: &email.html,
            reply_to: email.reply_to.as_deref(),
        }
    }
}

#[async_trait]
impl Transport for ResendTransport {
    fn id(&self) -> &str {
        RESEND_TRANSPORT_ID
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Api
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), TransportError> {
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.payload(email))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
