use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::{
    ContactEnvelope, OutgoingEmail, ResendTransport, SmtpTransport, Transport, TransportError,
};
use crate::config::Config;
use crate::models::ContactSubmission;

/// Result of one bounded try through one transport
#[derive(Debug)]
pub struct DeliveryAttempt {
    pub transport_id: String,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub enum AttemptOutcome {
    Success,
    Failure(TransportError),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }
}

/// Result of running the whole transport chain for one message
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// `provider` took the message; `attempts` ends with its successful attempt.
    Delivered {
        provider: String,
        attempts: Vec<DeliveryAttempt>,
    },
    /// Every transport failed, one attempt per transport in the order tried.
    Exhausted { attempts: Vec<DeliveryAttempt> },
    /// No transport has credentials; nothing was tried.
    NotConfigured,
}

impl DeliveryOutcome {
    /// `(transport id, reason)` for every failed attempt, in order.
    pub fn failure_reasons(&self) -> Vec<(&str, String)> {
        let attempts = match self {
            DeliveryOutcome::Delivered { attempts, .. } | DeliveryOutcome::Exhausted { attempts } => {
                attempts.as_slice()
            }
            DeliveryOutcome::NotConfigured => &[],
        };

        attempts
            .iter()
            .filter_map(|a| match &a.outcome {
                AttemptOutcome::Failure(err) => Some((a.transport_id.as_str(), err.to_string())),
                AttemptOutcome::Success => None,
            })
            .collect()
    }
}

/// Ordered transport chain with a per-attempt timeout.
///
/// The order is fixed when the mailer is built and never changes afterwards.
pub struct Mailer {
    envelope: Option<ContactEnvelope>,
    primaries: Vec<Arc<dyn Transport>>,
    fallback: Option<Arc<dyn Transport>>,
    attempt_timeout: Duration,
}

impl Mailer {
    pub fn new(
        envelope: ContactEnvelope,
        primaries: Vec<Arc<dyn Transport>>,
        fallback: Option<Arc<dyn Transport>>,
        attempt_timeout: Duration,
    ) -> Self {
        // A fallback already in the primary chain would be tried twice.
        let fallback = fallback.filter(|fb| !primaries.iter().any(|p| p.id() == fb.id()));

        Self {
            envelope: Some(envelope),
            primaries,
            fallback,
            attempt_timeout,
        }
    }

    /// A mailer with nothing to send through.
    pub fn unconfigured() -> Self {
        Self {
            envelope: None,
            primaries: Vec::new(),
            fallback: None,
            attempt_timeout: Duration::ZERO,
        }
    }

    /// Build the transport chain from configuration, skipping anything without credentials.
    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.attempt_timeout_secs);

        let Some(to) = config.contact_to.clone() else {
            tracing::warn!("CONTACT_TO not set and no SMTP_USER to fall back on, email disabled");
            return Self::unconfigured();
        };

        let resend: Option<Arc<dyn Transport>> = match &config.resend_api_key {
            Some(api_key) => match ResendTransport::new(
                config.resend_api_url.as_str(),
                api_key.as_str(),
                config.mail_from.as_str(),
                timeout,
            ) {
                Ok(transport) => Some(Arc::new(transport) as Arc<dyn Transport>),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to build Resend transport, skipping");
                    None
                }
            },
            None => {
                tracing::info!("RESEND_API_KEY not set, skipping Resend transport");
                None
            }
        };

        let mut smtp: Vec<Arc<dyn Transport>> = Vec::new();
        match (config.smtp_credentials(), config.smtp_from.as_deref()) {
            (Some((user, pass)), Some(from)) => {
                for profile in &config.smtp_profiles {
                    match SmtpTransport::new(&config.smtp_host, *profile, user, pass, from, timeout) {
                        Ok(transport) => smtp.push(Arc::new(transport)),
                        Err(e) => tracing::error!(
                            transport = %profile.id(),
                            error = %e,
                            "Failed to build SMTP transport, skipping"
                        ),
                    }
                }
            }
            _ => tracing::info!("SMTP_USER/SMTP_PASS not set, skipping SMTP transports"),
        }

        let (primaries, fallback) = if config.resend_first() {
            (resend.into_iter().chain(smtp).collect(), None)
        } else {
            (smtp, resend)
        };

        let mailer = Self::new(
            ContactEnvelope {
                to,
                subject: config.contact_subject.clone(),
            },
            primaries,
            fallback,
            timeout,
        );

        tracing::info!(
            transports = ?mailer.transport_ids(),
            attempt_timeout_secs = config.attempt_timeout_secs,
            "Mailer configured"
        );

        mailer
    }

    pub fn is_configured(&self) -> bool {
        self.envelope.is_some() && (!self.primaries.is_empty() || self.fallback.is_some())
    }

    /// Time to exhaust the chain when every attempt runs into its timeout.
    pub fn worst_case_delivery(&self) -> Duration {
        self.attempt_timeout * self.transports().count() as u32
    }

    /// Every transport id in the order they would be tried.
    pub fn transport_ids(&self) -> Vec<String> {
        self.transports().map(|t| t.id().to_string()).collect()
    }

    /// Primaries, then the fallback.
    pub fn transports(&self) -> impl Iterator<Item = &Arc<dyn Transport>> {
        self.primaries.iter().chain(self.fallback.iter())
    }

    /// Render the submission once and run it through the chain.
    pub async fn send_contact(&self, submission: &ContactSubmission) -> DeliveryOutcome {
        match &self.envelope {
            Some(envelope) => self.deliver(&OutgoingEmail::contact(envelope, submission)).await,
            None => {
                tracing::warn!("Contact submission dropped, no email transport configured");
                DeliveryOutcome::NotConfigured
            }
        }
    }

    /// Try each transport in order until one accepts the message.
    pub async fn deliver(&self, email: &OutgoingEmail) -> DeliveryOutcome {
        if !self.is_configured() {
            tracing::warn!("No email transport configured");
            return DeliveryOutcome::NotConfigured;
        }

        let mut attempts = Vec::new();

        for transport in &self.primaries {
            let attempt = self.attempt(transport.as_ref(), email).await;
            if attempt.outcome.is_success() {
                return delivered(attempt, attempts);
            }
            attempts.push(attempt);
        }

        if let Some(fallback) = &self.fallback {
            tracing::info!(
                transport = %fallback.id(),
                failed = attempts.len(),
                "Primary transports exhausted, trying fallback"
            );
            let attempt = self.attempt(fallback.as_ref(), email).await;
            if attempt.outcome.is_success() {
                return delivered(attempt, attempts);
            }
            attempts.push(attempt);
        }

        tracing::error!(attempts = attempts.len(), "All email transports failed");
        DeliveryOutcome::Exhausted { attempts }
    }

    async fn attempt(&self, transport: &dyn Transport, email: &OutgoingEmail) -> DeliveryAttempt {
        let started = Instant::now();

        let result = match tokio::time::timeout(self.attempt_timeout, transport.send(email)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.attempt_timeout)),
        };
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(()) => {
                tracing::info!(
                    transport = %transport.id(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Email sent"
                );
                AttemptOutcome::Success
            }
            Err(e) => {
                tracing::warn!(
                    transport = %transport.id(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "Email transport failed"
                );
                AttemptOutcome::Failure(e)
            }
        };

        DeliveryAttempt {
            transport_id: transport.id().to_string(),
            outcome,
            elapsed,
        }
    }
}

fn delivered(success: DeliveryAttempt, mut attempts: Vec<DeliveryAttempt>) -> DeliveryOutcome {
    let provider = success.transport_id.clone();
    attempts.push(success);
    DeliveryOutcome::Delivered { provider, attempts }
}
