use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{OutgoingEmail, Transport, TransportError, TransportKind};
use crate::config::{SmtpProfile, SmtpSecurity};

pub struct SmtpTransport {
    id: String,
    from: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Build the transport for `profile` against `host`. No connection is made here.
    pub fn new(
        host: &str,
        profile: SmtpProfile,
        username: &str,
        password: &str,
        from: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let from: Mailbox = from
            .parse()
            .map_err(|e| TransportError::InvalidMessage(format!("sender {:?}: {}", from, e)))?;

        let tls = match profile.security {
            SmtpSecurity::Implicit => Tls::Wrapper(TlsParameters::new(host.to_string())?),
            SmtpSecurity::StartTls => Tls::Required(TlsParameters::new(host.to_string())?),
            SmtpSecurity::Opportunistic => {
                Tls::Opportunistic(TlsParameters::new(host.to_string())?)
            }
            SmtpSecurity::None => Tls::None,
        };

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(profile.port)
            .tls(tls)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            id: profile.id(),
            from,
            mailer,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, TransportError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| TransportError::InvalidMessage(format!("recipient {:?}: {}", email.to, e)))?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone());

        if let Some(reply_to) = email.reply_to.as_deref().and_then(|r| r.parse::<Mailbox>().ok()) {
            builder = builder.reply_to(reply_to);
        }

        let message = builder.multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))?;

        Ok(message)
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Smtp
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), TransportError> {
        let message = self.build_message(email)?;
        self.mailer.send(message).await?;
        Ok(())
    }
}
