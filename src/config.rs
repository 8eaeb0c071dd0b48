use std::env;
use std::fmt;
use std::str::FromStr;

/// Slack between the slowest possible delivery and the whole-request timeout.
pub const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 10;

/// Default SMTP profile chain, tried in this order.
pub const DEFAULT_SMTP_PROFILES: &str = "implicit:465,starttls:587,opportunistic:25";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub app_env: AppEnv,
    pub contact_to: Option<String>,
    pub contact_subject: String,
    pub resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub mail_from: String,
    pub resend_priority: ResendPriority,
    pub smtp_host: String,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub smtp_profiles: Vec<SmtpProfile>,
    pub attempt_timeout_secs: u64,
    /// Explicit `REQUEST_TIMEOUT_SECS`; derived from the transport chain when unset.
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Empty values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server_port = match var("PORT").or_else(|| var("SERVER_PORT")) {
            Some(port) => port.trim().parse().map_err(|_| ConfigError::InvalidPort)?,
            None => 3001,
        };

        let smtp_username = var("SMTP_USER");

        let config = Config {
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port,
            app_env: parse_or("APP_ENV", var("APP_ENV"), AppEnv::Development)?,
            contact_to: var("CONTACT_TO").or_else(|| smtp_username.clone()),
            contact_subject: var("CONTACT_SUBJECT")
                .unwrap_or_else(|| "New Contact Form Submission".to_string()),
            resend_api_key: var("RESEND_API_KEY"),
            resend_api_url: var("RESEND_API_URL")
                .unwrap_or_else(|| "https://api.resend.com/emails".to_string()),
            mail_from: var("MAIL_FROM")
                .unwrap_or_else(|| "Contact Form <onboarding@resend.dev>".to_string()),
            resend_priority: parse_or(
                "RESEND_PRIORITY",
                var("RESEND_PRIORITY"),
                ResendPriority::First,
            )?,
            smtp_host: var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            smtp_from: var("SMTP_FROM").or_else(|| smtp_username.clone()),
            smtp_username,
            smtp_password: var("SMTP_PASS"),
            smtp_profiles: SmtpProfile::parse_list(
                &var("SMTP_PROFILES").unwrap_or_else(|| DEFAULT_SMTP_PROFILES.to_string()),
            )?,
            attempt_timeout_secs: parse_or("ATTEMPT_TIMEOUT_SECS", var("ATTEMPT_TIMEOUT_SECS"), 15)?,
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .map(|raw| parse_or("REQUEST_TIMEOUT_SECS", Some(raw), 0))
                .transpose()?,
        };

        if config.contact_to.is_none() && config.transport_count() > 0 {
            return Err(ConfigError::MissingRecipient);
        }

        let delivery_secs = config.worst_case_delivery_secs();
        if let Some(request_secs) = config.request_timeout_secs {
            if request_secs <= delivery_secs {
                return Err(ConfigError::RequestTimeoutTooShort {
                    request_secs,
                    delivery_secs,
                });
            }
        }

        Ok(config)
    }

    /// Transports that have credentials and will be built.
    pub fn transport_count(&self) -> usize {
        let resend = usize::from(self.resend_api_key.is_some());
        let smtp = match (self.smtp_credentials(), &self.smtp_from) {
            (Some(_), Some(_)) => self.smtp_profiles.len(),
            _ => 0,
        };
        resend + smtp
    }

    /// Time to exhaust every transport when each one runs into its attempt timeout.
    pub fn worst_case_delivery_secs(&self) -> u64 {
        self.attempt_timeout_secs * self.transport_count() as u64
    }

    /// Whole-request timeout; always longer than [`Self::worst_case_delivery_secs`].
    pub fn effective_request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .unwrap_or_else(|| self.worst_case_delivery_secs() + REQUEST_TIMEOUT_MARGIN_SECS)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Whether the Resend API goes ahead of the SMTP chain for this environment.
    pub fn resend_first(&self) -> bool {
        match self.resend_priority {
            ResendPriority::First => true,
            ResendPriority::Fallback => false,
            ResendPriority::ProductionFirst => self.app_env == AppEnv::Production,
        }
    }

    pub fn smtp_credentials(&self) -> Option<(&str, &str)> {
        match (&self.smtp_username, &self.smtp_password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key,
            value: value.clone(),
        }),
        None => Ok(default),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl FromStr for AppEnv {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "production" | "prod" => Ok(AppEnv::Production),
            _ => Err(()),
        }
    }
}

/// Where the Resend API transport sits relative to the SMTP chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendPriority {
    /// Tried before any SMTP profile.
    First,
    /// Tried once, after every SMTP profile failed.
    Fallback,
    /// `First` in production, `Fallback` elsewhere.
    ProductionFirst,
}

impl FromStr for ResendPriority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(ResendPriority::First),
            "fallback" => Ok(ResendPriority::Fallback),
            "production-first" | "production_first" => Ok(ResendPriority::ProductionFirst),
            _ => Err(()),
        }
    }
}

/// How the SMTP connection gets (or doesn't get) TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// TLS from the first byte (SMTPS, usually 465).
    Implicit,
    /// Plain connection upgraded with STARTTLS, upgrade required (usually 587).
    StartTls,
    /// STARTTLS when the server offers it, plain otherwise.
    Opportunistic,
    /// No TLS at all.
    None,
}

impl SmtpSecurity {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmtpSecurity::Implicit => "implicit",
            SmtpSecurity::StartTls => "starttls",
            SmtpSecurity::Opportunistic => "opportunistic",
            SmtpSecurity::None => "plain",
        }
    }
}

impl fmt::Display for SmtpSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SmtpSecurity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "implicit" | "tls" | "ssl" => Ok(SmtpSecurity::Implicit),
            "starttls" => Ok(SmtpSecurity::StartTls),
            "opportunistic" | "service" => Ok(SmtpSecurity::Opportunistic),
            "plain" | "none" => Ok(SmtpSecurity::None),
            _ => Err(()),
        }
    }
}

/// One SMTP connection profile against `SMTP_HOST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmtpProfile {
    pub security: SmtpSecurity,
    pub port: u16,
}

impl SmtpProfile {
    pub fn new(security: SmtpSecurity, port: u16) -> Self {
        Self { security, port }
    }

    /// Stable transport id, e.g. `smtp-starttls-587`.
    pub fn id(&self) -> String {
        format!("smtp-{}-{}", self.security, self.port)
    }

    /// Parse a comma separated `security:port` list, keeping its order.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, ConfigError> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let invalid = || ConfigError::InvalidSmtpProfile(entry.to_string());
                let (security, port) = entry.split_once(':').ok_or_else(invalid)?;
                Ok(SmtpProfile {
                    security: security.trim().parse().map_err(|_| invalid())?,
                    port: port.trim().parse().map_err(|_| invalid())?,
                })
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server port")]
    InvalidPort,
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("Invalid SMTP profile {0:?}, expected security:port")]
    InvalidSmtpProfile(String),
    #[error("CONTACT_TO is required when only RESEND_API_KEY is set")]
    MissingRecipient,
    #[error(
        "REQUEST_TIMEOUT_SECS ({request_secs}) must exceed the worst-case delivery time ({delivery_secs}s)"
    )]
    RequestTimeoutTooShort { request_secs: u64, delivery_secs: u64 },
}
