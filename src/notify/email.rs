// src/notify/email.rs
//! SMTP delivery via STARTTLS, configured from the environment.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, Message, MultiPart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{Notifier, OutboundMessage};
use crate::error::{ConfigError, ConfigResult};

pub const ENV_SMTP_HOST: &str = "SMTP_HOST";
pub const ENV_SMTP_PORT: &str = "SMTP_PORT";
pub const ENV_SMTP_USER: &str = "SMTP_USER";
pub const ENV_SMTP_PASS: &str = "SMTP_PASS";
pub const ENV_EMAIL_FROM: &str = "NOTIFY_EMAIL_FROM";
pub const ENV_EMAIL_TO: &str = "NOTIFY_EMAIL_TO";

const DEFAULT_SMTP_PORT: u16 = 587;

/// Sends each message as multipart/alternative (plain + HTML) mail.
#[derive(Debug)]
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// Build from `SMTP_*` / `NOTIFY_EMAIL_*` variables.
    ///
    /// Everything is validated here so a broken mail setup aborts the run
    /// before any source is contacted.
    pub fn from_env() -> ConfigResult<Self> {
        let host = require(ENV_SMTP_HOST)?;
        let user = require(ENV_SMTP_USER)?;
        let pass = require(ENV_SMTP_PASS)?;
        let from = parse_mailbox(ENV_EMAIL_FROM)?;
        let to = parse_mailbox(ENV_EMAIL_TO)?;
        let port = match std::env::var(ENV_SMTP_PORT) {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                ConfigError::Transport(format!("{ENV_SMTP_PORT} is not a port number: {raw}"))
            })?,
            Err(_) => DEFAULT_SMTP_PORT,
        };

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .map_err(|e| ConfigError::Transport(format!("invalid {ENV_SMTP_HOST} '{host}': {e}")))?
            .port(port)
            .credentials(Credentials::new(user, pass))
            .build();

        Ok(Self { mailer, from, to })
    }
}

fn require(name: &str) -> ConfigResult<String> {
    std::env::var(name).map_err(|_| ConfigError::Transport(format!("{name} missing")))
}

fn parse_mailbox(name: &str) -> ConfigResult<Mailbox> {
    require(name)?
        .parse()
        .map_err(|e| ConfigError::Transport(format!("invalid {name}: {e}")))
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.body.text.clone(),
                message.body.html.clone(),
            ))
            .context("build email")?;

        self.mailer.send(email).await.context("send email")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            ENV_SMTP_HOST,
            ENV_SMTP_PORT,
            ENV_SMTP_USER,
            ENV_SMTP_PASS,
            ENV_EMAIL_FROM,
            ENV_EMAIL_TO,
        ] {
            std::env::remove_var(name);
        }
    }

    fn set_valid_env() {
        std::env::set_var(ENV_SMTP_HOST, "smtp.example.org");
        std::env::set_var(ENV_SMTP_USER, "user");
        std::env::set_var(ENV_SMTP_PASS, "secret");
        std::env::set_var(ENV_EMAIL_FROM, "Feed Courier <courier@example.org>");
        std::env::set_var(ENV_EMAIL_TO, "reader@example.org");
    }

    #[test]
    #[serial]
    fn from_env_succeeds_with_full_settings() {
        clear_env();
        set_valid_env();
        assert!(EmailNotifier::from_env().is_ok());
        clear_env();
    }

    #[test]
    #[serial]
    fn missing_host_is_a_transport_error() {
        clear_env();
        set_valid_env();
        std::env::remove_var(ENV_SMTP_HOST);
        let err = EmailNotifier::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Transport(_)));
        assert!(err.to_string().contains(ENV_SMTP_HOST));
        clear_env();
    }

    #[test]
    #[serial]
    fn bad_recipient_is_a_transport_error() {
        clear_env();
        set_valid_env();
        std::env::set_var(ENV_EMAIL_TO, "not an address");
        let err = EmailNotifier::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_EMAIL_TO));
        clear_env();
    }

    #[test]
    #[serial]
    fn unparsable_port_is_a_transport_error() {
        clear_env();
        set_valid_env();
        std::env::set_var(ENV_SMTP_PORT, "not-a-port");
        let err = EmailNotifier::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_SMTP_PORT));
        clear_env();
    }
}
