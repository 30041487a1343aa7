//! SMTP Client
//!
//! Submits one message per authenticated session using lettre.

use async_trait::async_trait;
use cv_mailer_models::SenderProfile;
use cv_mailer_utils::{MailerConfig, MailerError, MailerResult};
use lettre::{
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;
use tracing::debug;

/// Submits a built message on behalf of a sender.
///
/// Implementations must not retry: a failure is reported once and the caller
/// decides what happens next.
#[async_trait]
pub trait MailTransport: Send + Sync + 'static {
    /// Returns the server's confirmation text.
    async fn send(&self, message: Message, sender: &SenderProfile) -> MailerResult<String>;
}

/// SMTP client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl From<&MailerConfig> for SmtpConfig {
    fn from(config: &MailerConfig) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            timeout: config.smtp_timeout(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self::from(&MailerConfig::default())
    }
}

/// STARTTLS submission client.
///
/// Every call opens its own session, authenticates with the sender's
/// credential and closes the session when the transport is dropped, on
/// success and on failure alike. Nothing is shared between recipients.
pub struct SmtpClient {
    config: SmtpConfig,
}

impl SmtpClient {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn session(&self, sender: &SenderProfile) -> MailerResult<AsyncSmtpTransport<Tokio1Executor>> {
        let creds = Credentials::new(sender.email.clone(), sender.credential.expose_secret().to_string());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
            .map_err(|e| classify_smtp_error(&e))?
            .port(self.config.port)
            .timeout(Some(self.config.timeout))
            .credentials(creds)
            .build();

        Ok(transport)
    }
}

impl Default for SmtpClient {
    fn default() -> Self {
        Self::new(SmtpConfig::default())
    }
}

#[async_trait]
impl MailTransport for SmtpClient {
    async fn send(&self, message: Message, sender: &SenderProfile) -> MailerResult<String> {
        debug!(host = %self.config.host, port = self.config.port, "Opening SMTP session");
        let transport = self.session(sender)?;

        let response = transport
            .send(message)
            .await
            .map_err(|e| classify_smtp_error(&e))?;

        Ok(response.message().collect::<Vec<_>>().join(" "))
    }
}

/// Map a lettre error to the failure kinds callers distinguish, keeping the
/// server's diagnostic text.
pub fn classify_smtp_error(error: &SmtpError) -> MailerError {
    let message = error.to_string();
    let code = error
        .status()
        .and_then(|code| code.to_string().parse::<u16>().ok());

    match code {
        Some(code) => classify_reply_code(code, message),
        None => MailerError::transport(message),
    }
}

pub fn classify_reply_code(code: u16, message: impl Into<String>) -> MailerError {
    match code {
        // Authentication required / too weak / credentials invalid / temporary auth failure
        454 | 530 | 534 | 535 => MailerError::authentication(message),
        // Mailbox unavailable / user not local / mailbox name not allowed / bad address syntax
        501 | 550 | 551 | 553 => MailerError::recipient_rejected(message),
        _ => MailerError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth_codes() {
        for code in [454, 530, 534, 535] {
            let err = classify_reply_code(code, "5.7.8 Username and Password not accepted");
            assert_eq!(err.error_code(), "AUTH_ERROR", "code {}", code);
            assert_eq!(err.diagnostic(), "5.7.8 Username and Password not accepted");
        }
    }

    #[test]
    fn test_classify_recipient_codes() {
        for code in [501, 550, 551, 553] {
            let err = classify_reply_code(code, "5.1.1 The email account that you tried to reach does not exist");
            assert_eq!(err.error_code(), "RECIPIENT_REJECTED", "code {}", code);
        }
    }

    #[test]
    fn test_classify_other_codes_as_transport() {
        for code in [421, 451, 452, 554] {
            assert_eq!(classify_reply_code(code, "busy").error_code(), "TRANSPORT_ERROR");
        }
    }

    #[test]
    fn test_config_from_mailer_config() {
        let config = SmtpConfig::from(&MailerConfig::default());
        assert_eq!(config.host, "smtp.gmail.com");
        assert_eq!(config.port, 587);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    fn sender() -> SenderProfile {
        SenderProfile::new(
            "jane@example.com",
            cv_mailer_models::Credential::new("app-password"),
            "Backend Engineer",
            "Jane Doe",
            "15551234567",
        )
    }

    fn message() -> Message {
        Message::builder()
            .from("jane@example.com".parse().unwrap())
            .to("jobs@acme.com".parse().unwrap())
            .subject("Application")
            .body("Hello".to_string())
            .unwrap()
    }

    fn local_client(port: u16) -> SmtpClient {
        SmtpClient::new(SmtpConfig {
            host: "127.0.0.1".to_string(),
            port,
            timeout: Duration::from_secs(5),
        })
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = local_client(port).send(message(), &sender()).await.unwrap_err();
        assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    }

    #[tokio::test]
    async fn test_server_reply_code_is_classified() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket
                .write_all(b"535 5.7.8 Username and Password not accepted\r\n")
                .await
                .unwrap();
            let mut rest = Vec::new();
            let _ = socket.read_to_end(&mut rest).await;
        });

        let err = local_client(port).send(message(), &sender()).await.unwrap_err();
        assert_eq!(err.error_code(), "AUTH_ERROR");
        assert!(err.diagnostic().contains("Username and Password not accepted"));

        server.abort();
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmtpClient>();
    }
}
