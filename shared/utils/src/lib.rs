pub mod config;
pub mod logging;
pub mod error;
pub mod validation;

pub use config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_loading() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.mailer.smtp_host, "smtp.gmail.com");
    }

    #[test]
    fn test_error_handling() {
        let error = MailerError::validation("sender_email", "Sender email is required");
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
        assert_eq!(error.http_status_code(), 400);
    }
}
