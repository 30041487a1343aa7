use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MailerError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Message build error: {message}")]
    Build { message: String },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Recipient rejected: {message}")]
    RecipientRejected { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl MailerError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn recipient_rejected(message: impl Into<String>) -> Self {
        Self::RecipientRejected {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Diagnostic text without the category prefix, as shown next to a recipient.
    pub fn diagnostic(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Template { message }
            | Self::Build { message }
            | Self::Authentication { message }
            | Self::RecipientRejected { message }
            | Self::Transport { message }
            | Self::Configuration { message }
            | Self::Internal { message } => message,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Template { .. } => "TEMPLATE_ERROR",
            Self::Build { .. } => "BUILD_ERROR",
            Self::Authentication { .. } => "AUTH_ERROR",
            Self::RecipientRejected { .. } => "RECIPIENT_REJECTED",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Template { .. } => 500,
            Self::Build { .. } => 400,
            Self::Authentication { .. } => 401,
            Self::RecipientRejected { .. } => 422,
            Self::Transport { .. } => 502,
            Self::Configuration { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }
}

pub type MailerResult<T> = Result<T, MailerError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub code: String,
}

impl From<MailerError> for ErrorResponse {
    fn from(error: MailerError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            code: error.error_code().to_string(),
        }
    }
}

impl From<serde_json::Error> for MailerError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<std::io::Error> for MailerError {
    fn from(error: std::io::Error) -> Self {
        Self::configuration(error.to_string())
    }
}
