//! Sender-side data supplied fresh with every send request.

use serde::Deserialize;
use validator::Validate;

/// Opaque secret used to authenticate with the mail submission endpoint.
///
/// The value is only reachable through [`Credential::expose_secret`]; `Debug`
/// and `Display` print a redaction marker instead.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// The person sending the applications.
///
/// Lives for one request and is never mutated while a batch is running.
#[derive(Debug, Clone, Validate, PartialEq)]
pub struct SenderProfile {
    #[validate(email(message = "Sender email must be a valid email address"))]
    pub email: String,
    pub credential: Credential,
    #[validate(length(min = 1, max = 255, message = "Job title must be between 1 and 255 characters"))]
    pub job_title: String,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    /// Digits only.
    pub phone_number: String,
}

impl SenderProfile {
    pub fn new(
        email: impl Into<String>,
        credential: Credential,
        job_title: impl Into<String>,
        name: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            credential,
            job_title: job_title.into(),
            name: name.into(),
            phone_number: phone_number.into(),
        }
    }
}
