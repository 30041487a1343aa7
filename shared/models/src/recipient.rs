//! Recipients of an application batch.

use serde::{Deserialize, Serialize};

/// Greeting used when a recipient has no company name.
pub const DEFAULT_GREETING: &str = "Hiring Team";

/// One destination of a batch. Duplicate addresses inside a batch are allowed
/// and each one is sent independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipient {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
}

impl Recipient {
    pub fn new(email: impl Into<String>, company: Option<String>) -> Self {
        Self {
            email: email.into(),
            company,
        }
    }

    /// Company name with surrounding whitespace removed, if any is left.
    pub fn company_name(&self) -> Option<&str> {
        self.company
            .as_deref()
            .map(str::trim)
            .filter(|company| !company.is_empty())
    }

    /// `"{company} Hiring Team"`, or the generic fallback.
    pub fn greeting(&self) -> String {
        match self.company_name() {
            Some(company) => format!("{} {}", company, DEFAULT_GREETING),
            None => DEFAULT_GREETING.to_string(),
        }
    }

    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_with_company() {
        let recipient = Recipient::new("jobs@acme.com", Some("Acme".to_string()));
        assert_eq!(recipient.greeting(), "Acme Hiring Team");
    }

    #[test]
    fn test_greeting_without_company() {
        assert_eq!(Recipient::new("jobs@acme.com", None).greeting(), "Hiring Team");
        assert_eq!(
            Recipient::new("jobs@acme.com", Some("   ".to_string())).greeting(),
            "Hiring Team"
        );
    }

    #[test]
    fn test_greeting_trims_company() {
        let recipient = Recipient::new("jobs@acme.com", Some("  Blue Ray ".to_string()));
        assert_eq!(recipient.greeting(), "Blue Ray Hiring Team");
    }

    #[test]
    fn test_deserialize_without_company() {
        let recipient: Recipient = serde_json::from_str(r#"{"email": "a@x.com"}"#).unwrap();
        assert_eq!(recipient.email, "a@x.com");
        assert!(recipient.company.is_none());
        assert!(recipient.has_email());
    }
}
