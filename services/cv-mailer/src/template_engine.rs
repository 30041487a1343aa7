//! Email Template Engine
//!
//! Fills `{placeholder}` tokens in the HTML body template. `{{` and `}}`
//! render as literal braces so inline CSS survives.

use cv_mailer_models::{Recipient, SenderProfile};
use cv_mailer_utils::{MailerError, MailerResult};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::debug;

/// Every placeholder a body template may use.
pub const TEMPLATE_TOKENS: [&str; 5] = ["greeting", "name", "job_title", "email", "phone_number"];

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("token pattern is valid")
    })
}

/// Values substituted into a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(token.into(), value.into());
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// The values for one recipient; only the greeting differs between
    /// recipients of the same batch.
    pub fn for_recipient(sender: &SenderProfile, recipient: &Recipient) -> Self {
        Self::new()
            .with("greeting", recipient.greeting())
            .with("name", sender.name.as_str())
            .with("job_title", sender.job_title.as_str())
            .with("email", sender.email.as_str())
            .with("phone_number", sender.phone_number.as_str())
    }
}

/// HTML body template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    source: String,
}

impl EmailTemplate {
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Read a template from disk.
    pub async fn load(path: &str) -> MailerResult<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(source) => {
                debug!(template_path = %path, bytes = source.len(), "Loaded email template");
                Ok(Self::from_source(source))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(MailerError::configuration(
                format!("Email template not found: {}", path),
            )),
            Err(e) => Err(MailerError::configuration(format!(
                "Failed to read email template {}: {}",
                path, e
            ))),
        }
    }

    /// Distinct placeholder names in the template.
    pub fn placeholders(&self) -> BTreeSet<String> {
        token_regex()
            .captures_iter(&self.source)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }

    /// Fail unless every placeholder is one of [`TEMPLATE_TOKENS`].
    pub fn check(&self) -> MailerResult<()> {
        let unknown: Vec<String> = self
            .placeholders()
            .into_iter()
            .filter(|token| !TEMPLATE_TOKENS.contains(&token.as_str()))
            .collect();

        if !unknown.is_empty() {
            return Err(MailerError::template(format!(
                "Unknown placeholder(s): {}",
                unknown.join(", ")
            )));
        }
        Ok(())
    }

    /// Substitute every placeholder. A placeholder without a value is an error.
    ///
    /// Values are inserted as-is, without HTML escaping.
    pub fn render(&self, context: &TemplateContext) -> MailerResult<String> {
        let missing: Vec<String> = self
            .placeholders()
            .into_iter()
            .filter(|token| context.get(token).is_none())
            .collect();

        if !missing.is_empty() {
            return Err(MailerError::template(format!(
                "No value for placeholder(s): {}",
                missing.join(", ")
            )));
        }

        let rendered = token_regex().replace_all(&self.source, |caps: &Captures| {
            match caps.get(1) {
                Some(token) => context.get(token.as_str()).unwrap_or_default().to_string(),
                None if &caps[0] == "{{" => "{".to_string(),
                None => "}".to_string(),
            }
        });

        Ok(rendered.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_mailer_models::Credential;
    use proptest::prelude::*;

    fn sender() -> SenderProfile {
        SenderProfile::new(
            "jane@example.com",
            Credential::new("secret"),
            "Backend Engineer",
            "Jane Doe",
            "15551234567",
        )
    }

    const BODY: &str = "<p>Dear {greeting},</p><p>I am applying for {job_title}.</p>\
        <p>{name}<br>{email}<br>{phone_number}</p>";

    #[test]
    fn test_render_all_tokens() {
        let template = EmailTemplate::from_source(BODY);
        let recipient = Recipient::new("jobs@acme.com", Some("Acme".to_string()));

        let body = template
            .render(&TemplateContext::for_recipient(&sender(), &recipient))
            .unwrap();

        assert_eq!(
            body,
            "<p>Dear Acme Hiring Team,</p><p>I am applying for Backend Engineer.</p>\
             <p>Jane Doe<br>jane@example.com<br>15551234567</p>"
        );
    }

    #[test]
    fn test_render_generic_greeting() {
        let template = EmailTemplate::from_source("Dear {greeting},");
        let context = TemplateContext::for_recipient(&sender(), &Recipient::new("a@x.com", None));

        assert_eq!(template.render(&context).unwrap(), "Dear Hiring Team,");
    }

    #[test]
    fn test_render_replaces_every_occurrence() {
        let template = EmailTemplate::from_source("{name} / {name} / {name}");
        let context = TemplateContext::new().with("name", "Jane");

        assert_eq!(template.render(&context).unwrap(), "Jane / Jane / Jane");
    }

    #[test]
    fn test_render_missing_value_fails() {
        let template = EmailTemplate::from_source("Hello {name}, call {phone_number}");
        let context = TemplateContext::new().with("name", "Jane");

        let err = template.render(&context).unwrap_err();
        assert_eq!(err.error_code(), "TEMPLATE_ERROR");
        assert!(err.to_string().contains("phone_number"));
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let template = EmailTemplate::from_source("<style>p {{ color: red; }}</style>{{name}} {name}");
        let context = TemplateContext::new().with("name", "Jane");

        assert_eq!(
            template.render(&context).unwrap(),
            "<style>p { color: red; }</style>{name} Jane"
        );
        assert_eq!(template.placeholders().len(), 1);
    }

    #[test]
    fn test_check_rejects_unknown_placeholder() {
        assert!(EmailTemplate::from_source(BODY).check().is_ok());

        let err = EmailTemplate::from_source("Hi {greeting}, see {portfolio_url}")
            .check()
            .unwrap_err();
        assert_eq!(err, MailerError::template("Unknown placeholder(s): portfolio_url"));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let template = EmailTemplate::from_source("{name}");
        let context = TemplateContext::new().with("name", "{email}");

        assert_eq!(template.render(&context).unwrap(), "{email}");
    }

    #[test]
    fn test_values_are_inserted_unescaped() {
        let template = EmailTemplate::from_source("<p>{greeting}</p>");
        let context = TemplateContext::new().with("greeting", "R&D <Labs> Hiring Team");

        assert_eq!(template.render(&context).unwrap(), "<p>R&D <Labs> Hiring Team</p>");
    }

    #[tokio::test]
    async fn test_load_missing_template() {
        let err = EmailTemplate::load("does/not/exist.html").await.unwrap_err();
        assert_eq!(err, MailerError::configuration("Email template not found: does/not/exist.html"));
    }

    #[tokio::test]
    async fn test_bundled_template_uses_known_tokens() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../templates/email_template.html");
        let template = EmailTemplate::load(path).await.unwrap();

        assert!(template.check().is_ok());
        assert_eq!(
            template.placeholders(),
            TEMPLATE_TOKENS.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>()
        );
    }

    proptest! {
        #[test]
        fn prop_render_is_idempotent(company in "[A-Za-z ]{0,20}", name in "[A-Za-z ]{1,20}") {
            let template = EmailTemplate::from_source(BODY);
            let mut profile = sender();
            profile.name = name;
            let recipient = Recipient::new("a@x.com", Some(company));
            let context = TemplateContext::for_recipient(&profile, &recipient);

            let first = template.render(&context).unwrap();
            let second = template.render(&context).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
