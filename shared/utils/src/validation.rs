use crate::error::{MailerError, MailerResult};
use cv_mailer_models::{Recipient, SenderProfile};
use validator::{Validate, ValidationErrors};

pub fn validate_model<T: Validate>(model: &T) -> MailerResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(MailerError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match &error.message {
                Some(message) => message.to_string(),
                None => match error.code.as_ref() {
                    "email" => format!("Invalid email format for field '{}'", field),
                    "length" => format!("Length validation failed for field '{}'", field),
                    code => format!("Validation failed for field '{}': {}", field, code),
                },
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

/// Fails with `"{label} is required"` when `value` is empty after trimming.
pub fn require_non_blank(field: &str, label: &str, value: &str) -> MailerResult<()> {
    if value.trim().is_empty() {
        return Err(MailerError::validation(field, format!("{} is required", label)));
    }
    Ok(())
}

/// Check every sender field the template and transport depend on.
///
/// Fields are checked in the order the form presents them so the first
/// missing one is reported.
pub fn validate_sender_profile(profile: &SenderProfile, subject: &str) -> MailerResult<()> {
    require_non_blank("sender_email", "Sender email", &profile.email)?;
    if profile.credential.is_blank() {
        return Err(MailerError::validation("app_password", "App password is required"));
    }
    require_non_blank("job_title", "Job title", &profile.job_title)?;
    require_non_blank("subject", "Subject", subject)?;
    require_non_blank("name", "Name", &profile.name)?;
    require_non_blank("phone_number", "Phone number", &profile.phone_number)?;

    validate_model(profile)
}

/// Trim every address, drop blank ones and keep the rest in input order.
///
/// An empty result is a validation error: nothing may be sent.
pub fn filter_recipients(recipients: Vec<Recipient>) -> MailerResult<Vec<Recipient>> {
    let filtered: Vec<Recipient> = recipients
        .into_iter()
        .filter(Recipient::has_email)
        .map(|recipient| Recipient {
            email: recipient.email.trim().to_string(),
            company: recipient.company,
        })
        .collect();

    if filtered.is_empty() {
        return Err(MailerError::validation("recipients", "No recipients provided"));
    }

    Ok(filtered)
}

/// Keep only ASCII digits.
pub fn normalize_phone_number(phone_number: &str) -> String {
    phone_number.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Remove a `data:<mime>;base64,` prefix as produced by a browser `FileReader`.
pub fn strip_data_uri(encoded: &str) -> &str {
    let trimmed = encoded.trim();
    match trimmed.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_mailer_models::Credential;
    use proptest::prelude::*;

    fn profile() -> SenderProfile {
        SenderProfile::new(
            "me@example.com",
            Credential::new("app-password"),
            "Backend Engineer",
            "Jane Doe",
            "15551234567",
        )
    }

    #[test]
    fn test_validate_sender_profile_ok() {
        assert!(validate_sender_profile(&profile(), "Application").is_ok());
    }

    #[test]
    fn test_validate_sender_profile_reports_each_blank_field() {
        let cases: Vec<(&str, Box<dyn Fn(&mut SenderProfile)>)> = vec![
            ("sender_email", Box::new(|p: &mut SenderProfile| p.email = " ".to_string())),
            ("app_password", Box::new(|p: &mut SenderProfile| p.credential = Credential::new(""))),
            ("job_title", Box::new(|p: &mut SenderProfile| p.job_title.clear())),
            ("name", Box::new(|p: &mut SenderProfile| p.name = "\t".to_string())),
            ("phone_number", Box::new(|p: &mut SenderProfile| p.phone_number.clear())),
        ];

        for (expected_field, mutate) in cases {
            let mut sender = profile();
            mutate(&mut sender);
            match validate_sender_profile(&sender, "Application") {
                Err(MailerError::Validation { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected validation error for {}, got {:?}", expected_field, other),
            }
        }
    }

    #[test]
    fn test_validate_sender_profile_requires_subject() {
        let err = validate_sender_profile(&profile(), "   ").unwrap_err();
        assert_eq!(err, MailerError::validation("subject", "Subject is required"));
    }

    #[test]
    fn test_validate_sender_profile_rejects_bad_email() {
        let mut sender = profile();
        sender.email = "nope".to_string();
        let err = validate_sender_profile(&sender, "Application").unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("Sender email must be a valid email address"));
    }

    #[test]
    fn test_filter_recipients_drops_blanks_and_keeps_order() {
        let recipients = vec![
            Recipient::new(" a@x.com ", None),
            Recipient::new("", Some("Ghost".to_string())),
            Recipient::new("b@x.com", Some("Acme".to_string())),
            Recipient::new("a@x.com", None),
        ];

        let filtered = filter_recipients(recipients).unwrap();
        let emails: Vec<&str> = filtered.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["a@x.com", "b@x.com", "a@x.com"]);
    }

    #[test]
    fn test_filter_recipients_all_blank() {
        let err = filter_recipients(vec![Recipient::new("  ", None)]).unwrap_err();
        assert_eq!(err, MailerError::validation("recipients", "No recipients provided"));
        assert!(filter_recipients(Vec::new()).is_err());
    }

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(normalize_phone_number("+1 (555) 123-4567"), "15551234567");
        assert_eq!(normalize_phone_number("abc"), "");
    }

    #[test]
    fn test_strip_data_uri() {
        assert_eq!(strip_data_uri("data:application/pdf;base64,JVBERi0="), "JVBERi0=");
        assert_eq!(strip_data_uri("  JVBERi0=  "), "JVBERi0=");
        assert_eq!(strip_data_uri("data:JVBERi0="), "JVBERi0=");
    }

    proptest! {
        #[test]
        fn prop_normalized_phone_is_digits(phone in "[0-9 +()-]{0,20}") {
            let normalized = normalize_phone_number(&phone);
            prop_assert!(normalized.chars().all(|c| c.is_ascii_digit()));
            prop_assert_eq!(
                normalized.len(),
                phone.chars().filter(|c| c.is_ascii_digit()).count()
            );
        }
    }
}
