//! Message Builder
//!
//! Turns a rendered body and the decoded CV into a complete MIME message.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cv_mailer_models::{Attachment, SenderProfile};
use cv_mailer_utils::{strip_data_uri, MailerError, MailerResult};
use lettre::message::{header::ContentType, Attachment as AttachmentPart, Mailbox, MultiPart, SinglePart};
use lettre::Message;

/// Decode a base64 attachment as sent by the browser form.
///
/// A `data:` URI prefix and embedded whitespace are tolerated.
pub fn decode_attachment(filename: &str, encoded: &str) -> MailerResult<Attachment> {
    let filename = filename.trim();
    if filename.is_empty() {
        return Err(MailerError::build("Attachment filename is empty"));
    }

    let compact: String = strip_data_uri(encoded)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(MailerError::build("PDF file data is empty"));
    }

    let content = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| MailerError::build(format!("Invalid PDF file data: {}", e)))?;

    Ok(Attachment::new(filename, content))
}

fn parse_mailbox(role: &str, address: &str) -> MailerResult<Mailbox> {
    let address = address.trim();
    if address.is_empty() {
        return Err(MailerError::build(format!("{} address is empty", role)));
    }

    address
        .parse()
        .map_err(|e| MailerError::build(format!("Invalid {} address {}: {}", role.to_lowercase(), address, e)))
}

/// Assemble `multipart/mixed`: the HTML body followed by exactly one attachment.
pub fn build_message(
    sender: &SenderProfile,
    to_email: &str,
    subject: &str,
    html_body: String,
    attachment: &Attachment,
) -> MailerResult<Message> {
    let from = parse_mailbox("Sender", &sender.email)?;
    let to = parse_mailbox("Recipient", to_email)?;

    let subject = subject.trim();
    if subject.is_empty() {
        return Err(MailerError::build("Subject is empty"));
    }

    let content_type = ContentType::parse(attachment.content_type())
        .map_err(|e| MailerError::build(format!("Invalid attachment content type: {}", e)))?;

    let attachment_part = AttachmentPart::new(attachment.filename.clone())
        .body(attachment.content.clone(), content_type);

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::html(html_body))
                .singlepart(attachment_part),
        )
        .map_err(|e| MailerError::build(format!("Failed to build email: {}", e)))
}
