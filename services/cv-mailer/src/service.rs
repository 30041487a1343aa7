//! Mailer Service
//!
//! Core send orchestration: one recipient at a time, in input order, with a
//! fixed pause between consecutive sends.

use cv_mailer_models::{Attachment, BatchReport, Recipient, SendOutcome, SenderProfile, StatusBoard};
use cv_mailer_utils::{
    filter_recipients, require_non_blank, validate_sender_profile, MailerConfig, MailerError,
    MailerResult,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::message_builder::{build_message, decode_attachment};
use crate::smtp_client::MailTransport;
use crate::template_engine::{EmailTemplate, TemplateContext};

/// Confirmation recorded for a recipient whose message was accepted.
pub const SENT_MESSAGE: &str = "Email sent successfully";

/// Cooperative cancellation, checked between recipients.
///
/// The server raises it on shutdown.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sender, subject and decoded CV shared read-only by every send of a request.
#[derive(Debug, Clone)]
pub struct Application {
    pub sender: SenderProfile,
    pub subject: String,
    pub attachment: Attachment,
}

/// Mailer service
#[derive(Clone)]
pub struct MailerService {
    transport: Arc<dyn MailTransport>,
    config: MailerConfig,
}

impl MailerService {
    pub fn new(transport: Arc<dyn MailTransport>, config: MailerConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// Validate every required sender field and decode the attachment.
    ///
    /// Nothing has been sent when this fails.
    pub fn prepare(
        &self,
        sender: SenderProfile,
        subject: &str,
        attachment_filename: Option<&str>,
        encoded_attachment: &str,
    ) -> MailerResult<Application> {
        validate_sender_profile(&sender, subject)?;
        self.finish_preparing(sender, subject, attachment_filename, encoded_attachment)
    }

    /// Like [`MailerService::prepare`] but name and phone number may be blank,
    /// as for a test message.
    pub fn prepare_test(
        &self,
        sender: SenderProfile,
        subject: &str,
        attachment_filename: Option<&str>,
        encoded_attachment: &str,
    ) -> MailerResult<Application> {
        require_non_blank("sender_email", "Sender email", &sender.email)?;
        if sender.credential.is_blank() {
            return Err(MailerError::validation("app_password", "App password is required"));
        }
        require_non_blank("job_title", "Job title", &sender.job_title)?;
        require_non_blank("subject", "Subject", subject)?;
        self.finish_preparing(sender, subject, attachment_filename, encoded_attachment)
    }

    fn finish_preparing(
        &self,
        sender: SenderProfile,
        subject: &str,
        attachment_filename: Option<&str>,
        encoded_attachment: &str,
    ) -> MailerResult<Application> {
        require_non_blank("pdf_file", "PDF file", encoded_attachment)?;

        let filename = attachment_filename
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.config.default_attachment_filename);
        let attachment = decode_attachment(filename, encoded_attachment)?;

        Ok(Application {
            sender,
            subject: subject.trim().to_string(),
            attachment,
        })
    }

    /// Read the body template named in the configuration.
    pub async fn load_template(&self) -> MailerResult<EmailTemplate> {
        let template = EmailTemplate::load(&self.config.template_path).await?;
        template.check()?;
        Ok(template)
    }

    /// Render, build and submit one message. Errors are returned, not recorded.
    #[instrument(skip_all, fields(recipient = %recipient.email))]
    pub async fn send_one(
        &self,
        application: &Application,
        template: &EmailTemplate,
        recipient: &Recipient,
    ) -> MailerResult<String> {
        require_non_blank("email", "Email address", &recipient.email)?;

        let context = TemplateContext::for_recipient(&application.sender, recipient);
        let body = template.render(&context)?;
        let message = build_message(
            &application.sender,
            &recipient.email,
            &application.subject,
            body,
            &application.attachment,
        )?;

        info!("Sending email");
        let confirmation = self.transport.send(message, &application.sender).await?;
        info!(response = %confirmation, "Email sent");
        Ok(confirmation)
    }

    /// Send to every recipient with a non-blank address, in order.
    ///
    /// Validation and template problems abort before the first send. After
    /// that, each recipient's failure is recorded in its own outcome and the
    /// batch moves on.
    #[instrument(skip_all, fields(recipients = recipients.len()))]
    pub async fn send_batch(
        &self,
        application: &Application,
        template: &EmailTemplate,
        recipients: Vec<Recipient>,
        cancel: &CancelFlag,
    ) -> MailerResult<BatchReport> {
        let recipients = filter_recipients(recipients)?;
        template.check()?;

        let delay = self.config.send_delay();
        let mut board = StatusBoard::new(recipients.iter().map(|r| r.email.clone()));
        let mut outcomes = Vec::with_capacity(recipients.len());

        for (index, recipient) in recipients.iter().enumerate() {
            if index > 0 && !cancel.is_cancelled() {
                tokio::time::sleep(delay).await;
            }

            if cancel.is_cancelled() {
                info!(remaining = recipients.len() - index, "Batch cancelled");
                for (skipped, rest) in recipients.iter().enumerate().skip(index) {
                    let outcome = SendOutcome::cancelled(rest.email.as_str());
                    board.record(skipped, &outcome).map_err(status_error)?;
                    outcomes.push(outcome);
                }
                break;
            }

            board.mark_sending(index).map_err(status_error)?;

            let outcome = match self.send_one(application, template, recipient).await {
                Ok(_) => SendOutcome::success(recipient.email.as_str(), SENT_MESSAGE),
                Err(e) => {
                    warn!(recipient = %recipient.email, error = %e, "Failed to send email");
                    SendOutcome::error(recipient.email.as_str(), e.diagnostic())
                }
            };

            board.record(index, &outcome).map_err(status_error)?;
            outcomes.push(outcome);
        }

        let report = BatchReport::new(outcomes, board);
        info!(
            successful = report.summary.successful,
            failed = report.summary.failed,
            cancelled = report.summary.cancelled,
            total = report.summary.total,
            "Batch finished"
        );
        Ok(report)
    }
}

fn status_error(error: cv_mailer_models::StatusError) -> MailerError {
    MailerError::internal(error.to_string())
}
