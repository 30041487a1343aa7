use axum::{extract::State, response::Json};
use cv_mailer_models::{BatchSummary, Credential, Recipient, SendOutcome, SenderProfile};
use cv_mailer_utils::{filter_recipients, normalize_phone_number, require_non_blank};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::ApiError;
use crate::AppState;

/// Sender fields shared by every send endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SenderFields {
    #[serde(default)]
    pub sender_email: String,
    #[serde(default)]
    pub app_password: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub subject: String,
    /// Base64 CV, optionally as a data URI.
    #[serde(default)]
    pub pdf_file: String,
    #[serde(default)]
    pub pdf_filename: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
}

impl SenderFields {
    fn profile(&self) -> SenderProfile {
        SenderProfile::new(
            self.sender_email.trim(),
            Credential::new(self.app_password.trim()),
            self.job_title.trim(),
            self.name.trim(),
            normalize_phone_number(&self.phone_number),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SendSingleRequest {
    #[serde(default)]
    pub recipient: Recipient,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Deserialize)]
pub struct SendBatchRequest {
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Deserialize)]
pub struct TestEmailRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(flatten)]
    pub sender: SenderFields,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<SendOutcome>,
    pub summary: BatchSummary,
}

/// Send to one recipient. The browser calls this once per row to show
/// progress as it goes.
pub async fn send_single(
    State(state): State<AppState>,
    Json(request): Json<SendSingleRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let to_email = request.recipient.email.trim().to_string();
    require_non_blank("email", "Email address", &to_email)?;

    let fields = &request.sender;
    let application = state.service.prepare(
        fields.profile(),
        &fields.subject,
        fields.pdf_filename.as_deref(),
        &fields.pdf_file,
    )?;
    let template = state.service.load_template().await?;

    let recipient = Recipient::new(to_email.as_str(), request.recipient.company.clone());
    match state.service.send_one(&application, &template, &recipient).await {
        Ok(_) => Ok(Json(SendResponse {
            success: true,
            message: format!("Email sent successfully to {}", to_email),
        })),
        Err(e) => {
            error!(recipient = %to_email, error = %e, "Failed to send email");
            Err(ApiError(e))
        }
    }
}

/// Legacy wide endpoint: sends the whole list and answers once with the
/// aggregated result. Recipients not yet reached when the server starts
/// shutting down are reported as cancelled.
pub async fn send_batch(
    State(state): State<AppState>,
    Json(request): Json<SendBatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let recipients = filter_recipients(request.recipients)?;

    let fields = &request.sender;
    let application = state.service.prepare(
        fields.profile(),
        &fields.subject,
        fields.pdf_filename.as_deref(),
        &fields.pdf_file,
    )?;
    let template = state.service.load_template().await?;

    info!(recipients = recipients.len(), "Starting batch");
    let report = state
        .service
        .send_batch(&application, &template, recipients, &state.shutdown)
        .await?;

    Ok(Json(BatchResponse {
        success: true,
        message: report.summary.to_string(),
        results: report.outcomes,
        summary: report.summary,
    }))
}

/// Send one message to the given address; name and phone number may be blank.
pub async fn send_test_email(
    State(state): State<AppState>,
    Json(request): Json<TestEmailRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let to_email = request.email.trim().to_string();
    require_non_blank("email", "Email address", &to_email)?;

    let fields = &request.sender;
    let application = state.service.prepare_test(
        fields.profile(),
        &fields.subject,
        fields.pdf_filename.as_deref(),
        &fields.pdf_file,
    )?;
    let template = state.service.load_template().await?;

    let recipient = Recipient::new(to_email.as_str(), request.company.clone());
    state
        .service
        .send_one(&application, &template, &recipient)
        .await
        .map_err(|e| {
            error!(recipient = %to_email, error = %e, "Failed to send test email");
            ApiError(e)
        })?;

    Ok(Json(SendResponse {
        success: true,
        message: format!("Test email sent successfully to {}", to_email),
    }))
}
