use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::AppState;

/// Static settings shown by the form. Contains nothing secret.
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub template_path: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    /// Seconds between consecutive sends.
    pub send_delay: f64,
    pub job_title: String,
    pub subject: String,
}

pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let mailer = state.service.config();

    Json(ConfigResponse {
        template_path: mailer.template_path.clone(),
        smtp_server: mailer.smtp_host.clone(),
        smtp_port: mailer.smtp_port,
        send_delay: mailer.send_delay().as_secs_f64(),
        job_title: mailer.default_job_title.clone(),
        subject: mailer.default_subject.clone(),
    })
}
