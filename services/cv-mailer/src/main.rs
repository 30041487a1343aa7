//! CV mailer HTTP service.
//!
//! Sends a job application (HTML cover letter plus CV attachment) to a list
//! of recipients over authenticated SMTP, one recipient at a time.

use anyhow::Result;
use axum::serve;
use cv_mailer_utils::{init_logging, AppConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

mod handlers;
mod message_builder;
mod middleware;
mod routes;
mod service;
mod smtp_client;
mod template_engine;

use service::{CancelFlag, MailerService};
use smtp_client::{SmtpClient, SmtpConfig};

#[derive(Clone)]
pub struct AppState {
    pub service: MailerService,
    /// Raised on shutdown; running batches stop before their next recipient.
    pub shutdown: CancelFlag,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });

    init_logging(&config.logging)?;
    info!("Starting CV mailer");

    if !std::path::Path::new(&config.mailer.template_path).exists() {
        warn!(template_path = %config.mailer.template_path, "Email template not found; sends will fail until it exists");
    }

    let transport = Arc::new(SmtpClient::new(SmtpConfig::from(&config.mailer)));
    let shutdown = CancelFlag::new();
    let state = AppState {
        service: MailerService::new(transport, config.mailer.clone()),
        shutdown: shutdown.clone(),
    };
    let app = routes::create_app(state, &config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("CV mailer listening on {}", addr);

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("CV mailer stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancelFlag) {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown requested, cancelling running batches");
    shutdown.cancel();
}
