// src/services/alert.rs

//! Failure notifications to the dedicated error channel.

use crate::error::{AppError, Result};
use crate::formatter::error_message;
use crate::services::ChatChannel;

/// What went wrong, in the shape the error embed displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Component that failed, shown as the footer
    pub component: String,
    pub message: String,
    /// Detail title and lines
    pub details: Option<(String, Vec<String>)>,
}

impl ErrorReport {
    pub fn new(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, title: impl Into<String>, lines: Vec<String>) -> Self {
        self.details = Some((title.into(), lines));
        self
    }

    pub fn from_error(error: &AppError) -> Self {
        Self::new(error.component(), "An error occurred while running the bot")
            .with_details(error.title(), error.details())
    }
}

/// Posts error reports to a channel.
pub struct Alerter {
    channel: Box<dyn ChatChannel>,
}

impl Alerter {
    pub fn new(channel: Box<dyn ChatChannel>) -> Self {
        Self { channel }
    }

    pub async fn report(&self, report: &ErrorReport) -> Result<()> {
        self.channel.post_message(&error_message(report)).await?;
        log::info!("Reported error from {} to the error channel", report.component);
        Ok(())
    }

    /// Report a run failure. A failure to report is only logged.
    pub async fn report_error(&self, error: &AppError) {
        if let Err(e) = self.report(&ErrorReport::from_error(error)).await {
            log::error!("Failed to report error: {}", e);
        }
    }
}
