// src/error.rs

//! Unified error handling for the rotation bot.

use std::fmt;

use thiserror::Error;

/// Result type alias for bot operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// AWS S3 error
    #[error("S3 error: {0}")]
    S3(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Upstream API answered with a non-success status
    #[error("{service} API error ({status}) for {url}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        url: String,
        message: String,
    },

    /// Role classification page could not be interpreted
    #[error("Scrape error: {0}")]
    Scrape(String),

    /// Emoji upload attempted for a champion without icon bytes
    #[error("Attempted to upload an emoji for champion '{0}' without an icon")]
    MissingIcon(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create an upstream API status error.
    pub fn api(
        service: &'static str,
        status: u16,
        url: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::Api {
            service,
            status,
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a scrape error.
    pub fn scrape(message: impl Into<String>) -> Self {
        Self::Scrape(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Name of the component that raised the error, used as the alert footer.
    pub fn component(&self) -> &'static str {
        match self {
            Self::S3(_) | Self::Io(_) | Self::Toml(_) | Self::Config(_) | Self::Validation(_) => {
                "Config"
            }
            Self::Api { service, .. } => service,
            Self::Http(_) | Self::Json(_) => "Http",
            Self::Selector { .. } | Self::Scrape(_) => "OP.GG",
            Self::MissingIcon(_) => "Reconciler",
        }
    }

    /// Short human readable title for the alert embed.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Api { .. } | Self::Http(_) => "HTTP Error",
            Self::MissingIcon(_) => "Emoji upload failed",
            Self::Config(_) | Self::Validation(_) | Self::Toml(_) => "Invalid configuration",
            _ => "Rotation run failed",
        }
    }

    /// Detail lines for the alert embed.
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::Api {
                status,
                url,
                message,
                ..
            } => vec![format!("-> {status}"), url.clone(), message.clone()],
            Self::Http(e) => {
                let mut details = Vec::new();
                if let Some(status) = e.status() {
                    details.push(format!("-> {status}"));
                }
                if let Some(url) = e.url() {
                    details.push(url.to_string());
                }
                details.push(e.to_string());
                details
            }
            other => vec![other.to_string()],
        }
    }
}
