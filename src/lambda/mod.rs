// src/lambda/mod.rs

//! AWS Lambda handler for the rotation bot.
//!
//! Meant to be triggered on a schedule. Each invocation:
//! 1. Loads configuration (S3 or bundled file, then environment)
//! 2. Assembles the rotation and compares it with the last announcement
//! 3. Republishes it when stale, reporting failures to the error channel

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::load_runtime_config;
use crate::error::Result;
use crate::pipeline::{RunSummary, execute};

/// Lambda invocation payload.
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    /// Keep-alive ping; returns without doing anything
    #[serde(default)]
    pub warmup: bool,

    /// Publish even when the announcement is up to date
    #[serde(default)]
    pub force: bool,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct RunResponse {
    pub success: bool,

    /// Whether a new announcement was posted
    pub published: bool,

    pub champion_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub execution_time_ms: u64,
}

impl From<RunSummary> for RunResponse {
    fn from(summary: RunSummary) -> Self {
        Self {
            success: true,
            published: summary.published(),
            champion_count: summary.champion_count,
            ..Default::default()
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<RunRequest>,
) -> std::result::Result<RunResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    if request.warmup {
        info!("Warmup event, skipping run");
        return Ok(RunResponse {
            success: true,
            ..Default::default()
        });
    }

    info!("Starting rotation run: force={}", request.force);

    let mut response = match run(&request).await {
        Ok(summary) => RunResponse::from(summary),
        Err(e) => {
            error!("Rotation run failed: {}", e);
            RunResponse {
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    };
    response.execution_time_ms = start.elapsed().as_millis() as u64;

    info!(
        "Run finished: success={}, published={} in {}ms",
        response.success, response.published, response.execution_time_ms
    );
    Ok(response)
}

async fn run(request: &RunRequest) -> Result<RunSummary> {
    let config = load_runtime_config().await?;
    config.validate()?;
    execute(&config, request.force).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ReconcileReport, Staleness};

    #[test]
    fn test_run_request_defaults() {
        let req: RunRequest = serde_json::from_str("{}").unwrap();
        assert!(!req.warmup);
        assert!(!req.force);
    }

    #[test]
    fn test_run_request_tolerates_schedule_payload() {
        let json = r#"{"warmup": true, "source": "aws.events", "detail-type": "Scheduled Event"}"#;
        let req: RunRequest = serde_json::from_str(json).unwrap();
        assert!(req.warmup);
    }

    #[test]
    fn test_response_from_summary() {
        let summary = RunSummary {
            champion_count: 20,
            staleness: Some(Staleness::NoAnnouncement),
            reconcile: Some(ReconcileReport::default()),
        };
        let response = RunResponse::from(summary);
        assert!(response.success);
        assert!(response.published);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["champion_count"], 20);
    }

    #[tokio::test]
    async fn test_warmup_returns_immediately() {
        let event = LambdaEvent::new(
            RunRequest {
                warmup: true,
                force: false,
            },
            lambda_runtime::Context::default(),
        );
        let response = handler(event).await.unwrap();
        assert!(response.success);
        assert!(!response.published);
    }
}
