// src/pipeline/run.rs

//! One rotation run: assemble, compare, reconcile.

use crate::error::Result;
use crate::models::{Config, Rotation};
use crate::pipeline::assemble::{AssembleOptions, RotationAssembler};
use crate::pipeline::compare::{Staleness, stored_staleness};
use crate::pipeline::reconcile::{ReconcileReport, Reconciler};
use crate::services::{CatalogSource, ChatChannel, ClassificationSource, Connections};
use crate::storage::ChannelStore;
use crate::utils::log;

/// Everything a run needs, built once by the binary.
#[derive(Clone, Copy)]
pub struct RotationContext<'a> {
    pub config: &'a Config,
    pub catalog: &'a dyn CatalogSource,
    pub classification: &'a dyn ClassificationSource,
    /// Announcement channel
    pub channel: &'a dyn ChatChannel,
    /// Broken champion list, when that check is enabled
    pub broken_list: Option<&'a dyn ChatChannel>,
}

impl RotationContext<'_> {
    fn assemble_options(&self, icons: bool) -> AssembleOptions {
        AssembleOptions {
            icons,
            low_level: self.config.bot.show_low_level_rotation,
        }
    }
}

/// Result of [`run_rotation`].
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub champion_count: usize,
    pub staleness: Option<Staleness>,
    /// `None` when the announcement was already up to date
    pub reconcile: Option<ReconcileReport>,
}

impl RunSummary {
    pub fn published(&self) -> bool {
        self.reconcile.is_some()
    }
}

/// Result of [`check_rotation`].
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub rotation: Rotation,
    pub staleness: Staleness,
}

/// Publish the rotation when the announcement is stale, or always when
/// `force` (or `always_send_rotation`) is set.
pub async fn run_rotation(ctx: RotationContext<'_>, force: bool) -> Result<RunSummary> {
    log::header("ROTATION RUN");

    let send_emojis = ctx.config.bot.debug.send_emojis;
    let rotation = RotationAssembler::new(ctx.catalog, ctx.classification)
        .assemble(ctx.assemble_options(send_emojis))
        .await?;
    log::success(&format!(
        "Assembled rotation of {} champions",
        rotation.champion_count()
    ));
    log_low_level(&rotation);

    let store = ChannelStore::new(ctx.channel);
    let force = force || ctx.config.bot.debug.always_send_rotation;

    let staleness = if force {
        ::log::info!("Forced run, skipping staleness check");
        None
    } else {
        let staleness = stored_staleness(&rotation, &store).await?;
        if !staleness.is_stale() {
            log::success("Announcement is up to date, nothing to do");
            return Ok(RunSummary {
                champion_count: rotation.champion_count(),
                staleness: Some(staleness),
                reconcile: None,
            });
        }
        Some(staleness)
    };

    let report = Reconciler::new(ctx.channel, &store, ctx.broken_list, &ctx.config.bot)
        .reconcile(&rotation)
        .await?;

    log::summary(
        "Rotation published",
        &[
            ("Champions", rotation.champion_count().to_string()),
            ("Emojis uploaded", report.uploaded.to_string()),
            ("Leftover emojis swept", report.swept_emojis.to_string()),
            ("Messages cleared", report.cleared_messages.to_string()),
            ("Broken warning", report.broken.to_string()),
        ],
    );
    if !report.leftover_emojis.is_empty() {
        ::log::warn!(
            "{} uploaded emojis could not be deleted",
            report.leftover_emojis.len()
        );
    }

    Ok(RunSummary {
        champion_count: rotation.champion_count(),
        staleness,
        reconcile: Some(report),
    })
}

/// Assemble and compare without any side effect.
pub async fn check_rotation(ctx: RotationContext<'_>) -> Result<CheckReport> {
    let rotation = RotationAssembler::new(ctx.catalog, ctx.classification)
        .assemble(ctx.assemble_options(false))
        .await?;
    log_low_level(&rotation);

    let staleness = stored_staleness(&rotation, &ChannelStore::new(ctx.channel)).await?;

    Ok(CheckReport {
        rotation,
        staleness,
    })
}

/// Connect the production collaborators and run, reporting any failure to
/// the error channel before returning it.
pub async fn execute(config: &Config, force: bool) -> Result<RunSummary> {
    let connections = Connections::new(config)?;
    let alerter = connections.alerter(config).await?;

    let result = async {
        let collaborators = connections.collaborators(config).await?;
        run_rotation(collaborators.context(config), force).await
    }
    .await;

    if let Err(e) = &result {
        ::log::error!("Rotation run failed: {}", e);
        alerter.report_error(e).await;
    }
    result
}

/// The low level rotation is only reported, never published.
fn log_low_level(rotation: &Rotation) {
    let Some(low_level) = &rotation.by_role_low_level else {
        return;
    };
    ::log::info!("Low level rotation:");
    for (role, champions) in low_level {
        let names: Vec<&str> = champions.iter().map(|c| c.name.as_str()).collect();
        log::sub_item(&format!("{}: {}", role, names.join(", ")));
    }
}
