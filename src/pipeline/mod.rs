//! Pipeline entry points for rotation runs.
//!
//! - `run_rotation`: Publish the rotation when the announcement is stale
//! - `execute`: Connect the production collaborators, run and alert on failure
//! - `check_rotation`: Assemble and compare without side effects

pub mod assemble;
pub mod compare;
pub mod reconcile;
pub mod run;

pub use assemble::{AssembleOptions, RotationAssembler};
pub use compare::{AnnouncementState, Staleness, check_staleness, stored_staleness};
pub use reconcile::{ReconcileReport, Reconciler};
pub use run::{CheckReport, RotationContext, RunSummary, check_rotation, execute, run_rotation};
