//! End-to-end `run` pipeline: structure → hand-off → department split.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument};

use qastruct_shared::{BatchConfig, Result};

use crate::handoff::{HandoffReport, handoff};
use crate::report::{BatchReport, FileReport, RunStatus};
use crate::split::run_departments;
use crate::stamp::RunStamp;
use crate::structure::run_structure;

/// Progress callback for reporting batch status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a file is queued for processing.
    fn file_started(&self, name: &str, current: usize, total: usize);
    /// Called when a file's outcome is known.
    fn file_finished(&self, report: &FileReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_started(&self, _name: &str, _current: usize, _total: usize) {}
    fn file_finished(&self, _report: &FileReport) {}
}

/// Result of the full pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub structure: BatchReport,
    pub handoff: HandoffReport,
    /// `None` when the hand-off had nothing to pass on.
    pub department: Option<BatchReport>,
    #[serde(skip)]
    pub elapsed: std::time::Duration,
}

impl PipelineReport {
    /// Worst status across all stages.
    pub fn status(&self) -> RunStatus {
        let handoff = if self.handoff.warnings.is_empty() {
            RunStatus::Clean
        } else {
            RunStatus::CompletedWithIssues
        };
        self.department
            .iter()
            .fold(self.structure.status().worst(handoff), |acc, r| acc.worst(r.status()))
    }
}

/// Run all stages in order under one run stamp.
///
/// A stage-level error aborts the pipeline; per-file failures do not.
#[instrument(skip_all, fields(stamp = %stamp))]
pub async fn run_pipeline(
    structure: &BatchConfig,
    department: &BatchConfig,
    stamp: &RunStamp,
    progress: &dyn ProgressReporter,
) -> Result<PipelineReport> {
    let start = Instant::now();

    let structure_report = run_structure(structure, stamp, progress).await?;

    progress.phase("Handing off structured documents");
    let handoff_report = handoff(&structure.output_dir, &department.input_dir, &department.extension)?;

    let department_report = if handoff_report.is_empty() {
        info!("no structured documents to split");
        None
    } else {
        Some(run_departments(department, stamp, progress).await?)
    };

    let report = PipelineReport {
        structure: structure_report,
        handoff: handoff_report,
        department: department_report,
        elapsed: start.elapsed(),
    };
    info!(status = ?report.status(), elapsed_ms = report.elapsed.as_millis() as u64, "pipeline finished");
    Ok(report)
}
