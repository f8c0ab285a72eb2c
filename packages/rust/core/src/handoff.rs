//! Hand-off between stages: structured outputs become department inputs.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};

use qastruct_shared::{QaStructError, Result};

use crate::files::{archive_input, ensure_dir};

/// Suffix of diagnostic artifacts, which stay behind for inspection.
const DIAGNOSTIC_SUFFIX: &str = "_ERROR";

/// What a hand-off moved.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HandoffReport {
    /// Copies created in the destination directory.
    pub copied: Vec<PathBuf>,
    /// Diagnostic artifacts left in place.
    pub skipped: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl HandoffReport {
    pub fn is_empty(&self) -> bool {
        self.copied.is_empty()
    }
}

/// Copy every `*.{extension}` file of `from` into `to` (overwriting), then
/// move the original into `{from}/done/`.
///
/// A copy failure aborts the hand-off; a failed move is a warning.
#[instrument(skip_all, fields(from = %from.display(), to = %to.display()))]
pub fn handoff(from: &Path, to: &Path, extension: &str) -> Result<HandoffReport> {
    let mut report = HandoffReport::default();
    if !from.is_dir() {
        return Err(QaStructError::validation(format!(
            "hand-off source does not exist: {}",
            from.display()
        )));
    }
    ensure_dir(to)?;

    let mut sources: Vec<PathBuf> = std::fs::read_dir(from)
        .map_err(|e| QaStructError::io(from, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        })
        .collect();
    sources.sort();

    let done_dir = from.join("done");
    for source in sources {
        let is_diagnostic = source
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy().ends_with(DIAGNOSTIC_SUFFIX));
        if is_diagnostic {
            report.skipped.push(source);
            continue;
        }

        let Some(name) = source.file_name() else {
            continue;
        };
        let target = to.join(name);
        std::fs::copy(&source, &target).map_err(|e| QaStructError::io(&source, e))?;
        archive_input(&source, Some(done_dir.as_path()), &mut report.warnings);
        report.copied.push(target);
    }

    if report.copied.is_empty() {
        warn!("nothing to hand off");
    }
    info!(
        copied = report.copied.len(),
        skipped = report.skipped.len(),
        "hand-off finished"
    );
    Ok(report)
}
