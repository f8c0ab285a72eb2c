//! Structuring stage: every transcript in the input directory → one
//! structured document or one diagnostic artifact.

use std::path::{Path, PathBuf};

use tracing::{error, info, instrument};

use qastruct_shared::{BatchConfig, QaStructError, Result};
use qastruct_structure::{render_diagnostic, transform};

use crate::files::{archive_input, display_name, ensure_dir, for_each_file, list_inputs, write_atomic};
use crate::pipeline::ProgressReporter;
use crate::report::{BatchReport, FileOutcome, FileReport};
use crate::stamp::RunStamp;

/// `{stem}_structured_{stamp}.txt` and its `_ERROR` sibling.
pub fn artifact_paths(input: &Path, output_dir: &Path, stamp: &RunStamp) -> (PathBuf, PathBuf) {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (
        output_dir.join(format!("{stem}_structured_{stamp}.txt")),
        output_dir.join(format!("{stem}_structured_{stamp}_ERROR.txt")),
    )
}

/// Structure every input file of `config.input_dir`.
///
/// Fails only when there is nothing to process or the output directory
/// cannot be created; per-file failures are recorded in the report.
#[instrument(skip_all, fields(input = %config.input_dir.display(), stamp = %stamp))]
pub async fn run_structure(
    config: &BatchConfig,
    stamp: &RunStamp,
    progress: &dyn ProgressReporter,
) -> Result<BatchReport> {
    progress.phase("Structuring transcripts");

    let inputs = list_inputs(&config.input_dir, &config.extension)?;
    ensure_dir(&config.output_dir)?;
    info!(files = inputs.len(), output = %config.output_dir.display(), "structuring batch");

    let output_dir = config.output_dir.clone();
    let done_dir = config.move_done.then(|| config.done_dir());
    let run_stamp = stamp.clone();
    let files = for_each_file(inputs, config.concurrency, progress, move |input| {
        structure_file(input, &output_dir, done_dir.as_deref(), &run_stamp)
    })
    .await;

    let report = BatchReport::new("structure", stamp, files);
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        warnings = report.warnings(),
        parents = report.totals.parents,
        "structuring finished"
    );
    Ok(report)
}

/// Process one file end to end. Never fails: errors become a diagnostic.
#[instrument(skip_all, fields(file = %display_name(input)))]
pub fn structure_file(
    input: &Path,
    output_dir: &Path,
    done_dir: Option<&Path>,
    stamp: &RunStamp,
) -> FileReport {
    let (output, diagnostic) = artifact_paths(input, output_dir, stamp);
    let name = display_name(input);

    let result = std::fs::read_to_string(input)
        .map_err(|e| QaStructError::io(input, e))
        .and_then(|text| transform(&text, &name))
        .and_then(|structured| write_atomic(&output, &structured.text).map(|()| structured));

    match result {
        Ok(structured) => {
            let mut warnings = Vec::new();
            archive_input(input, done_dir, &mut warnings);
            info!(output = %output.display(), parents = structured.stats.parents, "structured");
            FileReport {
                input: input.to_path_buf(),
                outcome: FileOutcome::Structured {
                    output,
                    stats: structured.stats,
                },
                warnings,
            }
        }
        Err(err) => {
            error!(error = %err, "file failed");
            match write_atomic(&diagnostic, &render_diagnostic(&err)) {
                Ok(()) => FileReport::failed(input, Some(diagnostic), err.to_string()),
                Err(write_err) => {
                    error!(error = %write_err, "could not write diagnostic");
                    FileReport::failed(input, None, format!("{err}; {write_err}"))
                }
            }
        }
    }
}
