//! Department stage: structured documents → one document per department.

use std::path::{Path, PathBuf};

use tracing::{error, info, instrument, warn};

use qastruct_department::split_by_department;
use qastruct_shared::{BatchConfig, QaStructError, Result};

use crate::files::{
    archive_input, display_name, ensure_dir, for_each_file_in_order, list_inputs, write_all_atomic,
};
use crate::pipeline::ProgressReporter;
use crate::report::{BatchReport, FileOutcome, FileReport};
use crate::stamp::RunStamp;

/// Split every structured file of `config.input_dir` by department.
///
/// Outputs land in `{output_dir}/{stamp}/`. Files run one at a time in
/// input order: two inputs with the same date and department write the same
/// output name, and the later input wins.
#[instrument(skip_all, fields(input = %config.input_dir.display(), stamp = %stamp))]
pub async fn run_departments(
    config: &BatchConfig,
    stamp: &RunStamp,
    progress: &dyn ProgressReporter,
) -> Result<BatchReport> {
    progress.phase("Splitting by department");

    let inputs = list_inputs(&config.input_dir, &config.extension)?;
    let output_dir = config.output_dir.join(stamp.as_str());
    ensure_dir(&output_dir)?;
    info!(files = inputs.len(), output = %output_dir.display(), "department batch");

    let done_dir = config.move_done.then(|| config.done_dir());
    let run_stamp = stamp.clone();
    let files = for_each_file_in_order(inputs, progress, move |input| {
        split_file(input, &output_dir, done_dir.as_deref(), &run_stamp)
    })
    .await;

    let report = BatchReport::new("department", stamp, files);
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        warnings = report.warnings(),
        "department split finished"
    );
    Ok(report)
}

/// Split one file. Nothing is written for a file that fails: its department
/// documents land together or not at all.
#[instrument(skip_all, fields(file = %display_name(input)))]
pub fn split_file(input: &Path, output_dir: &Path, done_dir: Option<&Path>, stamp: &RunStamp) -> FileReport {
    let text = match std::fs::read_to_string(input).map_err(|e| QaStructError::io(input, e)) {
        Ok(text) => text,
        Err(err) => {
            error!(error = %err, "file failed");
            return FileReport::failed(input, None, err.to_string());
        }
    };

    let split = split_by_department(&text, stamp.as_str());
    let mut warnings = Vec::new();

    let files: Vec<(PathBuf, &str)> = split
        .documents
        .iter()
        .map(|document| (output_dir.join(&document.file_name), document.text.as_str()))
        .collect();

    for ((target, _), document) in files.iter().zip(&split.documents) {
        if target.exists() {
            warn!(output = %target.display(), "overwriting department document");
            warnings.push(format!("overwrote {}", document.file_name));
        }
    }

    if let Err(err) = write_all_atomic(&files) {
        error!(error = %err, "file failed");
        return FileReport::failed(input, None, err.to_string());
    }

    for document in &split.documents {
        info!(department = %document.department, sections = document.sections, "department document written");
    }
    let outputs: Vec<PathBuf> = files.into_iter().map(|(target, _)| target).collect();

    if outputs.is_empty() {
        warn!("no sections found");
        warnings.push("no sections found".to_string());
    }

    archive_input(input, done_dir, &mut warnings);
    FileReport {
        input: input.to_path_buf(),
        outcome: FileOutcome::Split {
            outputs,
            sections: split.section_count(),
        },
        warnings,
    }
}
