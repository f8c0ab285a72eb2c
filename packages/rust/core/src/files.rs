//! Filesystem helpers and the per-file worker runners.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use qastruct_shared::{QaStructError, Result};

use crate::pipeline::ProgressReporter;
use crate::report::FileReport;

/// Regular files in `dir` with the given extension, sorted by name.
///
/// A missing directory or an empty listing is an error: there is nothing
/// for the stage to do.
pub fn list_inputs(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(QaStructError::validation(format!(
            "input directory does not exist: {}",
            dir.display()
        )));
    }

    let entries = std::fs::read_dir(dir).map_err(|e| QaStructError::io(dir, e))?;
    let mut inputs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| QaStructError::io(dir, e))?.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            inputs.push(path);
        }
    }
    inputs.sort();

    if inputs.is_empty() {
        return Err(QaStructError::validation(format!(
            "no *.{extension} files found in {}",
            dir.display()
        )));
    }

    debug!(dir = %dir.display(), count = inputs.len(), "inputs listed");
    Ok(inputs)
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| QaStructError::io(dir, e))
}

/// Hidden temp file next to `target`.
fn temp_path(target: &Path) -> PathBuf {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(format!(".{name}.tmp"))
}

/// Write `contents` to `target` via a temp file in the same directory and a rename.
pub fn write_atomic(target: &Path, contents: &str) -> Result<()> {
    write_all_atomic(&[(target.to_path_buf(), contents)])
}

/// Write several files so that either all of them land or none do.
///
/// Every document goes to its temp file first; targets are renamed into
/// place only once all temp writes succeeded. If a rename fails, targets
/// already renamed by this call are removed again.
pub fn write_all_atomic<S: AsRef<str>>(files: &[(PathBuf, S)]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());
    for (target, contents) in files {
        let temp = temp_path(target);
        if let Err(e) = std::fs::write(&temp, contents.as_ref()) {
            discard(staged.iter().map(|(temp, _)| temp.as_path()));
            return Err(QaStructError::io(&temp, e));
        }
        staged.push((temp, target.as_path()));
    }

    for (idx, (temp, target)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(temp, target) {
            discard(staged[..idx].iter().map(|(_, target)| *target));
            discard(staged[idx..].iter().map(|(temp, _)| temp.as_path()));
            return Err(QaStructError::io(*target, e));
        }
    }
    Ok(())
}

fn discard<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            debug!(path = %path.display(), error = %e, "could not remove partial output");
        }
    }
}

/// Move a processed input into `done_dir`, keeping its name.
pub fn move_to_done(input: &Path, done_dir: &Path) -> Result<PathBuf> {
    ensure_dir(done_dir)?;
    let name = input
        .file_name()
        .ok_or_else(|| QaStructError::validation(format!("not a file path: {}", input.display())))?;
    let target = done_dir.join(name);
    std::fs::rename(input, &target).map_err(|e| QaStructError::io(input, e))?;
    Ok(target)
}

/// Move the input aside if configured, turning a failure into a warning.
pub(crate) fn archive_input(input: &Path, done_dir: Option<&Path>, warnings: &mut Vec<String>) {
    let Some(done_dir) = done_dir else {
        return;
    };
    match move_to_done(input, done_dir) {
        Ok(target) => debug!(to = %target.display(), "input moved to done"),
        Err(e) => {
            warn!(input = %input.display(), error = %e, "could not move input to done");
            warnings.push(format!("could not move input to done: {e}"));
        }
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run `work` on each input on the blocking pool, at most `concurrency` at a time.
///
/// Reports come back in input order whatever order the workers finish in.
pub(crate) async fn for_each_file<F>(
    inputs: Vec<PathBuf>,
    concurrency: u32,
    progress: &dyn ProgressReporter,
    work: F,
) -> Vec<FileReport>
where
    F: Fn(&Path) -> FileReport + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1) as usize));
    let work = Arc::new(work);
    let total = inputs.len();

    let mut handles = Vec::with_capacity(total);
    for (idx, input) in inputs.into_iter().enumerate() {
        progress.file_started(&display_name(&input), idx + 1, total);

        let sem = Arc::clone(&semaphore);
        let work = Arc::clone(&work);
        let task_input = input.clone();
        let handle = tokio::spawn(async move {
            let _permit = sem.acquire_owned().await;
            tokio::task::spawn_blocking(move || (*work)(&task_input)).await
        });
        handles.push((input, handle));
    }

    let mut reports = Vec::with_capacity(total);
    for (input, handle) in handles {
        let joined = match handle.await {
            Ok(inner) => inner,
            Err(e) => Err(e),
        };
        let report = report_or_failure(input, joined);
        progress.file_finished(&report);
        reports.push(report);
    }
    reports
}

/// Run `work` on each input strictly in input order, one file at a time.
///
/// For stages whose outputs may collide across inputs: the last input wins.
pub(crate) async fn for_each_file_in_order<F>(
    inputs: Vec<PathBuf>,
    progress: &dyn ProgressReporter,
    work: F,
) -> Vec<FileReport>
where
    F: Fn(&Path) -> FileReport + Send + Sync + 'static,
{
    let work = Arc::new(work);
    let total = inputs.len();

    let mut reports = Vec::with_capacity(total);
    for (idx, input) in inputs.into_iter().enumerate() {
        progress.file_started(&display_name(&input), idx + 1, total);

        let work = Arc::clone(&work);
        let task_input = input.clone();
        let joined = tokio::task::spawn_blocking(move || (*work)(&task_input)).await;

        let report = report_or_failure(input, joined);
        progress.file_finished(&report);
        reports.push(report);
    }
    reports
}

fn report_or_failure(
    input: PathBuf,
    joined: std::result::Result<FileReport, tokio::task::JoinError>,
) -> FileReport {
    joined.unwrap_or_else(|e| {
        warn!(input = %input.display(), error = %e, "worker task failed");
        FileReport::failed(input, None, format!("worker task failed: {e}"))
    })
}
