//! Per-file outcomes and their aggregation.

use std::path::PathBuf;

use serde::Serialize;

use qastruct_shared::StructureStats;

use crate::stamp::RunStamp;

// ---------------------------------------------------------------------------
// Run status
// ---------------------------------------------------------------------------

/// Aggregate state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every file succeeded without warnings.
    Clean,
    /// The run finished but some files failed or produced warnings.
    CompletedWithIssues,
    /// The run could not proceed at all.
    Fatal,
}

impl RunStatus {
    /// Process exit code for this status.
    pub const fn exit_code(self) -> u8 {
        match self {
            RunStatus::Clean => 0,
            RunStatus::Fatal => 1,
            RunStatus::CompletedWithIssues => 2,
        }
    }

    /// The more severe of two statuses.
    pub fn worst(self, other: RunStatus) -> RunStatus {
        self.max(other)
    }
}

// ---------------------------------------------------------------------------
// File reports
// ---------------------------------------------------------------------------

/// What happened to one input file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Structured document written.
    Structured {
        output: PathBuf,
        stats: StructureStats,
    },
    /// Department documents written.
    Split {
        outputs: Vec<PathBuf>,
        sections: usize,
    },
    /// Nothing but (at most) a diagnostic artifact written.
    Failed {
        diagnostic: Option<PathBuf>,
        reason: String,
    },
}

/// Outcome of one input file plus any non-fatal warnings.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl FileReport {
    pub fn failed(input: impl Into<PathBuf>, diagnostic: Option<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            outcome: FileOutcome::Failed {
                diagnostic,
                reason: reason.into(),
            },
            warnings: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, FileOutcome::Failed { .. })
    }

    /// Short display name of the input.
    pub fn name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}

// ---------------------------------------------------------------------------
// Batch report
// ---------------------------------------------------------------------------

/// Everything one batch stage did.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub stage: &'static str,
    pub stamp: RunStamp,
    pub files: Vec<FileReport>,
    pub totals: StructureStats,
}

impl BatchReport {
    pub fn new(stage: &'static str, stamp: &RunStamp, files: Vec<FileReport>) -> Self {
        let mut totals = StructureStats::default();
        for file in &files {
            if let FileOutcome::Structured { stats, .. } = &file.outcome {
                totals += *stats;
            }
        }

        Self {
            stage,
            stamp: stamp.clone(),
            files,
            totals,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    pub fn warnings(&self) -> usize {
        self.files.iter().map(|f| f.warnings.len()).sum()
    }

    /// `Clean` only when every file succeeded without warnings.
    pub fn status(&self) -> RunStatus {
        if self.failed() == 0 && self.warnings() == 0 {
            RunStatus::Clean
        } else {
            RunStatus::CompletedWithIssues
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structured(name: &str, parents: usize) -> FileReport {
        FileReport {
            input: PathBuf::from(name),
            outcome: FileOutcome::Structured {
                output: PathBuf::from(format!("out/{name}")),
                stats: StructureStats {
                    parents,
                    primaries: parents,
                    follow_ups: 0,
                },
            },
            warnings: Vec::new(),
        }
    }

    #[test]
    fn all_success_is_clean() {
        let report = BatchReport::new(
            "structure",
            &RunStamp::now(),
            vec![structured("a.txt", 2), structured("b.txt", 1)],
        );
        assert_eq!(report.status(), RunStatus::Clean);
        assert_eq!(report.totals.parents, 3);
        assert_eq!(report.status().exit_code(), 0);
    }

    #[test]
    fn failures_and_warnings_are_issues() {
        let failed = BatchReport::new(
            "structure",
            &RunStamp::now(),
            vec![structured("a.txt", 1), FileReport::failed("b.txt", None, "bad")],
        );
        assert_eq!(failed.failed(), 1);
        assert_eq!(failed.status(), RunStatus::CompletedWithIssues);
        assert_eq!(failed.status().exit_code(), 2);

        let mut warned = structured("c.txt", 1);
        warned.warnings.push("could not move input".into());
        let report = BatchReport::new("structure", &RunStamp::now(), vec![warned]);
        assert_eq!(report.status(), RunStatus::CompletedWithIssues);
    }

    #[test]
    fn worst_status_wins() {
        assert_eq!(RunStatus::Clean.worst(RunStatus::CompletedWithIssues), RunStatus::CompletedWithIssues);
        assert_eq!(RunStatus::Fatal.worst(RunStatus::Clean), RunStatus::Fatal);
        assert_eq!(RunStatus::Fatal.exit_code(), 1);
    }

    #[test]
    fn report_serializes_outcome_inline() {
        let report = BatchReport::new("structure", &RunStamp::now(), vec![structured("a.txt", 1)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stage"], "structure");
        assert_eq!(json["files"][0]["status"], "structured");
        assert_eq!(json["files"][0]["stats"]["parents"], 1);
        assert!(json["files"][0].get("warnings").is_none());
    }
}
