//! Batch orchestration for QaStruct.
//!
//! This crate drives the structuring engine and the department splitter over
//! directories of files: listing inputs, writing artifacts, moving processed
//! inputs aside and aggregating per-file outcomes into a [`BatchReport`].

pub mod files;
pub mod handoff;
pub mod pipeline;
pub mod report;
pub mod split;
pub mod stamp;
pub mod structure;

pub use handoff::{HandoffReport, handoff};
pub use pipeline::{PipelineReport, ProgressReporter, SilentProgress, run_pipeline};
pub use report::{BatchReport, FileOutcome, FileReport, RunStatus};
pub use split::run_departments;
pub use stamp::RunStamp;
pub use structure::run_structure;
