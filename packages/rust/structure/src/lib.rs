//! Structuring engine: marker-tagged transcripts → structured Q/A documents.
//!
//! Stages, each a pure function returning a new value:
//! 1. [`segment`]: split lines into parent/child [`Span`]s
//! 2. [`validate`]: enforce the marker grammar, collecting [`Violation`]s
//! 3. [`build_child`]: rebuild one child block as a tagged sub-block
//! 4. [`transform`]: assemble and serialize the whole document
//!
//! Failed files are rendered with [`render_diagnostic`] instead.
//!
//! [`Violation`]: qastruct_shared::Violation

pub mod builder;
pub mod diagnostic;
pub mod lines;
pub mod segment;
pub mod token;
pub mod transform;
pub mod validate;

pub use builder::{ChildRole, build_child};
pub use diagnostic::render_diagnostic;
pub use segment::{Span, segment_children, segment_parents};
pub use token::{LineToken, Tag, classify};
pub use transform::{Structured, date_from_filename, extract_department, transform, transform_lines};
pub use validate::validate;

/// Validate a text without transforming it.
pub fn check(text: &str) -> Vec<qastruct_shared::Violation> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();
    validate(&lines)
}
