//! Core domain types for QaStruct documents.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Marker
// ---------------------------------------------------------------------------

/// Sentinel tokens that delimit the block structure of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// Opens a question-answer record.
    Parent,
    /// Opens a primary or follow-up exchange inside a record.
    Child,
    /// Separates a child's question from its answer.
    Divider,
}

impl Marker {
    /// All markers, in the order they are scanned for.
    pub const ALL: [Marker; 3] = [Marker::Parent, Marker::Child, Marker::Divider];

    /// The literal token as it appears in documents.
    pub const fn token(self) -> &'static str {
        match self {
            Marker::Parent => "[PARENT]",
            Marker::Child => "[CHILD]",
            Marker::Divider => "[QA_SPLIT]",
        }
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

// ---------------------------------------------------------------------------
// Violation
// ---------------------------------------------------------------------------

/// A single grammar violation found while validating a document.
///
/// Block indices are 1-based and counted in document order; child indices
/// restart for each parent block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A marker token shares its line with other text.
    EmbeddedMarker {
        line: usize,
        marker: Marker,
        text: String,
    },
    /// The document has no parent marker at all.
    NoParent,
    /// A parent block has no child block.
    MissingChild { parent: usize },
    /// A child block has no divider.
    MissingDivider { parent: usize, child: usize },
    /// A child block has more than one divider.
    MultipleDividers {
        parent: usize,
        child: usize,
        count: usize,
    },
    /// Nothing but blank lines between the child marker and the divider.
    MissingQuestion { parent: usize, child: usize },
    /// Nothing but blank lines after the divider.
    MissingAnswer { parent: usize, child: usize },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::EmbeddedMarker { line, marker, text } => {
                write!(f, "line {line}: marker {marker} is not alone on its line: {text:?}")
            }
            Violation::NoParent => write!(f, "no {} marker found", Marker::Parent),
            Violation::MissingChild { parent } => {
                write!(f, "parent block {parent}: no {} marker", Marker::Child)
            }
            Violation::MissingDivider { parent, child } => write!(
                f,
                "parent block {parent} / child block {child}: no {} marker",
                Marker::Divider
            ),
            Violation::MultipleDividers {
                parent,
                child,
                count,
            } => write!(
                f,
                "parent block {parent} / child block {child}: multiple {} markers ({count})",
                Marker::Divider
            ),
            Violation::MissingQuestion { parent, child } => write!(
                f,
                "parent block {parent} / child block {child}: no question line between {} and {}",
                Marker::Child,
                Marker::Divider
            ),
            Violation::MissingAnswer { parent, child } => write!(
                f,
                "parent block {parent} / child block {child}: no answer line after {}",
                Marker::Divider
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Dates and record identifiers
// ---------------------------------------------------------------------------

/// The meeting date a structured file is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileDate(pub NaiveDate);

impl FileDate {
    /// `YYYYMMDD`, used inside record identifiers.
    pub fn id_digits(&self) -> String {
        format!(
            "{:04}{:02}{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }

    /// Record identifier for the `seq`-th parent block of the file.
    pub fn record_id(&self, seq: usize) -> RecordId {
        RecordId { date: *self, seq }
    }
}

impl std::fmt::Display for FileDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Date-plus-sequence name of one parent block (`20240115-001`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId {
    pub date: FileDate,
    pub seq: usize,
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:03}", self.date.id_digits(), self.seq)
    }
}

/// Header line labels of a structured parent block.
///
/// Written by the structuring engine and read back by the department splitter.
pub mod header {
    /// `# Record ID: 20240115-001`
    pub const RECORD_ID: &str = "# Record ID:";
    /// `- Date: 2024-01-15`
    pub const DATE: &str = "- Date:";
    /// `- Department: Finance`
    pub const DEPARTMENT: &str = "- Department:";
}

// ---------------------------------------------------------------------------
// Per-file statistics
// ---------------------------------------------------------------------------

/// Block counts for one structured file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureStats {
    /// Parent blocks (records) emitted.
    pub parents: usize,
    /// Primary exchanges emitted (one per parent).
    pub primaries: usize,
    /// Follow-up exchanges emitted.
    pub follow_ups: usize,
}

impl std::ops::AddAssign for StructureStats {
    fn add_assign(&mut self, rhs: Self) {
        self.parents += rhs.parents;
        self.primaries += rhs.primaries;
        self.follow_ups += rhs.follow_ups;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> FileDate {
        FileDate(NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
    }

    #[test]
    fn record_id_is_zero_padded() {
        let d = date(2024, 1, 15);
        assert_eq!(d.to_string(), "2024-01-15");
        assert_eq!(d.record_id(1).to_string(), "20240115-001");
        assert_eq!(d.record_id(42).to_string(), "20240115-042");
        assert_eq!(d.record_id(1000).to_string(), "20240115-1000");
    }

    #[test]
    fn violation_messages_name_the_block() {
        let v = Violation::MultipleDividers {
            parent: 1,
            child: 2,
            count: 2,
        };
        assert_eq!(
            v.to_string(),
            "parent block 1 / child block 2: multiple [QA_SPLIT] markers (2)"
        );
        assert_eq!(Violation::NoParent.to_string(), "no [PARENT] marker found");
    }

    #[test]
    fn violation_serializes_with_kind_tag() {
        let v = Violation::EmbeddedMarker {
            line: 3,
            marker: Marker::Child,
            text: "see [CHILD] here".into(),
        };
        let json = serde_json::to_value(&v).expect("serialize");
        assert_eq!(json["kind"], "embedded_marker");
        assert_eq!(json["marker"], "child");
        assert_eq!(json["line"], 3);
    }

    #[test]
    fn stats_accumulate() {
        let mut total = StructureStats::default();
        total += StructureStats {
            parents: 2,
            primaries: 2,
            follow_ups: 3,
        };
        total += StructureStats {
            parents: 1,
            primaries: 1,
            follow_ups: 0,
        };
        assert_eq!(total.parents, 3);
        assert_eq!(total.follow_ups, 3);
    }
}
