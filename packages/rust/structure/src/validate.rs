//! Grammar checks run before any transformation.
//!
//! Violations accumulate across blocks. The only early exit is a document
//! without a single `[PARENT]` line, where block indices mean nothing.

use tracing::{debug, instrument};

use qastruct_shared::{Marker, Violation};

use crate::lines::next_non_blank;
use crate::segment::{Span, divider_positions, segment_children, segment_parents};
use crate::token::embedded_markers;

/// Check `lines` against the marker grammar. An empty result means accepted.
#[instrument(skip_all, fields(lines = lines.len()))]
pub fn validate<S: AsRef<str>>(lines: &[S]) -> Vec<Violation> {
    let mut violations = embedded_marker_violations(lines);

    let parents = segment_parents(lines);
    if parents.is_empty() {
        violations.push(Violation::NoParent);
        return violations;
    }

    for (p_idx, parent) in parents.iter().enumerate() {
        let parent_no = p_idx + 1;
        let children = segment_children(lines, *parent);
        if children.is_empty() {
            debug!(parent = parent_no, start = parent.start, "parent block without child");
            log_block(lines, *parent);
            violations.push(Violation::MissingChild { parent: parent_no });
            continue;
        }

        for (c_idx, child) in children.iter().enumerate() {
            if let Some(v) = check_child(lines, *child, parent_no, c_idx + 1) {
                violations.push(v);
            }
        }
    }

    debug!(count = violations.len(), "validation finished");
    violations
}

fn embedded_marker_violations<S: AsRef<str>>(lines: &[S]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        for marker in embedded_markers(line) {
            debug!(line_no = idx + 1, %marker, text = line, "marker shares its line");
            violations.push(Violation::EmbeddedMarker {
                line: idx + 1,
                marker,
                text: line.to_string(),
            });
        }
    }
    violations
}

/// First failing check for one child block, in grammar order.
fn check_child<S: AsRef<str>>(
    lines: &[S],
    child: Span,
    parent: usize,
    child_no: usize,
) -> Option<Violation> {
    let dividers = divider_positions(lines, child);
    let divider = match dividers.as_slice() {
        [] => {
            return Some(Violation::MissingDivider {
                parent,
                child: child_no,
            });
        }
        [single] => *single,
        many => {
            return Some(Violation::MultipleDividers {
                parent,
                child: child_no,
                count: many.len(),
            });
        }
    };

    match next_non_blank(lines, child.start + 1) {
        Some(q) if q < divider => {}
        _ => {
            return Some(Violation::MissingQuestion {
                parent,
                child: child_no,
            });
        }
    }

    match next_non_blank(lines, divider + 1) {
        Some(a) if a < child.end => None,
        _ => Some(Violation::MissingAnswer {
            parent,
            child: child_no,
        }),
    }
}

fn log_block<S: AsRef<str>>(lines: &[S], span: Span) {
    for (offset, line) in lines[span.range()].iter().enumerate() {
        debug!(offset = offset + 1, text = line.as_ref(), "block line");
    }
}
