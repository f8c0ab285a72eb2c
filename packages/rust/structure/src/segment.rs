//! Index-based block segmentation.
//!
//! Blocks are half-open [`Span`]s into the original line slice; nothing is
//! copied, so validation and transformation always see the same boundaries.

use std::ops::Range;

use qastruct_shared::Marker;

use crate::token::marker_of;

/// Half-open range of line indices `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Index of the marker line opening the block.
    pub start: usize,
    /// One past the last line of the block.
    pub end: usize,
}

impl Span {
    /// The whole block, marker line included.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The block without its opening marker line.
    pub fn content(&self) -> Range<usize> {
        (self.start + 1).min(self.end)..self.end
    }
}

/// One span per `[PARENT]` line; the last one runs to the end of the document.
pub fn segment_parents<S: AsRef<str>>(lines: &[S]) -> Vec<Span> {
    segment_by(
        lines,
        Span {
            start: 0,
            end: lines.len(),
        },
        Marker::Parent,
    )
}

/// One span per `[CHILD]` line inside `parent`.
pub fn segment_children<S: AsRef<str>>(lines: &[S], parent: Span) -> Vec<Span> {
    segment_by(lines, parent, Marker::Child)
}

/// Absolute indices of `[QA_SPLIT]` lines inside `child`.
pub fn divider_positions<S: AsRef<str>>(lines: &[S], child: Span) -> Vec<usize> {
    child
        .range()
        .filter(|&i| marker_of(lines[i].as_ref()) == Some(Marker::Divider))
        .collect()
}

fn segment_by<S: AsRef<str>>(lines: &[S], within: Span, marker: Marker) -> Vec<Span> {
    let starts: Vec<usize> = within
        .range()
        .filter(|&i| marker_of(lines[i].as_ref()) == Some(marker))
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(k, &start)| Span {
            start,
            end: starts.get(k + 1).copied().unwrap_or(within.end),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: [&str; 10] = [
        "preamble",
        "[PARENT]",
        "[CHILD]",
        "q",
        "[QA_SPLIT]",
        "a",
        "[CHILD]",
        "[PARENT]",
        "  [CHILD]  ",
        "x",
    ];

    #[test]
    fn parents_split_at_each_marker() {
        let parents = segment_parents(&DOC);
        assert_eq!(
            parents,
            vec![Span { start: 1, end: 7 }, Span { start: 7, end: 10 }]
        );
    }

    #[test]
    fn children_stay_inside_their_parent() {
        let parents = segment_parents(&DOC);
        let first = segment_children(&DOC, parents[0]);
        assert_eq!(
            first,
            vec![Span { start: 2, end: 6 }, Span { start: 6, end: 7 }]
        );
        let second = segment_children(&DOC, parents[1]);
        assert_eq!(second, vec![Span { start: 8, end: 10 }]);
    }

    #[test]
    fn dividers_are_found_by_absolute_index() {
        let parents = segment_parents(&DOC);
        let children = segment_children(&DOC, parents[0]);
        assert_eq!(divider_positions(&DOC, children[0]), vec![4]);
        assert!(divider_positions(&DOC, children[1]).is_empty());
    }

    #[test]
    fn no_parent_yields_no_spans() {
        assert!(segment_parents::<&str>(&[]).is_empty());
        assert!(segment_parents(&["[CHILD]", "text"]).is_empty());
    }

    #[test]
    fn content_excludes_marker_line() {
        let span = Span { start: 3, end: 6 };
        assert_eq!(span.content(), 4..6);
        assert_eq!(Span { start: 5, end: 5 }.content(), 5..5);
    }
}
