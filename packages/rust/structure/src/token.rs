//! Line tokenization: markers and question/answer tags.
//!
//! A line is a marker only when, trimmed, it is exactly one marker token.
//! Marker text anywhere else on a line is reported as embedded, never
//! treated as structure.

use qastruct_shared::Marker;

use crate::lines::is_blank;

/// Classification of a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineToken<'a> {
    /// Whitespace only.
    Blank,
    /// A standalone marker line.
    Marker(Marker),
    /// Ordinary content (may still contain embedded marker text).
    Text(&'a str),
}

/// Classify one line.
pub fn classify(line: &str) -> LineToken<'_> {
    if is_blank(line) {
        return LineToken::Blank;
    }
    let trimmed = line.trim();
    Marker::ALL
        .into_iter()
        .find(|m| m.token() == trimmed)
        .map_or(LineToken::Text(line), LineToken::Marker)
}

/// The marker this line stands for, if it is a standalone marker line.
pub fn marker_of(line: &str) -> Option<Marker> {
    match classify(line) {
        LineToken::Marker(m) => Some(m),
        _ => None,
    }
}

/// Marker tokens appearing inside ordinary text on this line.
pub fn embedded_markers(line: &str) -> Vec<Marker> {
    match classify(line) {
        LineToken::Text(text) => Marker::ALL
            .into_iter()
            .filter(|m| text.contains(m.token()))
            .collect(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Prefix marking the first line of a question or an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Question,
    Answer,
}

impl Tag {
    /// Literal prefix, trailing space included.
    pub const fn prefix(self) -> &'static str {
        match self {
            Tag::Question => "[Q] ",
            Tag::Answer => "[A] ",
        }
    }
}

/// Split a leading tag off a line.
pub fn split_tag(line: &str) -> (Option<Tag>, &str) {
    for tag in [Tag::Question, Tag::Answer] {
        if let Some(rest) = line.strip_prefix(tag.prefix()) {
            return (Some(tag), rest);
        }
    }
    (None, line)
}

/// Prefix `line` with `tag` unless it already carries that tag.
pub fn apply_tag(line: &str, tag: Tag) -> String {
    match split_tag(line) {
        (Some(existing), _) if existing == tag => line.to_string(),
        _ => format!("{}{line}", tag.prefix()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standalone_markers_are_recognized_after_trim() {
        assert_eq!(classify("[PARENT]"), LineToken::Marker(Marker::Parent));
        assert_eq!(classify("  [CHILD]\t"), LineToken::Marker(Marker::Child));
        assert_eq!(marker_of("[QA_SPLIT]"), Some(Marker::Divider));
        assert_eq!(classify("  "), LineToken::Blank);
        assert_eq!(classify("hello"), LineToken::Text("hello"));
    }

    #[test]
    fn embedded_marker_is_text_not_structure() {
        let line = "see [CHILD] below";
        assert_eq!(marker_of(line), None);
        assert_eq!(embedded_markers(line), vec![Marker::Child]);
        assert!(embedded_markers("[CHILD]").is_empty());
        assert_eq!(
            embedded_markers("[PARENT][QA_SPLIT]"),
            vec![Marker::Parent, Marker::Divider]
        );
    }

    #[test]
    fn lowercase_marker_is_plain_text() {
        assert_eq!(marker_of("[parent]"), None);
        assert!(embedded_markers("[parent]").is_empty());
    }

    #[test]
    fn tagging_is_idempotent() {
        let once = apply_tag("How much?", Tag::Question);
        assert_eq!(once, "[Q] How much?");
        assert_eq!(apply_tag(&once, Tag::Question), once);
        assert_eq!(split_tag(&once), (Some(Tag::Question), "How much?"));
    }

    #[test]
    fn tag_requires_trailing_space() {
        assert_eq!(split_tag("[Q]x"), (None, "[Q]x"));
        assert_eq!(apply_tag("[Q]x", Tag::Question), "[Q] [Q]x");
    }
}
