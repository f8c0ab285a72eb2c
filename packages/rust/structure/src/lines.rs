//! Blank-line helpers over ordered line sequences.
//!
//! Everything here is a pure function: slices in, sub-slices or new vectors out.

/// Blank lines every serialized document starts with.
pub const LEADING_BLANKS: usize = 2;

/// A line is blank when it holds nothing but whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Index of the first non-blank line at or after `from`.
pub fn next_non_blank<S: AsRef<str>>(lines: &[S], from: usize) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, line)| !is_blank(line.as_ref()))
        .map(|(i, _)| i)
}

/// Drop trailing blank lines, keeping interior ones.
pub fn trim_trailing_blank<S: AsRef<str>>(lines: &[S]) -> &[S] {
    let end = lines
        .iter()
        .rposition(|line| !is_blank(line.as_ref()))
        .map_or(0, |i| i + 1);
    &lines[..end]
}

/// Drop leading blank lines, keeping interior ones.
pub fn trim_leading_blank<S: AsRef<str>>(lines: &[S]) -> &[S] {
    let start = lines
        .iter()
        .position(|line| !is_blank(line.as_ref()))
        .unwrap_or(lines.len());
    &lines[start..]
}

/// Collapse every run of blank lines to a single blank line.
///
/// The first [`LEADING_BLANKS`] lines are kept verbatim so the mandated
/// document head survives.
pub fn collapse_blank_runs(lines: Vec<String>) -> Vec<String> {
    if lines.len() <= LEADING_BLANKS {
        return lines;
    }

    let mut out = Vec::with_capacity(lines.len());
    let mut prev_blank = false;

    for (i, line) in lines.into_iter().enumerate() {
        if i < LEADING_BLANKS {
            out.push(line);
            continue;
        }
        let blank = is_blank(&line);
        if blank && prev_blank {
            continue;
        }
        prev_blank = blank;
        out.push(line);
    }

    out
}

/// Join lines with `\n` and end the text with exactly one terminator.
pub fn render_document<S: AsRef<str>>(lines: &[S]) -> String {
    let joined = lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    let trimmed = joined.trim_end_matches('\n');
    format!("{trimmed}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn blank_detection_ignores_whitespace() {
        assert!(is_blank(""));
        assert!(is_blank("   \t"));
        assert!(is_blank("\u{3000}"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn next_non_blank_skips_from_index() {
        let lines = ["a", "", " ", "b"];
        assert_eq!(next_non_blank(&lines, 0), Some(0));
        assert_eq!(next_non_blank(&lines, 1), Some(3));
        assert_eq!(next_non_blank(&lines, 4), None);
        assert_eq!(next_non_blank(&["", ""], 0), None);
    }

    #[test]
    fn trims_keep_interior_blanks() {
        let lines = ["", "a", "", "b", "", ""];
        assert_eq!(trim_trailing_blank(&lines), &["", "a", "", "b"]);
        assert_eq!(trim_leading_blank(&lines), &["a", "", "b", "", ""]);
        let empty: [&str; 2] = ["", " "];
        assert!(trim_trailing_blank(&empty).is_empty());
        assert!(trim_leading_blank(&empty).is_empty());
    }

    #[test]
    fn collapse_protects_document_head() {
        let lines = owned(&["", "", "a", "", "", "", "b", "", ""]);
        assert_eq!(
            collapse_blank_runs(lines),
            owned(&["", "", "a", "", "b", ""])
        );
    }

    #[test]
    fn collapse_short_input_untouched() {
        assert_eq!(collapse_blank_runs(owned(&["", ""])), owned(&["", ""]));
    }

    #[test]
    fn render_ends_with_single_newline() {
        assert_eq!(render_document(&["a", "b", "", ""]), "a\nb\n");
        assert_eq!(render_document(&["", "", "x"]), "\n\nx\n");
        assert_eq!(render_document::<&str>(&[]), "\n");
    }
}
