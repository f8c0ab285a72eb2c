//! Diagnostic artifact written in place of a structured document.

use qastruct_shared::QaStructError;

use crate::lines::{LEADING_BLANKS, render_document};

/// Headline for grammar failures.
pub const INVALID_HEADLINE: &str = "ERROR: input file structure is invalid.";

/// Headline for every other file-level failure.
pub const UNEXPECTED_HEADLINE: &str = "ERROR: an unexpected error occurred while structuring.";

/// Render the diagnostic document for a failed file.
///
/// Grammar failures list one bullet per violation; anything else gets a
/// single bullet with the error summary.
pub fn render_diagnostic(err: &QaStructError) -> String {
    let mut lines: Vec<String> = vec![String::new(); LEADING_BLANKS];

    match err {
        QaStructError::Structure { violations } => {
            lines.push(INVALID_HEADLINE.to_string());
            lines.extend(violations.iter().map(|v| format!("- {v}")));
        }
        other => {
            lines.push(UNEXPECTED_HEADLINE.to_string());
            lines.push(format!("- {other}"));
        }
    }

    render_document(&lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qastruct_shared::Violation;

    #[test]
    fn violations_become_bullets() {
        let err = QaStructError::Structure {
            violations: vec![Violation::NoParent],
        };
        assert_eq!(
            render_diagnostic(&err),
            "\n\nERROR: input file structure is invalid.\n- no [PARENT] marker found\n"
        );
    }

    #[test]
    fn other_errors_get_one_summary_line() {
        let err = QaStructError::FilenameDate {
            name: "notes.txt".into(),
        };
        let text = render_diagnostic(&err);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], UNEXPECTED_HEADLINE);
        assert!(lines[3].starts_with("- file name \"notes.txt\""));
    }
}
