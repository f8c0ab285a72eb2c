//! Department splitter: regroups structured records into one document per
//! department.
//!
//! Input is the output of the structuring engine. Every `[PARENT]` line opens
//! a section; the section's `- Department:` header decides which output
//! document it lands in. Departments keep the order of their first
//! appearance and sections keep their order inside each department.

pub mod naming;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use qastruct_shared::types::header;
use qastruct_structure::lines::{LEADING_BLANKS, render_document, trim_leading_blank, trim_trailing_blank};
use qastruct_structure::segment_parents;

pub use naming::{UNASSIGNED, date_for_filename, output_file_name, sanitize_department};

/// `- Department: …` header, also accepted in its localized form.
static DEPARTMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:{}|- 部署:)(.*)",
        regex::escape(header::DEPARTMENT)
    ))
    .expect("department header regex")
});

/// `- Date: …` header, also accepted in its localized form.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:{}|- 日付:)\s*(.+)",
        regex::escape(header::DATE)
    ))
    .expect("date header regex")
});

/// One output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentDocument {
    /// Department name as written in the headers (empty → [`UNASSIGNED`]).
    pub department: String,
    /// `{date}_{department}.txt`, safe to use as a file name.
    pub file_name: String,
    /// Number of sections collected into this document.
    pub sections: usize,
    /// Serialized document, ending with a single `\n`.
    pub text: String,
}

/// Result of splitting one structured file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Date label used in every output file name.
    pub date: String,
    /// Documents in first-appearance order of their department.
    pub documents: Vec<DepartmentDocument>,
}

impl Split {
    pub fn section_count(&self) -> usize {
        self.documents.iter().map(|d| d.sections).sum()
    }
}

/// Cut a structured document into sections at each `[PARENT]` line.
///
/// Text before the first parent marker forms its own section. Sections are
/// trimmed of surrounding blank lines; blank-only sections are dropped.
pub fn split_sections<S: AsRef<str>>(lines: &[S]) -> Vec<&[S]> {
    let parents = segment_parents(lines);
    let preamble_end = parents.first().map_or(lines.len(), |p| p.start);

    std::iter::once(&lines[..preamble_end])
        .chain(parents.iter().map(|p| &lines[p.range()]))
        .map(|section| trim_trailing_blank(trim_leading_blank(section)))
        .filter(|section| !section.is_empty())
        .collect()
}

/// Department named by the first department header of a section.
///
/// `None` when the header is missing or empty.
pub fn section_department<S: AsRef<str>>(section: &[S]) -> Option<String> {
    section
        .iter()
        .find_map(|line| DEPARTMENT_RE.captures(line.as_ref()))
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Date from the first date header anywhere in the document.
pub fn document_date<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    lines
        .iter()
        .find_map(|line| DATE_RE.captures(line.as_ref()))
        .map(|caps| caps[1].trim().to_string())
        .filter(|date| !date.is_empty())
}

/// Split a structured document by department.
///
/// `fallback_date` labels the outputs when the document carries no date
/// header (the run stamp, in batch runs).
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn split_by_department(text: &str, fallback_date: &str) -> Split {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();

    let raw_date = document_date(&lines).unwrap_or_else(|| fallback_date.to_string());
    let date = date_for_filename(&raw_date);

    let mut groups: Vec<(String, Vec<&[&str]>)> = Vec::new();
    for section in split_sections(&lines) {
        let department = section_department(section).unwrap_or_else(|| UNASSIGNED.to_string());
        match groups.iter_mut().find(|(name, _)| *name == department) {
            Some((_, sections)) => sections.push(section),
            None => groups.push((department, vec![section])),
        }
    }

    let documents = groups
        .into_iter()
        .map(|(department, sections)| {
            debug!(%department, sections = sections.len(), "department group");
            DepartmentDocument {
                file_name: output_file_name(&date, &department),
                sections: sections.len(),
                text: render_sections(&sections),
                department,
            }
        })
        .collect();

    Split { date, documents }
}

/// Two leading blanks, then the sections separated by one blank line.
fn render_sections(sections: &[&[&str]]) -> String {
    let mut out: Vec<&str> = vec![""; LEADING_BLANKS];
    for (idx, section) in sections.iter().enumerate() {
        if idx > 0 {
            out.push("");
        }
        out.extend_from_slice(section);
    }
    render_document(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRUCTURED: &str = "\n\n[PARENT]\n# Record ID: 20240115-001\n- Date: 2024-01-15\n- Department: Finance\n[Q] 【Finance】 budget\n\n[CHILD]\n## Primary Q/A\n[Q] 【Finance】 budget\n[A] yes\n\n[PARENT]\n# Record ID: 20240115-002\n- Date: 2024-01-15\n- Department: \n[Q] plain\n\n[CHILD]\n## Primary Q/A\n[Q] plain\n[A] no\n\n[PARENT]\n# Record ID: 20240115-003\n- Date: 2024-01-15\n- Department: Finance\n[Q] 【Finance】 again\n\n[CHILD]\n## Primary Q/A\n[Q] 【Finance】 again\n[A] ok\n";

    #[test]
    fn sections_drop_leading_blanks() {
        let lines: Vec<&str> = STRUCTURED.lines().collect();
        let sections = split_sections(&lines);
        assert_eq!(sections.len(), 3);
        assert!(sections.iter().all(|s| s[0] == "[PARENT]"));
        assert!(sections.iter().all(|s| !s.last().is_some_and(|l| l.is_empty())));
    }

    #[test]
    fn non_blank_preamble_is_kept_as_a_section() {
        let lines = ["cover", "", "[PARENT]", "- Department: HR"];
        let sections = split_sections(&lines);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0], ["cover"]);
    }

    #[test]
    fn groups_follow_first_appearance() {
        let split = split_by_department(STRUCTURED, "20991231000000");
        assert_eq!(split.date, "20240115");
        let names: Vec<&str> = split.documents.iter().map(|d| d.department.as_str()).collect();
        assert_eq!(names, vec!["Finance", UNASSIGNED]);
        assert_eq!(split.documents[0].sections, 2);
        assert_eq!(split.documents[0].file_name, "20240115_Finance.txt");
        assert_eq!(split.section_count(), 3);
    }

    #[test]
    fn document_layout_has_single_blank_separators() {
        let split = split_by_department(STRUCTURED, "x");
        let finance = &split.documents[0].text;
        assert!(finance.starts_with("\n\n[PARENT]\n# Record ID: 20240115-001\n"));
        assert!(finance.contains("[A] yes\n\n[PARENT]\n# Record ID: 20240115-003\n"));
        assert!(finance.ends_with("[A] ok\n"));
        assert!(!finance.contains("plain"));
    }

    #[test]
    fn missing_date_falls_back() {
        let split = split_by_department("[PARENT]\n- Department: HR\n[Q] x\n", "20260101120000");
        assert_eq!(split.date, "20260101120000");
        assert_eq!(split.documents[0].file_name, "20260101120000_HR.txt");
    }

    #[test]
    fn localized_headers_are_understood() {
        let text = "[PARENT]\n- 日付: 2024年1月5日\n- 部署: 総務\n[Q] x\n";
        let split = split_by_department(text, "x");
        assert_eq!(split.date, "20240105");
        assert_eq!(split.documents[0].department, "総務");
    }

    #[test]
    fn empty_input_yields_no_documents() {
        let split = split_by_department("\n\n\n", "x");
        assert!(split.documents.is_empty());
    }
}
