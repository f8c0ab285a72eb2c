//! Whole-file transformation: validated transcript → structured document.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use qastruct_shared::types::header;
use qastruct_shared::{FileDate, Marker, QaStructError, Result, StructureStats};

use crate::builder::{ChildRole, build_child, tag_first};
use crate::lines::{LEADING_BLANKS, collapse_blank_runs, render_document, trim_trailing_blank};
use crate::segment::{segment_children, segment_parents};
use crate::token::{Tag, marker_of};
use crate::validate::validate;

/// Leading `yymmdd_` of an input file name.
static FILENAME_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{2})(\d{2})_").expect("filename date regex"));

/// First `【…】` token on a line.
static DEPARTMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"【([^】]*)】").expect("department regex"));

/// A successfully structured document.
#[derive(Debug, Clone)]
pub struct Structured {
    /// Serialized output, ending with a single `\n`.
    pub text: String,
    /// Date every record in the file is attributed to.
    pub date: FileDate,
    /// Block counts.
    pub stats: StructureStats,
}

/// Derive the file date from a `yymmdd_…` file name (year = 2000 + yy).
pub fn date_from_filename(name: &str) -> Result<FileDate> {
    let invalid = || QaStructError::FilenameDate {
        name: name.to_string(),
    };

    let caps = FILENAME_DATE_RE.captures(name).ok_or_else(invalid)?;
    let part = |i: usize| caps[i].parse::<u32>().map_err(|_| invalid());

    let year = 2000 + i32::try_from(part(1)?).map_err(|_| invalid())?;
    let date = NaiveDate::from_ymd_opt(year, part(2)?, part(3)?).ok_or_else(invalid)?;
    Ok(FileDate(date))
}

/// Department label: the first `【…】` token in the question lines.
pub fn extract_department<S: AsRef<str>>(question: &[S]) -> Option<String> {
    question
        .iter()
        .find_map(|line| DEPARTMENT_RE.captures(line.as_ref()))
        .map(|caps| caps[1].to_string())
}

/// Structure a whole input text. `filename` supplies the file date.
pub fn transform(text: &str, filename: &str) -> Result<Structured> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();
    transform_lines(&lines, filename)
}

/// Structure an already split line sequence.
#[instrument(skip(lines), fields(lines = lines.len()))]
pub fn transform_lines<S: AsRef<str>>(lines: &[S], filename: &str) -> Result<Structured> {
    let violations = validate(lines);
    if !violations.is_empty() {
        for v in &violations {
            warn!(violation = %v, "structure violation");
        }
        return Err(QaStructError::Structure { violations });
    }

    let date = date_from_filename(filename)?;
    let parents = segment_parents(lines);

    if let Some(first) = parents.first().filter(|p| p.start > 0) {
        debug!(dropped = first.start, "lines before the first parent marker are not emitted");
    }

    let mut out: Vec<String> = vec![String::new(); LEADING_BLANKS];
    let mut stats = StructureStats::default();

    for (p_idx, parent) in parents.iter().enumerate() {
        if p_idx > 0 {
            out.push(String::new());
        }

        let children = segment_children(lines, *parent);
        let primary = children.first().ok_or_else(|| {
            QaStructError::consistency(format!("parent block {} has no child block", p_idx + 1))
        })?;

        let primary_content = &lines[primary.content()];
        let divider = primary_content
            .iter()
            .position(|line| marker_of(line.as_ref()) == Some(Marker::Divider))
            .ok_or_else(|| {
                QaStructError::consistency(format!(
                    "primary block of parent {} has no divider",
                    p_idx + 1
                ))
            })?;
        let question = &primary_content[..divider];

        let department = extract_department(question).unwrap_or_default();
        let record_id = date.record_id(p_idx + 1);
        debug!(%record_id, department = %department, children = children.len(), "parent block");

        out.push(Marker::Parent.token().to_string());
        out.push(format!("{} {record_id}", header::RECORD_ID));
        out.push(format!("{} {date}", header::DATE));
        out.push(format!("{} {department}", header::DEPARTMENT));
        out.extend(tag_first(trim_trailing_blank(question), Tag::Question)?);
        out.push(String::new());

        for (c_idx, child) in children.iter().enumerate() {
            let role = ChildRole::for_index(c_idx);
            out.extend(build_child(&lines[child.content()], role)?);
            if c_idx + 1 < children.len() {
                out.push(String::new());
            }
        }

        stats.parents += 1;
        stats.primaries += 1;
        stats.follow_ups += children.len() - 1;
    }

    let out = collapse_blank_runs(out);

    info!(
        parents = stats.parents,
        follow_ups = stats.follow_ups,
        %date,
        "file structured"
    );

    Ok(Structured {
        text: render_document(&out),
        date,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_date_strict_pattern() {
        let d = date_from_filename("240115_test.txt").unwrap();
        assert_eq!(d.to_string(), "2024-01-15");
        assert_eq!(d.id_digits(), "20240115");
    }

    #[test]
    fn filename_without_prefix_is_rejected() {
        for name in ["test.txt", "24011_x.txt", "2401150_x.txt", "240115.txt"] {
            let err = date_from_filename(name).unwrap_err();
            assert!(matches!(err, QaStructError::FilenameDate { .. }), "{name}");
        }
    }

    #[test]
    fn impossible_calendar_date_is_rejected() {
        assert!(date_from_filename("240230_x.txt").is_err());
        assert!(date_from_filename("241301_x.txt").is_err());
        assert!(date_from_filename("240229_leap.txt").is_ok());
    }

    #[test]
    fn department_first_bracket_wins() {
        let q = ["intro", "【Finance】 budget 【Legal】", "【HR】"];
        assert_eq!(extract_department(&q).as_deref(), Some("Finance"));
        assert_eq!(extract_department(&["no brackets"]), None);
        assert_eq!(extract_department(&["【】 empty"]).as_deref(), Some(""));
    }

    #[test]
    fn preamble_and_parent_header_lines_are_dropped() {
        let text = "title line\n[PARENT]\nspeaker notes\n[CHILD]\nq\n[QA_SPLIT]\na\n";
        let out = transform(text, "240115_x.txt").unwrap();
        assert!(!out.text.contains("title line"));
        assert!(!out.text.contains("speaker notes"));
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let text = "\u{feff}[PARENT]\n[CHILD]\nq\n[QA_SPLIT]\na\n";
        assert!(transform(text, "240115_x.txt").is_ok());
    }

    #[test]
    fn crlf_input_is_accepted() {
        let text = "[PARENT]\r\n[CHILD]\r\nq\r\n[QA_SPLIT]\r\na\r\n";
        let out = transform(text, "240115_x.txt").unwrap();
        assert!(!out.text.contains('\r'));
    }

    #[test]
    fn validation_runs_before_filename_check() {
        let err = transform("no markers", "bad-name.txt").unwrap_err();
        assert!(matches!(err, QaStructError::Structure { .. }));
    }
}
