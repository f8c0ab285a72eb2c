//! Output file naming for department documents.

use std::sync::LazyLock;

use regex::Regex;

/// Department label for sections with no department header value.
pub const UNASSIGNED: &str = "unassigned";

static LOCAL_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})年(\d{1,2})月(\d{1,2})日").expect("local date regex"));

/// Normalize a date label for use in a file name.
///
/// `2024年1月5日` becomes `20240105`; anything else keeps only its digits,
/// or is returned as-is when it has none.
pub fn date_for_filename(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(caps) = LOCAL_DATE_RE.captures(raw) {
        return format!("{}{:0>2}{:0>2}", &caps[1], &caps[2], &caps[3]);
    }

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() { raw.to_string() } else { digits }
}

/// Replace characters that are unsafe in file names with `_`.
pub fn sanitize_department(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() {
        UNASSIGNED.to_string()
    } else {
        cleaned
    }
}

/// `{date}_{department}.txt`
pub fn output_file_name(date: &str, department: &str) -> String {
    format!("{date}_{}.txt", sanitize_department(department))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_dates_are_zero_padded() {
        assert_eq!(date_for_filename("2024年1月5日"), "20240105");
        assert_eq!(date_for_filename("2024年12月25日（水）"), "20241225");
    }

    #[test]
    fn other_dates_keep_digits() {
        assert_eq!(date_for_filename("2024-01-15"), "20240115");
        assert_eq!(date_for_filename("unknown"), "unknown");
    }

    #[test]
    fn unsafe_characters_are_replaced() {
        assert_eq!(sanitize_department("R&D/Ops"), "R&D_Ops");
        assert_eq!(sanitize_department("a:b*c?"), "a_b_c_");
        assert_eq!(sanitize_department("  "), UNASSIGNED);
        assert_eq!(output_file_name("20240115", "Legal"), "20240115_Legal.txt");
    }
}
