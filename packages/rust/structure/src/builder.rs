//! Question/answer sub-block assembly for a single child block.

use tracing::debug;

use qastruct_shared::{Marker, QaStructError, Result};

use crate::lines::{next_non_blank, trim_leading_blank, trim_trailing_blank};
use crate::token::{Tag, apply_tag, marker_of, split_tag};

/// Position of a child block within its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRole {
    /// The first child of a parent block.
    Primary,
    /// The n-th follow-up (1-based, per parent).
    FollowUp(usize),
}

impl ChildRole {
    /// Role of the child at 0-based `index` inside its parent.
    pub fn for_index(index: usize) -> Self {
        if index == 0 {
            Self::Primary
        } else {
            Self::FollowUp(index)
        }
    }

    /// Heading line emitted under the `[CHILD]` marker.
    pub fn title(&self) -> String {
        match self {
            Self::Primary => "## Primary Q/A".to_string(),
            Self::FollowUp(n) => format!("## Follow-up {n}"),
        }
    }
}

/// Build the output lines for one child block.
///
/// `content` is the block without its `[CHILD]` line and must hold exactly
/// one divider. The result starts with `[CHILD]` and the title, carries no
/// divider and no trailing blank lines.
pub fn build_child<S: AsRef<str>>(content: &[S], role: ChildRole) -> Result<Vec<String>> {
    build_child_inner(content, role).inspect_err(|e| {
        debug!(error = %e, ?role, "child block could not be built");
        for (idx, line) in content.iter().enumerate() {
            debug!(line_no = idx + 1, text = line.as_ref(), "child block line");
        }
    })
}

fn build_child_inner<S: AsRef<str>>(content: &[S], role: ChildRole) -> Result<Vec<String>> {
    let divider = content
        .iter()
        .position(|line| marker_of(line.as_ref()) == Some(Marker::Divider))
        .ok_or_else(|| QaStructError::consistency("child block has no divider"))?;

    let question = trim_trailing_blank(&content[..divider]);
    let answer = trim_leading_blank(&content[divider + 1..]);

    let question = tag_first(question, Tag::Question)?;
    let answer = tag_first(answer, Tag::Answer)?;

    let mut out = Vec::with_capacity(question.len() + answer.len() + 2);
    out.push(Marker::Child.token().to_string());
    out.push(role.title());
    out.extend(question);
    out.extend(answer);

    check_tags(&out)?;

    let kept = trim_trailing_blank(&out).len();
    out.truncate(kept);
    Ok(out)
}

/// Copy `segment`, tagging its first non-blank line.
pub(crate) fn tag_first<S: AsRef<str>>(segment: &[S], tag: Tag) -> Result<Vec<String>> {
    let first = next_non_blank(segment, 0).ok_or_else(|| {
        let part = match tag {
            Tag::Question => "question",
            Tag::Answer => "answer",
        };
        QaStructError::consistency(format!("{part} segment has no non-blank line"))
    })?;

    Ok(segment
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == first {
                apply_tag(line.as_ref(), tag)
            } else {
                line.as_ref().to_string()
            }
        })
        .collect())
}

/// Exactly one question tag and one answer tag, question first.
fn check_tags(out: &[String]) -> Result<()> {
    let positions = |wanted: Tag| -> Vec<usize> {
        out.iter()
            .enumerate()
            .filter(|(_, line)| split_tag(line).0 == Some(wanted))
            .map(|(i, _)| i)
            .collect()
    };
    let q = positions(Tag::Question);
    let a = positions(Tag::Answer);

    match (q.as_slice(), a.as_slice()) {
        ([q], [a]) if q < a => Ok(()),
        ([_], [_]) => Err(QaStructError::consistency(
            "question tag appears after answer tag",
        )),
        _ => Err(QaStructError::consistency(format!(
            "expected one question and one answer tag, found {} and {}",
            q.len(),
            a.len()
        ))),
    }
}
