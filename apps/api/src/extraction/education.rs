//! Education extraction.
//!
//! The first line without a four-digit year names the institution; the next
//! line holding one or two dates closes the entry. The degree is either the
//! text before the dates on that line or the line right above it.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::extraction::dates::find_any_dates;
use crate::extraction::experience::strip_bullet;
use crate::extraction::Extracted;
use crate::models::EducationRecord;

static FOUR_DIGIT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}\b").expect("valid regex"));

#[derive(Debug, Default)]
struct Draft {
    institution: Option<String>,
    degree: Option<String>,
    pending: Vec<String>,
}

/// Turns an education section into records.
pub fn extract_education(section: &str) -> Extracted<EducationRecord> {
    let mut out = Extracted::default();
    let mut draft = Draft::default();

    for line in section.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let has_year = FOUR_DIGIT_YEAR.is_match(line);

        if !has_year && draft.institution.is_none() {
            draft.institution = Some(line.to_string());
            continue;
        }

        let date = if has_year { find_any_dates(line) } else { None };
        let Some(date) = date else {
            draft.pending.push(strip_bullet(line).to_string());
            continue;
        };

        if draft.degree.is_none() {
            let inline = degree_text(&line[..date.span.0]);
            draft.degree = inline.or_else(|| draft.pending.pop());
        }

        let Draft {
            institution,
            degree,
            pending,
        } = std::mem::take(&mut draft);
        let Some(institution) = institution else {
            warn!(line, "dropping education entry without institution");
            out.dropped += 1;
            continue;
        };

        let (degree, field_of_study) = split_degree(degree);
        out.records.push(EducationRecord {
            institution,
            degree,
            field_of_study,
            start: Some(date.range.start),
            end: date.range.end,
            description: (!pending.is_empty()).then(|| pending.join("\n")),
        });
    }

    // An institution with no dates is still a valid entry.
    if let Some(institution) = draft.institution.take() {
        let degree = draft.degree.take().or_else(|| draft.pending.pop());
        let (degree, field_of_study) = split_degree(degree);
        out.records.push(EducationRecord {
            institution,
            degree,
            field_of_study,
            start: None,
            end: None,
            description: (!draft.pending.is_empty()).then(|| draft.pending.join("\n")),
        });
    } else if !draft.pending.is_empty() {
        warn!(lines = draft.pending.len(), "dropping trailing education lines without institution");
        out.dropped += 1;
    }

    out
}

fn degree_text(prefix: &str) -> Option<String> {
    let text = prefix.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '·' | '|' | ',' | '-' | '–' | '(' | ')')
    });
    (!text.is_empty()).then(|| text.to_string())
}

/// "Master of Science, Computer Science" and "Master of Science in Computer
/// Science" both split into degree and field.
fn split_degree(degree: Option<String>) -> (Option<String>, Option<String>) {
    let Some(degree) = degree else {
        return (None, None);
    };
    let split = degree
        .split_once(", ")
        .or_else(|| degree.split_once(" in "));
    match split {
        Some((d, f)) if !d.trim().is_empty() && !f.trim().is_empty() => {
            (Some(d.trim().to_string()), Some(f.trim().to_string()))
        }
        _ => (Some(degree), None),
    }
}
