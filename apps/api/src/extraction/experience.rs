//! Experience extraction as a line-oriented state machine over one section.
//!
//! Entries are separated by duration-marker lines ("2 years 3 months").
//! Inside an entry the first line is the title, the line holding a month-year
//! range carries dates and location, and the line right before it is the
//! company. Everything after the date line is description.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::extraction::dates::{find_month_range, DateRange};
use crate::extraction::Extracted;
use crate::models::ExperienceRecord;

static DURATION_MARKER: Lazy<Regex> = Lazy::new(|| {
    let years = r"(?:years?|yrs?|años?|ans?|an|jahre?|anos?|anni|anno)";
    let months = r"(?:months?|mos?|meses|mes|mois|monate?|mesi|mese)";
    Regex::new(&format!(
        r"(?i)^\(?\s*(?:\d+\s+{years}(?:\s*(?:,|y|e|et|und)?\s*\d+\s+{months})?|\d+\s+{months})\s*\)?$"
    ))
    .expect("valid duration regex")
});

/// Parenthesized duration trailing a date range, e.g. "(1 year 10 months)".
static TRAILING_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\([^)]*\d[^)]*\)").expect("valid regex"));

static TECH_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:technologies|tech stack|tools|tecnologías|tecnologias|technologien)\s*:\s*(?P<list>.+)$")
        .expect("valid regex")
});

const BULLET_MARKERS: &[char] = &['-', '•', '*', '–', '—', '·', '▪', '◦', '‣'];

pub fn is_duration_marker(line: &str) -> bool {
    DURATION_MARKER.is_match(line.trim())
}

pub fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|c: char| BULLET_MARKERS.contains(&c) || c.is_whitespace())
}

#[derive(Debug, Default)]
struct Draft {
    /// Content lines seen before the date line.
    header_lines: Vec<String>,
    company: Option<String>,
    range: Option<DateRange>,
    location: Option<String>,
    description: Vec<String>,
    skills: Vec<String>,
}

impl Draft {
    fn is_empty(&self) -> bool {
        self.header_lines.is_empty() && self.range.is_none() && self.description.is_empty()
    }

    fn accept(&mut self, line: &str) {
        if self.range.is_none() {
            if let Some(m) = find_month_range(line) {
                self.range = Some(m.range);
                // The line right before the date line is the company.
                if self.header_lines.len() >= 2 {
                    self.company = self.header_lines.last().cloned();
                }
                self.location = location_after(&line[m.span.1..])
                    .or_else(|| location_after(&line[..m.span.0]));
                return;
            }
            self.header_lines.push(line.to_string());
            return;
        }

        if let Some(caps) = TECH_LINE.captures(line) {
            self.skills.extend(split_list(&caps["list"]));
            return;
        }
        let text = strip_bullet(line);
        if !text.is_empty() {
            self.description.push(text.to_string());
        }
    }

    fn finish(self) -> Result<ExperienceRecord, String> {
        let title = self
            .header_lines
            .first()
            .cloned()
            .ok_or_else(|| "missing title".to_string())?;
        let company = self
            .company
            .ok_or_else(|| format!("missing company for '{title}'"))?;
        let range = self
            .range
            .ok_or_else(|| format!("missing start date for '{title}'"))?;

        Ok(ExperienceRecord {
            title,
            company,
            location: self.location,
            start: range.start,
            end: range.end,
            description: (!self.description.is_empty()).then(|| self.description.join("\n")),
            skills: self.skills,
        })
    }
}

fn location_after(rest: &str) -> Option<String> {
    let rest = TRAILING_DURATION.replace(rest, "");
    let rest = rest.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '·' | '|' | ',' | '-' | '–' | '—' | '(' | ')')
    });
    (!rest.is_empty()).then(|| rest.to_string())
}

fn split_list(list: &str) -> Vec<String> {
    list.split([',', '·', '•'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Turns an experience section into records. Entries that fail validation
/// are logged and counted, never fatal.
pub fn extract_experiences(section: &str) -> Extracted<ExperienceRecord> {
    let mut out = Extracted::default();
    let mut draft = Draft::default();

    for line in section.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_duration_marker(line) {
            flush(&mut out, std::mem::take(&mut draft));
            continue;
        }
        draft.accept(line);
    }
    flush(&mut out, draft);
    out
}

fn flush(out: &mut Extracted<ExperienceRecord>, draft: Draft) {
    if draft.is_empty() {
        return;
    }
    match draft.finish() {
        Ok(record) => out.records.push(record),
        Err(reason) => {
            warn!(%reason, "dropping experience entry");
            out.dropped += 1;
        }
    }
}
