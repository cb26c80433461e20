//! Locale date resolver for month/year expressions across the export's locales.
//!
//! One pure service used by every record kind; nothing here keeps state.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::models::YearMonth;

/// (spelling, month number). Lowercase, with and without accents where the
/// exporters are known to drop them.
const MONTHS: &[(&str, u32)] = &[
    // English
    ("january", 1), ("february", 2), ("march", 3), ("april", 4), ("may", 5), ("june", 6),
    ("july", 7), ("august", 8), ("september", 9), ("october", 10), ("november", 11),
    ("december", 12),
    ("jan", 1), ("feb", 2), ("mar", 3), ("apr", 4), ("jun", 6), ("jul", 7), ("aug", 8),
    ("sep", 9), ("sept", 9), ("oct", 10), ("nov", 11), ("dec", 12),
    // Spanish
    ("enero", 1), ("febrero", 2), ("marzo", 3), ("abril", 4), ("mayo", 5), ("junio", 6),
    ("julio", 7), ("agosto", 8), ("septiembre", 9), ("setiembre", 9), ("octubre", 10),
    ("noviembre", 11), ("diciembre", 12),
    ("ene", 1), ("abr", 4), ("ago", 8), ("dic", 12),
    // French
    ("janvier", 1), ("février", 2), ("fevrier", 2), ("mars", 3), ("avril", 4), ("mai", 5),
    ("juin", 6), ("juillet", 7), ("août", 8), ("aout", 8), ("septembre", 9), ("octobre", 10),
    ("novembre", 11), ("décembre", 12), ("decembre", 12),
    ("janv", 1), ("févr", 2), ("avr", 4), ("juil", 7), ("déc", 12),
    // German
    ("januar", 1), ("februar", 2), ("märz", 3), ("maerz", 3), ("juni", 6), ("juli", 7),
    ("oktober", 10), ("dezember", 12),
    ("mär", 3), ("okt", 10), ("dez", 12),
    // Portuguese
    ("janeiro", 1), ("fevereiro", 2), ("março", 3), ("marco", 3), ("maio", 5), ("junho", 6),
    ("julho", 7), ("setembro", 9), ("outubro", 10), ("novembro", 11), ("dezembro", 12),
    ("fev", 2), ("out", 10),
    // Italian
    ("gennaio", 1), ("febbraio", 2), ("aprile", 4), ("maggio", 5), ("giugno", 6),
    ("luglio", 7), ("settembre", 9), ("ottobre", 10), ("dicembre", 12),
    ("gen", 1), ("mag", 5), ("giu", 6), ("lug", 7), ("set", 9), ("ott", 10),
];

/// Words standing in for an open end date.
const PRESENT_WORDS: &[&str] = &[
    "present", "current", "now", "actualidad", "presente", "aujourd'hui", "aujourd’hui",
    "heute", "o momento", "momento", "oggi", "attuale",
];

static MONTH_ALTERNATION: Lazy<String> = Lazy::new(|| {
    let mut names: Vec<&str> = MONTHS.iter().map(|(name, _)| *name).collect();
    // Longest first so "sept" wins over "sep" and "june" over "jun".
    names.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));
    names
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|")
});

static PRESENT_ALTERNATION: Lazy<String> = Lazy::new(|| {
    PRESENT_WORDS
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
});

/// `Month[.] [de] YYYY`
static MONTH_YEAR: Lazy<String> = Lazy::new(|| {
    format!(r"(?:{})\.?\s+(?:de\s+)?\d{{4}}\b", MONTH_ALTERNATION.as_str())
});

static MONTH_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<start>{my})\s*[-–—]\s*(?P<end>{my}|{present})",
        my = MONTH_YEAR.as_str(),
        present = PRESENT_ALTERNATION.as_str(),
    ))
    .expect("valid month range regex")
});

static ANY_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<start>{my}|\d{{1,2}}/\d{{4}}\b|\d{{4}}\b)(?:\s*[-–—]\s*(?P<end>{my}|\d{{1,2}}/\d{{4}}\b|\d{{4}}\b|{present}))?",
        my = MONTH_YEAR.as_str(),
        present = PRESENT_ALTERNATION.as_str(),
    ))
    .expect("valid date regex")
});

static MONTH_YEAR_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<month>[\p{L}’']+)\.?\s+(?:de\s+)?(?P<year>\d{4})$")
        .expect("valid month-year regex")
});
static ISO_YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<year>\d{4})-(?P<month>\d{1,2})$").expect("valid regex"));
static SLASH_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<month>\d{1,2})/(?P<year>\d{4})$").expect("valid regex"));
static BARE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<year>\d{4})$").expect("valid regex"));

/// A start date and an optional end; `end == None` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: YearMonth,
    pub end: Option<YearMonth>,
}

/// A range found inside a line, with the byte span it occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub range: DateRange,
    pub span: (usize, usize),
}

pub fn month_number(name: &str) -> Option<u32> {
    let name = name.trim().trim_end_matches('.').to_lowercase();
    MONTHS
        .iter()
        .find(|(spelling, _)| *spelling == name)
        .map(|(_, n)| *n)
}

pub fn is_present_word(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    PRESENT_WORDS.iter().any(|w| *w == text)
}

/// Parses one date expression: `Month YYYY`, `Month de YYYY`, `YYYY-MM`,
/// `MM/YYYY`, or a bare `YYYY` (month 1).
pub fn parse_year_month(text: &str) -> Option<YearMonth> {
    let text = text.trim();
    if let Some(caps) = MONTH_YEAR_PARTS.captures(text) {
        let month = month_number(&caps["month"])?;
        return YearMonth::new(caps["year"].parse().ok()?, month);
    }
    if let Some(caps) = ISO_YEAR_MONTH.captures(text) {
        return YearMonth::new(caps["year"].parse().ok()?, caps["month"].parse().ok()?);
    }
    if let Some(caps) = SLASH_MONTH_YEAR.captures(text) {
        return YearMonth::new(caps["year"].parse().ok()?, caps["month"].parse().ok()?);
    }
    if let Some(caps) = BARE_YEAR.captures(text) {
        return YearMonth::new(caps["year"].parse().ok()?, 1);
    }
    None
}

/// Finds the first `Month YYYY - (Month YYYY | present)` range in a line.
pub fn find_month_range(line: &str) -> Option<DateMatch> {
    let caps = MONTH_RANGE_RE.captures(line)?;
    build_match(&caps)
}

/// Finds one or two dates (month-year or year) in a line, for education
/// entries where ranges are often year-only.
pub fn find_any_dates(line: &str) -> Option<DateMatch> {
    let caps = ANY_DATE_RE.captures(line)?;
    build_match(&caps)
}

fn build_match(caps: &regex::Captures<'_>) -> Option<DateMatch> {
    let whole = caps.get(0)?;
    let start = parse_year_month(caps.name("start")?.as_str())?;
    let end = match caps.name("end") {
        Some(m) if is_present_word(m.as_str()) => None,
        Some(m) => Some(parse_year_month(m.as_str())?),
        None => None,
    };

    if let Some(end) = end {
        if end < start {
            // Left as extracted; the caller decides what an inverted range means.
            warn!(%start, %end, "date range ends before it starts");
        }
    }

    Some(DateMatch {
        range: DateRange { start, end },
        span: (whole.start(), whole.end()),
    })
}
