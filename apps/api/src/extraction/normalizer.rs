//! Text normalizer: cleans raw extracted text before segmentation.
//!
//! Line structure is preserved; everything else about whitespace is canonical.
//! `normalize(normalize(x)) == normalize(x)` for every input.

use once_cell::sync::Lazy;
use regex::Regex;

static SPACE_BEFORE_CLOSING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" +([,.;:!?)\]])").expect("valid regex"));
static SPACE_AFTER_OPENING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([(\[]) +").expect("valid regex"));

pub fn normalize(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<String> = Vec::new();
    for line in unified.split('\n') {
        let cleaned = normalize_line(line);
        // Collapse runs of blank lines into one.
        if cleaned.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(cleaned);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

fn normalize_line(line: &str) -> String {
    let mut collapsed = String::with_capacity(line.len());
    let mut pending_space = false;
    for c in line.chars() {
        if c.is_whitespace() {
            pending_space = true;
        } else if c.is_control() || is_invisible(c) {
            continue;
        } else {
            if pending_space && !collapsed.is_empty() {
                collapsed.push(' ');
            }
            pending_space = false;
            collapsed.push(c);
        }
    }

    let fixed = SPACE_BEFORE_CLOSING.replace_all(&collapsed, "$1");
    let fixed = SPACE_AFTER_OPENING.replace_all(&fixed, "$1");
    fixed.trim().to_string()
}

/// Zero-width and BOM characters PDF extractors tend to leave behind.
fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(normalize("Senior   Engineer\t\tat  X"), "Senior Engineer at X");
    }

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(normalize("Tech\u{0007}Corp\u{200B}"), "TechCorp");
    }

    #[test]
    fn test_fixes_punctuation_spacing() {
        assert_eq!(
            normalize("San Francisco , CA ( Remote )"),
            "San Francisco, CA (Remote)"
        );
    }

    #[test]
    fn test_preserves_lines_and_collapses_blank_runs() {
        let raw = "\r\n\nEXPERIENCE\r\n  Senior Engineer \n\n\n\nTechCorp\n\n";
        assert_eq!(normalize(raw), "EXPERIENCE\nSenior Engineer\n\nTechCorp");
    }

    #[test]
    fn test_is_idempotent() {
        let samples = [
            "  a ,b ( c ) \t d.\n\n\n e\u{0000}f  ",
            "EXPERIENCE\nSenior Engineer\nTechCorp\nJanuary 2020 - Present\n- Built X",
            "( [ ( x ) ] ) ,, . .",
            "",
            "\n\n\n",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
