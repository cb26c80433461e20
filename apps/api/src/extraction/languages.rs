//! Languages extraction: `Name (Proficiency)` lines, proficiency canonicalized
//! against the fixed level set.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{LanguageProficiency, Proficiency};

/// Name followed by the first parenthesis pair. Several pairs on one line are
/// accepted when comma separated ("English (Native), Spanish (Professional)").
static NAME_LEVEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<name>[^,()]+?)\s*\((?P<level>[^)]*)\)").expect("valid regex"));

/// Locale spellings of the export's levels.
const ALIASES: &[(&str, Proficiency)] = &[
    ("native", Proficiency::NativeOrBilingual),
    ("bilingual", Proficiency::NativeOrBilingual),
    ("nativo o bilingüe", Proficiency::NativeOrBilingual),
    ("competencia bilingüe o nativa", Proficiency::NativeOrBilingual),
    ("bilingue ou langue natale", Proficiency::NativeOrBilingual),
    ("muttersprache oder zweisprachig", Proficiency::NativeOrBilingual),
    ("nativo ou bilíngue", Proficiency::NativeOrBilingual),
    ("competencia profesional completa", Proficiency::FullProfessional),
    ("capacité professionnelle complète", Proficiency::FullProfessional),
    ("verhandlungssicher", Proficiency::FullProfessional),
    ("competencia profesional", Proficiency::ProfessionalWorking),
    ("capacité professionnelle", Proficiency::ProfessionalWorking),
    ("fließend", Proficiency::ProfessionalWorking),
    ("competencia básica limitada", Proficiency::LimitedWorking),
    ("compétence professionnelle limitée", Proficiency::LimitedWorking),
    ("competencia básica", Proficiency::Elementary),
    ("notions", Proficiency::Elementary),
    ("grundkenntnisse", Proficiency::Elementary),
];

/// Maps free text to a level. Exact matches (case-insensitive, with or
/// without a trailing "proficiency") and known aliases win; otherwise the
/// level whose name length is closest to the input's length is chosen.
pub fn canonical_proficiency(raw: &str) -> Option<Proficiency> {
    let text = raw.trim().to_lowercase();
    let text = text
        .strip_suffix("proficiency")
        .unwrap_or(&text)
        .trim()
        .to_string();
    if text.is_empty() {
        return None;
    }

    if let Some(level) = Proficiency::ALL
        .iter()
        .find(|p| p.as_str().to_lowercase() == text)
    {
        return Some(*level);
    }
    if let Some((_, level)) = ALIASES.iter().find(|(alias, _)| *alias == text) {
        return Some(*level);
    }

    let len = text.chars().count() as i64;
    let nearest = Proficiency::ALL
        .iter()
        .min_by_key(|p| (p.as_str().chars().count() as i64 - len).abs())
        .copied();
    debug!(raw, ?nearest, "proficiency matched by length");
    nearest
}

pub fn extract_languages(section: &str) -> Vec<LanguageProficiency> {
    let mut languages = Vec::new();

    for line in section.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut matched = false;
        for caps in NAME_LEVEL.captures_iter(line) {
            let name = caps["name"].trim();
            if name.is_empty() {
                continue;
            }
            matched = true;
            languages.push(LanguageProficiency {
                language: name.to_string(),
                proficiency: canonical_proficiency(&caps["level"]),
            });
        }
        if !matched {
            languages.push(LanguageProficiency {
                language: line.to_string(),
                proficiency: None,
            });
        }
    }

    languages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_or_bilingual_scenario() {
        let langs = extract_languages("English (Native or Bilingual)");
        assert_eq!(langs.len(), 1);
        assert_eq!(langs[0].language, "English");
        assert_eq!(langs[0].proficiency, Some(Proficiency::NativeOrBilingual));
        assert_eq!(langs[0].proficiency.unwrap().as_str(), "Native or Bilingual");
    }

    #[test]
    fn test_trailing_proficiency_word_and_case() {
        assert_eq!(
            canonical_proficiency("full professional proficiency"),
            Some(Proficiency::FullProfessional)
        );
        assert_eq!(
            canonical_proficiency("Limited Working Proficiency"),
            Some(Proficiency::LimitedWorking)
        );
    }

    #[test]
    fn test_locale_alias() {
        assert_eq!(
            canonical_proficiency("Nativo o bilingüe"),
            Some(Proficiency::NativeOrBilingual)
        );
    }

    #[test]
    fn test_length_nearest_fallback() {
        // 10 chars, same length as "Elementary".
        assert_eq!(canonical_proficiency("Good level"), Some(Proficiency::Elementary));
        // 20 chars, closest to "Professional Working" (20).
        assert_eq!(
            canonical_proficiency("Conversational level"),
            Some(Proficiency::ProfessionalWorking)
        );
    }

    #[test]
    fn test_several_pairs_and_bare_lines() {
        let langs = extract_languages("English (Native), Spanish (Professional Working)\nGerman");
        assert_eq!(langs.len(), 3);
        assert_eq!(langs[1].language, "Spanish");
        assert_eq!(langs[1].proficiency, Some(Proficiency::ProfessionalWorking));
        assert_eq!(langs[2].language, "German");
        assert_eq!(langs[2].proficiency, None);
    }
}
