//! Section segmenter: splits normalized text into named sections.
//!
//! Header recognition is pluggable (`HeaderStrategy`), selected per document.
//! Matching is substring based: a header token anywhere in a line opens a new
//! section ("Volunteer Experience", "Experience (continued)").

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the section holding lines seen before the first header.
pub const PREAMBLE: &str = "preamble";

/// Section name → raw text, in the order each name first appears.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMap {
    entries: Vec<(String, String)>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, body)| body.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, b)| (n.as_str(), b.as_str()))
    }

    /// Appends to an existing section, or opens a new one at the end.
    fn append(&mut self, name: &str, body: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => {
                existing.push('\n');
                existing.push_str(body);
            }
            None => self.entries.push((name.to_string(), body.to_string())),
        }
    }
}

/// Decides whether a line is a section header, and under which name.
pub trait HeaderStrategy: Send + Sync {
    fn match_header(&self, line: &str) -> Option<String>;

    fn name(&self) -> &'static str;
}

/// Ordered (token, canonical name) table; first match wins. More specific
/// tokens come first so "Volunteer Experience" lands in `volunteer` and
/// "CONTACT INFORMATION" in `contact` rather than `education`.
const HEADER_TOKENS: &[(&str, &str)] = &[
    // contact
    ("Contact Information", "contact"),
    ("Contactar", "contact"),
    ("Coordonnées", "contact"),
    ("Kontakt", "contact"),
    ("Contato", "contact"),
    ("Contatti", "contact"),
    ("Contact", "contact"),
    // volunteer
    ("Volunteer Experience", "volunteer"),
    ("Experiencia de voluntariado", "volunteer"),
    ("Expérience de bénévolat", "volunteer"),
    ("Ehrenamtliches Engagement", "volunteer"),
    ("Trabalho voluntário", "volunteer"),
    ("Volunteer", "volunteer"),
    ("Voluntariado", "volunteer"),
    ("Bénévolat", "volunteer"),
    ("Ehrenamt", "volunteer"),
    // experience
    ("Berufserfahrung", "experience"),
    ("Experiencia", "experience"),
    ("Experiência", "experience"),
    ("Expérience", "experience"),
    ("Esperienza", "experience"),
    ("Experience", "experience"),
    // education
    ("Formação acadêmica", "education"),
    ("Educación", "education"),
    ("Ausbildung", "education"),
    ("Formazione", "education"),
    ("Formation", "education"),
    ("Education", "education"),
    // skills
    ("Aptitudes principales", "skills"),
    ("Principales compétences", "skills"),
    ("Principais competências", "skills"),
    ("Top-Kenntnisse", "skills"),
    ("Competenze principali", "skills"),
    ("Top Skills", "skills"),
    ("Skills", "skills"),
    ("Aptitudes", "skills"),
    ("Compétences", "skills"),
    ("Kenntnisse", "skills"),
    // languages
    ("Languages", "languages"),
    ("Idiomas", "languages"),
    ("Langues", "languages"),
    ("Sprachen", "languages"),
    ("Lingue", "languages"),
    // certifications
    ("Licenses & Certifications", "certifications"),
    ("Certifications", "certifications"),
    ("Certificaciones", "certifications"),
    ("Certificações", "certifications"),
    ("Bescheinigungen", "certifications"),
    ("Certificazioni", "certifications"),
    // summary
    ("Summary", "summary"),
    ("Extracto", "summary"),
    ("Résumé", "summary"),
    ("Zusammenfassung", "summary"),
    ("Resumo", "summary"),
    ("Riepilogo", "summary"),
    ("About", "summary"),
    // the rest are recognised so their text doesn't leak into neighbours
    ("Honors-Awards", "honors"),
    ("Honors & Awards", "honors"),
    ("Publications", "publications"),
    ("Publicaciones", "publications"),
    ("Projects", "projects"),
    ("Proyectos", "projects"),
];

/// Fixed dictionary of header tokens, locale variants included. A token
/// matches when its Title form or its UPPERCASE form appears in the line.
#[derive(Debug, Clone)]
pub struct TokenDictionary {
    entries: Vec<(String, String, &'static str)>,
}

impl TokenDictionary {
    pub fn new() -> Self {
        let entries = HEADER_TOKENS
            .iter()
            .map(|(token, name)| (token.to_string(), token.to_uppercase(), *name))
            .collect();
        Self { entries }
    }
}

impl Default for TokenDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderStrategy for TokenDictionary {
    fn match_header(&self, line: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(title, upper, _)| line.contains(title.as_str()) || line.contains(upper.as_str()))
            .map(|(_, _, name)| name.to_string())
    }

    fn name(&self) -> &'static str {
        "dictionary"
    }
}

/// For documents without recognizable tokens: any line longer than three
/// characters with letters and no lowercase letters is a header.
#[derive(Debug, Clone, Default)]
pub struct UppercaseHeuristic;

impl HeaderStrategy for UppercaseHeuristic {
    fn match_header(&self, line: &str) -> Option<String> {
        let line = line.trim();
        let has_letter = line.chars().any(char::is_alphabetic);
        let has_lower = line.chars().any(char::is_lowercase);
        (line.chars().count() > 3 && has_letter && !has_lower).then(|| line.to_lowercase())
    }

    fn name(&self) -> &'static str {
        "uppercase"
    }
}

/// Which header strategy to use for a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyChoice {
    /// Dictionary when any line matches it, otherwise the uppercase heuristic.
    #[default]
    Auto,
    Dictionary,
    Uppercase,
}

impl std::str::FromStr for StrategyChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(StrategyChoice::Auto),
            "dictionary" | "tokens" => Ok(StrategyChoice::Dictionary),
            "uppercase" => Ok(StrategyChoice::Uppercase),
            other => Err(format!("unknown section strategy '{other}'")),
        }
    }
}

pub fn select_strategy(choice: StrategyChoice, text: &str) -> Box<dyn HeaderStrategy> {
    match choice {
        StrategyChoice::Dictionary => Box::new(TokenDictionary::new()),
        StrategyChoice::Uppercase => Box::new(UppercaseHeuristic),
        StrategyChoice::Auto => {
            let dictionary = TokenDictionary::new();
            if text.lines().any(|l| dictionary.match_header(l).is_some()) {
                Box::new(dictionary)
            } else {
                Box::new(UppercaseHeuristic)
            }
        }
    }
}

/// Walks the lines, flushing the accumulator under the previous section name
/// each time a header opens a new one.
pub fn segment(text: &str, strategy: &dyn HeaderStrategy) -> SectionMap {
    let mut sections = SectionMap::new();
    let mut current = PREAMBLE.to_string();
    let mut accumulator: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(name) = strategy.match_header(line) {
            flush(&mut sections, &current, &accumulator);
            current = name;
            accumulator.clear();
        } else {
            accumulator.push(line);
        }
    }
    flush(&mut sections, &current, &accumulator);

    debug!(
        strategy = strategy.name(),
        sections = sections.len(),
        "segmented document"
    );
    sections
}

fn flush(sections: &mut SectionMap, name: &str, accumulator: &[&str]) {
    let body = accumulator.join("\n");
    let body = body.trim();
    if body.is_empty() {
        return;
    }
    sections.append(name, body);
}

/// Extractor routing for a section name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Experience,
    Education,
    Skills,
    Languages,
    Certifications,
    Volunteer,
    Summary,
    Other,
}

impl SectionKind {
    /// Substring routing, so uppercase-heuristic names such as
    /// "work experience" still reach the right extractor. Contact is checked
    /// first ("contact information" contains "formation"), volunteer before
    /// experience.
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        let routes: [(&[&str], SectionKind); 8] = [
            (&["contact", "coordonnées", "kontakt", "contato", "contatti"], SectionKind::Other),
            (&["volunteer", "voluntari", "bénévolat", "ehrenamt"], SectionKind::Volunteer),
            (&["experience", "experiencia", "experiência", "expérience", "erfahrung", "esperienza"], SectionKind::Experience),
            (&["education", "educación", "formation", "formação", "ausbildung", "formazione"], SectionKind::Education),
            (&["skills", "aptitudes", "compétences", "competências", "kenntnisse", "competenze"], SectionKind::Skills),
            (&["languages", "idiomas", "langues", "sprachen", "lingue"], SectionKind::Languages),
            (&["certification", "certificacion", "certificaç", "bescheinigung", "certificazion"], SectionKind::Certifications),
            (&["summary", "about", "extracto", "résumé", "zusammenfassung", "resumo", "riepilogo"], SectionKind::Summary),
        ];
        routes
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| name.contains(n)))
            .map(|(_, kind)| *kind)
            .unwrap_or(SectionKind::Other)
    }
}
