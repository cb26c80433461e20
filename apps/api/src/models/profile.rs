use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A calendar month, the resolution every profile date is normalized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Returns `None` unless `month` is within 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{s}'"))?;
        let year = y.parse::<i32>().map_err(|e| format!("bad year in '{s}': {e}"))?;
        let month = m.parse::<u32>().map_err(|e| format!("bad month in '{s}': {e}"))?;
        YearMonth::new(year, month).ok_or_else(|| format!("month out of range in '{s}'"))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Fixed set of language levels used by the profile export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proficiency {
    #[serde(rename = "Elementary")]
    Elementary,
    #[serde(rename = "Limited Working")]
    LimitedWorking,
    #[serde(rename = "Professional Working")]
    ProfessionalWorking,
    #[serde(rename = "Full Professional")]
    FullProfessional,
    #[serde(rename = "Native or Bilingual")]
    NativeOrBilingual,
}

impl Proficiency {
    pub const ALL: [Proficiency; 5] = [
        Proficiency::Elementary,
        Proficiency::LimitedWorking,
        Proficiency::ProfessionalWorking,
        Proficiency::FullProfessional,
        Proficiency::NativeOrBilingual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Proficiency::Elementary => "Elementary",
            Proficiency::LimitedWorking => "Limited Working",
            Proficiency::ProfessionalWorking => "Professional Working",
            Proficiency::FullProfessional => "Full Professional",
            Proficiency::NativeOrBilingual => "Native or Bilingual",
        }
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start: YearMonth,
    /// `None` for an open-ended ("Present") position.
    pub end: Option<YearMonth>,
    pub description: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub institution: String,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start: Option<YearMonth>,
    pub end: Option<YearMonth>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageProficiency {
    pub language: String,
    pub proficiency: Option<Proficiency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolunteerRecord {
    pub text: String,
}

/// Structured record of a person's professional background.
///
/// Built once per document by the assembler and shared read-only afterwards
/// (`Arc<CandidateProfile>`); nothing mutates it after assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub full_name: String,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_url: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub experiences: Vec<ExperienceRecord>,
    #[serde(default)]
    pub education: Vec<EducationRecord>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<LanguageProficiency>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub volunteer: Vec<VolunteerRecord>,
}

impl CandidateProfile {
    /// Every string-valued and string-list-valued attribute, flattened,
    /// without empties or duplicates.
    pub fn string_attributes(&self) -> Vec<String> {
        let scalars = [
            Some(&self.full_name),
            self.headline.as_ref(),
            self.location.as_ref(),
            self.email.as_ref(),
            self.phone.as_ref(),
            self.profile_url.as_ref(),
            self.summary.as_ref(),
        ];

        let mut pool: Vec<String> = Vec::new();
        let candidates = scalars
            .into_iter()
            .flatten()
            .chain(self.skills.iter())
            .chain(self.certifications.iter());
        for value in candidates {
            let value = value.trim();
            if !value.is_empty() && !pool.iter().any(|p| p == value) {
                pool.push(value.to_string());
            }
        }
        pool
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> CandidateProfile {
    CandidateProfile {
        full_name: "Jane Doe".to_string(),
        headline: Some("Senior Engineer at TechCorp".to_string()),
        location: Some("San Francisco Bay Area".to_string()),
        email: Some("jane@example.com".to_string()),
        phone: Some("+1 415 555 0100".to_string()),
        profile_url: Some("www.linkedin.com/in/janedoe".to_string()),
        summary: None,
        experiences: vec![ExperienceRecord {
            title: "Senior Engineer".to_string(),
            company: "TechCorp".to_string(),
            location: Some("San Francisco".to_string()),
            start: YearMonth::new(2020, 1).unwrap(),
            end: None,
            description: Some("Built X".to_string()),
            skills: vec!["Rust".to_string()],
        }],
        education: vec![EducationRecord {
            institution: "Stanford University".to_string(),
            degree: Some("Master of Science".to_string()),
            field_of_study: Some("Computer Science".to_string()),
            start: YearMonth::new(2016, 1),
            end: YearMonth::new(2018, 1),
            description: None,
        }],
        skills: vec!["Rust".to_string(), "Kubernetes".to_string()],
        languages: vec![LanguageProficiency {
            language: "English".to_string(),
            proficiency: Some(Proficiency::NativeOrBilingual),
        }],
        certifications: vec!["AWS Certified Solutions Architect".to_string()],
        volunteer: vec![VolunteerRecord {
            text: "Mentor\nCode Club".to_string(),
        }],
    }
}
