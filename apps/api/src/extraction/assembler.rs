use crate::errors::AppError;
use crate::extraction::basic_info::BasicInfo;
use crate::models::{
    CandidateProfile, EducationRecord, ExperienceRecord, LanguageProficiency, VolunteerRecord,
};

/// Everything the extractors produced for one document.
#[derive(Debug, Default)]
pub struct ProfileParts {
    pub basic: BasicInfo,
    pub summary: Option<String>,
    pub experiences: Vec<ExperienceRecord>,
    pub education: Vec<EducationRecord>,
    pub skills: Vec<String>,
    pub languages: Vec<LanguageProficiency>,
    pub certifications: Vec<String>,
    pub volunteer: Vec<VolunteerRecord>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Merges the parts into a profile. A missing or blank name is fatal.
pub fn assemble(parts: ProfileParts) -> Result<CandidateProfile, AppError> {
    let ProfileParts {
        basic,
        summary,
        experiences,
        education,
        skills,
        languages,
        certifications,
        volunteer,
    } = parts;

    let full_name = clean(basic.full_name).ok_or_else(|| AppError::ProfileAssembly {
        reason: "full_name is missing or empty".to_string(),
    })?;

    Ok(CandidateProfile {
        full_name,
        headline: clean(basic.headline),
        location: clean(basic.location),
        email: clean(basic.email),
        phone: clean(basic.phone),
        profile_url: clean(basic.profile_url),
        summary: clean(summary),
        experiences,
        education,
        skills,
        languages,
        certifications,
        volunteer,
    })
}
