//! "Extract profile from document": normalize, segment, extract, assemble.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classifier::ZeroShotClassifier;
use crate::errors::AppError;
use crate::extraction::assembler::{assemble, ProfileParts};
use crate::extraction::basic_info::{
    extract_basic_info, find_email, find_phone, find_profile_url, BasicInfo,
};
use crate::extraction::document::RawDocumentText;
use crate::extraction::education::extract_education;
use crate::extraction::experience::extract_experiences;
use crate::extraction::languages::extract_languages;
use crate::extraction::listing::{extract_certifications, extract_volunteer};
use crate::extraction::normalizer::normalize;
use crate::extraction::segmenter::{segment, select_strategy, SectionKind, StrategyChoice};
use crate::extraction::skills::extract_skills;
use crate::models::CandidateProfile;

/// Collaborators and knobs for one extraction run.
#[derive(Clone)]
pub struct ExtractionContext {
    pub classifier: Arc<dyn ZeroShotClassifier>,
    pub strategy: StrategyChoice,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub profile: CandidateProfile,
    /// Section names found in the document, in document order.
    pub sections: Vec<String>,
    /// Records dropped by the extractors for failing validation.
    pub dropped_records: usize,
}

pub async fn extract_profile(
    ctx: &ExtractionContext,
    document: &RawDocumentText,
) -> Result<ExtractionReport, AppError> {
    if document.is_blank() {
        return Err(AppError::DocumentExtraction(
            "document contains no text".to_string(),
        ));
    }

    let text = normalize(&document.joined());
    info!(
        pages = document.pages.len(),
        chars = text.len(),
        "extracting profile"
    );

    let strategy = select_strategy(ctx.strategy, &text);
    let sections = segment(&text, strategy.as_ref());

    let basic = match extract_basic_info(&text, ctx.classifier.as_ref()).await {
        Ok(basic) => basic,
        Err(e) => {
            warn!(error = %e, "basic info classification failed");
            BasicInfo {
                email: find_email(&text),
                phone: find_phone(&text),
                profile_url: find_profile_url(&text),
                ..BasicInfo::default()
            }
        }
    };

    let mut parts = ProfileParts {
        basic,
        ..ProfileParts::default()
    };
    let mut dropped = 0;
    let mut summaries: Vec<&str> = Vec::new();

    for (name, body) in sections.iter() {
        match SectionKind::from_name(name) {
            SectionKind::Experience => {
                let out = extract_experiences(body);
                dropped += out.dropped;
                parts.experiences.extend(out.records);
            }
            SectionKind::Education => {
                let out = extract_education(body);
                dropped += out.dropped;
                parts.education.extend(out.records);
            }
            SectionKind::Skills => {
                for skill in extract_skills(body) {
                    if !parts.skills.contains(&skill) {
                        parts.skills.push(skill);
                    }
                }
            }
            SectionKind::Languages => parts.languages.extend(extract_languages(body)),
            SectionKind::Certifications => {
                parts.certifications.extend(extract_certifications(body))
            }
            SectionKind::Volunteer => parts.volunteer.extend(extract_volunteer(body)),
            SectionKind::Summary => summaries.push(body),
            SectionKind::Other => debug!(section = %name, "section not extracted"),
        }
    }
    parts.summary = (!summaries.is_empty()).then(|| summaries.join("\n"));

    let profile = assemble(parts)?;
    info!(
        experiences = profile.experiences.len(),
        education = profile.education.len(),
        skills = profile.skills.len(),
        dropped,
        "profile extracted"
    );

    Ok(ExtractionReport {
        profile,
        sections: sections.names().map(String::from).collect(),
        dropped_records: dropped,
    })
}

#[cfg(test)]
pub(crate) const SAMPLE_EXPORT: &str = "Contact
jane@example.com
www.linkedin.com/in/janedoe (LinkedIn)
Jane Doe
Senior Engineer at TechCorp
San Francisco Bay Area
Summary
Engineer who builds reliable systems.
Experience
Senior Engineer
TechCorp
January 2020 - Present · San Francisco
- Built X
Technologies: Rust, Tokio
3 years 2 months
Engineer
StartupCo
March 2018 - December 2019
Shipped Y
Education
Stanford University
Master of Science, Computer Science
2016 - 2018
Languages
English (Native or Bilingual)
Top Skills
Rust
Kubernetes
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::testing::FakeClassifier;
    use crate::models::{Proficiency, YearMonth};

    fn ctx(classifier: FakeClassifier) -> ExtractionContext {
        ExtractionContext {
            classifier: Arc::new(classifier),
            strategy: StrategyChoice::Auto,
        }
    }

    #[tokio::test]
    async fn test_full_export() {
        let report = extract_profile(
            &ctx(FakeClassifier::new()),
            &RawDocumentText::from_text(SAMPLE_EXPORT),
        )
        .await
        .unwrap();

        let p = &report.profile;
        assert_eq!(p.full_name, "Jane Doe");
        assert_eq!(p.headline.as_deref(), Some("Senior Engineer at TechCorp"));
        assert_eq!(p.email.as_deref(), Some("jane@example.com"));
        assert_eq!(p.summary.as_deref(), Some("Engineer who builds reliable systems."));
        assert_eq!(p.experiences.len(), 2);
        assert_eq!(p.experiences[0].company, "TechCorp");
        assert_eq!(p.experiences[0].start, YearMonth::new(2020, 1).unwrap());
        assert_eq!(p.experiences[0].skills, vec!["Rust", "Tokio"]);
        assert_eq!(p.education[0].institution, "Stanford University");
        assert_eq!(p.languages[0].proficiency, Some(Proficiency::NativeOrBilingual));
        assert_eq!(p.skills, vec!["Rust", "Kubernetes"]);
        assert_eq!(report.dropped_records, 0);
        assert_eq!(
            report.sections,
            vec!["contact", "summary", "experience", "education", "languages", "skills"]
        );
    }

    #[tokio::test]
    async fn test_pages_are_joined() {
        let (first, second) = SAMPLE_EXPORT.split_at(SAMPLE_EXPORT.find("Education").unwrap());
        let document = RawDocumentText {
            pages: vec![first.to_string(), second.to_string()],
        };
        let report = extract_profile(&ctx(FakeClassifier::new()), &document)
            .await
            .unwrap();
        assert_eq!(report.profile.education.len(), 1);
        assert_eq!(report.profile.experiences.len(), 2);
    }

    #[tokio::test]
    async fn test_sections_of_one_kind_keep_document_order() {
        let text = "Contact\njane@example.com\nJane Doe\nPlatform Engineer\n\
                    WORK EXPERIENCE\nStaff Engineer\nZeta Corp\nJanuary 2021 - Present\n\
                    PROFESSIONAL EXPERIENCE\nAnalyst\nAlpha Inc\nJanuary 2018 - December 2020";
        let ctx = ExtractionContext {
            classifier: Arc::new(FakeClassifier::new()),
            strategy: StrategyChoice::Uppercase,
        };
        let report = extract_profile(&ctx, &RawDocumentText::from_text(text))
            .await
            .unwrap();

        let companies: Vec<&str> = report
            .profile
            .experiences
            .iter()
            .map(|e| e.company.as_str())
            .collect();
        assert_eq!(companies, vec!["Zeta Corp", "Alpha Inc"]);
        assert_eq!(
            report.sections,
            vec!["preamble", "work experience", "professional experience"]
        );
    }

    #[tokio::test]
    async fn test_blank_document_is_an_extraction_error() {
        let err = extract_profile(&ctx(FakeClassifier::new()), &RawDocumentText::from_text("  \n"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DocumentExtraction(_)));
    }

    #[tokio::test]
    async fn test_classifier_failure_without_marker_fails_assembly() {
        let text = "Jane Doe\nEngineer\nEXPERIENCE\nEngineer\nAcme\nJan 2021 - Present";
        let err = extract_profile(
            &ctx(FakeClassifier::failing()),
            &RawDocumentText::from_text(text),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::ProfileAssembly { .. }));
    }
}
