pub mod application;
pub mod form;
pub mod profile;

pub use application::{ApplicationRecord, ApplicationStatus};
pub use form::{FieldType, FormFieldDescriptor, MappedField};
pub use profile::{
    CandidateProfile, EducationRecord, ExperienceRecord, LanguageProficiency, Proficiency,
    VolunteerRecord, YearMonth,
};
