use crate::models::{FieldType, FormFieldDescriptor};

/// Natural-language statement of what a field asks for, used as the premise
/// the candidate values are scored against.
pub fn hypothesis_for(descriptor: &FormFieldDescriptor) -> String {
    match descriptor.field_type {
        FieldType::Email => "This field requires an email address".to_string(),
        FieldType::Tel => "This field requires a phone number".to_string(),
        FieldType::Date => "This field requires a date".to_string(),
        _ => format!(
            "This field requires {}",
            descriptor.label.trim().to_lowercase()
        ),
    }
}
