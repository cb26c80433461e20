use serde::{Deserialize, Deserializer, Serialize};

/// Kind of input element on the target form. Deserializes from any HTML
/// input type or tag name through [`FieldType::from_html`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Date,
    Select,
    Radio,
    Textarea,
    File,
}

impl FieldType {
    /// Maps an HTML `type` attribute (or tag name) to a field type.
    /// Unknown input types such as `url` or `number` are treated as text.
    pub fn from_html(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "email" => FieldType::Email,
            "tel" | "phone" => FieldType::Tel,
            "date" | "month" => FieldType::Date,
            "select" | "select-one" => FieldType::Select,
            "radio" => FieldType::Radio,
            "textarea" => FieldType::Textarea,
            "file" => FieldType::File,
            _ => FieldType::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Textarea => "textarea",
            FieldType::File => "file",
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let kind = String::deserialize(deserializer)?;
        Ok(FieldType::from_html(&kind))
    }
}

/// Metadata describing one input element to be filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormFieldDescriptor {
    /// Selector or other identity the browser collaborator understands.
    pub identity: String,
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

/// A descriptor with the value chosen for it. Lives for one session only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedField {
    pub descriptor: FormFieldDescriptor,
    pub value: String,
    /// Always within [0, 1].
    pub confidence: f64,
}

impl MappedField {
    pub fn new(descriptor: FormFieldDescriptor, value: String, confidence: f64) -> Self {
        Self {
            descriptor,
            value,
            confidence: clamp_confidence(confidence),
        }
    }

    pub fn empty(descriptor: FormFieldDescriptor) -> Self {
        Self::new(descriptor, String::new(), 0.0)
    }

    pub fn is_file(&self) -> bool {
        self.descriptor.field_type == FieldType::File
    }
}

pub fn clamp_confidence(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_from_html() {
        assert_eq!(FieldType::from_html("EMAIL"), FieldType::Email);
        assert_eq!(FieldType::from_html("url"), FieldType::Text);
        assert_eq!(FieldType::from_html("select-one"), FieldType::Select);
        assert_eq!(FieldType::from_html("file"), FieldType::File);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let d = FormFieldDescriptor {
            identity: "#x".to_string(),
            field_type: FieldType::Text,
            label: "X".to_string(),
            required: false,
            options: vec![],
        };
        assert_eq!(MappedField::new(d.clone(), "v".into(), 1.7).confidence, 1.0);
        assert_eq!(MappedField::new(d.clone(), "v".into(), -0.2).confidence, 0.0);
        assert_eq!(MappedField::new(d, "v".into(), f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_descriptor_deserializes_with_defaults() {
        let d: FormFieldDescriptor =
            serde_json::from_str(r##"{"identity":"#email","field_type":"email","label":"Email"}"##)
                .unwrap();
        assert!(!d.required);
        assert!(d.options.is_empty());
    }

    #[test]
    fn test_descriptor_accepts_html_input_types() {
        let d: FormFieldDescriptor = serde_json::from_str(
            r#"{"identity":"country","field_type":"select-one","label":"Country"}"#,
        )
        .unwrap();
        assert_eq!(d.field_type, FieldType::Select);

        let d: FormFieldDescriptor =
            serde_json::from_str(r#"{"identity":"site","field_type":"url","label":"Website"}"#)
                .unwrap();
        assert_eq!(d.field_type, FieldType::Text);
        assert_eq!(serde_json::to_value(d.field_type).unwrap(), "text");
    }
}
