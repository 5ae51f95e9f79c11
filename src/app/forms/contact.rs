//! Contact form.

use super::validation::{self, ValidationError};
use super::{form_data, FieldValue, FormData, FormSchema};

pub const CATEGORIES: &[&str] = &["general", "prayer", "ministry", "events", "volunteer", "other"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ContactForm;

impl FormSchema for ContactForm {
    const NAME: &'static str = "contact";
    const FIELDS: &'static [&'static str] =
        &["name", "email", "phone", "subject", "message", "category", "consent"];

    fn defaults() -> FormData {
        form_data([
            ("name", FieldValue::from("")),
            ("email", FieldValue::from("")),
            ("phone", FieldValue::from("")),
            ("subject", FieldValue::from("")),
            ("message", FieldValue::from("")),
            ("category", FieldValue::from("general")),
            ("consent", FieldValue::from(false)),
        ])
    }

    fn validate_field(field: &str, value: &FieldValue, _draft: &FormData) -> Option<ValidationError> {
        let text = value.as_text();
        match field {
            "name" => validation::required_text(text, 2, 100),
            "email" => validation::email(text),
            "phone" => validation::optional_phone(text),
            "subject" => validation::required_text(text, 5, 200),
            "message" => validation::required_text(text, 10, 2000),
            "category" => validation::one_of(text, CATEGORIES),
            "consent" => validation::consent(value.as_flag()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("name", "A", Some(ValidationError::TooShort { min: 2 }))]
    #[case("name", "Anu", None)]
    #[case("email", "", Some(ValidationError::Required))]
    #[case("email", "anu@", Some(ValidationError::InvalidEmail))]
    #[case("phone", "", None)]
    #[case("phone", "555", Some(ValidationError::InvalidPhone))]
    #[case("subject", "Hi", Some(ValidationError::TooShort { min: 5 }))]
    #[case("message", "Too short", Some(ValidationError::TooShort { min: 10 }))]
    #[case("message", "Please pray for my family.", None)]
    #[case("category", "volunteer", None)]
    #[case("category", "sales", Some(ValidationError::InvalidChoice))]
    #[case("unknown", "", None)]
    fn text_rules(#[case] field: &str, #[case] value: &str, #[case] expected: Option<ValidationError>) {
        let draft = ContactForm::defaults();
        assert_eq!(ContactForm::validate_field(field, &FieldValue::from(value), &draft), expected);
    }

    #[test]
    fn consent_must_be_checked() {
        let draft = ContactForm::defaults();
        assert_eq!(
            ContactForm::validate_field("consent", &FieldValue::from(false), &draft),
            Some(ValidationError::ConsentRequired)
        );
        assert_eq!(ContactForm::validate_field("consent", &FieldValue::from(true), &draft), None);
    }

    #[test]
    fn message_over_limit() {
        let long = "a".repeat(2001);
        assert_eq!(
            ContactForm::validate_field("message", &FieldValue::from(long), &ContactForm::defaults()),
            Some(ValidationError::TooLong { max: 2000 })
        );
    }

    #[test]
    fn defaults_cover_every_field() {
        let defaults = ContactForm::defaults();
        assert!(ContactForm::FIELDS.iter().all(|f| defaults.contains_key(*f)));
    }
}
