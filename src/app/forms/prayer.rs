//! Prayer request form.
//!
//! A request may be anonymous, in which case no name is needed. An email
//! is optional but must be valid when given.

use super::validation::{self, ValidationError};
use super::{form_data, FieldValue, FormData, FormSchema};

pub const CATEGORIES: &[&str] = &["healing", "family", "guidance", "thanksgiving", "salvation", "other"];
pub const URGENCY: &[&str] = &["normal", "urgent"];

#[derive(Debug, Clone, Copy, Default)]
pub struct PrayerRequestForm;

impl FormSchema for PrayerRequestForm {
    const NAME: &'static str = "prayer";
    const FIELDS: &'static [&'static str] = &["name", "email", "request", "category", "urgency", "anonymous"];

    fn defaults() -> FormData {
        form_data([
            ("name", FieldValue::from("")),
            ("email", FieldValue::from("")),
            ("request", FieldValue::from("")),
            ("category", FieldValue::from("other")),
            ("urgency", FieldValue::from("normal")),
            ("anonymous", FieldValue::from(false)),
        ])
    }

    fn validate_field(field: &str, value: &FieldValue, draft: &FormData) -> Option<ValidationError> {
        let text = value.as_text();
        match field {
            "name" => {
                let anonymous = draft.get("anonymous").is_some_and(FieldValue::as_flag);
                if anonymous && text.trim().is_empty() {
                    None
                } else {
                    validation::required_text(text, 2, 100)
                }
            }
            "email" => validation::optional_email(text),
            "request" => validation::required_text(text, 10, 1000),
            "category" => validation::one_of(text, CATEGORIES),
            "urgency" => validation::one_of(text, URGENCY),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_requests_need_no_name() {
        let mut draft = PrayerRequestForm::defaults();
        let blank = FieldValue::from("");
        assert_eq!(
            PrayerRequestForm::validate_field("name", &blank, &draft),
            Some(ValidationError::Required)
        );

        draft.insert("anonymous".to_string(), FieldValue::from(true));
        assert_eq!(PrayerRequestForm::validate_field("name", &blank, &draft), None);
    }

    #[test]
    fn email_is_optional_but_checked() {
        let draft = PrayerRequestForm::defaults();
        assert_eq!(PrayerRequestForm::validate_field("email", &FieldValue::from(""), &draft), None);
        assert_eq!(
            PrayerRequestForm::validate_field("email", &FieldValue::from("not-an-email"), &draft),
            Some(ValidationError::InvalidEmail)
        );
    }

    #[test]
    fn request_length_and_choices() {
        let draft = PrayerRequestForm::defaults();
        assert_eq!(
            PrayerRequestForm::validate_field("request", &FieldValue::from("x".repeat(1001)), &draft),
            Some(ValidationError::TooLong { max: 1000 })
        );
        assert_eq!(
            PrayerRequestForm::validate_field("urgency", &FieldValue::from("someday"), &draft),
            Some(ValidationError::InvalidChoice)
        );
        assert_eq!(PrayerRequestForm::validate_field("category", &FieldValue::from("healing"), &draft), None);
    }
}
