//! Required-field checks applied before the wizard accepts an answer.

use std::fmt;

use sitelog_domain::{AnswerValue, FieldKind, FieldSpec};

/// Field-level validation failure, shown to the user as a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub key: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &FieldSpec, message: impl Into<String>) -> Self {
        Self {
            key: field.key.clone(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Checks `value` against `field` and returns the normalized answer to store.
///
/// `Ok(None)` means the field is left unanswered. Optional fields always pass:
/// input that does not fit their kind is kept verbatim as text.
pub fn validate(
    field: &FieldSpec,
    value: Option<&AnswerValue>,
) -> Result<Option<AnswerValue>, ValidationError> {
    let value = value.filter(|value| !value.is_blank());
    let Some(value) = value else {
        if field.required {
            return Err(ValidationError::new(
                field,
                format!("{} is required", field.label),
            ));
        }
        return Ok(None);
    };

    match &field.kind {
        FieldKind::Text | FieldKind::LongText => {
            Ok(Some(AnswerValue::Text(value.to_cell().trim().to_string())))
        }
        FieldKind::Number => match value.as_number() {
            Some(number) if number > 0.0 => Ok(Some(AnswerValue::Number(number))),
            Some(number) if !field.required => Ok(Some(AnswerValue::Number(number))),
            Some(_) => Err(ValidationError::new(
                field,
                format!("{} must be greater than zero", field.label),
            )),
            None if field.required => Err(ValidationError::new(
                field,
                format!("{} must be a number", field.label),
            )),
            None => Ok(Some(value.clone())),
        },
        FieldKind::SingleSelect(options) => {
            let choice = value.to_cell().trim().to_string();
            if field.required && !options.iter().any(|option| *option == choice) {
                return Err(ValidationError::new(
                    field,
                    format!("{} must be one of: {}", field.label, options.join(", ")),
                ));
            }
            Ok(Some(AnswerValue::Choice(choice)))
        }
        FieldKind::Date => match value.as_date() {
            Some(date) => Ok(Some(AnswerValue::Date(date))),
            None if field.required => Err(ValidationError::new(
                field,
                format!("{} must be a date (YYYY-MM-DD)", field.label),
            )),
            None => Ok(Some(value.clone())),
        },
    }
}
