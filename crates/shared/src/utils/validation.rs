use validator::{Validate, ValidationErrors};

use crate::errors::ServiceError;

/// Flattens validator output into `field: message` lines, sorted by field
/// so replies are stable.
pub fn format_validation_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut error_messages = Vec::new();

    for (field, field_errors) in fields {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| match error.code.as_ref() {
                    "length" => "Invalid length".to_string(),
                    "range" => "Value out of range".to_string(),
                    "custom" => "Custom validation failed".to_string(),
                    _ => format!("Invalid {field}"),
                });
            error_messages.push(format!("{field}: {message}"));
        }
    }

    if error_messages.is_empty() {
        error_messages.push("Validation failed".to_string());
    }

    error_messages
}

pub fn validate_request<T: Validate>(req: &T) -> Result<(), ServiceError> {
    req.validate()
        .map_err(|errors| ServiceError::Validation(format_validation_errors(&errors)))
}
