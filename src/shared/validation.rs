//! Validation Utilities

use validator::ValidationErrors;

use super::error::SessionError;

/// Convert validation errors of one submitted question into a `SessionError`.
///
/// `position` is the 1-based position of the question in the submitted set.
/// When several fields fail, the one whose name sorts first is reported.
pub fn question_validation_error(position: usize, errors: ValidationErrors) -> SessionError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    let message = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let detail = e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, detail)
            })
        })
        .next()
        .unwrap_or_else(|| "validation failed".into());

    SessionError::InvalidQuestion(format!("question {}: {}", position, message))
}
