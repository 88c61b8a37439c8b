/// Decode failure for a single input, anchored to the element that shows it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Form-level failure such as "no hazard selected", shown as a banner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FormValidationError {
    pub message: String,
}

impl FormValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<FieldError> for FormValidationError {
    fn from(value: FieldError) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

/// First failing check in declaration order.
///
/// Callers evaluate every check up front and pass the outcomes here, so no
/// check is skipped because an earlier one failed.
pub fn first_error(checks: &[Option<FieldError>]) -> Option<FieldError> {
    checks.iter().flatten().next().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_keeps_declaration_order() {
        let checks = [
            None,
            Some(FieldError::new("time", "required")),
            Some(FieldError::new("department", "required")),
        ];
        assert_eq!(first_error(&checks).map(|e| e.field), Some("time".to_string()));
        assert_eq!(first_error(&[None, None]), None);
    }
}
