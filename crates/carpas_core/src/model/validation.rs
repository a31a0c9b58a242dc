//! Input validation errors and text normalization shared by record drafts.

/// Malformed or out-of-range caller input, caught before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Roll number is required")]
    RollNoRequired,
    #[error("Name is required")]
    NameRequired,
    #[error("Course code is required")]
    CourseCodeRequired,
    #[error("Attendance values must be >= 0")]
    NegativeAttendance,
    #[error("Attended classes cannot exceed total classes")]
    AttendedExceedsTotal,
    #[error("Max marks must be > 0")]
    MaxMarksNotPositive,
    #[error("Marks obtained must be between 0 and max marks")]
    MarksOutOfRange,
}

/// Trims `value`; returns `missing` when nothing is left.
pub fn normalize_required(value: &str, missing: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(missing)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trims an optional text field, mapping blank input to `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{normalize_optional, normalize_required, ValidationError};

    #[test]
    fn normalize_required_trims_and_rejects_blank() {
        assert_eq!(
            normalize_required("  R-01 ", ValidationError::RollNoRequired).unwrap(),
            "R-01"
        );
        assert_eq!(
            normalize_required(" \t ", ValidationError::NameRequired).unwrap_err(),
            ValidationError::NameRequired
        );
    }

    #[test]
    fn normalize_optional_maps_blank_to_none() {
        assert_eq!(normalize_optional(Some("  ")), None);
        assert_eq!(normalize_optional(None), None);
        assert_eq!(
            normalize_optional(Some(" cse ")).as_deref(),
            Some("cse")
        );
    }
}
