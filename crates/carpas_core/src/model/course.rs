//! Course record and its create/update input.
//!
//! # Invariants
//! - `code` is trimmed, upper-cased, non-empty and unique.
//! - `name` is non-empty after trimming.

use super::validation::{normalize_required, ValidationError};
use serde::{Deserialize, Serialize};

pub type CourseId = i64;

/// Persisted course row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    pub semester: Option<i64>,
    pub credits: Option<i64>,
}

/// Caller input for `create_course` / `update_course`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDraft {
    pub code: String,
    pub name: String,
    pub semester: Option<i64>,
    pub credits: Option<i64>,
}

impl CourseDraft {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn semester(mut self, value: i64) -> Self {
        self.semester = Some(value);
        self
    }

    pub fn credits(mut self, value: i64) -> Self {
        self.credits = Some(value);
        self
    }

    /// Returns the draft with a canonical code and trimmed name.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            code: normalize_course_code(&self.code)?,
            name: normalize_required(&self.name, ValidationError::NameRequired)?,
            semester: self.semester,
            credits: self.credits,
        })
    }
}

/// Canonical course code form: trimmed and upper-cased.
pub fn normalize_course_code(code: &str) -> Result<String, ValidationError> {
    normalize_required(code, ValidationError::CourseCodeRequired).map(|code| code.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::{normalize_course_code, CourseDraft};
    use crate::model::validation::ValidationError;

    #[test]
    fn course_code_is_trimmed_and_uppercased() {
        assert_eq!(normalize_course_code(" cs301 ").unwrap(), "CS301");
    }

    #[test]
    fn blank_code_is_rejected() {
        let err = CourseDraft::new("   ", "Operating Systems")
            .normalized()
            .unwrap_err();
        assert_eq!(err, ValidationError::CourseCodeRequired);
    }
}
