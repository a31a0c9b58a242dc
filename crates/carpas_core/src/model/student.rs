//! Student record and its create/update input.
//!
//! # Invariants
//! - `roll_no` and `name` are non-empty after trimming.
//! - `roll_no` is unique across the store (enforced by service + index).
//! - Optional text fields never hold blank strings.

use super::validation::{normalize_optional, normalize_required, ValidationError};
use serde::{Deserialize, Serialize};

pub type StudentId = i64;

/// Persisted student row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub roll_no: String,
    pub name: String,
    pub department: Option<String>,
    pub semester: Option<i64>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Caller input for `create_student` / `update_student`.
///
/// Raw values are kept as given; [`StudentDraft::normalized`] produces the
/// form that is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDraft {
    pub roll_no: String,
    pub name: String,
    pub department: Option<String>,
    pub semester: Option<i64>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl StudentDraft {
    /// Creates a draft with only the required fields set.
    pub fn new(roll_no: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            roll_no: roll_no.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn department(mut self, value: impl Into<String>) -> Self {
        self.department = Some(value.into());
        self
    }

    pub fn semester(mut self, value: i64) -> Self {
        self.semester = Some(value);
        self
    }

    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    pub fn phone(mut self, value: impl Into<String>) -> Self {
        self.phone = Some(value.into());
        self
    }

    /// Returns the trimmed draft, or the first missing required field.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            roll_no: normalize_required(&self.roll_no, ValidationError::RollNoRequired)?,
            name: normalize_required(&self.name, ValidationError::NameRequired)?,
            department: normalize_optional(self.department.as_deref()),
            semester: self.semester,
            email: normalize_optional(self.email.as_deref()),
            phone: normalize_optional(self.phone.as_deref()),
        })
    }
}
