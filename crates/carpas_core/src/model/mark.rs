//! Assessment mark record and its input.
//!
//! # Invariants
//! - `max_marks > 0` and `0 <= marks_obtained <= max_marks`.
//! - `assessment` is never blank; it defaults to [`DEFAULT_ASSESSMENT`].
//! - Marks are append-only per enrollment; there is no overwrite.

use super::enrollment::EnrollmentId;
use super::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type MarkId = i64;

/// Label used when the caller leaves the assessment blank.
pub const DEFAULT_ASSESSMENT: &str = "Exam";

/// Persisted mark row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub id: MarkId,
    pub enrollment_id: EnrollmentId,
    pub assessment: String,
    pub marks_obtained: f64,
    pub max_marks: f64,
    pub recorded_on: NaiveDate,
}

/// Caller input for `add_mark`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkDraft {
    pub assessment: String,
    pub marks_obtained: f64,
    pub max_marks: f64,
}

impl MarkDraft {
    pub fn new(assessment: impl Into<String>, marks_obtained: f64, max_marks: f64) -> Self {
        Self {
            assessment: assessment.into(),
            marks_obtained,
            max_marks,
        }
    }

    /// Validates the score range and fills in the default label.
    ///
    /// Non-finite values fail the same checks as out-of-range ones.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        if !(self.max_marks.is_finite() && self.max_marks > 0.0) {
            return Err(ValidationError::MaxMarksNotPositive);
        }
        if !(self.marks_obtained.is_finite()
            && (0.0..=self.max_marks).contains(&self.marks_obtained))
        {
            return Err(ValidationError::MarksOutOfRange);
        }

        let trimmed = self.assessment.trim();
        let assessment = if trimmed.is_empty() {
            DEFAULT_ASSESSMENT.to_string()
        } else {
            trimmed.to_string()
        };

        Ok(Self {
            assessment,
            marks_obtained: self.marks_obtained,
            max_marks: self.max_marks,
        })
    }
}
