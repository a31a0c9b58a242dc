//! Attendance record and count validation.
//!
//! # Invariants
//! - `0 <= attended_classes <= total_classes`.
//! - At most one row per enrollment.

use super::enrollment::EnrollmentId;
use super::validation::ValidationError;
use serde::{Deserialize, Serialize};

pub type AttendanceId = i64;

/// Persisted attendance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: AttendanceId,
    pub enrollment_id: EnrollmentId,
    pub total_classes: i64,
    pub attended_classes: i64,
}

/// Checks caller-provided class counts before they are stored.
pub fn validate_attendance(total_classes: i64, attended_classes: i64) -> Result<(), ValidationError> {
    if total_classes < 0 || attended_classes < 0 {
        return Err(ValidationError::NegativeAttendance);
    }
    if attended_classes > total_classes {
        return Err(ValidationError::AttendedExceedsTotal);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_attendance;
    use crate::model::validation::ValidationError;

    #[test]
    fn negative_counts_are_rejected_before_range_check() {
        assert_eq!(
            validate_attendance(-1, 5),
            Err(ValidationError::NegativeAttendance)
        );
        assert_eq!(
            validate_attendance(10, -1),
            Err(ValidationError::NegativeAttendance)
        );
    }

    #[test]
    fn attended_may_equal_but_not_exceed_total() {
        assert_eq!(validate_attendance(40, 40), Ok(()));
        assert_eq!(validate_attendance(0, 0), Ok(()));
        assert_eq!(
            validate_attendance(40, 41),
            Err(ValidationError::AttendedExceedsTotal)
        );
    }
}
