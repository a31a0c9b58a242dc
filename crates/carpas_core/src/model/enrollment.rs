//! Enrollment record and its flattened display projection.
//!
//! # Invariants
//! - A (student, course) pair has at most one enrollment.
//! - An enrollment owns at most one attendance row and any number of marks.

use super::course::CourseId;
use super::student::StudentId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type EnrollmentId = i64;

/// Persisted enrollment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub enrolled_on: NaiveDate,
}

/// Enrollment joined with its student and course, for list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentListItem {
    pub enrollment_id: EnrollmentId,
    pub enrolled_on: NaiveDate,
    pub student_id: StudentId,
    pub roll_no: String,
    pub student_name: String,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
}
