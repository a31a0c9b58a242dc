//! Caller-facing service error vocabulary.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use crate::repo::{Entity, RepoError, UniqueKey};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by every service operation.
///
/// `Display` output of every variant except `Store` is a stable,
/// human-readable message meant for direct display.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Roll number already exists")]
    DuplicateRollNo,
    #[error("Course code already exists")]
    DuplicateCourseCode,
    #[error("Student is already enrolled in this course")]
    AlreadyEnrolled,
    #[error("Student not found")]
    StudentNotFound,
    #[error("Course not found")]
    CourseNotFound,
    #[error("Enrollment not found")]
    EnrollmentNotFound,
    #[error("Mark not found")]
    MarkNotFound,
    /// Unexpected store failure, passed through unchanged.
    #[error(transparent)]
    Store(DbError),
}

impl ServiceError {
    /// Returns `true` for expected conditions (validation, conflict,
    /// not-found) as opposed to store failures.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Store(_))
    }

    pub(crate) fn not_found(entity: Entity) -> Self {
        match entity {
            Entity::Student => Self::StudentNotFound,
            Entity::Course => Self::CourseNotFound,
            Entity::Enrollment => Self::EnrollmentNotFound,
            Entity::Mark => Self::MarkNotFound,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err) => Self::Store(err),
            RepoError::Duplicate(UniqueKey::StudentRollNo) => Self::DuplicateRollNo,
            RepoError::Duplicate(UniqueKey::CourseCode) => Self::DuplicateCourseCode,
            RepoError::Duplicate(UniqueKey::EnrollmentPair) => Self::AlreadyEnrolled,
            RepoError::NotFound { entity, .. } => Self::not_found(entity),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(DbError::Sqlite(value))
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::db::DbError;
    use crate::model::validation::ValidationError;
    use crate::repo::{Entity, RepoError, UniqueKey};

    #[test]
    fn repo_errors_map_to_stable_messages() {
        let cases = [
            (
                RepoError::Duplicate(UniqueKey::StudentRollNo),
                "Roll number already exists",
            ),
            (
                RepoError::Duplicate(UniqueKey::CourseCode),
                "Course code already exists",
            ),
            (
                RepoError::Duplicate(UniqueKey::EnrollmentPair),
                "Student is already enrolled in this course",
            ),
            (
                RepoError::NotFound {
                    entity: Entity::Mark,
                    id: 9,
                },
                "Mark not found",
            ),
        ];
        for (repo_err, message) in cases {
            let err = ServiceError::from(repo_err);
            assert!(err.is_user_facing());
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn validation_message_passes_through() {
        let err = ServiceError::from(ValidationError::AttendedExceedsTotal);
        assert_eq!(err.to_string(), "Attended classes cannot exceed total classes");
    }

    #[test]
    fn store_failures_are_not_user_facing() {
        let err = ServiceError::from(DbError::Sqlite(rusqlite::Error::InvalidQuery));
        assert!(!err.is_user_facing());
    }
}
