//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Isolate SQLite query details from service orchestration.
//! - Translate store uniqueness failures into [`RepoError::Duplicate`].
//!
//! # Invariants
//! - Repositories persist already-normalized input; validation belongs to
//!   the model drafts and the service layer.
//! - Write paths targeting a missing row return [`RepoError::NotFound`].

use crate::db::DbError;
use std::fmt::{Display, Formatter};

pub mod course_repo;
pub mod enrollment_repo;
pub mod student_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Record kind named by a not-found error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Student,
    Course,
    Enrollment,
    Mark,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Student => "student",
            Self::Course => "course",
            Self::Enrollment => "enrollment",
            Self::Mark => "mark",
        };
        f.write_str(name)
    }
}

/// Natural key backed by a unique index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    StudentRollNo,
    CourseCode,
    EnrollmentPair,
}

/// Repository error for record persistence and query operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("unique key violated: {0:?}")]
    Duplicate(UniqueKey),
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: i64 },
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps a SQLite unique-constraint failure to `Duplicate(key)`.
pub(crate) fn unique_violation_as(key: UniqueKey) -> impl FnOnce(rusqlite::Error) -> RepoError {
    move |err| {
        if is_unique_violation(&err) {
            RepoError::Duplicate(key)
        } else {
            err.into()
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

pub(crate) fn ensure_changed(changed: usize, entity: Entity, id: i64) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound { entity, id });
    }
    Ok(())
}
