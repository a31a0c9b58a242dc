//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input, then delegate mutations to repositories.
//! - Translate repository outcomes into the caller-facing [`ServiceError`]
//!   vocabulary.
//!
//! # Invariants
//! - Services are the only mutation path for record data.
//! - Every invariant is checked twice: proactively here, and by the store's
//!   unique indexes and constraints at statement time.
//! - Callers run each service call inside one
//!   [`crate::db::with_transaction`] boundary.

pub mod course_service;
pub mod enrollment_service;
mod error;
pub mod student_service;

pub use error::{ServiceError, ServiceResult};

use crate::repo::course_repo::SqliteCourseRepository;
use crate::repo::enrollment_repo::SqliteEnrollmentRepository;
use crate::repo::student_repo::SqliteStudentRepository;
use course_service::CourseService;
use enrollment_service::EnrollmentService;
use rusqlite::Connection;
use student_service::StudentService;

/// Student service bound to a connection or open transaction.
pub fn students(conn: &Connection) -> StudentService<SqliteStudentRepository<'_>> {
    StudentService::new(SqliteStudentRepository::new(conn))
}

/// Course service bound to a connection or open transaction.
pub fn courses(conn: &Connection) -> CourseService<SqliteCourseRepository<'_>> {
    CourseService::new(SqliteCourseRepository::new(conn))
}

/// Enrollment service bound to a connection or open transaction.
pub fn enrollments(conn: &Connection) -> EnrollmentService<SqliteEnrollmentRepository<'_>> {
    EnrollmentService::new(SqliteEnrollmentRepository::new(conn))
}
