//! Core records integrity and analytics engine for CARPAS.
//! This crate is the single source of truth for record invariants.

pub mod analytics;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use analytics::{
    course_average_attendance_pct, course_average_marks_pct, find_at_risk, percentage,
    student_enrollment_summaries, AtRiskEnrollment, EnrollmentSummary, RiskThresholds,
};
pub use db::{
    open_db, open_db_in_memory, open_db_with_report, reconcile_store, reset_store,
    with_transaction, DbError, DbResult, ReconcileReport,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attendance::Attendance;
pub use model::course::{Course, CourseDraft, CourseId};
pub use model::enrollment::{Enrollment, EnrollmentId, EnrollmentListItem};
pub use model::mark::{Mark, MarkDraft, MarkId, DEFAULT_ASSESSMENT};
pub use model::student::{Student, StudentDraft, StudentId};
pub use model::validation::ValidationError;
pub use repo::course_repo::{CourseRepository, SqliteCourseRepository};
pub use repo::enrollment_repo::{EnrollmentRepository, SqliteEnrollmentRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::course_service::CourseService;
pub use service::enrollment_service::EnrollmentService;
pub use service::student_service::StudentService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
