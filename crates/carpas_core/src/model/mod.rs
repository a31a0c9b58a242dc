//! Records domain model: students, courses, enrollments, attendance, marks.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Normalize and validate caller input before it reaches storage.
//!
//! # Invariants
//! - Every record is identified by a store-assigned surrogate `i64` id.
//! - Relationships are plain foreign-key ids, navigated by query.
//! - Deletion is hard delete with cascade; there are no tombstones.

pub mod attendance;
pub mod course;
pub mod enrollment;
pub mod mark;
pub mod student;
pub mod validation;
