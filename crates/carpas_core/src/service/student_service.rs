//! Student use-case service.
//!
//! # Invariants
//! - Roll number and name are trimmed and non-empty before any write.
//! - Roll numbers are unique; a collision is reported as
//!   [`ServiceError::DuplicateRollNo`] whether caught by lookup or by the
//!   unique index.

use crate::model::student::{Student, StudentDraft, StudentId};
use crate::repo::student_repo::StudentRepository;
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Student service facade over repository implementations.
pub struct StudentService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one student from normalized draft input.
    pub fn create_student(&self, draft: &StudentDraft) -> ServiceResult<Student> {
        let draft = draft.normalized()?;
        if self.repo.find_by_roll_no(&draft.roll_no)?.is_some() {
            return Err(ServiceError::DuplicateRollNo);
        }

        let student = self.repo.create_student(&draft)?;
        info!(
            "event=student_create module=service status=ok student_id={}",
            student.id
        );
        Ok(student)
    }

    /// Replaces every field of an existing student.
    pub fn update_student(&self, id: StudentId, draft: &StudentDraft) -> ServiceResult<Student> {
        if self.repo.get_student(id)?.is_none() {
            return Err(ServiceError::StudentNotFound);
        }

        let draft = draft.normalized()?;
        if let Some(holder) = self.repo.find_by_roll_no(&draft.roll_no)? {
            if holder.id != id {
                return Err(ServiceError::DuplicateRollNo);
            }
        }

        let student = self.repo.update_student(id, &draft)?;
        info!("event=student_update module=service status=ok student_id={id}");
        Ok(student)
    }

    /// Deletes a student together with its enrollments, attendance and marks.
    pub fn delete_student(&self, id: StudentId) -> ServiceResult<()> {
        self.repo.delete_student(id)?;
        info!("event=student_delete module=service status=ok student_id={id}");
        Ok(())
    }

    pub fn get_student(&self, id: StudentId) -> ServiceResult<Option<Student>> {
        Ok(self.repo.get_student(id)?)
    }

    /// Looks a student up by roll number; input is trimmed first.
    pub fn find_student_by_roll_no(&self, roll_no: &str) -> ServiceResult<Option<Student>> {
        let roll_no = roll_no.trim();
        if roll_no.is_empty() {
            return Ok(None);
        }
        Ok(self.repo.find_by_roll_no(roll_no)?)
    }

    /// Lists all students ordered by roll number.
    pub fn list_students(&self) -> ServiceResult<Vec<Student>> {
        Ok(self.repo.list_students()?)
    }
}
