//! Enrollment, attendance and marks use-case service.
//!
//! # Invariants
//! - Enrollment requires both parents to exist and the pair to be new.
//! - `0 <= attended <= total` before attendance is written; one row per
//!   enrollment, overwritten in place.
//! - `max > 0` and `0 <= obtained <= max` before a mark is appended.

use crate::model::attendance::{validate_attendance, Attendance};
use crate::model::course::CourseId;
use crate::model::enrollment::{Enrollment, EnrollmentId, EnrollmentListItem};
use crate::model::mark::{Mark, MarkDraft, MarkId};
use crate::model::student::StudentId;
use crate::repo::enrollment_repo::EnrollmentRepository;
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Enrollment aggregate service facade over repository implementations.
pub struct EnrollmentService<R: EnrollmentRepository> {
    repo: R,
}

impl<R: EnrollmentRepository> EnrollmentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Enrolls a student in a course.
    ///
    /// # Errors
    /// - `StudentNotFound` / `CourseNotFound` when either parent is absent
    ///   (student checked first).
    /// - `AlreadyEnrolled` when the pair already has an enrollment.
    pub fn enroll_student(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> ServiceResult<Enrollment> {
        if !self.repo.student_exists(student_id)? {
            return Err(ServiceError::StudentNotFound);
        }
        if !self.repo.course_exists(course_id)? {
            return Err(ServiceError::CourseNotFound);
        }
        if self.repo.find_enrollment(student_id, course_id)?.is_some() {
            return Err(ServiceError::AlreadyEnrolled);
        }

        let enrollment = self.repo.create_enrollment(student_id, course_id)?;
        info!(
            "event=enroll module=service status=ok enrollment_id={} student_id={} course_id={}",
            enrollment.id, student_id, course_id
        );
        Ok(enrollment)
    }

    /// Removes an enrollment together with its attendance and marks.
    pub fn remove_enrollment(&self, id: EnrollmentId) -> ServiceResult<()> {
        self.repo.delete_enrollment(id)?;
        info!("event=unenroll module=service status=ok enrollment_id={id}");
        Ok(())
    }

    pub fn find_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> ServiceResult<Option<Enrollment>> {
        Ok(self.repo.find_enrollment(student_id, course_id)?)
    }

    /// Lists enrollments joined with student and course, newest first.
    pub fn list_enrollments(&self) -> ServiceResult<Vec<EnrollmentListItem>> {
        Ok(self.repo.list_enrollments()?)
    }

    /// Creates or overwrites the attendance row of an enrollment.
    pub fn set_attendance(
        &self,
        enrollment_id: EnrollmentId,
        total_classes: i64,
        attended_classes: i64,
    ) -> ServiceResult<Attendance> {
        self.require_enrollment(enrollment_id)?;
        validate_attendance(total_classes, attended_classes)?;

        let attendance =
            self.repo
                .upsert_attendance(enrollment_id, total_classes, attended_classes)?;
        info!(
            "event=attendance_set module=service status=ok enrollment_id={} total={} attended={}",
            enrollment_id, total_classes, attended_classes
        );
        Ok(attendance)
    }

    pub fn get_attendance(&self, enrollment_id: EnrollmentId) -> ServiceResult<Option<Attendance>> {
        Ok(self.repo.get_attendance(enrollment_id)?)
    }

    /// Appends one assessment mark to an enrollment.
    pub fn add_mark(&self, enrollment_id: EnrollmentId, draft: &MarkDraft) -> ServiceResult<Mark> {
        self.require_enrollment(enrollment_id)?;
        let draft = draft.normalized()?;

        let mark = self.repo.add_mark(enrollment_id, &draft)?;
        info!(
            "event=mark_add module=service status=ok enrollment_id={} mark_id={}",
            enrollment_id, mark.id
        );
        Ok(mark)
    }

    pub fn delete_mark(&self, id: MarkId) -> ServiceResult<()> {
        self.repo.delete_mark(id)?;
        info!("event=mark_delete module=service status=ok mark_id={id}");
        Ok(())
    }

    /// Lists marks of one enrollment, newest first.
    pub fn list_marks_for_enrollment(&self, enrollment_id: EnrollmentId) -> ServiceResult<Vec<Mark>> {
        Ok(self.repo.list_marks(enrollment_id)?)
    }

    pub fn count_marks(&self, enrollment_id: EnrollmentId) -> ServiceResult<u64> {
        Ok(self.repo.count_marks(enrollment_id)?)
    }

    fn require_enrollment(&self, id: EnrollmentId) -> ServiceResult<Enrollment> {
        self.repo
            .get_enrollment(id)?
            .ok_or(ServiceError::EnrollmentNotFound)
    }
}
