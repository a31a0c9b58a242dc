//! Course use-case service.
//!
//! # Invariants
//! - Course codes are stored trimmed and upper-cased, so lookups and
//!   uniqueness are case-insensitive from the caller's point of view.
//! - A code collision is reported as [`ServiceError::DuplicateCourseCode`].

use crate::model::course::{normalize_course_code, Course, CourseDraft, CourseId};
use crate::repo::course_repo::CourseRepository;
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Course service facade over repository implementations.
pub struct CourseService<R: CourseRepository> {
    repo: R,
}

impl<R: CourseRepository> CourseService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_course(&self, draft: &CourseDraft) -> ServiceResult<Course> {
        let draft = draft.normalized()?;
        if self.repo.find_by_code(&draft.code)?.is_some() {
            return Err(ServiceError::DuplicateCourseCode);
        }

        let course = self.repo.create_course(&draft)?;
        info!(
            "event=course_create module=service status=ok course_id={}",
            course.id
        );
        Ok(course)
    }

    pub fn update_course(&self, id: CourseId, draft: &CourseDraft) -> ServiceResult<Course> {
        if self.repo.get_course(id)?.is_none() {
            return Err(ServiceError::CourseNotFound);
        }

        let draft = draft.normalized()?;
        if let Some(holder) = self.repo.find_by_code(&draft.code)? {
            if holder.id != id {
                return Err(ServiceError::DuplicateCourseCode);
            }
        }

        let course = self.repo.update_course(id, &draft)?;
        info!("event=course_update module=service status=ok course_id={id}");
        Ok(course)
    }

    /// Deletes a course together with its enrollments, attendance and marks.
    pub fn delete_course(&self, id: CourseId) -> ServiceResult<()> {
        self.repo.delete_course(id)?;
        info!("event=course_delete module=service status=ok course_id={id}");
        Ok(())
    }

    pub fn get_course(&self, id: CourseId) -> ServiceResult<Option<Course>> {
        Ok(self.repo.get_course(id)?)
    }

    /// Looks a course up by code; input is normalized like stored codes.
    pub fn find_course_by_code(&self, code: &str) -> ServiceResult<Option<Course>> {
        match normalize_course_code(code) {
            Ok(code) => Ok(self.repo.find_by_code(&code)?),
            Err(_) => Ok(None),
        }
    }

    /// Lists all courses ordered by code.
    pub fn list_courses(&self) -> ServiceResult<Vec<Course>> {
        Ok(self.repo.list_courses()?)
    }
}
