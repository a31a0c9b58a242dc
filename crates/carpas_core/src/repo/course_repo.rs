//! Course repository contract and SQLite implementation.
//!
//! # Invariants
//! - Lists are ordered by `code ASC, id ASC`.
//! - A code collision surfaces as `Duplicate(CourseCode)`.

use super::{ensure_changed, unique_violation_as, Entity, RepoResult, UniqueKey};
use crate::model::course::{Course, CourseDraft, CourseId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COURSE_SELECT_SQL: &str = "SELECT
    id,
    code,
    name,
    semester,
    credits
FROM courses";

/// Repository interface for course rows.
pub trait CourseRepository {
    fn create_course(&self, draft: &CourseDraft) -> RepoResult<Course>;
    fn update_course(&self, id: CourseId, draft: &CourseDraft) -> RepoResult<Course>;
    /// Deletes the course; enrollments and their children cascade.
    fn delete_course(&self, id: CourseId) -> RepoResult<()>;
    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>>;
    fn find_by_code(&self, code: &str) -> RepoResult<Option<Course>>;
    fn list_courses(&self) -> RepoResult<Vec<Course>>;
}

/// SQLite-backed course repository.
pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn create_course(&self, draft: &CourseDraft) -> RepoResult<Course> {
        self.conn
            .execute(
                "INSERT INTO courses (code, name, semester, credits)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    draft.code.as_str(),
                    draft.name.as_str(),
                    draft.semester,
                    draft.credits,
                ],
            )
            .map_err(unique_violation_as(UniqueKey::CourseCode))?;

        Ok(course_from_draft(self.conn.last_insert_rowid(), draft))
    }

    fn update_course(&self, id: CourseId, draft: &CourseDraft) -> RepoResult<Course> {
        let changed = self
            .conn
            .execute(
                "UPDATE courses
                 SET code = ?1, name = ?2, semester = ?3, credits = ?4
                 WHERE id = ?5;",
                params![
                    draft.code.as_str(),
                    draft.name.as_str(),
                    draft.semester,
                    draft.credits,
                    id,
                ],
            )
            .map_err(unique_violation_as(UniqueKey::CourseCode))?;
        ensure_changed(changed, Entity::Course, id)?;

        Ok(course_from_draft(id, draft))
    }

    fn delete_course(&self, id: CourseId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM courses WHERE id = ?1;", [id])?;
        ensure_changed(changed, Entity::Course, id)
    }

    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        let course = self
            .conn
            .query_row(
                &format!("{COURSE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_course_row,
            )
            .optional()?;
        Ok(course)
    }

    fn find_by_code(&self, code: &str) -> RepoResult<Option<Course>> {
        let course = self
            .conn
            .query_row(
                &format!("{COURSE_SELECT_SQL} WHERE code = ?1 ORDER BY id LIMIT 1;"),
                [code],
                parse_course_row,
            )
            .optional()?;
        Ok(course)
    }

    fn list_courses(&self) -> RepoResult<Vec<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_SELECT_SQL} ORDER BY code ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(parse_course_row(row)?);
        }
        Ok(courses)
    }
}

fn parse_course_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get("id")?,
        code: row.get("code")?,
        name: row.get("name")?,
        semester: row.get("semester")?,
        credits: row.get("credits")?,
    })
}

fn course_from_draft(id: CourseId, draft: &CourseDraft) -> Course {
    Course {
        id,
        code: draft.code.clone(),
        name: draft.name.clone(),
        semester: draft.semester,
        credits: draft.credits,
    }
}
