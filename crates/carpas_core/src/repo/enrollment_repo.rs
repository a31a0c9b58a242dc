//! Enrollment aggregate repository: enrollments, attendance and marks.
//!
//! # Responsibility
//! - Persist enrollments and their dependent attendance/mark rows.
//! - Serve the flattened enrollment list used by display views.
//!
//! # Invariants
//! - Enrollment and mark lists are newest-first by id.
//! - `upsert_attendance` keeps at most one attendance row per enrollment.
//! - A duplicate (student, course) pair surfaces as `Duplicate(EnrollmentPair)`.

use super::{ensure_changed, unique_violation_as, Entity, RepoError, RepoResult, UniqueKey};
use crate::model::attendance::Attendance;
use crate::model::course::CourseId;
use crate::model::enrollment::{Enrollment, EnrollmentId, EnrollmentListItem};
use crate::model::mark::{Mark, MarkDraft, MarkId};
use crate::model::student::StudentId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENROLLMENT_SELECT_SQL: &str = "SELECT
    id,
    student_id,
    course_id,
    enrolled_on
FROM enrollments";

const MARK_SELECT_SQL: &str = "SELECT
    id,
    enrollment_id,
    assessment,
    marks_obtained,
    max_marks,
    recorded_on
FROM marks";

/// Repository interface for the enrollment aggregate.
pub trait EnrollmentRepository {
    fn student_exists(&self, id: StudentId) -> RepoResult<bool>;
    fn course_exists(&self, id: CourseId) -> RepoResult<bool>;

    fn create_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<Enrollment>;
    fn get_enrollment(&self, id: EnrollmentId) -> RepoResult<Option<Enrollment>>;
    fn find_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<Option<Enrollment>>;
    /// Deletes the enrollment; attendance and marks cascade.
    fn delete_enrollment(&self, id: EnrollmentId) -> RepoResult<()>;
    fn list_enrollments(&self) -> RepoResult<Vec<EnrollmentListItem>>;

    fn get_attendance(&self, enrollment_id: EnrollmentId) -> RepoResult<Option<Attendance>>;
    /// Inserts the attendance row or overwrites its counts in place.
    fn upsert_attendance(
        &self,
        enrollment_id: EnrollmentId,
        total_classes: i64,
        attended_classes: i64,
    ) -> RepoResult<Attendance>;

    fn add_mark(&self, enrollment_id: EnrollmentId, draft: &MarkDraft) -> RepoResult<Mark>;
    fn delete_mark(&self, id: MarkId) -> RepoResult<()>;
    fn list_marks(&self, enrollment_id: EnrollmentId) -> RepoResult<Vec<Mark>>;
    fn count_marks(&self, enrollment_id: EnrollmentId) -> RepoResult<u64>;
}

/// SQLite-backed enrollment aggregate repository.
pub struct SqliteEnrollmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEnrollmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn exists(&self, sql: &str, id: i64) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(sql, [id], |row| row.get(0))?;
        Ok(exists == 1)
    }
}

impl EnrollmentRepository for SqliteEnrollmentRepository<'_> {
    fn student_exists(&self, id: StudentId) -> RepoResult<bool> {
        self.exists("SELECT EXISTS(SELECT 1 FROM students WHERE id = ?1);", id)
    }

    fn course_exists(&self, id: CourseId) -> RepoResult<bool> {
        self.exists("SELECT EXISTS(SELECT 1 FROM courses WHERE id = ?1);", id)
    }

    fn create_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<Enrollment> {
        self.conn
            .execute(
                "INSERT INTO enrollments (student_id, course_id) VALUES (?1, ?2);",
                params![student_id, course_id],
            )
            .map_err(unique_violation_as(UniqueKey::EnrollmentPair))?;

        let id = self.conn.last_insert_rowid();
        self.get_enrollment(id)?.ok_or(RepoError::NotFound {
            entity: Entity::Enrollment,
            id,
        })
    }

    fn get_enrollment(&self, id: EnrollmentId) -> RepoResult<Option<Enrollment>> {
        let enrollment = self
            .conn
            .query_row(
                &format!("{ENROLLMENT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_enrollment_row,
            )
            .optional()?;
        Ok(enrollment)
    }

    fn find_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<Option<Enrollment>> {
        let enrollment = self
            .conn
            .query_row(
                &format!(
                    "{ENROLLMENT_SELECT_SQL}
                     WHERE student_id = ?1 AND course_id = ?2
                     ORDER BY id
                     LIMIT 1;"
                ),
                params![student_id, course_id],
                parse_enrollment_row,
            )
            .optional()?;
        Ok(enrollment)
    }

    fn delete_enrollment(&self, id: EnrollmentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM enrollments WHERE id = ?1;", [id])?;
        ensure_changed(changed, Entity::Enrollment, id)
    }

    fn list_enrollments(&self) -> RepoResult<Vec<EnrollmentListItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                e.id AS enrollment_id,
                e.enrolled_on AS enrolled_on,
                s.id AS student_id,
                s.roll_no AS roll_no,
                s.name AS student_name,
                c.id AS course_id,
                c.code AS course_code,
                c.name AS course_name
             FROM enrollments e
             INNER JOIN students s ON s.id = e.student_id
             INNER JOIN courses c ON c.id = e.course_id
             ORDER BY e.id DESC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(EnrollmentListItem {
                enrollment_id: row.get("enrollment_id")?,
                enrolled_on: row.get("enrolled_on")?,
                student_id: row.get("student_id")?,
                roll_no: row.get("roll_no")?,
                student_name: row.get("student_name")?,
                course_id: row.get("course_id")?,
                course_code: row.get("course_code")?,
                course_name: row.get("course_name")?,
            });
        }
        Ok(items)
    }

    fn get_attendance(&self, enrollment_id: EnrollmentId) -> RepoResult<Option<Attendance>> {
        let attendance = self
            .conn
            .query_row(
                "SELECT id, enrollment_id, total_classes, attended_classes
                 FROM attendance
                 WHERE enrollment_id = ?1;",
                [enrollment_id],
                parse_attendance_row,
            )
            .optional()?;
        Ok(attendance)
    }

    fn upsert_attendance(
        &self,
        enrollment_id: EnrollmentId,
        total_classes: i64,
        attended_classes: i64,
    ) -> RepoResult<Attendance> {
        let attendance = self.conn.query_row(
            "INSERT INTO attendance (enrollment_id, total_classes, attended_classes)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (enrollment_id) DO UPDATE SET
                total_classes = excluded.total_classes,
                attended_classes = excluded.attended_classes
             RETURNING id, enrollment_id, total_classes, attended_classes;",
            params![enrollment_id, total_classes, attended_classes],
            parse_attendance_row,
        )?;
        Ok(attendance)
    }

    fn add_mark(&self, enrollment_id: EnrollmentId, draft: &MarkDraft) -> RepoResult<Mark> {
        let mark = self.conn.query_row(
            "INSERT INTO marks (enrollment_id, assessment, marks_obtained, max_marks)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, enrollment_id, assessment, marks_obtained, max_marks, recorded_on;",
            params![
                enrollment_id,
                draft.assessment.as_str(),
                draft.marks_obtained,
                draft.max_marks,
            ],
            parse_mark_row,
        )?;
        Ok(mark)
    }

    fn delete_mark(&self, id: MarkId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM marks WHERE id = ?1;", [id])?;
        ensure_changed(changed, Entity::Mark, id)
    }

    fn list_marks(&self, enrollment_id: EnrollmentId) -> RepoResult<Vec<Mark>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MARK_SELECT_SQL} WHERE enrollment_id = ?1 ORDER BY id DESC;"
        ))?;
        let mut rows = stmt.query([enrollment_id])?;
        let mut marks = Vec::new();
        while let Some(row) = rows.next()? {
            marks.push(parse_mark_row(row)?);
        }
        Ok(marks)
    }

    fn count_marks(&self, enrollment_id: EnrollmentId) -> RepoResult<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM marks WHERE enrollment_id = ?1;",
            [enrollment_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn parse_enrollment_row(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
    Ok(Enrollment {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        course_id: row.get("course_id")?,
        enrolled_on: row.get("enrolled_on")?,
    })
}

fn parse_attendance_row(row: &Row<'_>) -> rusqlite::Result<Attendance> {
    Ok(Attendance {
        id: row.get("id")?,
        enrollment_id: row.get("enrollment_id")?,
        total_classes: row.get("total_classes")?,
        attended_classes: row.get("attended_classes")?,
    })
}

fn parse_mark_row(row: &Row<'_>) -> rusqlite::Result<Mark> {
    Ok(Mark {
        id: row.get("id")?,
        enrollment_id: row.get("enrollment_id")?,
        assessment: row.get("assessment")?,
        marks_obtained: row.get("marks_obtained")?,
        max_marks: row.get("max_marks")?,
        recorded_on: row.get("recorded_on")?,
    })
}
