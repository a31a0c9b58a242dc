//! Student repository contract and SQLite implementation.
//!
//! # Invariants
//! - Lists are ordered by `roll_no ASC, id ASC`.
//! - A roll-number collision surfaces as `Duplicate(StudentRollNo)`.

use super::{ensure_changed, unique_violation_as, Entity, RepoResult, UniqueKey};
use crate::model::student::{Student, StudentDraft, StudentId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    roll_no,
    name,
    department,
    semester,
    email,
    phone
FROM students";

/// Repository interface for student rows.
pub trait StudentRepository {
    fn create_student(&self, draft: &StudentDraft) -> RepoResult<Student>;
    fn update_student(&self, id: StudentId, draft: &StudentDraft) -> RepoResult<Student>;
    /// Deletes the student; enrollments and their children cascade.
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn find_by_roll_no(&self, roll_no: &str) -> RepoResult<Option<Student>>;
    fn list_students(&self) -> RepoResult<Vec<Student>>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, draft: &StudentDraft) -> RepoResult<Student> {
        self.conn
            .execute(
                "INSERT INTO students (
                    roll_no,
                    name,
                    department,
                    semester,
                    email,
                    phone
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    draft.roll_no.as_str(),
                    draft.name.as_str(),
                    draft.department.as_deref(),
                    draft.semester,
                    draft.email.as_deref(),
                    draft.phone.as_deref(),
                ],
            )
            .map_err(unique_violation_as(UniqueKey::StudentRollNo))?;

        Ok(student_from_draft(self.conn.last_insert_rowid(), draft))
    }

    fn update_student(&self, id: StudentId, draft: &StudentDraft) -> RepoResult<Student> {
        let changed = self
            .conn
            .execute(
                "UPDATE students
                 SET
                    roll_no = ?1,
                    name = ?2,
                    department = ?3,
                    semester = ?4,
                    email = ?5,
                    phone = ?6
                 WHERE id = ?7;",
                params![
                    draft.roll_no.as_str(),
                    draft.name.as_str(),
                    draft.department.as_deref(),
                    draft.semester,
                    draft.email.as_deref(),
                    draft.phone.as_deref(),
                    id,
                ],
            )
            .map_err(unique_violation_as(UniqueKey::StudentRollNo))?;
        ensure_changed(changed, Entity::Student, id)?;

        Ok(student_from_draft(id, draft))
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;
        ensure_changed(changed, Entity::Student, id)
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let student = self
            .conn
            .query_row(
                &format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_student_row,
            )
            .optional()?;
        Ok(student)
    }

    fn find_by_roll_no(&self, roll_no: &str) -> RepoResult<Option<Student>> {
        let student = self
            .conn
            .query_row(
                &format!("{STUDENT_SELECT_SQL} WHERE roll_no = ?1 ORDER BY id LIMIT 1;"),
                [roll_no],
                parse_student_row,
            )
            .optional()?;
        Ok(student)
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY roll_no ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }
}

fn parse_student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get("id")?,
        roll_no: row.get("roll_no")?,
        name: row.get("name")?,
        department: row.get("department")?,
        semester: row.get("semester")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
    })
}

fn student_from_draft(id: StudentId, draft: &StudentDraft) -> Student {
    Student {
        id,
        roll_no: draft.roll_no.clone(),
        name: draft.name.clone(),
        department: draft.department.clone(),
        semester: draft.semester,
        email: draft.email.clone(),
        phone: draft.phone.clone(),
    }
}
