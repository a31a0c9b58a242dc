//! Startup repair of natural-key duplicates and unique index installation.
//!
//! # Responsibility
//! - Merge rows that collide on a natural key in stores written before the
//!   key was enforced.
//! - Install the natural-key unique indexes once the store is clean.
//!
//! # Invariants
//! - Keys are processed in a fixed order: student roll number, course code,
//!   attendance per enrollment, enrollment per (student, course) pair.
//! - The row with the lowest surrogate id in a group is the keeper.
//! - Children of a duplicate are re-pointed (or merged) before it is deleted,
//!   so no cascade removes data.
//! - A clean store is left untouched; running the pass twice equals once.
//! - If a duplicate survives the merge, index creation fails and the whole
//!   pass rolls back.

use super::tx::with_transaction;
use super::{DbError, DbResult};
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::time::Instant;

const UNIQUE_INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_students_roll_no ON students (roll_no);",
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_courses_code ON courses (code);",
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_attendance_enrollment ON attendance (enrollment_id);",
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_enrollments_student_course ON enrollments (student_id, course_id);",
];

/// Number of duplicate rows removed per natural key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub students_merged: usize,
    pub courses_merged: usize,
    pub attendance_merged: usize,
    pub enrollments_merged: usize,
}

impl ReconcileReport {
    /// Total number of duplicate rows removed.
    pub fn total(&self) -> usize {
        self.students_merged + self.courses_merged + self.attendance_merged + self.enrollments_merged
    }

    /// Returns `true` when the store needed no repair.
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// Parent table whose natural key is referenced from `enrollments`.
struct ParentKey {
    table: &'static str,
    column: &'static str,
    enrollment_fk: &'static str,
}

const STUDENT_ROLL_NO: ParentKey = ParentKey {
    table: "students",
    column: "roll_no",
    enrollment_fk: "student_id",
};

const COURSE_CODE: ParentKey = ParentKey {
    table: "courses",
    column: "code",
    enrollment_fk: "course_id",
};

#[derive(Debug, Clone, Copy)]
struct AttendanceRow {
    id: i64,
    total_classes: i64,
    attended_classes: i64,
}

/// Merges duplicates and installs the unique indexes in one transaction.
///
/// # Errors
/// - Returns `DbError::Sqlite` when a query fails or when an index cannot be
///   created because duplicates remain. Nothing is committed in that case.
pub fn reconcile_store(conn: &mut Connection) -> DbResult<ReconcileReport> {
    let started_at = Instant::now();
    let result = with_transaction(conn, |tx| -> DbResult<ReconcileReport> {
        let report = merge_duplicates(tx)?;
        install_unique_indexes(tx)?;
        Ok(report)
    });

    match &result {
        Ok(report) if report.is_clean() => info!(
            "event=reconcile module=db status=ok duration_ms={} merged=0",
            started_at.elapsed().as_millis()
        ),
        Ok(report) => warn!(
            "event=reconcile module=db status=ok duration_ms={} merged={} students={} courses={} attendance={} enrollments={}",
            started_at.elapsed().as_millis(),
            report.total(),
            report.students_merged,
            report.courses_merged,
            report.attendance_merged,
            report.enrollments_merged
        ),
        Err(err) => error!(
            "event=reconcile module=db status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }

    result
}

/// Deletes every record in one transaction, children first.
pub fn reset_store(conn: &mut Connection) -> DbResult<()> {
    with_transaction(conn, |tx| -> DbResult<()> {
        tx.execute_batch(
            "DELETE FROM marks;
             DELETE FROM attendance;
             DELETE FROM enrollments;
             DELETE FROM courses;
             DELETE FROM students;",
        )?;
        Ok(())
    })?;
    warn!("event=store_reset module=db status=ok");
    Ok(())
}

fn merge_duplicates(conn: &Connection) -> DbResult<ReconcileReport> {
    let students_merged = merge_parent_duplicates(conn, &STUDENT_ROLL_NO)?;
    let courses_merged = merge_parent_duplicates(conn, &COURSE_CODE)?;
    let attendance_merged = merge_attendance_duplicates(conn)?;
    let enrollments_merged = merge_enrollment_duplicates(conn)?;

    Ok(ReconcileReport {
        students_merged,
        courses_merged,
        attendance_merged,
        enrollments_merged,
    })
}

fn install_unique_indexes(conn: &Connection) -> DbResult<()> {
    for sql in UNIQUE_INDEXES {
        conn.execute_batch(sql)?;
    }
    Ok(())
}

fn merge_parent_duplicates(conn: &Connection, key: &ParentKey) -> DbResult<usize> {
    let ParentKey {
        table,
        column,
        enrollment_fk,
    } = key;

    let keys: Vec<String> = {
        let mut stmt = conn.prepare(&format!(
            "SELECT {column}
             FROM {table}
             WHERE {column} IS NOT NULL
             GROUP BY {column}
             HAVING COUNT(id) > 1
             ORDER BY {column};"
        ))?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    let mut removed = 0;
    for value in keys {
        let ids = collect_ids(
            conn,
            &format!("SELECT id FROM {table} WHERE {column} = ?1 ORDER BY id;"),
            params![value],
        )?;
        let Some((keeper, duplicates)) = ids.split_first() else {
            continue;
        };

        for duplicate in duplicates {
            conn.execute(
                &format!("UPDATE enrollments SET {enrollment_fk} = ?1 WHERE {enrollment_fk} = ?2;"),
                params![keeper, duplicate],
            )?;
            conn.execute(&format!("DELETE FROM {table} WHERE id = ?1;"), [duplicate])?;
            removed += 1;
        }
    }

    Ok(removed)
}

fn merge_attendance_duplicates(conn: &Connection) -> DbResult<usize> {
    let enrollment_ids = collect_ids(
        conn,
        "SELECT enrollment_id
         FROM attendance
         WHERE enrollment_id IS NOT NULL
         GROUP BY enrollment_id
         HAVING COUNT(id) > 1
         ORDER BY enrollment_id;",
        [],
    )?;

    let mut removed = 0;
    for enrollment_id in enrollment_ids {
        let rows = {
            let mut stmt = conn.prepare(
                "SELECT id, total_classes, attended_classes
                 FROM attendance
                 WHERE enrollment_id = ?1
                 ORDER BY id;",
            )?;
            let rows = stmt.query_map([enrollment_id], parse_attendance_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        let Some((keeper, duplicates)) = rows.split_first() else {
            continue;
        };

        merge_attendance_into(conn, keeper, duplicates)?;
        removed += duplicates.len();
    }

    Ok(removed)
}

fn merge_enrollment_duplicates(conn: &Connection) -> DbResult<usize> {
    let pairs: Vec<(i64, i64)> = {
        let mut stmt = conn.prepare(
            "SELECT student_id, course_id
             FROM enrollments
             GROUP BY student_id, course_id
             HAVING COUNT(id) > 1
             ORDER BY student_id, course_id;",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    let mut removed = 0;
    for (student_id, course_id) in pairs {
        let ids = collect_ids(
            conn,
            "SELECT id
             FROM enrollments
             WHERE student_id = ?1 AND course_id = ?2
             ORDER BY id;",
            params![student_id, course_id],
        )?;
        let Some((keeper, duplicates)) = ids.split_first() else {
            continue;
        };

        for duplicate in duplicates {
            conn.execute(
                "UPDATE marks SET enrollment_id = ?1 WHERE enrollment_id = ?2;",
                params![keeper, duplicate],
            )?;

            match (
                attendance_for(conn, *keeper)?,
                attendance_for(conn, *duplicate)?,
            ) {
                (_, None) => {}
                (None, Some(moved)) => {
                    conn.execute(
                        "UPDATE attendance SET enrollment_id = ?1 WHERE id = ?2;",
                        params![keeper, moved.id],
                    )?;
                }
                (Some(kept), Some(merged)) => {
                    merge_attendance_into(conn, &kept, &[merged])?;
                }
            }

            conn.execute("DELETE FROM enrollments WHERE id = ?1;", [duplicate])?;
            removed += 1;
        }
    }

    Ok(removed)
}

/// Folds `others` into `keeper` (max of each count, then `attended <= total`)
/// and deletes `others`.
fn merge_attendance_into(
    conn: &Connection,
    keeper: &AttendanceRow,
    others: &[AttendanceRow],
) -> DbResult<()> {
    let (total, attended) = merged_counts(keeper, others);

    for other in others {
        conn.execute("DELETE FROM attendance WHERE id = ?1;", [other.id])?;
    }
    conn.execute(
        "UPDATE attendance
         SET total_classes = ?1, attended_classes = ?2
         WHERE id = ?3;",
        params![total, attended, keeper.id],
    )?;

    Ok(())
}

fn merged_counts(keeper: &AttendanceRow, others: &[AttendanceRow]) -> (i64, i64) {
    let (total, attended) = others.iter().fold(
        (keeper.total_classes, keeper.attended_classes),
        |(total, attended), row| {
            (
                total.max(row.total_classes),
                attended.max(row.attended_classes),
            )
        },
    );
    (total, attended.min(total))
}

fn attendance_for(conn: &Connection, enrollment_id: i64) -> DbResult<Option<AttendanceRow>> {
    conn.query_row(
        "SELECT id, total_classes, attended_classes
         FROM attendance
         WHERE enrollment_id = ?1
         ORDER BY id
         LIMIT 1;",
        [enrollment_id],
        parse_attendance_row,
    )
    .optional()
    .map_err(DbError::from)
}

fn collect_ids(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> DbResult<Vec<i64>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| row.get(0))?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

fn parse_attendance_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AttendanceRow> {
    Ok(AttendanceRow {
        id: row.get(0)?,
        total_classes: row.get(1)?,
        attended_classes: row.get(2)?,
    })
}
