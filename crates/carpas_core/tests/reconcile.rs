use carpas_core::db::migrations::apply_migrations;
use carpas_core::{
    open_db, open_db_with_report, reconcile_store, student_enrollment_summaries, ReconcileReport,
};
use rusqlite::types::Value;
use rusqlite::Connection;

/// Store with the current tables but without the natural-key indexes, as
/// left behind by builds that did not enforce them.
fn legacy_store() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    apply_migrations(&mut conn).unwrap();
    conn
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

fn snapshot(conn: &Connection) -> Vec<String> {
    let queries = [
        "SELECT * FROM students ORDER BY id;",
        "SELECT * FROM courses ORDER BY id;",
        "SELECT * FROM enrollments ORDER BY id;",
        "SELECT * FROM attendance ORDER BY id;",
        "SELECT * FROM marks ORDER BY id;",
    ];
    let mut lines = Vec::new();
    for sql in queries {
        let mut stmt = conn.prepare(sql).unwrap();
        let columns = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                let mut fields = Vec::with_capacity(columns);
                for index in 0..columns {
                    let value: Value = row.get(index)?;
                    fields.push(format!("{value:?}"));
                }
                Ok(fields.join("|"))
            })
            .unwrap();
        for row in rows {
            lines.push(format!("{sql} {}", row.unwrap()));
        }
    }
    lines
}

#[test]
fn duplicate_students_are_merged_with_enrollments_moved_to_keeper() {
    let mut conn = legacy_store();
    conn.execute_batch(
        "INSERT INTO students (id, roll_no, name) VALUES (1, 'X1', 'First'), (2, 'X1', 'Second');
         INSERT INTO courses (id, code, name) VALUES (1, 'C1', 'One'), (2, 'C2', 'Two');
         INSERT INTO enrollments (id, student_id, course_id) VALUES (1, 1, 1), (2, 2, 2);",
    )
    .unwrap();

    let report = reconcile_store(&mut conn).unwrap();

    assert_eq!(report.students_merged, 1);
    assert_eq!(report.enrollments_merged, 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM students;"), 1);
    let survivor_name: String = conn
        .query_row("SELECT name FROM students WHERE id = 1;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(survivor_name, "First");

    let summaries = student_enrollment_summaries(&conn, 1).unwrap();
    let codes: Vec<&str> = summaries.iter().map(|s| s.course_code.as_str()).collect();
    assert_eq!(codes, vec!["C1", "C2"]);
}

#[test]
fn duplicate_attendance_rows_collapse_to_maximum_counts() {
    let mut conn = legacy_store();
    conn.execute_batch(
        "INSERT INTO students (id, roll_no, name) VALUES (1, 'R-1', 'Ann');
         INSERT INTO courses (id, code, name) VALUES (1, 'C1', 'One');
         INSERT INTO enrollments (id, student_id, course_id) VALUES (1, 1, 1);
         INSERT INTO attendance (id, enrollment_id, total_classes, attended_classes)
         VALUES (1, 1, 30, 20), (2, 1, 40, 10);",
    )
    .unwrap();

    let report = reconcile_store(&mut conn).unwrap();

    assert_eq!(report.attendance_merged, 1);
    let row: (i64, i64, i64) = conn
        .query_row(
            "SELECT id, total_classes, attended_classes FROM attendance;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(row, (1, 40, 20));
}

#[test]
fn duplicate_enrollments_merge_marks_and_attendance_into_keeper() {
    let mut conn = legacy_store();
    conn.execute_batch(
        "INSERT INTO students (id, roll_no, name) VALUES (1, 'R-1', 'Ann');
         INSERT INTO courses (id, code, name) VALUES (1, 'C1', 'One');
         INSERT INTO enrollments (id, student_id, course_id) VALUES (1, 1, 1), (2, 1, 1);
         INSERT INTO attendance (enrollment_id, total_classes, attended_classes)
         VALUES (1, 20, 15), (2, 30, 10);
         INSERT INTO marks (enrollment_id, assessment, marks_obtained, max_marks)
         VALUES (1, 'Quiz', 5, 10), (2, 'Mid Sem', 20, 30), (2, 'End Sem', 40, 50);",
    )
    .unwrap();

    let report = reconcile_store(&mut conn).unwrap();

    assert_eq!(report.enrollments_merged, 1);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM enrollments;"), 1);
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM marks WHERE enrollment_id = 1;"),
        3
    );
    let counts: (i64, i64) = conn
        .query_row(
            "SELECT total_classes, attended_classes FROM attendance WHERE enrollment_id = 1;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(counts, (30, 15));
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM attendance;"), 1);
}

#[test]
fn attendance_of_duplicate_enrollment_is_adopted_when_keeper_has_none() {
    let mut conn = legacy_store();
    conn.execute_batch(
        "INSERT INTO students (id, roll_no, name) VALUES (1, 'R-1', 'Ann');
         INSERT INTO courses (id, code, name) VALUES (1, 'C1', 'One');
         INSERT INTO enrollments (id, student_id, course_id) VALUES (1, 1, 1), (2, 1, 1);
         INSERT INTO attendance (id, enrollment_id, total_classes, attended_classes)
         VALUES (7, 2, 10, 8);",
    )
    .unwrap();

    reconcile_store(&mut conn).unwrap();

    let row: (i64, i64, i64) = conn
        .query_row(
            "SELECT id, enrollment_id, attended_classes FROM attendance;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(row, (7, 1, 8));
}

#[test]
fn merging_students_also_merges_resulting_duplicate_enrollments() {
    let mut conn = legacy_store();
    conn.execute_batch(
        "INSERT INTO students (id, roll_no, name) VALUES (1, 'X1', 'First'), (2, 'X1', 'Second');
         INSERT INTO courses (id, code, name) VALUES (1, 'C1', 'One'), (2, 'C1', 'Copy');
         INSERT INTO enrollments (id, student_id, course_id) VALUES (1, 1, 1), (2, 2, 2);
         INSERT INTO marks (enrollment_id, marks_obtained, max_marks) VALUES (2, 9, 10);",
    )
    .unwrap();

    let report = reconcile_store(&mut conn).unwrap();

    assert_eq!(
        report,
        ReconcileReport {
            students_merged: 1,
            courses_merged: 1,
            attendance_merged: 0,
            enrollments_merged: 1,
        }
    );
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM enrollments;"), 1);
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM marks WHERE enrollment_id = 1;"),
        1
    );
}

#[test]
fn second_pass_is_a_clean_no_op() {
    let mut conn = legacy_store();
    conn.execute_batch(
        "INSERT INTO students (id, roll_no, name) VALUES (1, 'X1', 'A'), (2, 'X1', 'B'), (3, 'Y1', 'C');
         INSERT INTO courses (id, code, name) VALUES (1, 'C1', 'One'), (2, 'C1', 'Dup');
         INSERT INTO enrollments (id, student_id, course_id) VALUES (1, 1, 1), (2, 2, 2), (3, 3, 1);
         INSERT INTO attendance (enrollment_id, total_classes, attended_classes)
         VALUES (1, 10, 9), (2, 12, 6), (3, 5, 5);
         INSERT INTO marks (enrollment_id, marks_obtained, max_marks) VALUES (1, 3, 10), (2, 7, 10);",
    )
    .unwrap();

    let first = reconcile_store(&mut conn).unwrap();
    assert!(!first.is_clean());
    let after_first = snapshot(&conn);

    let second = reconcile_store(&mut conn).unwrap();
    assert!(second.is_clean());
    assert_eq!(snapshot(&conn), after_first);
}

#[test]
fn reconciled_store_rejects_new_duplicates() {
    let mut conn = legacy_store();
    conn.execute_batch(
        "INSERT INTO students (roll_no, name) VALUES ('X1', 'A'), ('X1', 'B');",
    )
    .unwrap();
    reconcile_store(&mut conn).unwrap();

    let result = conn.execute(
        "INSERT INTO students (roll_no, name) VALUES ('X1', 'C');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn opening_legacy_file_repairs_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    {
        let mut conn = Connection::open(&path).unwrap();
        apply_migrations(&mut conn).unwrap();
        conn.execute_batch(
            "INSERT INTO courses (code, name) VALUES ('C1', 'One'), ('C1', 'Two'), ('C1', 'Three');",
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM courses;"), 1);
    let name: String = conn
        .query_row("SELECT name FROM courses;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "One");
}

#[test]
fn open_db_with_report_returns_merge_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    {
        let mut conn = Connection::open(&path).unwrap();
        apply_migrations(&mut conn).unwrap();
        conn.execute_batch(
            "INSERT INTO students (roll_no, name) VALUES ('X1', 'A'), ('X1', 'B');",
        )
        .unwrap();
    }

    let (_, report) = open_db_with_report(&path).unwrap();
    assert_eq!(report.students_merged, 1);

    let (_, report) = open_db_with_report(&path).unwrap();
    assert!(report.is_clean());
}
