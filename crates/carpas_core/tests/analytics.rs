use carpas_core::{
    course_average_attendance_pct, course_average_marks_pct, find_at_risk, open_db_in_memory,
    percentage, service, student_enrollment_summaries, CourseDraft, CourseId, EnrollmentId,
    MarkDraft, RiskThresholds, StudentDraft, StudentId,
};
use rusqlite::Connection;

fn student(conn: &Connection, roll_no: &str) -> StudentId {
    service::students(conn)
        .create_student(&StudentDraft::new(roll_no, format!("Student {roll_no}")))
        .unwrap()
        .id
}

fn course(conn: &Connection, code: &str) -> CourseId {
    service::courses(conn)
        .create_course(&CourseDraft::new(code, format!("Course {code}")))
        .unwrap()
        .id
}

fn enroll(conn: &Connection, student_id: StudentId, course_id: CourseId) -> EnrollmentId {
    service::enrollments(conn)
        .enroll_student(student_id, course_id)
        .unwrap()
        .id
}

fn mark(conn: &Connection, enrollment_id: EnrollmentId, obtained: f64, max: f64) {
    service::enrollments(conn)
        .add_mark(enrollment_id, &MarkDraft::new("Exam", obtained, max))
        .unwrap();
}

fn attendance(conn: &Connection, enrollment_id: EnrollmentId, total: i64, attended: i64) {
    service::enrollments(conn)
        .set_attendance(enrollment_id, total, attended)
        .unwrap();
}

#[test]
fn percentage_rounds_to_two_decimals_and_rejects_zero_denominator() {
    assert_eq!(percentage(33.0, 99.0), Some(33.33));
    assert_eq!(percentage(2.0, 3.0), Some(66.67));
    assert_eq!(percentage(0.0, 0.0), None);
    assert_eq!(percentage(5.0, 0.0), None);
}

#[test]
fn summary_percentages_round_exact_halves_to_even() {
    let conn = open_db_in_memory().unwrap();
    let ann = student(&conn, "R-1");
    let enrollment = enroll(&conn, ann, course(&conn, "CS301"));
    attendance(&conn, enrollment, 32, 13);
    mark(&conn, enrollment, 1.0, 32.0);

    let summaries = student_enrollment_summaries(&conn, ann).unwrap();
    assert_eq!(summaries[0].attendance_pct, Some(40.62));
    assert_eq!(summaries[0].marks_pct, Some(3.12));
}

#[test]
fn student_summaries_sum_all_marks_and_leave_missing_data_undefined() {
    let conn = open_db_in_memory().unwrap();
    let ann = student(&conn, "R-1");
    let graded = enroll(&conn, ann, course(&conn, "CS301"));
    let empty = enroll(&conn, ann, course(&conn, "CS302"));
    attendance(&conn, graded, 40, 30);
    mark(&conn, graded, 20.0, 30.0);
    mark(&conn, graded, 40.0, 50.0);

    let summaries = student_enrollment_summaries(&conn, ann).unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].enrollment_id, graded);
    assert_eq!(summaries[0].attendance_pct, Some(75.0));
    assert_eq!(summaries[0].marks_pct, Some(75.0));
    assert_eq!(summaries[1].enrollment_id, empty);
    assert_eq!(summaries[1].attendance_pct, None);
    assert_eq!(summaries[1].marks_pct, None);
}

#[test]
fn unknown_student_has_no_summaries() {
    let conn = open_db_in_memory().unwrap();
    assert!(student_enrollment_summaries(&conn, 404).unwrap().is_empty());
}

#[test]
fn course_marks_average_is_mean_of_enrollment_percentages() {
    let conn = open_db_in_memory().unwrap();
    let cs = course(&conn, "CS301");
    let small = enroll(&conn, student(&conn, "R-1"), cs);
    let large = enroll(&conn, student(&conn, "R-2"), cs);
    enroll(&conn, student(&conn, "R-3"), cs);
    mark(&conn, small, 10.0, 20.0);
    mark(&conn, large, 90.0, 100.0);

    // (50 + 90) / 2, not 100 / 120.
    assert_eq!(course_average_marks_pct(&conn, cs).unwrap(), Some(70.0));
}

#[test]
fn course_attendance_average_skips_zero_totals() {
    let conn = open_db_in_memory().unwrap();
    let cs = course(&conn, "CS301");
    let counted = enroll(&conn, student(&conn, "R-1"), cs);
    let zero = enroll(&conn, student(&conn, "R-2"), cs);
    enroll(&conn, student(&conn, "R-3"), cs);
    attendance(&conn, counted, 40, 30);
    attendance(&conn, zero, 0, 0);

    assert_eq!(course_average_attendance_pct(&conn, cs).unwrap(), Some(75.0));
}

#[test]
fn course_without_data_has_undefined_averages() {
    let conn = open_db_in_memory().unwrap();
    let cs = course(&conn, "CS301");
    enroll(&conn, student(&conn, "R-1"), cs);

    assert_eq!(course_average_marks_pct(&conn, cs).unwrap(), None);
    assert_eq!(course_average_attendance_pct(&conn, cs).unwrap(), None);
}

#[test]
fn at_risk_reports_only_the_failing_dimension() {
    let conn = open_db_in_memory().unwrap();
    let enrollment = enroll(&conn, student(&conn, "R-1"), course(&conn, "CS301"));
    attendance(&conn, enrollment, 40, 20);
    mark(&conn, enrollment, 60.0, 100.0);

    let flagged = find_at_risk(&conn, &RiskThresholds::default()).unwrap();

    assert_eq!(flagged.len(), 1);
    let entry = &flagged[0];
    assert_eq!(entry.enrollment_id, enrollment);
    assert_eq!(entry.roll_no, "R-1");
    assert_eq!(entry.course_code, "CS301");
    assert_eq!(entry.attendance_pct, Some(50.0));
    assert_eq!(entry.marks_pct, Some(60.0));
    assert_eq!(entry.reason, "Low attendance");
}

#[test]
fn at_risk_joins_both_reasons_and_ignores_undefined_values() {
    let conn = open_db_in_memory().unwrap();
    let cs = course(&conn, "CS301");
    let failing = enroll(&conn, student(&conn, "R-1"), cs);
    let marks_only = enroll(&conn, student(&conn, "R-2"), cs);
    let healthy = enroll(&conn, student(&conn, "R-3"), cs);
    enroll(&conn, student(&conn, "R-4"), cs);

    attendance(&conn, failing, 40, 10);
    mark(&conn, failing, 5.0, 50.0);
    mark(&conn, marks_only, 10.0, 50.0);
    attendance(&conn, healthy, 40, 30);
    mark(&conn, healthy, 20.0, 50.0);

    let flagged = find_at_risk(&conn, &RiskThresholds::default()).unwrap();
    let reasons: Vec<(EnrollmentId, &str)> = flagged
        .iter()
        .map(|entry| (entry.enrollment_id, entry.reason.as_str()))
        .collect();

    assert_eq!(
        reasons,
        vec![
            (failing, "Low attendance, Low marks"),
            (marks_only, "Low marks"),
        ]
    );
}

#[test]
fn at_risk_honours_custom_thresholds() {
    let conn = open_db_in_memory().unwrap();
    let enrollment = enroll(&conn, student(&conn, "R-1"), course(&conn, "CS301"));
    attendance(&conn, enrollment, 40, 32);

    let strict = RiskThresholds {
        attendance_pct: 85.0,
        marks_pct: 40.0,
    };
    assert_eq!(find_at_risk(&conn, &strict).unwrap().len(), 1);
    assert!(find_at_risk(&conn, &RiskThresholds::default())
        .unwrap()
        .is_empty());
}

#[test]
fn report_records_serialize_undefined_percentages_as_null() {
    let conn = open_db_in_memory().unwrap();
    let ann = student(&conn, "R-1");
    let enrollment = enroll(&conn, ann, course(&conn, "CS301"));
    mark(&conn, enrollment, 5.0, 50.0);

    let summaries = student_enrollment_summaries(&conn, ann).unwrap();
    let json = serde_json::to_value(&summaries[0]).unwrap();
    assert_eq!(json["course_code"], "CS301");
    assert_eq!(json["marks_pct"], 10.0);
    assert!(json["attendance_pct"].is_null());

    let flagged = find_at_risk(&conn, &RiskThresholds::default()).unwrap();
    let json = serde_json::to_value(&flagged).unwrap();
    assert_eq!(json[0]["reason"], "Low marks");
}
