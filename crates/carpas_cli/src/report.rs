//! Report assembly and text rendering for the `report` and listing commands.
//!
//! Every read runs inside one transaction so a report sees a single
//! consistent state of the store.

use anyhow::Result;
use carpas_core::{
    course_average_attendance_pct, course_average_marks_pct, find_at_risk, service,
    student_enrollment_summaries, with_transaction, AtRiskEnrollment, Course,
    EnrollmentListItem, EnrollmentSummary, ReconcileReport, RiskThresholds, ServiceError,
    Student,
};
use rusqlite::Connection;
use serde::Serialize;
use std::fmt::Write as _;

const UNDEFINED: &str = "n/a";

#[derive(Debug, Serialize)]
pub struct StudentReport {
    pub student: Student,
    pub enrollments: Vec<EnrollmentSummary>,
}

#[derive(Debug, Serialize)]
pub struct CourseReport {
    pub course: Course,
    pub enrolled: usize,
    pub average_attendance_pct: Option<f64>,
    pub average_marks_pct: Option<f64>,
}

pub fn list_students(conn: &mut Connection) -> Result<Vec<Student>> {
    with_transaction(conn, |tx| Ok(service::students(tx).list_students()?))
}

pub fn list_courses(conn: &mut Connection) -> Result<Vec<Course>> {
    with_transaction(conn, |tx| Ok(service::courses(tx).list_courses()?))
}

pub fn list_enrollments(conn: &mut Connection) -> Result<Vec<EnrollmentListItem>> {
    with_transaction(conn, |tx| Ok(service::enrollments(tx).list_enrollments()?))
}

pub fn student_report(conn: &mut Connection, roll_no: &str) -> Result<StudentReport> {
    with_transaction(conn, |tx| {
        let student = service::students(tx)
            .find_student_by_roll_no(roll_no)?
            .ok_or(ServiceError::StudentNotFound)?;
        let enrollments = student_enrollment_summaries(tx, student.id)?;
        Ok(StudentReport {
            student,
            enrollments,
        })
    })
}

pub fn course_report(conn: &mut Connection, code: &str) -> Result<CourseReport> {
    with_transaction(conn, |tx| {
        let course = service::courses(tx)
            .find_course_by_code(code)?
            .ok_or(ServiceError::CourseNotFound)?;
        let enrolled = service::enrollments(tx)
            .list_enrollments()?
            .iter()
            .filter(|item| item.course_id == course.id)
            .count();
        Ok(CourseReport {
            average_attendance_pct: course_average_attendance_pct(tx, course.id)?,
            average_marks_pct: course_average_marks_pct(tx, course.id)?,
            course,
            enrolled,
        })
    })
}

pub fn at_risk_report(
    conn: &mut Connection,
    thresholds: &RiskThresholds,
) -> Result<Vec<AtRiskEnrollment>> {
    with_transaction(conn, |tx| Ok(find_at_risk(tx, thresholds)?))
}

pub fn render_reconcile(report: &ReconcileReport) -> String {
    if report.is_clean() {
        return "Store ready; no duplicates found.".to_string();
    }
    format!(
        "Store ready; merged {} duplicate rows (students={}, courses={}, attendance={}, enrollments={}).",
        report.total(),
        report.students_merged,
        report.courses_merged,
        report.attendance_merged,
        report.enrollments_merged
    )
}

pub fn render_students(students: &[Student]) -> String {
    let mut out = format!("{:<12} {:<28} {:<8} {:>3}\n", "ROLL", "NAME", "DEPT", "SEM");
    for student in students {
        let _ = writeln!(
            out,
            "{:<12} {:<28} {:<8} {:>3}",
            student.roll_no,
            student.name,
            student.department.as_deref().unwrap_or("-"),
            optional(student.semester)
        );
    }
    out
}

pub fn render_courses(courses: &[Course]) -> String {
    let mut out = format!("{:<8} {:<32} {:>3} {:>7}\n", "CODE", "NAME", "SEM", "CREDITS");
    for course in courses {
        let _ = writeln!(
            out,
            "{:<8} {:<32} {:>3} {:>7}",
            course.code,
            course.name,
            optional(course.semester),
            optional(course.credits)
        );
    }
    out
}

pub fn render_enrollments(items: &[EnrollmentListItem]) -> String {
    let mut out = format!(
        "{:>5} {:<12} {:<24} {:<8} {:<10}\n",
        "ID", "ROLL", "STUDENT", "COURSE", "ENROLLED"
    );
    for item in items {
        let _ = writeln!(
            out,
            "{:>5} {:<12} {:<24} {:<8} {:<10}",
            item.enrollment_id, item.roll_no, item.student_name, item.course_code, item.enrolled_on
        );
    }
    out
}

pub fn render_student_report(report: &StudentReport) -> String {
    let mut out = format!("{} ({})\n", report.student.name, report.student.roll_no);
    if report.enrollments.is_empty() {
        out.push_str("No enrollments.\n");
        return out;
    }
    let _ = writeln!(out, "{:<8} {:<32} {:>11} {:>8}", "CODE", "COURSE", "ATTENDANCE%", "MARKS%");
    for summary in &report.enrollments {
        let _ = writeln!(
            out,
            "{:<8} {:<32} {:>11} {:>8}",
            summary.course_code,
            summary.course_name,
            pct(summary.attendance_pct),
            pct(summary.marks_pct)
        );
    }
    out
}

pub fn render_course_report(report: &CourseReport) -> String {
    format!(
        "{} {}\nenrolled: {}\naverage attendance%: {}\naverage marks%: {}\n",
        report.course.code,
        report.course.name,
        report.enrolled,
        pct(report.average_attendance_pct),
        pct(report.average_marks_pct)
    )
}

pub fn render_at_risk(flagged: &[AtRiskEnrollment]) -> String {
    if flagged.is_empty() {
        return "No at-risk enrollments.\n".to_string();
    }
    let mut out = format!(
        "{:<12} {:<24} {:<8} {:>11} {:>8}  {}\n",
        "ROLL", "STUDENT", "COURSE", "ATTENDANCE%", "MARKS%", "REASON"
    );
    for entry in flagged {
        let _ = writeln!(
            out,
            "{:<12} {:<24} {:<8} {:>11} {:>8}  {}",
            entry.roll_no,
            entry.student_name,
            entry.course_code,
            pct(entry.attendance_pct),
            pct(entry.marks_pct),
            entry.reason
        );
    }
    out
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), |value| format!("{value:.2}"))
}

fn optional(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}
