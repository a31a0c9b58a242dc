//! Per-student enrollment summaries and per-course class averages.

use super::{parse_totals, round2, EnrollmentTotals, TOTALS_COLUMNS_SQL};
use crate::db::DbResult;
use crate::model::course::CourseId;
use crate::model::enrollment::EnrollmentId;
use crate::model::student::StudentId;
use rusqlite::Connection;
use serde::Serialize;

/// Percentages for one enrollment of a student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentSummary {
    pub enrollment_id: EnrollmentId,
    pub course_code: String,
    pub course_name: String,
    pub attendance_pct: Option<f64>,
    pub marks_pct: Option<f64>,
}

/// Summarizes every enrollment of `student_id`, ascending by enrollment id.
///
/// An unknown student yields an empty list.
pub fn student_enrollment_summaries(
    conn: &Connection,
    student_id: StudentId,
) -> DbResult<Vec<EnrollmentSummary>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT
            e.id AS enrollment_id,
            c.code AS course_code,
            c.name AS course_name,
            {TOTALS_COLUMNS_SQL}
         FROM enrollments e
         INNER JOIN courses c ON c.id = e.course_id
         LEFT JOIN attendance a ON a.enrollment_id = e.id
         WHERE e.student_id = ?1
         ORDER BY e.id ASC;"
    ))?;
    let mut rows = stmt.query([student_id])?;
    let mut summaries = Vec::new();
    while let Some(row) = rows.next()? {
        let totals = parse_totals(row)?;
        summaries.push(EnrollmentSummary {
            enrollment_id: row.get("enrollment_id")?,
            course_code: row.get("course_code")?,
            course_name: row.get("course_name")?,
            attendance_pct: totals.attendance_pct(),
            marks_pct: totals.marks_pct(),
        });
    }
    Ok(summaries)
}

/// Class average of per-enrollment marks percentages for a course.
///
/// Enrollments without marks are skipped; `None` when none have marks.
pub fn course_average_marks_pct(conn: &Connection, course_id: CourseId) -> DbResult<Option<f64>> {
    let totals = course_totals(conn, course_id)?;
    Ok(mean(totals.iter().filter_map(EnrollmentTotals::marks_ratio)))
}

/// Class average of per-enrollment attendance percentages for a course.
///
/// Only enrollments with `total_classes > 0` contribute.
pub fn course_average_attendance_pct(
    conn: &Connection,
    course_id: CourseId,
) -> DbResult<Option<f64>> {
    let totals = course_totals(conn, course_id)?;
    Ok(mean(totals.iter().filter_map(EnrollmentTotals::attendance_ratio)))
}

fn course_totals(conn: &Connection, course_id: CourseId) -> DbResult<Vec<EnrollmentTotals>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TOTALS_COLUMNS_SQL}
         FROM enrollments e
         LEFT JOIN attendance a ON a.enrollment_id = e.id
         WHERE e.course_id = ?1
         ORDER BY e.id ASC;"
    ))?;
    let mut rows = stmt.query([course_id])?;
    let mut totals = Vec::new();
    while let Some(row) = rows.next()? {
        totals.push(parse_totals(row)?);
    }
    Ok(totals)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_u32), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        None
    } else {
        Some(round2(sum / f64::from(count)))
    }
}

#[cfg(test)]
mod tests {
    use super::mean;

    #[test]
    fn mean_of_nothing_is_undefined() {
        assert_eq!(mean(std::iter::empty()), None);
    }

    #[test]
    fn mean_is_rounded_after_averaging() {
        assert_eq!(mean([100.0 / 3.0, 50.0].into_iter()), Some(41.67));
    }
}
