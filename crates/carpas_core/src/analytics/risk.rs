//! At-risk classification of enrollments.

use super::{parse_totals, TOTALS_COLUMNS_SQL};
use crate::db::DbResult;
use crate::model::enrollment::EnrollmentId;
use log::info;
use rusqlite::Connection;
use serde::Serialize;

const LOW_ATTENDANCE: &str = "Low attendance";
const LOW_MARKS: &str = "Low marks";

/// Percent thresholds below which an enrollment is flagged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    pub attendance_pct: f64,
    pub marks_pct: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            attendance_pct: 75.0,
            marks_pct: 40.0,
        }
    }
}

/// Flagged enrollment with display fields and the reason it was flagged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtRiskEnrollment {
    pub enrollment_id: EnrollmentId,
    pub roll_no: String,
    pub student_name: String,
    pub course_code: String,
    pub course_name: String,
    pub attendance_pct: Option<f64>,
    pub marks_pct: Option<f64>,
    /// `"Low attendance"`, `"Low marks"`, or both joined by `", "`.
    pub reason: String,
}

/// Scans every enrollment and returns the flagged ones by ascending id.
///
/// An undefined percentage never counts as low.
pub fn find_at_risk(
    conn: &Connection,
    thresholds: &RiskThresholds,
) -> DbResult<Vec<AtRiskEnrollment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT
            e.id AS enrollment_id,
            s.roll_no AS roll_no,
            s.name AS student_name,
            c.code AS course_code,
            c.name AS course_name,
            {TOTALS_COLUMNS_SQL}
         FROM enrollments e
         INNER JOIN students s ON s.id = e.student_id
         INNER JOIN courses c ON c.id = e.course_id
         LEFT JOIN attendance a ON a.enrollment_id = e.id
         ORDER BY e.id ASC;"
    ))?;
    let mut rows = stmt.query([])?;
    let mut scanned = 0_usize;
    let mut flagged = Vec::new();
    while let Some(row) = rows.next()? {
        scanned += 1;
        let totals = parse_totals(row)?;
        let attendance_pct = totals.attendance_pct();
        let marks_pct = totals.marks_pct();

        let Some(reason) = risk_reason(attendance_pct, marks_pct, thresholds) else {
            continue;
        };
        flagged.push(AtRiskEnrollment {
            enrollment_id: row.get("enrollment_id")?,
            roll_no: row.get("roll_no")?,
            student_name: row.get("student_name")?,
            course_code: row.get("course_code")?,
            course_name: row.get("course_name")?,
            attendance_pct,
            marks_pct,
            reason,
        });
    }

    info!(
        "event=at_risk_scan module=analytics status=ok scanned={} flagged={} attendance_threshold={} marks_threshold={}",
        scanned,
        flagged.len(),
        thresholds.attendance_pct,
        thresholds.marks_pct
    );
    Ok(flagged)
}

fn risk_reason(
    attendance_pct: Option<f64>,
    marks_pct: Option<f64>,
    thresholds: &RiskThresholds,
) -> Option<String> {
    let mut reasons = Vec::with_capacity(2);
    if attendance_pct.is_some_and(|pct| pct < thresholds.attendance_pct) {
        reasons.push(LOW_ATTENDANCE);
    }
    if marks_pct.is_some_and(|pct| pct < thresholds.marks_pct) {
        reasons.push(LOW_MARKS);
    }

    if reasons.is_empty() {
        None
    } else {
        Some(reasons.join(", "))
    }
}
