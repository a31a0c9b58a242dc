//! Read-only performance analytics over the records store.
//!
//! # Responsibility
//! - Derive attendance and marks percentages per enrollment.
//! - Aggregate per-course class averages.
//! - Classify at-risk enrollments against thresholds.
//!
//! # Invariants
//! - Nothing in this module writes to the store.
//! - A percentage over a zero denominator is undefined (`None`), never `0`.
//! - Per-course averages are the mean of per-enrollment percentages, not a
//!   pooled ratio of sums.

mod risk;
mod summary;

pub use risk::{find_at_risk, AtRiskEnrollment, RiskThresholds};
pub use summary::{
    course_average_attendance_pct, course_average_marks_pct, student_enrollment_summaries,
    EnrollmentSummary,
};

/// Returns `numerator / denominator * 100` rounded to two decimals, or `None`
/// when `denominator <= 0`.
pub fn percentage(numerator: f64, denominator: f64) -> Option<f64> {
    ratio_pct(numerator, denominator).map(round2)
}

pub(crate) fn ratio_pct(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator * 100.0)
    } else {
        None
    }
}

/// Rounds to two decimals, exact halves to the even neighbour.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Raw per-enrollment counters shared by summaries, averages and risk scans.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EnrollmentTotals {
    pub total_classes: i64,
    pub attended_classes: i64,
    /// `None` when the enrollment has no marks.
    pub marks_obtained: Option<f64>,
    pub max_marks: Option<f64>,
}

impl EnrollmentTotals {
    pub fn attendance_ratio(&self) -> Option<f64> {
        ratio_pct(self.attended_classes as f64, self.total_classes as f64)
    }

    pub fn marks_ratio(&self) -> Option<f64> {
        match (self.marks_obtained, self.max_marks) {
            (Some(obtained), Some(maximum)) => ratio_pct(obtained, maximum),
            _ => None,
        }
    }

    pub fn attendance_pct(&self) -> Option<f64> {
        self.attendance_ratio().map(round2)
    }

    pub fn marks_pct(&self) -> Option<f64> {
        self.marks_ratio().map(round2)
    }
}

/// Column list producing [`EnrollmentTotals`] for an enrollment aliased `e`.
pub(crate) const TOTALS_COLUMNS_SQL: &str = "COALESCE(a.total_classes, 0) AS total_classes,
    COALESCE(a.attended_classes, 0) AS attended_classes,
    (SELECT SUM(m.marks_obtained) FROM marks m WHERE m.enrollment_id = e.id) AS marks_obtained,
    (SELECT SUM(m.max_marks) FROM marks m WHERE m.enrollment_id = e.id) AS max_marks";

pub(crate) fn parse_totals(row: &rusqlite::Row<'_>) -> rusqlite::Result<EnrollmentTotals> {
    Ok(EnrollmentTotals {
        total_classes: row.get("total_classes")?,
        attended_classes: row.get("attended_classes")?,
        marks_obtained: row.get("marks_obtained")?,
        max_marks: row.get("max_marks")?,
    })
}
