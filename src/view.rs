use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::models::{
    AttendanceRecord, AttendanceRow, AttendanceSummary, CalendarEvent, PerformanceRecord,
    PerformanceRow, PerformanceSeries, RemedialClass,
};
use crate::subjects::SubjectDirectory;

pub const UNKNOWN_SUBJECT: &str = "Unknown";
pub const PRESENT_STATUS: &str = "present";

/// Calendar events for classes on or after `today`, in input order.
pub fn build_upcoming_events(
    classes: &[RemedialClass],
    subjects: &SubjectDirectory,
    today: NaiveDate,
) -> Vec<CalendarEvent> {
    classes
        .iter()
        .filter(|class| class.date >= today)
        .map(|class| {
            let subject = subjects.name(&class.subject_id).unwrap_or(UNKNOWN_SUBJECT);
            let time = format_time(class.time);
            let start = format!("{}T{}", class.date.format("%Y-%m-%d"), time);

            CalendarEvent {
                title: format!("{subject} ({time})"),
                end: start.clone(),
                start,
                location: format!("Room {}", class.room),
            }
        })
        .collect()
}

/// Per-record performance rows for `student_id`. `None` when the student
/// has no records.
pub fn build_performance_series(
    records: &[PerformanceRecord],
    subjects: &SubjectDirectory,
    student_id: Uuid,
) -> Option<PerformanceSeries> {
    let rows: Vec<PerformanceRow> = records
        .iter()
        .filter(|record| record.student_id == student_id)
        .map(|record| PerformanceRow {
            date: record.date,
            subject: subjects.name(&record.subject_id).map(str::to_string),
            score_before: record.score_before,
            score_after: record.score_after,
        })
        .collect();

    if rows.is_empty() {
        return None;
    }

    Some(PerformanceSeries { rows })
}

/// Present-rate and date-ordered rows. `None` when there are no records.
pub fn build_attendance_summary(records: &[AttendanceRecord]) -> Option<AttendanceSummary> {
    if records.is_empty() {
        return None;
    }

    let present = records
        .iter()
        .filter(|record| record.status == PRESENT_STATUS)
        .count();
    let rate = 100.0 * present as f64 / records.len() as f64;

    let mut rows: Vec<AttendanceRow> = records
        .iter()
        .map(|record| AttendanceRow {
            date: record.date,
            status: record.status.clone(),
        })
        .collect();
    rows.sort_by_key(|row| row.date);

    Some(AttendanceSummary {
        rate_present_percent: round_one_decimal(rate),
        rows,
    })
}

/// Rounds the exact binary value to one decimal, ties to even, the same way
/// `{:.1}` formats it.
pub fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
