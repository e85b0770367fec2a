use chrono::{NaiveDate, NaiveTime};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemedialClass {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub capacity: Option<i32>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub room: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub score_before: f64,
    pub score_after: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub class_id: Uuid,
    pub student_id: Uuid,
    pub status: String,
    pub date: NaiveDate,
}

/// A validated feedback row, ready for a single write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackSubmission {
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub text: String,
    pub date: NaiveDate,
}

/// Point event consumed by the calendar widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: String,
    pub end: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    pub date: NaiveDate,
    pub subject: Option<String>,
    pub score_before: f64,
    pub score_after: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestType {
    Before,
    After,
}

/// One observation of the tidy performance series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub series: TestType,
    pub subject: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSeries {
    pub rows: Vec<PerformanceRow>,
}

impl PerformanceSeries {
    /// Two points per row, "Before" then "After", in row order.
    pub fn points(&self) -> Vec<SeriesPoint> {
        self.rows
            .iter()
            .flat_map(|row| {
                [
                    (TestType::Before, row.score_before),
                    (TestType::After, row.score_after),
                ]
                .into_iter()
                .map(move |(series, score)| SeriesPoint {
                    date: row.date,
                    series,
                    subject: row.subject.clone(),
                    score,
                })
            })
            .collect()
    }
}

// Rows for the table, tidy points for the chart.
impl Serialize for PerformanceSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PerformanceSeries", 2)?;
        state.serialize_field("rows", &self.rows)?;
        state.serialize_field("points", &self.points())?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRow {
    pub date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub rate_present_percent: f64,
    pub rows: Vec<AttendanceRow>,
}

/// Options and limits for the feedback form widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackForm {
    pub subject_options: Vec<String>,
    pub max_text_length: usize,
}

/// What the form emits on submit. Borrowed by the submit path so the
/// caller still holds the entered text after a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackIntent {
    pub selected_subject: String,
    pub text: String,
}
