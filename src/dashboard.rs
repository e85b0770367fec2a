use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::feedback;
use crate::models::{
    AttendanceRecord, AttendanceSummary, CalendarEvent, FeedbackForm, PerformanceRecord,
    PerformanceSeries, RemedialClass, Student, Subject,
};
use crate::subjects::SubjectDirectory;
use crate::view;

pub const NO_UPCOMING_CLASSES: &str = "No upcoming classes scheduled.";
pub const NO_PERFORMANCE_DATA: &str = "No performance data available.";
pub const NO_ATTENDANCE_RECORDS: &str = "No attendance records available.";

/// Read side of the store the dashboard is built from.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn student(&self, student_id: Uuid) -> anyhow::Result<Option<Student>>;
    async fn remedial_classes(&self) -> anyhow::Result<Vec<RemedialClass>>;
    async fn subjects(&self) -> anyhow::Result<Vec<Subject>>;
    async fn performance_by_student(
        &self,
        student_id: Uuid,
    ) -> anyhow::Result<Vec<PerformanceRecord>>;
    async fn attendance_for_student(
        &self,
        student_id: Uuid,
    ) -> anyhow::Result<Vec<AttendanceRecord>>;
}

/// One dashboard section. Failures stay local to the section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum Section<T> {
    Ready(T),
    Empty,
    Unavailable(String),
}

impl<T> Section<T> {
    fn from_optional(value: Option<T>) -> Self {
        match value {
            Some(value) => Section::Ready(value),
            None => Section::Empty,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub student_id: Uuid,
    pub student_name: Option<String>,
    pub today: NaiveDate,
    pub upcoming: Section<Vec<CalendarEvent>>,
    pub performance: Section<PerformanceSeries>,
    pub attendance: Section<AttendanceSummary>,
    pub feedback_form: FeedbackForm,
}

pub async fn load_subjects<S: DashboardSource + ?Sized>(source: &S) -> SubjectDirectory {
    match source.subjects().await {
        Ok(subjects) => SubjectDirectory::from_subjects(subjects),
        Err(err) => {
            warn!(error = %err, "subjects unavailable, labels will fall back");
            SubjectDirectory::default()
        }
    }
}

pub async fn load_dashboard<S: DashboardSource + ?Sized>(
    source: &S,
    student_id: Uuid,
    today: NaiveDate,
) -> Dashboard {
    let student_name = match source.student(student_id).await {
        Ok(student) => student.map(|s| s.full_name),
        Err(err) => {
            warn!(%student_id, error = %err, "student lookup failed");
            None
        }
    };

    let subjects = load_subjects(source).await;

    let upcoming = match source.remedial_classes().await {
        Ok(classes) => {
            let events = view::build_upcoming_events(&classes, &subjects, today);
            debug!(total = classes.len(), upcoming = events.len(), "classes loaded");
            if events.is_empty() {
                Section::Empty
            } else {
                Section::Ready(events)
            }
        }
        Err(err) => unavailable("classes", err),
    };

    let performance = match source.performance_by_student(student_id).await {
        Ok(records) => Section::from_optional(view::build_performance_series(
            &records, &subjects, student_id,
        )),
        Err(err) => unavailable("performance", err),
    };

    let attendance = match source.attendance_for_student(student_id).await {
        Ok(mut records) => {
            records.retain(|record| record.student_id == student_id);
            Section::from_optional(view::build_attendance_summary(&records))
        }
        Err(err) => unavailable("attendance", err),
    };

    Dashboard {
        student_id,
        student_name,
        today,
        upcoming,
        performance,
        attendance,
        feedback_form: feedback::feedback_form(&subjects),
    }
}

fn unavailable<T>(section: &str, err: anyhow::Error) -> Section<T> {
    warn!(section, error = %err, "section query failed");
    Section::Unavailable(format!("{err:#}"))
}
