use std::fmt::Write;

use crate::dashboard::{
    Dashboard, Section, NO_ATTENDANCE_RECORDS, NO_PERFORMANCE_DATA, NO_UPCOMING_CLASSES,
};

pub fn render_json(dashboard: &Dashboard) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(dashboard)?)
}

pub fn render_markdown(dashboard: &Dashboard) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Student Dashboard");
    match &dashboard.student_name {
        Some(name) => {
            let _ = writeln!(
                output,
                "Welcome back, {name}! Here's a quick look at your classes, progress, and attendance."
            );
        }
        None => {
            let _ = writeln!(output, "Student {}", dashboard.student_id);
        }
    }
    let _ = writeln!(output, "As of {}", dashboard.today);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Upcoming Remedial Classes");
    match &dashboard.upcoming {
        Section::Ready(events) => {
            for event in events {
                let _ = writeln!(
                    output,
                    "- {}: {} in {}",
                    event.start, event.title, event.location
                );
            }
        }
        Section::Empty => {
            let _ = writeln!(output, "{NO_UPCOMING_CLASSES}");
        }
        Section::Unavailable(reason) => {
            let _ = writeln!(output, "Upcoming classes could not be loaded ({reason}).");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## My Performance");
    match &dashboard.performance {
        Section::Ready(series) => {
            let _ = writeln!(output, "| Date | Subject | Before | After |");
            let _ = writeln!(output, "|------|---------|--------|-------|");
            for row in &series.rows {
                let _ = writeln!(
                    output,
                    "| {} | {} | {:.1} | {:.1} |",
                    row.date,
                    row.subject.as_deref().unwrap_or(""),
                    row.score_before,
                    row.score_after
                );
            }
        }
        Section::Empty => {
            let _ = writeln!(output, "{NO_PERFORMANCE_DATA}");
        }
        Section::Unavailable(reason) => {
            let _ = writeln!(output, "Performance could not be loaded ({reason}).");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## My Attendance Record");
    match &dashboard.attendance {
        Section::Ready(summary) => {
            let _ = writeln!(
                output,
                "Attendance Rate: {:.1}% Present",
                summary.rate_present_percent
            );
            let _ = writeln!(output);
            let _ = writeln!(output, "| Date | Status |");
            let _ = writeln!(output, "|------|--------|");
            for row in &summary.rows {
                let _ = writeln!(output, "| {} | {} |", row.date, row.status);
            }
        }
        Section::Empty => {
            let _ = writeln!(output, "{NO_ATTENDANCE_RECORDS}");
        }
        Section::Unavailable(reason) => {
            let _ = writeln!(output, "Attendance could not be loaded ({reason}).");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Submit Feedback");
    let form = &dashboard.feedback_form;
    if form.subject_options.is_empty() {
        let _ = writeln!(output, "No subjects are open for feedback.");
    } else {
        let _ = writeln!(
            output,
            "Subjects: {} (up to {} characters)",
            form.subject_options.join(", "),
            form.max_text_length
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::models::{
        AttendanceRow, AttendanceSummary, CalendarEvent, FeedbackForm, PerformanceRow,
        PerformanceSeries,
    };

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sample(performance: Section<PerformanceSeries>) -> Dashboard {
        Dashboard {
            student_id: Uuid::nil(),
            student_name: Some("Noor Haddad".to_string()),
            today: day(10),
            upcoming: Section::Ready(vec![CalendarEvent {
                title: "Mathematics (16:00)".to_string(),
                start: "2024-03-10T16:00".to_string(),
                end: "2024-03-10T16:00".to_string(),
                location: "Room 101".to_string(),
            }]),
            performance,
            attendance: Section::Ready(AttendanceSummary {
                rate_present_percent: 75.0,
                rows: vec![AttendanceRow {
                    date: day(1),
                    status: "present".to_string(),
                }],
            }),
            feedback_form: FeedbackForm {
                subject_options: vec!["Mathematics".to_string(), "Physics".to_string()],
                max_text_length: 500,
            },
        }
    }

    #[test]
    fn markdown_includes_every_section() {
        let report = render_markdown(&sample(Section::Ready(PerformanceSeries {
            rows: vec![PerformanceRow {
                date: day(2),
                subject: Some("Mathematics".to_string()),
                score_before: 48.0,
                score_after: 67.5,
            }],
        })));

        assert!(report.contains("Welcome back, Noor Haddad!"));
        assert!(report.contains("- 2024-03-10T16:00: Mathematics (16:00) in Room 101"));
        assert!(report.contains("| 2024-03-02 | Mathematics | 48.0 | 67.5 |"));
        assert!(report.contains("Attendance Rate: 75.0% Present"));
        assert!(report.contains("Subjects: Mathematics, Physics (up to 500 characters)"));
    }

    #[test]
    fn failed_section_does_not_hide_others() {
        let report = render_markdown(&sample(Section::Unavailable("timeout".to_string())));

        assert!(report.contains("Performance could not be loaded (timeout)."));
        assert!(report.contains("Attendance Rate: 75.0% Present"));
    }

    #[test]
    fn empty_section_shows_placeholder() {
        let report = render_markdown(&sample(Section::Empty));
        assert!(report.contains(NO_PERFORMANCE_DATA));
    }

    #[test]
    fn json_tags_section_status() {
        let json = render_json(&sample(Section::Empty)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["performance"]["status"], "empty");
        assert_eq!(value["attendance"]["status"], "ready");
        assert_eq!(value["attendance"]["data"]["rate_present_percent"], 75.0);
        assert_eq!(value["upcoming"]["data"][0]["location"], "Room 101");
    }

    #[test]
    fn json_carries_tidy_points_for_chart() {
        let json = render_json(&sample(Section::Ready(PerformanceSeries {
            rows: vec![PerformanceRow {
                date: day(2),
                subject: None,
                score_before: 40.0,
                score_after: 60.0,
            }],
        })))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let points = &value["performance"]["data"]["points"];

        assert_eq!(points[0]["series"], "Before");
        assert_eq!(points[1]["series"], "After");
        assert_eq!(points[1]["score"], 60.0);
        assert_eq!(points[0]["date"], "2024-03-02");
    }
}
