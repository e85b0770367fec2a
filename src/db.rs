use anyhow::Context;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::dashboard::DashboardSource;
use crate::feedback::FeedbackStore;
use crate::models::{
    AttendanceRecord, FeedbackSubmission, PerformanceRecord, RemedialClass, Student, Subject,
};

pub const DEMO_STUDENT_ID: &str = "6f2c9e41-5a7d-4b13-a8e0-7c94d1b2f305";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool, today: NaiveDate) -> anyhow::Result<()> {
    let student_id = Uuid::parse_str(DEMO_STUDENT_ID)?;
    sqlx::query(
        r#"
        INSERT INTO remedial_dashboard.students (id, full_name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET full_name = EXCLUDED.full_name
        "#,
    )
    .bind(student_id)
    .bind("Noor Haddad")
    .bind("noor.haddad@example.com")
    .execute(pool)
    .await?;

    let subjects = vec![
        (
            Uuid::parse_str("1e8a4c72-93bd-4f06-b5a1-2d7e6c0f9a14")?,
            "Mathematics",
        ),
        (
            Uuid::parse_str("4b9d0e35-c6a2-47f8-9e13-85f2a7c1d046")?,
            "Physics",
        ),
        (
            Uuid::parse_str("8b1d3c5e-7f90-4a2b-9c4d-5e6f7a8b9c0d")?,
            "English",
        ),
    ];

    for (id, name) in &subjects {
        sqlx::query(
            r#"
            INSERT INTO remedial_dashboard.subjects (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            "#,
        )
        .bind(*id)
        .bind(*name)
        .execute(pool)
        .await?;
    }

    let classes = vec![
        (
            Uuid::parse_str("a1f0c3d2-1b2c-4d5e-8f90-0a1b2c3d4e01")?,
            subjects[0].0,
            Some(20_i32),
            today - Duration::days(14),
            (15, 0),
            "101",
        ),
        (
            Uuid::parse_str("a1f0c3d2-1b2c-4d5e-8f90-0a1b2c3d4e02")?,
            subjects[1].0,
            Some(15),
            today - Duration::days(7),
            (10, 30),
            "Lab 2",
        ),
        (
            Uuid::parse_str("a1f0c3d2-1b2c-4d5e-8f90-0a1b2c3d4e03")?,
            subjects[0].0,
            Some(20),
            today,
            (16, 0),
            "101",
        ),
        (
            Uuid::parse_str("a1f0c3d2-1b2c-4d5e-8f90-0a1b2c3d4e04")?,
            subjects[2].0,
            None,
            today + Duration::days(3),
            (9, 15),
            "204",
        ),
    ];

    for (id, subject_id, capacity, date, (hour, minute), room) in &classes {
        let time = NaiveTime::from_hms_opt(*hour, *minute, 0).context("invalid class time")?;
        sqlx::query(
            r#"
            INSERT INTO remedial_dashboard.remedial_classes
            (id, subject_id, capacity, class_date, class_time, room)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET class_date = EXCLUDED.class_date, class_time = EXCLUDED.class_time
            "#,
        )
        .bind(*id)
        .bind(*subject_id)
        .bind(*capacity)
        .bind(*date)
        .bind(time)
        .bind(*room)
        .execute(pool)
        .await?;
    }

    let performance = vec![
        (
            Uuid::parse_str("b2e1d4c3-2c3d-4e5f-9a01-1b2c3d4e5f01")?,
            subjects[0].0,
            48.0,
            67.5,
            today - Duration::days(30),
        ),
        (
            Uuid::parse_str("b2e1d4c3-2c3d-4e5f-9a01-1b2c3d4e5f02")?,
            subjects[1].0,
            55.0,
            71.0,
            today - Duration::days(10),
        ),
    ];

    for (id, subject_id, before, after, recorded_on) in performance {
        sqlx::query(
            r#"
            INSERT INTO remedial_dashboard.performance
            (id, student_id, subject_id, score_before, score_after, recorded_on)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(student_id)
        .bind(subject_id)
        .bind(before)
        .bind(after)
        .bind(recorded_on)
        .execute(pool)
        .await?;
    }

    let attendance = vec![
        (classes[0].0, "present", classes[0].3),
        (classes[1].0, "absent", classes[1].3),
    ];

    for (class_id, status, attended_on) in attendance {
        sqlx::query(
            r#"
            INSERT INTO remedial_dashboard.attendance
            (id, class_id, student_id, status, attended_on)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (class_id, student_id, attended_on) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(class_id)
        .bind(student_id)
        .bind(status)
        .bind(attended_on)
        .execute(pool)
        .await?;
    }

    info!(%student_id, "seed data written");
    Ok(())
}

pub async fn fetch_student(pool: &PgPool, student_id: Uuid) -> anyhow::Result<Option<Student>> {
    let row = sqlx::query(
        "SELECT id, full_name, email FROM remedial_dashboard.students WHERE id = $1",
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| Student {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
    }))
}

pub async fn fetch_remedial_classes(pool: &PgPool) -> anyhow::Result<Vec<RemedialClass>> {
    let rows = sqlx::query(
        "SELECT id, subject_id, capacity, class_date, class_time, room \
         FROM remedial_dashboard.remedial_classes",
    )
    .fetch_all(pool)
    .await?;

    let mut classes = Vec::with_capacity(rows.len());
    for row in rows {
        classes.push(RemedialClass {
            id: row.get("id"),
            subject_id: row.get("subject_id"),
            capacity: row.get("capacity"),
            date: row.get("class_date"),
            time: row.get("class_time"),
            room: row.get("room"),
        });
    }

    debug!(count = classes.len(), "fetched remedial classes");
    Ok(classes)
}

pub async fn fetch_subjects(pool: &PgPool) -> anyhow::Result<Vec<Subject>> {
    let rows = sqlx::query("SELECT id, name FROM remedial_dashboard.subjects ORDER BY name, id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| Subject {
            id: row.get("id"),
            name: row.get("name"),
        })
        .collect())
}

pub async fn fetch_performance_by_student(
    pool: &PgPool,
    student_id: Uuid,
) -> anyhow::Result<Vec<PerformanceRecord>> {
    let rows = sqlx::query(
        "SELECT id, student_id, subject_id, score_before, score_after, recorded_on \
         FROM remedial_dashboard.performance \
         WHERE student_id = $1 \
         ORDER BY recorded_on",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(PerformanceRecord {
            id: row.get("id"),
            student_id: row.get("student_id"),
            subject_id: row.get("subject_id"),
            score_before: row.get("score_before"),
            score_after: row.get("score_after"),
            date: row.get("recorded_on"),
        });
    }

    debug!(%student_id, count = records.len(), "fetched performance");
    Ok(records)
}

pub async fn fetch_attendance_for_student(
    pool: &PgPool,
    student_id: Uuid,
) -> anyhow::Result<Vec<AttendanceRecord>> {
    let rows = sqlx::query(
        "SELECT id, class_id, student_id, status, attended_on \
         FROM remedial_dashboard.attendance \
         WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(AttendanceRecord {
            id: row.get("id"),
            class_id: row.get("class_id"),
            student_id: row.get("student_id"),
            status: row.get("status"),
            date: row.get("attended_on"),
        });
    }

    debug!(%student_id, count = records.len(), "fetched attendance");
    Ok(records)
}

pub async fn add_feedback(pool: &PgPool, submission: &FeedbackSubmission) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO remedial_dashboard.feedback
        (id, student_id, subject_id, body, submitted_on)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(submission.student_id)
    .bind(submission.subject_id)
    .bind(&submission.text)
    .bind(submission.date)
    .execute(pool)
    .await
    .context("failed to insert feedback")?;

    Ok(())
}

pub async fn import_attendance_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        class_id: Uuid,
        student_id: Uuid,
        status: String,
        date: NaiveDate,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid attendance row {}", line + 1))?;

        let result = sqlx::query(
            r#"
            INSERT INTO remedial_dashboard.attendance
            (id, class_id, student_id, status, attended_on)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (class_id, student_id, attended_on) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(row.class_id)
        .bind(row.student_id)
        .bind(row.status.trim())
        .bind(row.date)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Postgres-backed store for the dashboard and the feedback form.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl DashboardSource for PgStore {
    async fn student(&self, student_id: Uuid) -> anyhow::Result<Option<Student>> {
        fetch_student(&self.pool, student_id).await
    }

    async fn remedial_classes(&self) -> anyhow::Result<Vec<RemedialClass>> {
        fetch_remedial_classes(&self.pool).await
    }

    async fn subjects(&self) -> anyhow::Result<Vec<Subject>> {
        fetch_subjects(&self.pool).await
    }

    async fn performance_by_student(
        &self,
        student_id: Uuid,
    ) -> anyhow::Result<Vec<PerformanceRecord>> {
        fetch_performance_by_student(&self.pool, student_id).await
    }

    async fn attendance_for_student(
        &self,
        student_id: Uuid,
    ) -> anyhow::Result<Vec<AttendanceRecord>> {
        fetch_attendance_for_student(&self.pool, student_id).await
    }
}

#[async_trait]
impl FeedbackStore for PgStore {
    async fn add_feedback(&self, submission: &FeedbackSubmission) -> anyhow::Result<()> {
        add_feedback(&self.pool, submission).await
    }
}
