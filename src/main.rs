use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use uuid::Uuid;

mod config;
mod dashboard;
mod db;
mod feedback;
mod logging;
mod models;
mod report;
mod subjects;
mod view;

use crate::config::Config;
use crate::db::PgStore;
use crate::feedback::FeedbackError;
use crate::models::{FeedbackIntent, FeedbackSubmission};

#[derive(Parser)]
#[command(name = "remedial-dashboard")]
#[command(about = "Student view of remedial classes, progress and attendance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a demo student with classes, scores and attendance
    Seed,
    /// Import attendance rows from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Render the dashboard for one student
    Show {
        #[arg(long)]
        student_id: Uuid,
        /// Date to treat as today (defaults to the local date)
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the subjects offered on the feedback form
    Subjects,
    /// Submit feedback for a subject
    Feedback {
        #[arg(long)]
        student_id: Uuid,
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "")]
        text: String,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;
    let store = PgStore::new(pool.clone());

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool, local_today()).await?;
            println!("Seed data inserted for student {}.", db::DEMO_STUDENT_ID);
        }
        Commands::Import { csv } => {
            let inserted = db::import_attendance_csv(&pool, &csv).await?;
            println!("Inserted {inserted} attendance rows from {}.", csv.display());
        }
        Commands::Show {
            student_id,
            today,
            format,
            out,
        } => {
            let today = today.unwrap_or_else(local_today);
            let board = dashboard::load_dashboard(&store, student_id, today).await;
            let rendered = match format {
                Format::Markdown => report::render_markdown(&board),
                Format::Json => report::render_json(&board)?,
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Dashboard written to {}.", path.display());
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Subjects => {
            let subjects = dashboard::load_subjects(&store).await;
            if subjects.is_empty() {
                println!("No subjects found.");
            }
            let form = feedback::feedback_form(&subjects);
            for name in form.subject_options {
                println!("- {name}");
            }
        }
        Commands::Feedback {
            student_id,
            subject,
            text,
            today,
        } => {
            let today = today.unwrap_or_else(local_today);
            let subjects = dashboard::load_subjects(&store).await;
            info!(subjects = subjects.len(), "subjects loaded for feedback");
            let intent = FeedbackIntent {
                selected_subject: subject,
                text,
            };

            let result =
                feedback::submit_feedback(&store, student_id, &intent, &subjects, today).await;
            match feedback_reply(&result) {
                Ok(message) => println!("{message}"),
                Err(message) => {
                    eprintln!("{message}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// One line for the user per submission, success or failure.
fn feedback_reply(result: &Result<FeedbackSubmission, FeedbackError>) -> Result<String, String> {
    match result {
        Ok(_) => Ok("Thank you for your feedback!".to_string()),
        Err(err) => Err(err.user_message()),
    }
}
