use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{FeedbackForm, FeedbackIntent, FeedbackSubmission};
use crate::subjects::SubjectDirectory;

pub const MAX_FEEDBACK_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("subject not found: {0}")]
    SubjectNotFound(String),

    #[error("feedback is {len} characters, the limit is {max}")]
    TextTooLong { len: usize, max: usize },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl FeedbackError {
    /// Message shown next to the form. The entered text is kept for retry.
    pub fn user_message(&self) -> String {
        match self {
            FeedbackError::SubjectNotFound(_) => "Subject not found. Please try again.".to_string(),
            FeedbackError::TextTooLong { max, .. } => {
                format!("Feedback must be at most {max} characters.")
            }
            FeedbackError::Store(_) => {
                "Feedback could not be saved right now. Please try again.".to_string()
            }
        }
    }
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn add_feedback(&self, submission: &FeedbackSubmission) -> anyhow::Result<()>;
}

pub fn feedback_form(subjects: &SubjectDirectory) -> FeedbackForm {
    FeedbackForm {
        subject_options: subjects.names(),
        max_text_length: MAX_FEEDBACK_CHARS,
    }
}

/// Resolves the selected subject and validates the text without writing.
pub fn prepare_feedback(
    student_id: Uuid,
    intent: &FeedbackIntent,
    subjects: &SubjectDirectory,
    today: NaiveDate,
) -> Result<FeedbackSubmission, FeedbackError> {
    let subject_id = subjects
        .id_for(&intent.selected_subject)
        .ok_or_else(|| FeedbackError::SubjectNotFound(intent.selected_subject.clone()))?;

    let len = intent.text.chars().count();
    if len > MAX_FEEDBACK_CHARS {
        return Err(FeedbackError::TextTooLong {
            len,
            max: MAX_FEEDBACK_CHARS,
        });
    }

    Ok(FeedbackSubmission {
        student_id,
        subject_id,
        text: intent.text.clone(),
        date: today,
    })
}

/// Validates one form submission and writes it exactly once.
pub async fn submit_feedback<S: FeedbackStore + ?Sized>(
    store: &S,
    student_id: Uuid,
    intent: &FeedbackIntent,
    subjects: &SubjectDirectory,
    today: NaiveDate,
) -> Result<FeedbackSubmission, FeedbackError> {
    let submission = match prepare_feedback(student_id, intent, subjects, today) {
        Ok(submission) => submission,
        Err(err) => {
            warn!(%student_id, subject = %intent.selected_subject, error = %err, "feedback rejected");
            return Err(err);
        }
    };

    if let Err(err) = store.add_feedback(&submission).await {
        warn!(%student_id, subject_id = %submission.subject_id, error = %err, "feedback not stored");
        return Err(FeedbackError::Store(err));
    }
    info!(%student_id, subject_id = %submission.subject_id, "feedback stored");

    Ok(submission)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::models::Subject;

    #[derive(Default)]
    struct RecordingStore {
        writes: Mutex<Vec<FeedbackSubmission>>,
        fail: bool,
    }

    #[async_trait]
    impl FeedbackStore for RecordingStore {
        async fn add_feedback(&self, submission: &FeedbackSubmission) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("connection reset");
            }
            self.writes.lock().unwrap().push(submission.clone());
            Ok(())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn directory(maths: Uuid) -> SubjectDirectory {
        SubjectDirectory::from_subjects(vec![
            Subject {
                id: maths,
                name: "Mathematics".to_string(),
            },
            Subject {
                id: Uuid::new_v4(),
                name: "Physics".to_string(),
            },
        ])
    }

    fn intent(subject: &str, text: &str) -> FeedbackIntent {
        FeedbackIntent {
            selected_subject: subject.to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn valid_submission_writes_once() {
        let store = RecordingStore::default();
        let maths = Uuid::new_v4();
        let student = Uuid::new_v4();

        let stored = submit_feedback(
            &store,
            student,
            &intent("Mathematics", "More worked examples please"),
            &directory(maths),
            today(),
        )
        .await
        .unwrap();

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0], stored);
        assert_eq!(writes[0].subject_id, maths);
        assert_eq!(writes[0].student_id, student);
        assert_eq!(writes[0].date, today());
    }

    #[tokio::test]
    async fn unknown_subject_writes_nothing() {
        let store = RecordingStore::default();
        let entered = intent("Astronomy", "Loved it");

        let err = submit_feedback(&store, Uuid::new_v4(), &entered, &directory(Uuid::new_v4()), today())
            .await
            .unwrap_err();

        assert!(matches!(err, FeedbackError::SubjectNotFound(ref name) if name == "Astronomy"));
        assert_eq!(err.user_message(), "Subject not found. Please try again.");
        assert!(store.writes.lock().unwrap().is_empty());
        assert_eq!(entered.text, "Loved it");
    }

    #[tokio::test]
    async fn overlong_text_is_rejected() {
        let store = RecordingStore::default();
        let text = "a".repeat(MAX_FEEDBACK_CHARS + 1);

        let err = submit_feedback(
            &store,
            Uuid::new_v4(),
            &intent("Physics", &text),
            &directory(Uuid::new_v4()),
            today(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FeedbackError::TextTooLong { len: 501, max: 500 }));
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_surfaces() {
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };

        let err = submit_feedback(
            &store,
            Uuid::new_v4(),
            &intent("Physics", "ok"),
            &directory(Uuid::new_v4()),
            today(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FeedbackError::Store(_)));
        assert_eq!(
            err.user_message(),
            "Feedback could not be saved right now. Please try again."
        );
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_text_and_limit_are_accepted() {
        let subjects = directory(Uuid::new_v4());

        assert!(prepare_feedback(Uuid::new_v4(), &intent("Physics", ""), &subjects, today()).is_ok());

        let multibyte = "é".repeat(MAX_FEEDBACK_CHARS);
        assert!(prepare_feedback(Uuid::new_v4(), &intent("Physics", &multibyte), &subjects, today())
            .is_ok());
    }

    #[test]
    fn form_lists_subjects_with_limit() {
        let form = feedback_form(&directory(Uuid::new_v4()));
        assert_eq!(form.subject_options, vec!["Mathematics", "Physics"]);
        assert_eq!(form.max_text_length, 500);
    }
}
