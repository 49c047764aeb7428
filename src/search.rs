//! Exam number submission flow.
//!
//! A submission is validated first (no dataset access for empty input), then
//! resolved against the loaded dataset, then applied to the detail panel.

use crate::dataset::{Dataset, StudentRecord};
use crate::loader::{DatasetLoader, LoadError};
use crate::panel::DetailPanel;
use std::time::Instant;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter an exam number.";
pub const NOT_FOUND_MESSAGE: &str = "Exam number not found.";
pub const FOUND_MESSAGE: &str = "Student record found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Error,
}

/// Inline message under the search form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

impl Feedback {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Error,
            message: message.into(),
        }
    }
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Input was blank after trimming
    EmptyInput,
    Found {
        exam_number: String,
        record: StudentRecord,
    },
    NotFound {
        exam_number: String,
    },
    LoadFailed(LoadError),
}

impl SearchOutcome {
    pub fn feedback(&self) -> Feedback {
        match self {
            SearchOutcome::EmptyInput => Feedback::error(EMPTY_INPUT_MESSAGE),
            SearchOutcome::Found { .. } => Feedback::success(FOUND_MESSAGE),
            SearchOutcome::NotFound { .. } => Feedback::error(NOT_FOUND_MESSAGE),
            SearchOutcome::LoadFailed(e) => Feedback::error(e.to_string()),
        }
    }
}

/// Trimmed exam number, or `EmptyInput` when there is nothing to look up.
pub fn validate(input: &str) -> Result<String, SearchOutcome> {
    let exam_number = input.trim();
    if exam_number.is_empty() {
        Err(SearchOutcome::EmptyInput)
    } else {
        Ok(exam_number.to_string())
    }
}

/// Exact-key lookup of an already validated exam number.
pub fn resolve(dataset: Result<&Dataset, &LoadError>, exam_number: &str) -> SearchOutcome {
    let dataset = match dataset {
        Ok(d) => d,
        Err(e) => return SearchOutcome::LoadFailed(e.clone()),
    };
    match dataset.get(exam_number) {
        Some(record) => SearchOutcome::Found {
            exam_number: exam_number.to_string(),
            record: record.clone(),
        },
        None => SearchOutcome::NotFound {
            exam_number: exam_number.to_string(),
        },
    }
}

/// Validate, load if needed, and look up in one blocking call.
pub fn submit(input: &str, loader: &DatasetLoader) -> SearchOutcome {
    let exam_number = match validate(input) {
        Ok(n) => n,
        Err(outcome) => return outcome,
    };
    match loader.ensure_loaded() {
        Ok(loaded) => resolve(Ok(&loaded.dataset), &exam_number),
        Err(e) => resolve(Err(&e), &exam_number),
    }
}

/// Drive the panel from an outcome and return the feedback to show.
///
/// `stamp` is the formatted current date-time, used when a record is revealed.
pub fn apply(
    outcome: &SearchOutcome,
    panel: &mut DetailPanel,
    stamp: String,
    now: Instant,
) -> Feedback {
    match outcome {
        SearchOutcome::Found {
            exam_number,
            record,
        } => {
            log::debug!("Showing record for exam number {}", exam_number);
            panel.reveal(record, exam_number, stamp, now);
        }
        SearchOutcome::NotFound { exam_number } => {
            log::debug!("Exam number {} not found", exam_number);
            panel.dismiss(now);
        }
        SearchOutcome::EmptyInput | SearchOutcome::LoadFailed(_) => panel.dismiss(now),
    }
    outcome.feedback()
}
