//! Exam Results
//!
//! Looks up a student's exam record by exam number and ranks the top students
//! from a published JSON dataset.
//!
//! This library provides:
//! - `dataset`: Student records and the ordered exam-number map
//! - `loader`: Fetch-once dataset loader with an owned in-memory cache
//! - `ranking` / `leaderboard`: Score extraction, ranking, and leaderboard cards
//! - `search`: Exam number submission flow
//! - `panel`: Student detail panel state machine
//! - `clock`: Date/time formatting for the live clock and print stamps
//! - `print`: Printable result slips
//! - `config`: Settings file handling
//!
//! Binaries:
//! - `exam-ui`: Windowed lookup and leaderboard
//! - `exam-lookup`: Command-line lookup and leaderboard

pub mod clock;
pub mod config;
pub mod dataset;
pub mod leaderboard;
pub mod loader;
pub mod panel;
pub mod print;
pub mod ranking;
pub mod search;

pub use dataset::{Dataset, StudentRecord};
pub use loader::{DatasetLoader, LoadError, LoadOutcome};
