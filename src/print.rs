//! Printable result slips and the host print command.

use crate::panel::StudentView;
use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Print command used when none is configured.
pub const DEFAULT_PRINT_COMMAND: &str = "lp";

/// A slip waiting for its print time.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintJob {
    pub view: StudentView,
    pub stamp: String,
    /// Dispatch no earlier than this
    pub due: Instant,
}

impl PrintJob {
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }
}

/// Plain-text rendering of the detail panel.
pub fn render_slip(view: &StudentView, stamp: &str) -> Result<String> {
    let rows = [
        ("Name", view.name.as_str()),
        ("Exam number", view.exam_number.as_str()),
        ("Grade", view.grade.as_str()),
        ("Department", view.department.as_str()),
        ("Total", view.total.as_str()),
        ("Evaluation", view.evaluation.as_str()),
        ("Status", view.status.as_str()),
    ];

    let mut out = String::new();
    writeln!(out, "Exam Result")?;
    writeln!(out, "{}", "=".repeat(40))?;
    for (label, value) in rows {
        writeln!(out, "{:<14}{}", format!("{}:", label), value)?;
    }
    writeln!(out, "{}", "-".repeat(40))?;
    writeln!(out, "Printed: {}", stamp)?;
    Ok(out)
}

/// Writes slips to the temp directory and hands them to a print command.
#[derive(Debug, Clone)]
pub struct Printer {
    command: String,
    dir: PathBuf,
}

impl Printer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            dir: std::env::temp_dir(),
        }
    }

    /// Write slips somewhere other than the temp directory.
    #[cfg(test)]
    fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Write the slip to disk, returning its path.
    pub fn write_slip(&self, job: &PrintJob) -> Result<PathBuf> {
        let file_name = format!("exam-result-{}.txt", sanitize(&job.view.exam_number));
        let path = self.dir.join(file_name);
        std::fs::write(&path, render_slip(&job.view, &job.stamp)?)
            .with_context(|| format!("Failed to write print slip {}", path.display()))?;
        Ok(path)
    }

    /// Write the slip and start the print command on it.
    pub fn print(&self, job: &PrintJob) -> Result<PathBuf> {
        let path = self.write_slip(job)?;
        self.spawn(&path)?;
        log::info!("Sent {} to '{}'", path.display(), self.command);
        Ok(path)
    }

    fn spawn(&self, path: &Path) -> Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("Print command is empty"))?;
        std::process::Command::new(program)
            .args(parts)
            .arg(path)
            .spawn()
            .with_context(|| format!("Failed to run print command '{}'", self.command))?;
        Ok(())
    }
}

/// Keep exam numbers filesystem-safe.
fn sanitize(exam_number: &str) -> String {
    let cleaned: String = exam_number
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
