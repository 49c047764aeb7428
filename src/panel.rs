//! Student detail panel state machine.
//!
//! `Hidden -> Visible -> Exiting -> Hidden`. The exit only completes when the
//! surrounding UI reports the exit transition finished via `finish_exit`.

use crate::dataset::StudentRecord;
use crate::print::PrintJob;
use std::time::{Duration, Instant};

pub const ENTER_DURATION: Duration = Duration::from_millis(350);
pub const EXIT_DURATION: Duration = Duration::from_millis(350);

/// Gap between refreshing the stamp and handing the slip to the printer.
pub const PRINT_DELAY: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Hidden,
    Visible { since: Instant },
    Exiting { since: Instant },
}

/// Display fields of the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentView {
    pub name: String,
    pub grade: String,
    pub exam_number: String,
    pub total: String,
    pub evaluation: String,
    pub status: String,
    /// Status carries the fail keyword
    pub status_fail: bool,
    pub department: String,
}

#[derive(Debug, Clone)]
pub struct DetailPanel {
    state: PanelState,
    view: StudentView,
    print_enabled: bool,
    stamp: String,
    fail_keyword: String,
}

impl DetailPanel {
    pub fn new(fail_keyword: impl Into<String>) -> Self {
        Self {
            state: PanelState::Hidden,
            view: StudentView::default(),
            print_enabled: false,
            stamp: String::new(),
            fail_keyword: fail_keyword.into(),
        }
    }

    #[cfg(test)]
    fn state(&self) -> PanelState {
        self.state
    }

    pub fn view(&self) -> &StudentView {
        &self.view
    }

    pub fn print_enabled(&self) -> bool {
        self.print_enabled
    }

    /// Formatted date-time stamped on the panel; empty once dismissed.
    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    pub fn is_hidden(&self) -> bool {
        self.state == PanelState::Hidden
    }

    /// Populate from `record` and show. Restarts the entrance from any state.
    pub fn reveal(
        &mut self,
        record: &StudentRecord,
        exam_number: &str,
        stamp: String,
        now: Instant,
    ) {
        self.view = StudentView {
            name: record.name.clone(),
            grade: record.grade.clone(),
            exam_number: exam_number.to_string(),
            total: record.total.clone(),
            evaluation: record.evaluation.clone(),
            status: record.status.clone(),
            status_fail: record.is_fail(&self.fail_keyword),
            department: record.department.clone(),
        };
        self.print_enabled = true;
        self.stamp = stamp;
        self.state = PanelState::Visible { since: now };
    }

    /// Start hiding. No-op when hidden or already on the way out.
    pub fn dismiss(&mut self, now: Instant) {
        if !matches!(self.state, PanelState::Visible { .. }) {
            return;
        }
        self.state = PanelState::Exiting { since: now };
        self.print_enabled = false;
        self.stamp.clear();
    }

    /// Exit transition finished. Acts once; ignored unless exiting.
    pub fn finish_exit(&mut self) -> bool {
        if matches!(self.state, PanelState::Exiting { .. }) {
            self.state = PanelState::Hidden;
            true
        } else {
            false
        }
    }

    /// Whether the exit transition has run its full duration.
    pub fn exit_elapsed(&self, now: Instant) -> bool {
        match self.state {
            PanelState::Exiting { since } => now.saturating_duration_since(since) >= EXIT_DURATION,
            _ => false,
        }
    }

    /// Refresh the stamp and schedule a print. `None` while hidden.
    pub fn print(&mut self, stamp: String, now: Instant) -> Option<PrintJob> {
        if self.is_hidden() {
            return None;
        }
        self.stamp = stamp;
        Some(PrintJob {
            view: self.view.clone(),
            stamp: self.stamp.clone(),
            due: now + PRINT_DELAY,
        })
    }

    /// Transition progress in `0.0..=1.0`.
    pub fn opacity(&self, now: Instant) -> f32 {
        match self.state {
            PanelState::Hidden => 0.0,
            PanelState::Visible { since } => progress(since, now, ENTER_DURATION),
            PanelState::Exiting { since } => 1.0 - progress(since, now, EXIT_DURATION),
        }
    }

    /// A transition is still playing and needs animation frames.
    pub fn is_animating(&self, now: Instant) -> bool {
        match self.state {
            PanelState::Hidden => false,
            PanelState::Visible { since } => now.saturating_duration_since(since) < ENTER_DURATION,
            PanelState::Exiting { .. } => true,
        }
    }
}

fn progress(since: Instant, now: Instant, total: Duration) -> f32 {
    let elapsed = now.saturating_duration_since(since).as_secs_f32();
    (elapsed / total.as_secs_f32()).clamp(0.0, 1.0)
}
