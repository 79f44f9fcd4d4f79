//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: one spinner line per running task, cleared on completion.
//! Non-TTY mode: hidden bars; logs are the only progress indicator.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

fn task_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {prefix:<24.dim} {wide_msg:.dim}")
        .expect("invalid template")
}

/// Truncate to at most `max` chars for prefix alignment
fn truncate_name(name: &str, max: usize) -> &str {
    match name.char_indices().nth(max) {
        Some((cut, _)) => &name[..cut],
        None => name,
    }
}

/// Central progress context owning the MultiProgress.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY on stderr.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: std::io::stderr().is_terminal(),
        }
    }

    /// Context that never draws anything.
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: false,
        }
    }

    /// Spinner line for one task. Hidden (no-op) outside a TTY.
    ///
    /// Fetchers update it with `pb.set_message(..)`; call
    /// `pb.finish_and_clear()` when the task ends.
    pub fn task_line(&self, name: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(task_style());
        pb.set_prefix(truncate_name(name, 24).to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress context shared between the CLI and runners.
pub type SharedProgress = Arc<ProgressContext>;
