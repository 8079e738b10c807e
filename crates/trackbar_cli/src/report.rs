//! Report output model for scenario runs.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Component, Path};

use crate::assert::Snapshot;

/// Report status for a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// Machine-readable result of a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub status: ReportStatus,
    pub failed_step_index: Option<usize>,
    pub assertion: Option<String>,
    pub message: Option<String>,
    pub steps_run: usize,
    pub elapsed_frames: u64,
    pub elapsed_ms: u64,
    /// Scroll offset writes made during the run
    pub scroll_writes: usize,
    pub final_state: Snapshot,
}

impl ScenarioReport {
    pub fn passed(
        steps_run: usize,
        elapsed_frames: u64,
        elapsed_ms: u64,
        scroll_writes: usize,
        final_state: Snapshot,
    ) -> Self {
        Self {
            status: ReportStatus::Passed,
            failed_step_index: None,
            assertion: None,
            message: None,
            steps_run,
            elapsed_frames,
            elapsed_ms,
            scroll_writes,
            final_state,
        }
    }

    pub fn failed(
        assertion: &str,
        failed_step_index: usize,
        message: String,
        elapsed_frames: u64,
        elapsed_ms: u64,
        scroll_writes: usize,
        final_state: Snapshot,
    ) -> Self {
        Self {
            status: ReportStatus::Failed,
            failed_step_index: Some(failed_step_index),
            assertion: Some(assertion.to_string()),
            message: Some(message),
            steps_run: failed_step_index + 1,
            elapsed_frames,
            elapsed_ms,
            scroll_writes,
            final_state,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ReportStatus::Failed
    }

    /// Human-readable summary
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        match self.status {
            ReportStatus::Passed => {
                let _ = writeln!(out, "PASSED  {} steps", self.steps_run);
            }
            ReportStatus::Failed => {
                let _ = writeln!(
                    out,
                    "FAILED  step {} ({})",
                    self.failed_step_index.unwrap_or_default(),
                    self.assertion.as_deref().unwrap_or("unknown")
                );
                if let Some(message) = &self.message {
                    let _ = writeln!(out, "        {message}");
                }
            }
        }
        let _ = writeln!(
            out,
            "time    {} ms, {} frames, {} scroll writes",
            self.elapsed_ms, self.elapsed_frames, self.scroll_writes
        );

        let state = &self.final_state;
        let _ = writeln!(
            out,
            "scroll  top={} left={}",
            state.scroll_top, state.scroll_left
        );
        let _ = writeln!(
            out,
            "state   {} (visible={}, listeners={})",
            state.state, state.visible, state.window_listeners
        );
        for (name, view) in [("vertical", state.vertical), ("horizontal", state.horizontal)] {
            if let Some(view) = view {
                let _ = writeln!(
                    out,
                    "{name:<11} thumb size={} offset={} track={}",
                    view.thumb_size, view.thumb_offset, view.track_size
                );
            }
        }
        out
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        if path.is_absolute() || path.has_root() {
            bail!("report path must be relative and must not start with a separator");
        }
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            bail!("report path cannot contain '..' or drive prefixes");
        }
        let payload = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        std::fs::write(path, payload)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn write_json<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        writer.write_all(payload.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}
