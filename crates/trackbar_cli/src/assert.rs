//! Assertion helpers for scenario checks.

use serde::Serialize;
use trackbar_core::Axis;
use trackbar_widgets::{AxisView, ScrollContainer, WindowEvents};
use trackbar_widgets::headless::HeadlessHost;

/// Largest difference still treated as equal, in pixels
const TOLERANCE: f32 = 0.01;

/// Observable state of the host and container at one point in a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub scroll_top: f32,
    pub scroll_left: f32,
    pub state: &'static str,
    pub visible: bool,
    pub class_name: String,
    pub vertical: Option<AxisView>,
    pub horizontal: Option<AxisView>,
    pub hovered_axis: Option<Axis>,
    pub window_listeners: usize,
}

impl Snapshot {
    pub fn capture(host: &HeadlessHost, container: &ScrollContainer) -> Self {
        Self {
            scroll_top: host.surface.scroll_top(),
            scroll_left: host.surface.scroll_left(),
            state: container.state().name(),
            visible: container.is_visible(),
            class_name: container.class_list().join(" "),
            vertical: container.axis_view(Axis::Vertical),
            horizontal: container.axis_view(Axis::Horizontal),
            hovered_axis: container.hovered_axis(),
            window_listeners: host.window.listener_count(),
        }
    }

    fn axis(&self, axis: Axis) -> Option<&AxisView> {
        match axis {
            Axis::Vertical => self.vertical.as_ref(),
            Axis::Horizontal => self.horizontal.as_ref(),
        }
    }
}

/// Assertion result with structured failure details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionResult {
    Passed,
    Failed { code: String, message: String },
}

impl AssertionResult {
    fn failed(code: &str, message: String) -> Self {
        AssertionResult::Failed {
            code: code.to_string(),
            message,
        }
    }
}

fn close(actual: f32, expected: f32) -> bool {
    (actual - expected).abs() <= TOLERANCE
}

fn check_value(name: &str, actual: f32, expected: Option<f32>) -> Option<String> {
    match expected {
        Some(expected) if !close(actual, expected) => {
            Some(format!("{name}: expected {expected}, got {actual}"))
        }
        _ => None,
    }
}

pub fn evaluate_scroll(
    top: Option<f32>,
    left: Option<f32>,
    snapshot: &Snapshot,
) -> AssertionResult {
    let mismatch = check_value("scroll_top", snapshot.scroll_top, top)
        .or_else(|| check_value("scroll_left", snapshot.scroll_left, left));
    match mismatch {
        Some(message) => AssertionResult::failed("scroll_mismatch", message),
        None => AssertionResult::Passed,
    }
}

pub fn evaluate_thumb(
    axis: Axis,
    size: Option<f32>,
    offset: Option<f32>,
    snapshot: &Snapshot,
) -> AssertionResult {
    let Some(view) = snapshot.axis(axis) else {
        return AssertionResult::failed(
            "inactive_axis",
            format!("{} axis has no track", axis.name()),
        );
    };
    let mismatch = check_value("thumb_size", view.thumb_size, size)
        .or_else(|| check_value("thumb_offset", view.thumb_offset, offset));
    match mismatch {
        Some(message) => {
            AssertionResult::failed("thumb_mismatch", format!("{}: {message}", axis.name()))
        }
        None => AssertionResult::Passed,
    }
}

pub fn evaluate_visible(expected: bool, snapshot: &Snapshot) -> AssertionResult {
    if snapshot.visible == expected {
        AssertionResult::Passed
    } else {
        AssertionResult::failed(
            "visibility_mismatch",
            format!("expected visible={expected}, got {}", snapshot.visible),
        )
    }
}

pub fn evaluate_state(expected: &str, snapshot: &Snapshot) -> AssertionResult {
    if snapshot.state == expected {
        AssertionResult::Passed
    } else {
        AssertionResult::failed(
            "state_mismatch",
            format!("expected state '{expected}', got '{}'", snapshot.state),
        )
    }
}

pub fn evaluate_hovered(expected: Option<Axis>, snapshot: &Snapshot) -> AssertionResult {
    if snapshot.hovered_axis == expected {
        AssertionResult::Passed
    } else {
        let name = |axis: Option<Axis>| axis.map_or("none", |axis| axis.name());
        AssertionResult::failed(
            "hover_mismatch",
            format!(
                "expected hovered axis {}, got {}",
                name(expected),
                name(snapshot.hovered_axis)
            ),
        )
    }
}

pub fn evaluate_listeners(expected: usize, snapshot: &Snapshot) -> AssertionResult {
    if snapshot.window_listeners == expected {
        AssertionResult::Passed
    } else {
        AssertionResult::failed(
            "listener_leak",
            format!(
                "expected {expected} window listeners, got {}",
                snapshot.window_listeners
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            scroll_top: 100.0,
            scroll_left: 0.0,
            state: "idle",
            visible: true,
            class_name: "scroll-container scroll-container__vertical".to_string(),
            vertical: Some(AxisView {
                thumb_size: 10.0,
                thumb_offset: 10.0,
                track_size: 100.0,
                ..Default::default()
            }),
            horizontal: None,
            hovered_axis: None,
            window_listeners: 1,
        }
    }

    #[test]
    fn test_scroll_within_tolerance() {
        assert_eq!(
            evaluate_scroll(Some(100.001), None, &snapshot()),
            AssertionResult::Passed
        );
        let AssertionResult::Failed { code, message } =
            evaluate_scroll(Some(100.0), Some(40.0), &snapshot())
        else {
            panic!("expected failure");
        };
        assert_eq!(code, "scroll_mismatch");
        assert!(message.starts_with("scroll_left"));
    }

    #[test]
    fn test_thumb_on_inactive_axis() {
        assert!(matches!(
            evaluate_thumb(Axis::Horizontal, Some(1.0), None, &snapshot()),
            AssertionResult::Failed { ref code, .. } if code == "inactive_axis"
        ));
        assert_eq!(
            evaluate_thumb(Axis::Vertical, Some(10.0), Some(10.0), &snapshot()),
            AssertionResult::Passed
        );
    }

    #[test]
    fn test_state_and_listeners() {
        assert_eq!(evaluate_state("idle", &snapshot()), AssertionResult::Passed);
        assert!(matches!(
            evaluate_state("dragging", &snapshot()),
            AssertionResult::Failed { .. }
        ));
        assert!(matches!(
            evaluate_listeners(0, &snapshot()),
            AssertionResult::Failed { ref code, .. } if code == "listener_leak"
        ));
        assert_eq!(evaluate_hovered(None, &snapshot()), AssertionResult::Passed);
        assert_eq!(evaluate_visible(true, &snapshot()), AssertionResult::Passed);
    }
}
