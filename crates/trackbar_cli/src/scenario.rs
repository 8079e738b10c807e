//! Scenario definition for headless interaction runs.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use trackbar_core::Axis;
use trackbar_widgets::ScrollContainerConfig;

/// Host layout, optional container settings and the steps to replay.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub surface: SurfaceSpec,
    /// Native scrollbar width the container hides and reserves
    #[serde(default)]
    pub scrollbar_width: f32,
    /// Inline container settings; a `--config` file takes precedence
    #[serde(default)]
    pub container: Option<ScrollContainerConfig>,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("Failed to parse scenario")
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid scenario {}", path.display()))
    }
}

/// Size of the scrollable content region and its content
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SurfaceSpec {
    pub client_width: f32,
    pub client_height: f32,
    pub scroll_width: f32,
    pub scroll_height: f32,
}

/// One scripted input or check.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Advance virtual time
    Wait { ms: u64 },
    /// Advance to the next `frames` frame boundaries
    Tick { frames: u32 },
    /// Native scroll of the content, as from a wheel or touchpad
    Scroll {
        #[serde(default)]
        top: Option<f32>,
        #[serde(default)]
        left: Option<f32>,
    },
    PointerDown { x: f32, y: f32 },
    /// Moves over the container and the window
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    PointerEnter,
    PointerLeave,
    Click,
    KeyDown,
    /// Resize the visible region and fire a window resize
    Resize { width: f32, height: f32 },
    /// Change the content extent without notifying the container
    SetContent { width: f32, height: f32 },
    ScrollTo {
        x: f32,
        y: f32,
        #[serde(default)]
        immediate: bool,
    },
    Unmount,
    AssertScroll {
        #[serde(default)]
        top: Option<f32>,
        #[serde(default)]
        left: Option<f32>,
    },
    AssertThumb {
        axis: Axis,
        #[serde(default)]
        size: Option<f32>,
        #[serde(default)]
        offset: Option<f32>,
    },
    AssertVisible { visible: bool },
    /// `idle`, `dragging` or `animating`
    AssertState { state: String },
    AssertHovered { axis: Option<Axis> },
    AssertListeners { count: usize },
}

impl ScenarioStep {
    /// Assertion name for reports, `None` for input steps
    pub fn assertion_name(&self) -> Option<&'static str> {
        match self {
            ScenarioStep::AssertScroll { .. } => Some("assert_scroll"),
            ScenarioStep::AssertThumb { .. } => Some("assert_thumb"),
            ScenarioStep::AssertVisible { .. } => Some("assert_visible"),
            ScenarioStep::AssertState { .. } => Some("assert_state"),
            ScenarioStep::AssertHovered { .. } => Some("assert_hovered"),
            ScenarioStep::AssertListeners { .. } => Some("assert_listeners"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackbar_core::ScrollDirection;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::from_json(
            r#"{
                "surface": { "client_width": 300, "client_height": 100, "scroll_width": 300, "scroll_height": 1000 },
                "container": { "direction": "both", "auto_hide": true },
                "steps": [
                    { "type": "pointer_down", "x": 295, "y": 60 },
                    { "type": "wait", "ms": 100 },
                    { "type": "assert_scroll", "top": 100 },
                    { "type": "assert_thumb", "axis": "vertical", "offset": 10 },
                    { "type": "assert_hovered", "axis": null },
                    { "type": "pointer_leave" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.scrollbar_width, 0.0);
        let container = scenario.container.unwrap();
        assert_eq!(container.direction, ScrollDirection::Both);
        assert!(container.auto_hide);
        assert_eq!(scenario.steps.len(), 6);
        assert!(matches!(
            scenario.steps[2],
            ScenarioStep::AssertScroll {
                top: Some(_),
                left: None
            }
        ));
        assert!(matches!(
            scenario.steps[3],
            ScenarioStep::AssertThumb {
                axis: Axis::Vertical,
                size: None,
                offset: Some(_)
            }
        ));
        assert_eq!(scenario.steps[4].assertion_name(), Some("assert_hovered"));
        assert_eq!(scenario.steps[5].assertion_name(), None);
    }

    #[test]
    fn test_rejects_unknown_step() {
        let err = Scenario::from_json(
            r#"{
                "surface": { "client_width": 1, "client_height": 1, "scroll_width": 1, "scroll_height": 1 },
                "steps": [{ "type": "fling" }]
            }"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("fling"));
    }
}
