//! Scenario runner that replays steps against the headless host.

use anyhow::{Context, Result};
use trackbar_core::events::event_types;
use trackbar_core::{Event, Point, TrackGeometry};
use trackbar_widgets::headless::HeadlessHost;
use trackbar_widgets::{ScrollContainer, ScrollContainerConfig, ScrollSurface};

use crate::assert::{
    evaluate_hovered, evaluate_listeners, evaluate_scroll, evaluate_state, evaluate_thumb,
    evaluate_visible, AssertionResult, Snapshot,
};
use crate::report::ScenarioReport;
use crate::scenario::{Scenario, ScenarioStep};

/// Final outcome of a scenario run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Passed { report: ScenarioReport },
    Failed { report: ScenarioReport },
}

impl RunOutcome {
    pub fn report(&self) -> &ScenarioReport {
        match self {
            RunOutcome::Passed { report } => report,
            RunOutcome::Failed { report } => report,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// Execute scenario JSON with its own container settings.
pub fn run_scenario(input: &str) -> Result<RunOutcome> {
    let scenario = Scenario::from_json(input)?;
    let config = scenario.container.clone().unwrap_or_default();
    run_loaded_scenario(&scenario, config)
}

/// Execute a pre-loaded scenario with the given container settings.
pub fn run_loaded_scenario(
    scenario: &Scenario,
    config: ScrollContainerConfig,
) -> Result<RunOutcome> {
    let surface = scenario.surface;
    for (name, extent) in [
        ("client_width", surface.client_width),
        ("client_height", surface.client_height),
        ("scroll_width", surface.scroll_width),
        ("scroll_height", surface.scroll_height),
    ] {
        anyhow::ensure!(
            extent >= 0.0 && extent.is_finite(),
            "Surface {name} must be a non-negative number, got {extent}"
        );
    }
    let host = HeadlessHost::new(
        surface.client_width,
        surface.client_height,
        surface.scroll_width,
        surface.scroll_height,
    );
    let container = ScrollContainer::with_geometry(
        config,
        TrackGeometry::new(scenario.scrollbar_width),
        host.surface.clone(),
        host.environment(),
    );
    host.connect(&container);
    container.mount().context("Failed to mount scroll container")?;
    tracing::info!(
        "running {} steps ({})",
        scenario.steps.len(),
        container.config().direction.name()
    );

    for (step_index, step) in scenario.steps.iter().enumerate() {
        tracing::debug!("step {step_index}: {step:?}");
        let result = run_step(&host, &container, step)
            .with_context(|| format!("Step {step_index} failed"))?;
        if let AssertionResult::Failed { message, .. } = result {
            let assertion = step.assertion_name().unwrap_or("step");
            tracing::info!("{assertion} failed at step {step_index}: {message}");
            let report = ScenarioReport::failed(
                assertion,
                step_index,
                message,
                host.scheduler.frame_count(),
                elapsed_ms(&host),
                host.surface.write_count(),
                Snapshot::capture(&host, &container),
            );
            return Ok(RunOutcome::Failed { report });
        }
    }

    Ok(RunOutcome::Passed {
        report: ScenarioReport::passed(
            scenario.steps.len(),
            host.scheduler.frame_count(),
            elapsed_ms(&host),
            host.surface.write_count(),
            Snapshot::capture(&host, &container),
        ),
    })
}

fn elapsed_ms(host: &HeadlessHost) -> u64 {
    u64::try_from(host.now().as_millis()).unwrap_or(u64::MAX)
}

fn run_step(
    host: &HeadlessHost,
    container: &ScrollContainer,
    step: &ScenarioStep,
) -> Result<AssertionResult> {
    match step {
        ScenarioStep::Wait { ms } => host.advance_ms(*ms),
        ScenarioStep::Tick { frames } => {
            for _ in 0..*frames {
                host.scheduler.next_frame();
            }
        }
        ScenarioStep::Scroll { top, left } => {
            if let Some(top) = top {
                host.surface.set_scroll_top(*top);
            }
            if let Some(left) = left {
                host.surface.set_scroll_left(*left);
            }
        }
        ScenarioStep::PointerDown { x, y } => {
            let mut event = Event::pointer(event_types::POINTER_DOWN, *x, *y);
            if !container.handle_event(&mut event) {
                tracing::debug!("pointer down at ({x}, {y}) missed the tracks");
            }
        }
        ScenarioStep::PointerMove { x, y } => {
            container.on_pointer_move(Point::new(*x, *y));
            host.window.pointer_move(*x, *y);
        }
        ScenarioStep::PointerUp { x, y } => {
            host.window.pointer_up(*x, *y);
        }
        ScenarioStep::PointerEnter => container.on_pointer_enter(),
        ScenarioStep::PointerLeave => container.on_pointer_leave(),
        ScenarioStep::Click => {
            container.handle_event(&mut Event::bare(event_types::CLICK));
        }
        ScenarioStep::KeyDown => {
            container.handle_event(&mut Event::bare(event_types::KEY_DOWN));
        }
        ScenarioStep::Resize { width, height } => host.resize(*width, *height),
        ScenarioStep::SetContent { width, height } => {
            host.surface.set_content_size(*width, *height);
        }
        ScenarioStep::ScrollTo { x, y, immediate } => {
            if *immediate {
                container.scroll_to_immediate(*x, *y)?;
            } else {
                container.scroll_to(*x, *y)?;
            }
        }
        ScenarioStep::Unmount => container.unmount(),
        assertion => {
            let snapshot = Snapshot::capture(host, container);
            return Ok(evaluate(assertion, &snapshot));
        }
    }
    Ok(AssertionResult::Passed)
}

fn evaluate(step: &ScenarioStep, snapshot: &Snapshot) -> AssertionResult {
    match step {
        ScenarioStep::AssertScroll { top, left } => evaluate_scroll(*top, *left, snapshot),
        ScenarioStep::AssertThumb { axis, size, offset } => {
            evaluate_thumb(*axis, *size, *offset, snapshot)
        }
        ScenarioStep::AssertVisible { visible } => evaluate_visible(*visible, snapshot),
        ScenarioStep::AssertState { state } => evaluate_state(state, snapshot),
        ScenarioStep::AssertHovered { axis } => evaluate_hovered(*axis, snapshot),
        ScenarioStep::AssertListeners { count } => evaluate_listeners(*count, snapshot),
        _ => AssertionResult::Passed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_THEN_DRAG: &str = r#"{
        "surface": { "client_width": 300, "client_height": 100, "scroll_width": 300, "scroll_height": 1000 },
        "steps": [
            { "type": "assert_thumb", "axis": "vertical", "size": 10, "offset": 0 },
            { "type": "pointer_down", "x": 295, "y": 60 },
            { "type": "assert_state", "state": "animating" },
            { "type": "wait", "ms": 100 },
            { "type": "assert_scroll", "top": 100 },
            { "type": "assert_thumb", "axis": "vertical", "offset": 10 },
            { "type": "pointer_down", "x": 295, "y": 15 },
            { "type": "assert_listeners", "count": 3 },
            { "type": "pointer_move", "x": 295, "y": 45 },
            { "type": "tick", "frames": 1 },
            { "type": "assert_scroll", "top": 400 },
            { "type": "pointer_up", "x": 295, "y": 45 },
            { "type": "assert_state", "state": "idle" },
            { "type": "assert_listeners", "count": 1 }
        ]
    }"#;

    #[test]
    fn test_page_then_drag_passes() {
        let outcome = run_scenario(PAGE_THEN_DRAG).unwrap();
        let report = outcome.report();
        assert!(!outcome.is_failed(), "{}", report.render_text());
        assert_eq!(report.steps_run, 14);
        assert_eq!(report.final_state.scroll_top, 400.0);
        assert!(report.elapsed_ms >= 100);
    }

    #[test]
    fn test_failed_assertion_stops_run() {
        let outcome = run_scenario(
            r#"{
                "surface": { "client_width": 300, "client_height": 100, "scroll_width": 300, "scroll_height": 1000 },
                "steps": [
                    { "type": "scroll", "top": 50 },
                    { "type": "assert_scroll", "top": 60 },
                    { "type": "scroll", "top": 60 }
                ]
            }"#,
        )
        .unwrap();

        assert!(outcome.is_failed());
        let report = outcome.report();
        assert_eq!(report.failed_step_index, Some(1));
        assert_eq!(report.assertion.as_deref(), Some("assert_scroll"));
        assert_eq!(report.final_state.scroll_top, 50.0);
    }

    #[test]
    fn test_scroll_after_unmount_is_an_error() {
        let err = run_scenario(
            r#"{
                "surface": { "client_width": 300, "client_height": 100, "scroll_width": 300, "scroll_height": 1000 },
                "steps": [
                    { "type": "unmount" },
                    { "type": "assert_listeners", "count": 0 },
                    { "type": "scroll_to", "x": 0, "y": 100 }
                ]
            }"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("Step 2 failed"));
    }

    #[test]
    fn test_negative_surface_is_rejected() {
        let err = run_scenario(
            r#"{
                "surface": { "client_width": 300, "client_height": -10, "scroll_width": 300, "scroll_height": 1000 },
                "steps": [{ "type": "tick", "frames": 1 }]
            }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("client_height"));
    }

    #[test]
    fn test_auto_hide_scenario() {
        let outcome = run_scenario(
            r#"{
                "surface": { "client_width": 300, "client_height": 100, "scroll_width": 300, "scroll_height": 1000 },
                "container": { "auto_hide": true },
                "steps": [
                    { "type": "assert_visible", "visible": false },
                    { "type": "scroll", "top": 10 },
                    { "type": "wait", "ms": 300 },
                    { "type": "scroll", "top": 20 },
                    { "type": "wait", "ms": 300 },
                    { "type": "assert_visible", "visible": true },
                    { "type": "wait", "ms": 40 },
                    { "type": "assert_visible", "visible": false }
                ]
            }"#,
        )
        .unwrap();
        assert!(!outcome.is_failed(), "{}", outcome.report().render_text());
    }
}
