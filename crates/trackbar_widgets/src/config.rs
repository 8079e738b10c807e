//! Scroll container configuration
//!
//! Containers are configured in code or from a TOML table:
//!
//! ```toml
//! direction = "both"
//! auto_hide = true
//! class_name = "order-list"
//!
//! [timing]
//! auto_hide_delay_ms = 500
//! page_scroll_easing = "ease_out_quad"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use trackbar_animation::Easing;
use trackbar_core::ScrollDirection;

use crate::error::{Result, ScrollError};

/// Per-container settings, fixed for the container's lifetime
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrollContainerConfig {
    /// Axes the container scrolls along
    pub direction: ScrollDirection,
    /// Fade the bars out after scroll inactivity
    pub auto_hide: bool,
    /// Extra class appended to the root class list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub timing: TimingConfig,
}

/// Rate-limiting and animation timings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Quiet period after the last scroll before the bars hide
    pub auto_hide_delay_ms: u64,
    /// Length of the track-click page tween
    pub page_scroll_duration_ms: u64,
    /// Minimum spacing of content-update recomputations
    pub content_update_interval_ms: u64,
    pub page_scroll_easing: Easing,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            auto_hide_delay_ms: 333,
            page_scroll_duration_ms: 75,
            content_update_interval_ms: 100,
            page_scroll_easing: Easing::Linear,
        }
    }
}

impl TimingConfig {
    pub fn auto_hide_delay(&self) -> Duration {
        Duration::from_millis(self.auto_hide_delay_ms)
    }

    pub fn page_scroll_duration(&self) -> Duration {
        Duration::from_millis(self.page_scroll_duration_ms)
    }

    pub fn content_update_interval(&self) -> Duration {
        Duration::from_millis(self.content_update_interval_ms)
    }
}

impl ScrollContainerConfig {
    pub fn new(direction: ScrollDirection) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }

    /// Builder: enable or disable auto-hide
    pub fn auto_hide(mut self, enabled: bool) -> Self {
        self.auto_hide = enabled;
        self
    }

    /// Builder: set the caller's class name
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).map_err(|e| ScrollError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScrollError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ScrollError::Config(e.to_string()))
    }

    /// Reject settings the container cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.timing.content_update_interval_ms == 0 {
            return Err(ScrollError::Config(
                "timing.content_update_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScrollContainerConfig::default();
        assert_eq!(config.direction, ScrollDirection::Vertical);
        assert!(!config.auto_hide);
        assert_eq!(config.class_name, None);
        assert_eq!(config.timing.auto_hide_delay(), Duration::from_millis(333));
        assert_eq!(config.timing.page_scroll_duration(), Duration::from_millis(75));
        assert_eq!(config.timing.content_update_interval(), Duration::from_millis(100));
        assert_eq!(config.timing.page_scroll_easing, Easing::Linear);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = ScrollContainerConfig::from_toml_str(
            r#"
            direction = "both"
            auto_hide = true
            class_name = "order-list"

            [timing]
            auto_hide_delay_ms = 500
            page_scroll_easing = "ease_out_quad"
            "#,
        )
        .unwrap();

        assert_eq!(config.direction, ScrollDirection::Both);
        assert!(config.auto_hide);
        assert_eq!(config.class_name.as_deref(), Some("order-list"));
        assert_eq!(config.timing.auto_hide_delay_ms, 500);
        assert_eq!(config.timing.page_scroll_duration_ms, 75);
        assert_eq!(config.timing.page_scroll_easing, Easing::EaseOutQuad);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = ScrollContainerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ScrollContainerConfig::default());
    }

    #[test]
    fn test_rejects_unknown_direction() {
        let err = ScrollContainerConfig::from_toml_str(r#"direction = "diagonal""#).unwrap_err();
        assert!(matches!(err, ScrollError::Config(_)));
    }

    #[test]
    fn test_accepts_multiple_classes() {
        let config =
            ScrollContainerConfig::from_toml_str(r#"class_name = "order-list compact""#).unwrap();
        assert_eq!(config.class_name.as_deref(), Some("order-list compact"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ScrollContainerConfig::new(ScrollDirection::Horizontal)
            .auto_hide(true)
            .class_name("stats");
        let text = config.to_toml().unwrap();
        assert_eq!(ScrollContainerConfig::from_toml_str(&text).unwrap(), config);
    }
}
