// ABOUTME: Converter configuration: selectors, breakpoints, grouping, loop and navigation policy.
// ABOUTME: ConverterConfig is serde-loadable and validated before a GridConverter is built.

use serde::{Deserialize, Serialize};

use crate::breakpoints::{BreakpointTable, GroupPolicy};
use crate::dom::selectors::compile;
use crate::error::{CarouselError, Result};

fn default_debounce_ms() -> u64 {
    250
}

/// When prev/next affordances are shown at all.
///
/// The article and product grids historically disagree here, so the policy
/// is chosen per converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavVisibility {
    /// Hidden whenever `item_count <= slides_per_view`.
    #[default]
    ByCapacity,
    /// Always visible in loop mode; otherwise as `ByCapacity`.
    AlwaysInLoop,
}

/// Class names used for the produced carousel structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Marks a container as converted; its presence makes `transform` a no-op.
    pub initialized_class: String,
    pub container_class: String,
    pub wrapper_class: String,
    pub slide_class: String,
    pub prev_class: String,
    pub next_class: String,
    pub pagination_class: String,
    pub bullet_class: String,
    pub bullet_active_class: String,
    pub disabled_class: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            initialized_class: "carousel-initialized".to_string(),
            container_class: "swiper".to_string(),
            wrapper_class: "swiper-wrapper".to_string(),
            slide_class: "swiper-slide".to_string(),
            prev_class: "swiper-button-prev".to_string(),
            next_class: "swiper-button-next".to_string(),
            pagination_class: "swiper-pagination".to_string(),
            bullet_class: "swiper-pagination-bullet".to_string(),
            bullet_active_class: "swiper-pagination-bullet-active".to_string(),
            disabled_class: "swiper-button-disabled".to_string(),
        }
    }
}

/// Optional selectors for controls that already exist inside the container.
///
/// A `None` selector means the transformer injects that control itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub prev: Option<String>,
    pub next: Option<String>,
    pub pagination: Option<String>,
}

/// Configuration for one converter type (article grid, product grid, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Converter name; also the prefix of generated marker ids.
    pub name: String,
    pub container_selector: String,
    pub item_selector: String,
    pub breakpoints: BreakpointTable,
    #[serde(default)]
    pub group_policy: GroupPolicy,
    #[serde(default)]
    pub loop_mode: bool,
    #[serde(default)]
    pub nav_visibility: NavVisibility,
    #[serde(default)]
    pub controls: ControlsConfig,
    /// Elements inside the container hidden while the carousel is active.
    #[serde(default)]
    pub hide_selectors: Vec<String>,
    #[serde(default)]
    pub markers: MarkerConfig,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl ConverterConfig {
    /// Create a config with default markers, grouping and debounce.
    pub fn new(
        name: impl Into<String>,
        container_selector: impl Into<String>,
        item_selector: impl Into<String>,
        breakpoints: BreakpointTable,
    ) -> Self {
        Self {
            name: name.into(),
            container_selector: container_selector.into(),
            item_selector: item_selector.into(),
            breakpoints,
            group_policy: GroupPolicy::default(),
            loop_mode: false,
            nav_visibility: NavVisibility::default(),
            controls: ControlsConfig::default(),
            hide_selectors: Vec::new(),
            markers: MarkerConfig::default(),
            debounce_ms: default_debounce_ms(),
        }
    }

    /// Parse a config from JSON. The breakpoint table is validated while parsing.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ConverterConfig = serde_json::from_str(json).map_err(|e| {
            CarouselError::config("converter config", "parse json", Some(e.into()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Compile every selector, turning invalid ones into `ConfigError`.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CarouselError::config(
                "converter config",
                "validate",
                Some(anyhow::anyhow!("name must not be empty")),
            ));
        }
        compile(&self.container_selector, "compile container selector")?;
        compile(&self.item_selector, "compile item selector")?;
        for css in &self.hide_selectors {
            compile(css, "compile hide selector")?;
        }
        let controls = [
            &self.controls.prev,
            &self.controls.next,
            &self.controls.pagination,
        ];
        for css in controls.into_iter().flatten() {
            compile(css, "compile control selector")?;
        }
        Ok(())
    }

    pub fn group_policy(mut self, policy: GroupPolicy) -> Self {
        self.group_policy = policy;
        self
    }

    pub fn loop_mode(mut self, enabled: bool) -> Self {
        self.loop_mode = enabled;
        self
    }

    pub fn nav_visibility(mut self, visibility: NavVisibility) -> Self {
        self.nav_visibility = visibility;
        self
    }

    pub fn controls(mut self, controls: ControlsConfig) -> Self {
        self.controls = controls;
        self
    }

    pub fn hide(mut self, selector: impl Into<String>) -> Self {
        self.hide_selectors.push(selector.into());
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }
}
