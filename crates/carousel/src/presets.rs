// ABOUTME: Built-in converter presets for the storefront article and product grids.
// ABOUTME: Provides load_builtin_presets() and preset(name) over embedded JSON data.

//! Built-in converter presets.
//!
//! - `articles`: full-page grouping, no loop, navigation hidden by capacity.
//! - `products`: one slide per click, loop mode, navigation always shown in loop mode.

use std::collections::BTreeMap;

use crate::config::ConverterConfig;
use crate::error::{CarouselError, Result};

/// Embedded JSON keyed by preset name.
const BUILTIN_PRESETS_JSON: &str = include_str!("../data/converters.json");

/// Loads and validates every built-in preset.
pub fn load_builtin_presets() -> Result<BTreeMap<String, ConverterConfig>> {
    let presets: BTreeMap<String, ConverterConfig> = serde_json::from_str(BUILTIN_PRESETS_JSON)
        .map_err(|e| CarouselError::config("builtin presets", "parse json", Some(e.into())))?;
    for config in presets.values() {
        config.validate()?;
    }
    Ok(presets)
}

/// Names of the built-in presets, sorted.
pub fn preset_names() -> Result<Vec<String>> {
    Ok(load_builtin_presets()?.into_keys().collect())
}

/// The built-in preset called `name`.
pub fn preset(name: &str) -> Result<ConverterConfig> {
    load_builtin_presets()?.remove(name).ok_or_else(|| {
        CarouselError::config(
            name,
            "load preset",
            Some(anyhow::anyhow!("unknown preset")),
        )
    })
}
