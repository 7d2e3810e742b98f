// ABOUTME: Viewport breakpoint table and layout resolution for the grid converters.
// ABOUTME: Resolves a viewport width to slides-per-view, spacing and group size.

//! Breakpoint tables and layout resolution.
//!
//! A [`BreakpointTable`] is an ordered width-to-layout mapping. Resolution picks
//! the entry with the greatest `min_width <= width`; the group size is then
//! derived by the converter's [`GroupPolicy`].
//!
//! Invariants checked when the table is built (never per lookup):
//! - exactly one entry has `min_width == 0`
//! - entries are unique by `min_width`
//! - `slides_per_view` is finite and positive, `space_between` finite and non-negative

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CarouselError, Result};

/// One row of a breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub min_width: u32,
    pub slides_per_view: f32,
    #[serde(default)]
    pub space_between: f32,
}

impl Breakpoint {
    pub fn new(min_width: u32, slides_per_view: f32, space_between: f32) -> Self {
        Self {
            min_width,
            slides_per_view,
            space_between,
        }
    }
}

/// Ordered breakpoint table, sorted ascending by `min_width`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Breakpoint>", into = "Vec<Breakpoint>")]
pub struct BreakpointTable {
    entries: Vec<Breakpoint>,
}

impl BreakpointTable {
    /// Builds a table, validating the invariants listed in the module docs.
    ///
    /// Source order is irrelevant; entries are sorted here.
    pub fn new(entries: impl IntoIterator<Item = Breakpoint>) -> Result<Self> {
        let mut entries: Vec<Breakpoint> = entries.into_iter().collect();

        let mut seen = HashSet::new();
        for bp in &entries {
            if !seen.insert(bp.min_width) {
                return Err(CarouselError::config(
                    "breakpoints",
                    "build table",
                    Some(anyhow::anyhow!("duplicate min_width {}", bp.min_width)),
                ));
            }
            if !bp.slides_per_view.is_finite() || bp.slides_per_view <= 0.0 {
                return Err(CarouselError::config(
                    "breakpoints",
                    "build table",
                    Some(anyhow::anyhow!(
                        "slides_per_view at {} must be positive, got {}",
                        bp.min_width,
                        bp.slides_per_view
                    )),
                ));
            }
            if !bp.space_between.is_finite() || bp.space_between < 0.0 {
                return Err(CarouselError::config(
                    "breakpoints",
                    "build table",
                    Some(anyhow::anyhow!(
                        "space_between at {} must be non-negative, got {}",
                        bp.min_width,
                        bp.space_between
                    )),
                ));
            }
        }
        if !seen.contains(&0) {
            return Err(CarouselError::config(
                "breakpoints",
                "build table",
                Some(anyhow::anyhow!("missing the zero-width default entry")),
            ));
        }

        entries.sort_by_key(|bp| bp.min_width);
        Ok(Self { entries })
    }

    /// Builds a table from `(min_width, slides_per_view, space_between)` triples.
    pub fn from_triples(rows: &[(u32, f32, f32)]) -> Result<Self> {
        Self::new(rows.iter().map(|&(w, spv, gap)| Breakpoint::new(w, spv, gap)))
    }

    /// Returns a copy of this table with `entry` added or replacing the row at the same width.
    pub fn with_entry(&self, entry: Breakpoint) -> Result<Self> {
        let rows = self
            .entries
            .iter()
            .copied()
            .filter(|bp| bp.min_width != entry.min_width)
            .chain(std::iter::once(entry));
        Self::new(rows)
    }

    /// Entries in ascending `min_width` order.
    pub fn entries(&self) -> &[Breakpoint] {
        &self.entries
    }

    /// Returns the entry with the greatest `min_width <= width`.
    pub fn lookup(&self, width: u32) -> &Breakpoint {
        // entries[0] is the zero-width default, guaranteed by `new`.
        self.entries
            .iter()
            .rev()
            .find(|bp| bp.min_width <= width)
            .unwrap_or(&self.entries[0])
    }

    /// Resolves `width` to a full layout under `policy`.
    pub fn resolve(&self, width: u32, policy: GroupPolicy) -> ResolvedLayout {
        ResolvedLayout::from_breakpoint(self.lookup(width), policy)
    }

    /// Every breakpoint resolved under `policy`, keyed by `min_width`.
    ///
    /// This is the `breakpoints` map handed to the carousel engine.
    pub fn resolved_map(&self, policy: GroupPolicy) -> Vec<(u32, ResolvedLayout)> {
        self.entries
            .iter()
            .map(|bp| (bp.min_width, ResolvedLayout::from_breakpoint(bp, policy)))
            .collect()
    }
}

impl TryFrom<Vec<Breakpoint>> for BreakpointTable {
    type Error = CarouselError;

    fn try_from(entries: Vec<Breakpoint>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<BreakpointTable> for Vec<Breakpoint> {
    fn from(table: BreakpointTable) -> Self {
        table.entries
    }
}

/// How the group size (slides advanced per navigation step) is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPolicy {
    /// Group size equals `floor(slides_per_view)`: one click advances a full page.
    #[default]
    MatchView,
    /// Fixed group size, clamped to `1..=floor(slides_per_view)`.
    Fixed(usize),
}

impl GroupPolicy {
    /// Group size for a given view size. Always at least 1.
    pub fn group_size(self, slides_per_view: f32) -> usize {
        let view = whole_slides(slides_per_view);
        match self {
            GroupPolicy::MatchView => view,
            GroupPolicy::Fixed(n) => n.clamp(1, view),
        }
    }
}

/// Number of whole slides visible at once, at least 1.
pub fn whole_slides(slides_per_view: f32) -> usize {
    (slides_per_view.floor() as usize).max(1)
}

/// Layout parameters resolved for one viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedLayout {
    /// The `min_width` of the breakpoint this layout came from.
    pub breakpoint: u32,
    pub slides_per_view: f32,
    pub space_between: f32,
    pub slides_per_group: usize,
}

impl ResolvedLayout {
    pub fn from_breakpoint(bp: &Breakpoint, policy: GroupPolicy) -> Self {
        Self {
            breakpoint: bp.min_width,
            slides_per_view: bp.slides_per_view,
            space_between: bp.space_between,
            slides_per_group: policy.group_size(bp.slides_per_view),
        }
    }

    /// True when `item_count` items all fit without sliding.
    pub fn fits(&self, item_count: usize) -> bool {
        item_count as f32 <= self.slides_per_view
    }

    /// True when `item_count` exceeds the view capacity.
    pub fn is_eligible(&self, item_count: usize) -> bool {
        !self.fits(item_count)
    }
}

/// Resolves `width` against `table`, deriving the group size from `policy`.
pub fn resolve(width: u32, table: &BreakpointTable, policy: GroupPolicy) -> ResolvedLayout {
    table.resolve(width, policy)
}
