// ABOUTME: Capability interface for the third-party carousel engine consumed by the converters.
// ABOUTME: Engines come from a factory and report lifecycle changes as queued events.

//! The carousel engine capability.
//!
//! The converters never render, animate or measure slides themselves. They
//! hand a transformed container to an engine obtained from an
//! [`EngineFactory`] and talk to it only through [`CarouselEngine`].
//!
//! Lifecycle hooks are modelled as queued [`EngineEvent`]s: the engine
//! records them and the converter drains them with
//! [`CarouselEngine::take_events`] after every call that can move the carousel.

pub mod headless;

use std::fmt;

use dom_query::NodeId;
use serde::Serialize;

use crate::breakpoints::ResolvedLayout;
use crate::error::Result;

/// Navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Prev,
    Next,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Prev => write!(f, "prev"),
            Direction::Next => write!(f, "next"),
        }
    }
}

/// Navigation elements handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTargets {
    pub prev: NodeId,
    pub next: NodeId,
}

/// Pagination element handed to the engine. Bullets inside it are rendered
/// by the converter's pagination controller, not by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationTarget {
    pub element: NodeId,
}

/// Engine construction parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Layout for the current viewport.
    pub layout: ResolvedLayout,
    /// Per-breakpoint layouts keyed by `min_width`, ascending.
    pub breakpoints: Vec<(u32, ResolvedLayout)>,
    pub navigation: Option<NavigationTargets>,
    pub pagination: Option<PaginationTarget>,
    pub loop_mode: bool,
}

/// The DOM the engine is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineMount {
    pub container: NodeId,
    pub wrapper: NodeId,
    pub slides: Vec<NodeId>,
}

/// Lifecycle notifications queued by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    Init,
    ActiveIndexChange { index: usize },
    BreakpointChange { min_width: u32 },
    Resize { width: u32 },
}

/// A live carousel bound to one container.
pub trait CarouselEngine: fmt::Debug {
    fn slide_count(&self) -> usize;
    fn active_index(&self) -> usize;
    fn is_at_start(&self) -> bool;
    fn is_at_end(&self) -> bool;
    /// `min_width` of the breakpoint currently applied, if any.
    fn current_breakpoint(&self) -> Option<u32>;
    fn loop_enabled(&self) -> bool;
    /// Layout parameters currently applied.
    fn layout(&self) -> ResolvedLayout;

    /// Moves one group in `direction`.
    fn advance(&mut self, direction: Direction);
    /// Moves to slide `index`.
    fn seek(&mut self, index: usize);
    /// Replaces layout parameters in place, without a destroy cycle.
    fn update(&mut self, layout: &ResolvedLayout);
    /// Viewport width changed; the engine applies its own breakpoint map.
    fn resize(&mut self, width: u32);

    /// Drains queued lifecycle events, oldest first.
    fn take_events(&mut self) -> Vec<EngineEvent>;
    /// Detaches the engine from the DOM. Further calls are no-ops.
    fn destroy(&mut self);
}

/// Obtains engines. One factory serves every container of a converter.
pub trait EngineFactory: fmt::Debug {
    /// Makes sure the engine is available. Called once, before the first mount.
    ///
    /// An `EngineUnavailable` error here switches the converter off for good.
    fn load(&self) -> Result<()> {
        Ok(())
    }

    fn create(&self, mount: &EngineMount, config: &EngineConfig) -> Result<Box<dyn CarouselEngine>>;
}
