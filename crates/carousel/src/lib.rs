// ABOUTME: Main library entry point for the storefront grid-to-carousel converters.
// ABOUTME: Re-exports the public API: GridConverter, ConverterBuilder, ConverterConfig, CarouselError, ErrorCode.

//! Storefront carousel - responsive grid-to-carousel conversion.
//!
//! A [`GridConverter`] watches one kind of grid on a page (article cards,
//! product cards). Whenever the viewport is narrow enough that the items no
//! longer fit, the grid is rewritten into a slide structure and bound to a
//! carousel engine; when they fit again the grid is restored exactly.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//!
//! use dom_query::Document;
//! use storefront_carousel::{presets, GridConverter};
//!
//! let doc = Document::from(
//!     r#"<div class="article-grid">
//!         <article class="article-card">1</article><article class="article-card">2</article>
//!         <article class="article-card">3</article><article class="article-card">4</article>
//!         <article class="article-card">5</article><article class="article-card">6</article>
//!     </div>"#,
//! );
//! let mut converter = GridConverter::builder(presets::preset("articles")?).build()?;
//! let report = converter.scan(&doc, 1300);
//! assert_eq!(report.transformed, 1);
//!
//! converter.tick(&doc, Instant::now());
//! assert_eq!(converter.registry().len(), 1);
//! # Ok::<(), storefront_carousel::CarouselError>(())
//! ```

pub mod breakpoints;
pub mod config;
pub mod converter;
pub mod dom;
pub mod engine;
pub mod error;
pub mod navigation;
pub mod pagination;
pub mod presets;
pub mod registry;
pub mod resize;
pub mod schedule;

pub use crate::breakpoints::{resolve, Breakpoint, BreakpointTable, GroupPolicy, ResolvedLayout};
pub use crate::config::{ControlsConfig, ConverterConfig, MarkerConfig, NavVisibility};
pub use crate::converter::{ClickOutcome, ConverterBuilder, GridConverter, ScanReport};
pub use crate::dom::{DomTransformer, SkipReason, TransformOutcome, TransformedHandle};
pub use crate::engine::headless::{HeadlessEngine, HeadlessFactory};
pub use crate::engine::{CarouselEngine, Direction, EngineConfig, EngineEvent, EngineFactory};
pub use crate::error::{CarouselError, ErrorCode, Result};
pub use crate::navigation::{NavState, NavigationController};
pub use crate::pagination::PaginationController;
pub use crate::registry::{InstanceId, InstanceSummary, SliderInstance, SliderInstanceRegistry};
pub use crate::resize::{Debouncer, ResizeCoordinator, ResizeDecision};
