// ABOUTME: DOM side of the converters: selector cache, node helpers, stylesheet and transformer.
// ABOUTME: Everything here works on a dom_query Document and stores only NodeIds between calls.

//! DOM utilities for converting grids into carousels.
//!
//! This module provides the reversible grid transformation, the shared
//! stylesheet injection and the small set of node helpers they rely on.

pub mod nodes;
pub mod selectors;
pub mod styles;
pub mod transformer;

pub use styles::STYLE_ID;
pub use transformer::{collect_items, DomTransformer, SkipReason, TransformOutcome, TransformedHandle};
