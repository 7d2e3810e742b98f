// ABOUTME: Reversible conversion of a static grid container into a carousel slide structure.
// ABOUTME: Wraps items in a slide wrapper, adds controls, and undoes exactly what it changed.

//! Grid-to-carousel DOM transformation.
//!
//! `transform` turns
//!
//! ```text
//! <div class="article-grid"> <article/> <article/> ... </div>
//! ```
//!
//! into
//!
//! ```text
//! <div class="article-grid swiper carousel-initialized" id="article-slider-1">
//!   <div class="swiper-wrapper" id="article-slider-1-wrapper"> <article class="swiper-slide"/> ... </div>
//!   <button class="swiper-button-prev"/> <button class="swiper-button-next"/> <div class="swiper-pagination"/>
//! </div>
//! ```
//!
//! Controls are siblings of the wrapper, never inside the sliding area.
//!
//! `revert` undoes every mutation recorded in the [`TransformedHandle`]:
//! items go back to their original parent and position (node identity is
//! kept, they are moved, never cloned), injected nodes are removed and every
//! touched attribute gets its previous value back.

use dom_query::{Document, NodeId, NodeRef};

use crate::breakpoints::ResolvedLayout;
use crate::config::{ControlsConfig, ConverterConfig, MarkerConfig};
use crate::dom::nodes::{self, insert_after, is_attached, AttrSnapshot};
use crate::dom::selectors::{compile, get_or_compile, select_within};
use crate::dom::styles::ensure_stylesheet;
use crate::error::{CarouselError, Result};

/// Attributes the controllers may change on a pre-existing control.
const CONTROL_ATTRS: &[&str] = &["class", "disabled", "hidden", "aria-disabled"];

/// Why a container was left untouched. Expected outcomes, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The container already carries the initialized marker.
    AlreadyInitialized,
    /// The container or one of its items is no longer in the document.
    Detached,
    NoItems,
    /// Every item is visible at once; no carousel needed.
    FitsViewport,
}

/// Result of a transform attempt.
#[derive(Debug)]
pub enum TransformOutcome {
    Transformed(TransformedHandle),
    Skipped(SkipReason),
}

/// Where an item lived before it was moved into the wrapper.
#[derive(Debug, Clone, Copy)]
struct ItemOrigin {
    item: NodeId,
    parent: NodeId,
    next_sibling: Option<NodeId>,
}

/// Everything needed to undo one transform.
#[derive(Debug)]
pub struct TransformedHandle {
    pub container: NodeId,
    pub wrapper: NodeId,
    pub prev: NodeId,
    pub next: NodeId,
    pub pagination: NodeId,
    origins: Vec<ItemOrigin>,
    /// Nodes created by the transform, removed on revert.
    injected: Vec<NodeId>,
    /// Attribute state before the transform, restored in reverse order.
    snapshots: Vec<AttrSnapshot>,
}

impl TransformedHandle {
    /// Item ids in their original order.
    pub fn items(&self) -> Vec<NodeId> {
        self.origins.iter().map(|o| o.item).collect()
    }

    pub fn item_count(&self) -> usize {
        self.origins.len()
    }
}

#[derive(Debug, Clone, Copy)]
enum ControlKind {
    Prev,
    Next,
    Pagination,
}

/// Controls resolved before any mutation happens.
struct ResolvedControls<'a> {
    prev: Option<NodeRef<'a>>,
    next: Option<NodeRef<'a>>,
    pagination: Option<NodeRef<'a>>,
}

/// Converts containers into carousel structure and back.
#[derive(Debug, Clone)]
pub struct DomTransformer {
    markers: MarkerConfig,
    controls: ControlsConfig,
    hide_selectors: Vec<String>,
}

impl DomTransformer {
    pub fn new(markers: MarkerConfig, controls: ControlsConfig, hide_selectors: Vec<String>) -> Self {
        Self {
            markers,
            controls,
            hide_selectors,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(
            config.markers.clone(),
            config.controls.clone(),
            config.hide_selectors.clone(),
        )
    }

    pub fn markers(&self) -> &MarkerConfig {
        &self.markers
    }

    /// True when `container` carries the initialized marker.
    pub fn is_marked(&self, doc: &Document, container: NodeId) -> bool {
        nodes::node(doc, container)
            .map(|c| c.has_class(&self.markers.initialized_class))
            .unwrap_or(false)
    }

    /// Converts `container` unless it is already converted, gone, empty, or everything fits.
    ///
    /// `marker_id` becomes the container id (when it has none) and the prefix of the wrapper id.
    /// A control selector that matches nothing is a `ConfigError`, raised before
    /// the DOM is touched.
    pub fn transform(
        &self,
        doc: &Document,
        container: NodeId,
        items: &[NodeId],
        layout: &ResolvedLayout,
        marker_id: &str,
    ) -> Result<TransformOutcome> {
        let Some(container_node) = nodes::node(doc, container) else {
            return Ok(TransformOutcome::Skipped(SkipReason::Detached));
        };
        if container_node.has_class(&self.markers.initialized_class) {
            return Ok(TransformOutcome::Skipped(SkipReason::AlreadyInitialized));
        }
        if !is_attached(&container_node) {
            return Ok(TransformOutcome::Skipped(SkipReason::Detached));
        }
        if items.is_empty() {
            return Ok(TransformOutcome::Skipped(SkipReason::NoItems));
        }
        let mut item_nodes = Vec::with_capacity(items.len());
        for id in items {
            match nodes::attached(doc, *id) {
                Some(n) => item_nodes.push(n),
                None => return Ok(TransformOutcome::Skipped(SkipReason::Detached)),
            }
        }
        if layout.fits(item_nodes.len()) {
            return Ok(TransformOutcome::Skipped(SkipReason::FitsViewport));
        }

        let existing = self.resolve_controls(&container_node)?;
        let hidden = self.resolve_hidden(&container_node)?;

        let mut snapshots = Vec::new();
        let mut injected = Vec::new();

        snapshots.push(AttrSnapshot::capture(&container_node, &["id", "class"]));
        container_node.add_class(&self.markers.container_class);
        container_node.add_class(&self.markers.initialized_class);
        if container_node.attr("id").is_none() {
            container_node.set_attr("id", marker_id);
        }

        let origins: Vec<ItemOrigin> = item_nodes
            .iter()
            .filter_map(|item| {
                item.parent().map(|parent| ItemOrigin {
                    item: item.id,
                    parent: parent.id,
                    next_sibling: item.next_sibling().map(|n| n.id),
                })
            })
            .collect();

        let wrapper = doc.tree.new_element("div");
        wrapper.set_attr("class", &self.markers.wrapper_class);
        wrapper.set_attr("id", &format!("{}-wrapper", marker_id));
        item_nodes[0].insert_before(&wrapper);
        injected.push(wrapper.id);

        for item in &item_nodes {
            snapshots.push(AttrSnapshot::capture(item, &["class"]));
            item.add_class(&self.markers.slide_class);
            item.remove_from_parent();
            wrapper.append_child(item);
        }

        // Injected controls follow the wrapper in prev, next, pagination order.
        let mut anchor = wrapper.clone();
        let mut control_ids = [wrapper.id; 3];
        let slots = [
            (existing.prev, ControlKind::Prev),
            (existing.next, ControlKind::Next),
            (existing.pagination, ControlKind::Pagination),
        ];
        for (slot, (found, kind)) in control_ids.iter_mut().zip(slots) {
            *slot = match found {
                Some(node) => {
                    snapshots.push(AttrSnapshot::capture(&node, CONTROL_ATTRS));
                    node.id
                }
                None => {
                    let created = self.build_control(doc, kind);
                    insert_after(&anchor, &created);
                    injected.push(created.id);
                    let id = created.id;
                    anchor = created;
                    id
                }
            };
        }
        let [prev, next, pagination] = control_ids;

        for node in &hidden {
            snapshots.push(AttrSnapshot::capture(node, &["hidden"]));
            node.set_attr("hidden", "");
        }

        ensure_stylesheet(doc);

        Ok(TransformOutcome::Transformed(TransformedHandle {
            container,
            wrapper: wrapper.id,
            prev,
            next,
            pagination,
            origins,
            injected,
            snapshots,
        }))
    }

    /// Undoes `handle`. Safe on a container that has since left the document.
    pub fn revert(&self, doc: &Document, handle: TransformedHandle) {
        // Restore last item first so a recorded next sibling is already back in place.
        for origin in handle.origins.iter().rev() {
            let (Some(item), Some(parent)) =
                (nodes::node(doc, origin.item), nodes::node(doc, origin.parent))
            else {
                continue;
            };
            item.remove_from_parent();
            let anchor = origin
                .next_sibling
                .and_then(|id| nodes::node(doc, id))
                .filter(|n| n.parent().map(|p| p.id) == Some(parent.id));
            match anchor {
                Some(next) => next.insert_before(&item),
                None => parent.append_child(&item),
            }
        }

        for id in &handle.injected {
            if let Some(node) = nodes::node(doc, *id) {
                node.remove_from_parent();
            }
        }

        for snapshot in handle.snapshots.iter().rev() {
            snapshot.restore(doc);
        }
    }

    fn build_control<'a>(&self, doc: &'a Document, kind: ControlKind) -> NodeRef<'a> {
        let (tag, class, label) = match kind {
            ControlKind::Prev => ("button", &self.markers.prev_class, Some("Previous slide")),
            ControlKind::Next => ("button", &self.markers.next_class, Some("Next slide")),
            ControlKind::Pagination => ("div", &self.markers.pagination_class, None),
        };
        let el = doc.tree.new_element(tag);
        if tag == "button" {
            el.set_attr("type", "button");
        }
        el.set_attr("class", class);
        if let Some(label) = label {
            el.set_attr("aria-label", label);
        }
        el
    }

    fn resolve_controls<'a>(&self, container: &NodeRef<'a>) -> Result<ResolvedControls<'a>> {
        let find = |css: &Option<String>| -> Result<Option<NodeRef<'a>>> {
            let Some(css) = css else {
                return Ok(None);
            };
            let matcher = compile(css, "resolve control")?;
            match select_within(container, &matcher).into_iter().next() {
                Some(node) => Ok(Some(node)),
                None => Err(CarouselError::config(
                    css.as_str(),
                    "resolve control",
                    Some(anyhow::anyhow!("no matching element inside the container")),
                )),
            }
        };
        Ok(ResolvedControls {
            prev: find(&self.controls.prev)?,
            next: find(&self.controls.next)?,
            pagination: find(&self.controls.pagination)?,
        })
    }

    fn resolve_hidden<'a>(&self, container: &NodeRef<'a>) -> Result<Vec<NodeRef<'a>>> {
        let mut found = Vec::new();
        for css in &self.hide_selectors {
            let matcher = compile(css, "compile hide selector")?;
            found.extend(select_within(container, &matcher));
        }
        Ok(found)
    }
}

/// Item nodes inside `container` matching `item_selector`, in document order.
pub fn collect_items(doc: &Document, container: NodeId, item_selector: &str) -> Vec<NodeId> {
    let (Some(node), Some(matcher)) = (nodes::node(doc, container), get_or_compile(item_selector))
    else {
        return Vec::new();
    };
    select_within(&node, &matcher).iter().map(|n| n.id).collect()
}
