// ABOUTME: Live carousel instances and the registry that aggregates them per converter.
// ABOUTME: Binds a transformed container to its engine, navigation and pagination controllers.

use std::collections::BTreeMap;
use std::fmt;

use dom_query::{Document, NodeId};
use serde::Serialize;
use tracing::debug;

use crate::breakpoints::{BreakpointTable, GroupPolicy, ResolvedLayout};
use crate::config::{ConverterConfig, NavVisibility};
use crate::dom::{DomTransformer, TransformedHandle};
use crate::engine::{
    CarouselEngine, Direction, EngineConfig, EngineEvent, EngineMount, NavigationTargets,
    PaginationTarget,
};
use crate::navigation::{nav_visible, NavState, NavigationController};
use crate::pagination::PaginationController;

/// Registry key of one live carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InstanceId(u64);

impl InstanceId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serializable view of one instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceSummary {
    pub id: InstanceId,
    pub marker_id: String,
    pub item_count: usize,
    pub mounted: bool,
    pub layout: ResolvedLayout,
    pub active_index: usize,
    pub nav_state: NavState,
    pub nav_visible: bool,
    pub pagination_groups: Vec<usize>,
    pub active_group: usize,
}

/// One transformed container and everything bound to it.
///
/// An instance exists only while its container is transformed. It starts
/// `busy` with no engine; the converter attaches one on the next tick, once
/// the new structure is in place.
#[derive(Debug)]
pub struct SliderInstance {
    id: InstanceId,
    marker_id: String,
    handle: TransformedHandle,
    table: BreakpointTable,
    policy: GroupPolicy,
    layout: ResolvedLayout,
    loop_mode: bool,
    nav_visibility: NavVisibility,
    engine: Option<Box<dyn CarouselEngine>>,
    busy: bool,
    navigation: NavigationController,
    pagination: PaginationController,
}

impl SliderInstance {
    pub fn new(
        id: InstanceId,
        marker_id: impl Into<String>,
        handle: TransformedHandle,
        layout: ResolvedLayout,
        config: &ConverterConfig,
    ) -> Self {
        let markers = &config.markers;
        let navigation =
            NavigationController::new(handle.prev, handle.next, markers.disabled_class.clone());
        let pagination = PaginationController::new(
            handle.pagination,
            markers.bullet_class.clone(),
            markers.bullet_active_class.clone(),
        );
        Self {
            id,
            marker_id: marker_id.into(),
            handle,
            table: config.breakpoints.clone(),
            policy: config.group_policy,
            layout,
            loop_mode: config.loop_mode,
            nav_visibility: config.nav_visibility,
            engine: None,
            busy: true,
            navigation,
            pagination,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn marker_id(&self) -> &str {
        &self.marker_id
    }

    pub fn container(&self) -> NodeId {
        self.handle.container
    }

    pub fn wrapper(&self) -> NodeId {
        self.handle.wrapper
    }

    pub fn prev_control(&self) -> NodeId {
        self.handle.prev
    }

    pub fn next_control(&self) -> NodeId {
        self.handle.next
    }

    pub fn pagination_element(&self) -> NodeId {
        self.handle.pagination
    }

    /// Bullet nodes in group order.
    pub fn bullets(&self) -> &[NodeId] {
        self.pagination.bullets()
    }

    pub fn item_count(&self) -> usize {
        self.handle.item_count()
    }

    pub fn layout(&self) -> ResolvedLayout {
        self.layout
    }

    /// A mount is pending and structural work on this container must wait.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_mounted(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Option<&dyn CarouselEngine> {
        self.engine.as_deref()
    }

    pub fn active_index(&self) -> usize {
        self.engine.as_ref().map(|e| e.active_index()).unwrap_or(0)
    }

    pub fn nav_state(&self) -> NavState {
        self.navigation.state()
    }

    pub fn nav_is_visible(&self) -> bool {
        self.navigation.is_visible()
    }

    pub fn pagination_groups(&self) -> &[usize] {
        self.pagination.groups()
    }

    pub fn active_group(&self) -> usize {
        self.pagination.active_group()
    }

    /// True when `node` is one of this instance's navigation or pagination nodes.
    pub fn owns_control(&self, doc: &Document, node: NodeId) -> bool {
        self.navigation.direction_of(node).is_some()
            || self.pagination.seek_target(doc, node).is_some()
    }

    fn loop_enabled(&self) -> bool {
        self.engine
            .as_ref()
            .map(|e| e.loop_enabled())
            .unwrap_or(self.loop_mode)
    }

    /// What the engine is handed on mount.
    pub fn mount_request(&self) -> (EngineMount, EngineConfig) {
        let mount = EngineMount {
            container: self.handle.container,
            wrapper: self.handle.wrapper,
            slides: self.handle.items(),
        };
        let config = EngineConfig {
            layout: self.layout,
            breakpoints: self.table.resolved_map(self.policy),
            navigation: Some(NavigationTargets {
                prev: self.handle.prev,
                next: self.handle.next,
            }),
            pagination: Some(PaginationTarget {
                element: self.handle.pagination,
            }),
            loop_mode: self.loop_mode,
        };
        (mount, config)
    }

    /// Binds the engine, builds pagination and syncs controls from the engine's state.
    pub fn attach(&mut self, doc: &Document, engine: Box<dyn CarouselEngine>) {
        self.engine = Some(engine);
        self.busy = false;
        self.pagination
            .rebuild(doc, self.item_count(), self.layout.slides_per_group);
        self.pump(doc);
    }

    /// Drains engine events and re-synchronises controls. Returns how many were handled.
    pub fn pump(&mut self, doc: &Document) -> usize {
        let events = match self.engine.as_mut() {
            Some(engine) => engine.take_events(),
            None => return 0,
        };
        for event in &events {
            if let EngineEvent::BreakpointChange { min_width } = event {
                self.on_breakpoint_change(doc, *min_width);
            }
        }
        self.sync(doc);
        events.len()
    }

    /// Re-applies the grouping policy for the breakpoint the engine switched to.
    fn on_breakpoint_change(&mut self, doc: &Document, min_width: u32) {
        let layout = self.table.resolve(min_width, self.policy);
        if let Some(engine) = self.engine.as_mut() {
            if engine.layout() != layout {
                engine.update(&layout);
            }
        }
        self.apply_layout(doc, layout);
    }

    /// Updates layout parameters in place, without a destroy/revert cycle.
    pub fn reconfigure(&mut self, doc: &Document, layout: ResolvedLayout) {
        if let Some(engine) = self.engine.as_mut() {
            engine.update(&layout);
        }
        self.apply_layout(doc, layout);
        self.pump(doc);
    }

    fn apply_layout(&mut self, doc: &Document, layout: ResolvedLayout) {
        let group_changed = layout.slides_per_group != self.pagination.group_size()
            || self.pagination.groups().is_empty();
        self.layout = layout;
        if group_changed && self.engine.is_some() {
            self.pagination
                .rebuild(doc, self.item_count(), layout.slides_per_group);
        }
    }

    /// Forwards a raw viewport width to the engine.
    pub fn resize_engine(&mut self, doc: &Document, width: u32) {
        if let Some(engine) = self.engine.as_mut() {
            engine.resize(width);
        }
        self.pump(doc);
    }

    /// Advances when the affordance is enabled. Returns whether the engine was asked to move.
    pub fn advance(&mut self, doc: &Document, direction: Direction) -> bool {
        let Some(direction) = self.navigation.click(direction) else {
            return false;
        };
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        engine.advance(direction);
        self.pump(doc);
        true
    }

    /// Seeks to the group start of the bullet `node`, if it is one of ours.
    pub fn seek_bullet(&mut self, doc: &Document, node: NodeId) -> Option<usize> {
        let target = self.pagination.seek_target(doc, node)?;
        let engine = self.engine.as_mut()?;
        engine.seek(target);
        self.pump(doc);
        Some(target)
    }

    /// The direction of a navigation node owned by this instance.
    pub fn direction_of(&self, node: NodeId) -> Option<Direction> {
        self.navigation.direction_of(node)
    }

    fn sync(&mut self, doc: &Document) {
        let loop_mode = self.loop_enabled();
        let (active_index, at_end) = match self.engine.as_ref() {
            Some(engine) => (engine.active_index(), engine.is_at_end()),
            None => (0, false),
        };
        self.pagination.set_active(doc, active_index, at_end);
        let visible = nav_visible(self.item_count(), &self.layout, loop_mode, self.nav_visibility);
        self.navigation.sync(
            doc,
            self.pagination.active_group(),
            self.pagination.groups().len(),
            loop_mode,
            visible,
        );
    }

    /// Destroys the engine binding and reverts the container.
    pub fn teardown(mut self, doc: &Document, transformer: &DomTransformer) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
        debug!(instance = %self.id, marker = %self.marker_id, "tearing down carousel");
        self.pagination.clear(doc);
        transformer.revert(doc, self.handle);
    }

    pub fn summary(&self) -> InstanceSummary {
        InstanceSummary {
            id: self.id,
            marker_id: self.marker_id.clone(),
            item_count: self.item_count(),
            mounted: self.is_mounted(),
            layout: self.layout,
            active_index: self.active_index(),
            nav_state: self.nav_state(),
            nav_visible: self.nav_is_visible(),
            pagination_groups: self.pagination_groups().to_vec(),
            active_group: self.active_group(),
        }
    }
}

/// Live instances of one converter, in registration order.
#[derive(Debug, Default)]
pub struct SliderInstanceRegistry {
    next_id: u64,
    instances: BTreeMap<InstanceId, SliderInstance>,
}

impl SliderInstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a fresh id. Ids are never reused.
    pub fn next_id(&mut self) -> InstanceId {
        self.next_id += 1;
        InstanceId(self.next_id)
    }

    pub fn register(&mut self, instance: SliderInstance) -> InstanceId {
        let id = instance.id();
        self.instances.insert(id, instance);
        id
    }

    pub fn unregister(&mut self, id: InstanceId) -> Option<SliderInstance> {
        self.instances.remove(&id)
    }

    pub fn get(&self, id: InstanceId) -> Option<&SliderInstance> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut SliderInstance> {
        self.instances.get_mut(&id)
    }

    pub fn all(&self) -> impl Iterator<Item = &SliderInstance> {
        self.instances.values()
    }

    pub fn ids(&self) -> Vec<InstanceId> {
        self.instances.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn find_by_container(&self, container: NodeId) -> Option<InstanceId> {
        self.instances
            .values()
            .find(|i| i.container() == container)
            .map(|i| i.id())
    }

    /// The instance owning the clicked control `node`.
    pub fn find_by_control(&self, doc: &Document, node: NodeId) -> Option<InstanceId> {
        self.instances
            .values()
            .find(|i| i.owns_control(doc, node))
            .map(|i| i.id())
    }

    pub fn summaries(&self) -> Vec<InstanceSummary> {
        self.instances.values().map(|i| i.summary()).collect()
    }

    /// Tears down every instance and empties the registry. Returns how many were live.
    pub fn destroy_all(&mut self, doc: &Document, transformer: &DomTransformer) -> usize {
        let instances = std::mem::take(&mut self.instances);
        let count = instances.len();
        for instance in instances.into_values() {
            instance.teardown(doc, transformer);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{collect_items, TransformOutcome};
    use crate::engine::headless::HeadlessEngine;

    const GRID: &str = r#"<html><head></head><body><div class="grid">
<p class="c">1</p><p class="c">2</p><p class="c">3</p><p class="c">4</p><p class="c">5</p>
<p class="c">6</p><p class="c">7</p><p class="c">8</p><p class="c">9</p><p class="c">10</p>
</div></body></html>"#;

    fn config() -> ConverterConfig {
        ConverterConfig::new(
            "tests",
            ".grid",
            ".c",
            BreakpointTable::from_triples(&[(0, 4.0, 8.0)]).unwrap(),
        )
    }

    fn live_instance(doc: &Document, registry: &mut SliderInstanceRegistry) -> InstanceId {
        let config = config();
        let transformer = DomTransformer::from_config(&config);
        let grid = doc.select(".grid").nodes()[0].id;
        let items = collect_items(doc, grid, ".c");
        let layout = config.breakpoints.resolve(1300, config.group_policy);
        let id = registry.next_id();
        let marker = format!("tests-slider-{}", id);
        let TransformOutcome::Transformed(handle) = transformer
            .transform(doc, grid, &items, &layout, &marker)
            .unwrap()
        else {
            panic!("expected transform");
        };
        let mut instance = SliderInstance::new(id, marker, handle, layout, &config);
        assert!(instance.is_busy());
        let (mount, engine_config) = instance.mount_request();
        assert_eq!(mount.slides.len(), 10);
        instance.attach(doc, Box::new(HeadlessEngine::new(10, &engine_config)));
        registry.register(instance)
    }

    #[test]
    fn attached_instance_syncs_controls() {
        let doc = Document::from(GRID);
        let mut registry = SliderInstanceRegistry::new();
        let id = live_instance(&doc, &mut registry);
        let instance = registry.get(id).unwrap();
        assert!(!instance.is_busy());
        assert!(instance.is_mounted());
        assert_eq!(instance.pagination_groups(), &[0, 4, 8]);
        assert_eq!(instance.nav_state(), NavState::Start);
        assert!(instance.nav_is_visible());
        assert_eq!(
            doc.select(".swiper-pagination-bullet-active").attr("data-group-start").unwrap().to_string(),
            "0"
        );
    }

    #[test]
    fn advance_walks_to_the_end_and_stops() {
        let doc = Document::from(GRID);
        let mut registry = SliderInstanceRegistry::new();
        let id = live_instance(&doc, &mut registry);
        let instance = registry.get_mut(id).unwrap();

        assert!(!instance.advance(&doc, Direction::Prev));
        assert!(instance.advance(&doc, Direction::Next));
        assert_eq!(instance.nav_state(), NavState::Middle);
        assert!(instance.advance(&doc, Direction::Next));
        assert_eq!(instance.nav_state(), NavState::End);
        assert_eq!(instance.active_group(), 2);
        assert!(!instance.advance(&doc, Direction::Next));
        assert_eq!(doc.select(".swiper-pagination-bullet-active").length(), 1);
    }

    #[test]
    fn reconfigure_rebuilds_groups_in_place() {
        let doc = Document::from(GRID);
        let mut registry = SliderInstanceRegistry::new();
        let id = live_instance(&doc, &mut registry);
        let wrapper = registry.get(id).unwrap().wrapper();
        let layout = BreakpointTable::from_triples(&[(0, 3.0, 8.0)])
            .unwrap()
            .resolve(0, GroupPolicy::MatchView);

        let instance = registry.get_mut(id).unwrap();
        instance.reconfigure(&doc, layout);
        assert_eq!(instance.pagination_groups(), &[0, 3, 6, 9]);
        assert_eq!(instance.wrapper(), wrapper);
        assert_eq!(doc.select(".swiper-pagination-bullet").length(), 4);
    }

    #[test]
    fn destroy_all_reverts_and_is_safe_when_empty() {
        let doc = Document::from(GRID);
        let before = doc.select(".grid").html().to_string();
        let transformer = DomTransformer::from_config(&config());
        let mut registry = SliderInstanceRegistry::new();
        live_instance(&doc, &mut registry);
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.destroy_all(&doc, &transformer), 1);
        assert!(registry.is_empty());
        assert_eq!(doc.select(".grid").html().to_string(), before);
        assert_eq!(registry.destroy_all(&doc, &transformer), 0);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut registry = SliderInstanceRegistry::new();
        let a = registry.next_id();
        let b = registry.next_id();
        assert_ne!(a, b);
        assert!(registry.unregister(a).is_none());
    }
}
