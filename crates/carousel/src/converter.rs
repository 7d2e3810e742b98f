// ABOUTME: GridConverter drives one converter type over a page: scan, resize, mount, click and teardown.
// ABOUTME: Owns the candidates, registry, deferred mounts and debounced resize state of that converter.

//! The grid converter.
//!
//! A [`GridConverter`] is an explicitly constructed component with an
//! injected [`ConverterConfig`] and [`EngineFactory`]. The page lifecycle
//! calls into it:
//!
//! - [`GridConverter::scan`] once the document is ready, and
//!   [`GridConverter::rescan`] whenever new content was inserted,
//! - [`GridConverter::on_resize`] for every viewport resize and
//!   [`GridConverter::tick`] on every turn of the event loop,
//! - [`GridConverter::handle_click`] for clicks inside a carousel,
//! - [`GridConverter::destroy_all`] on full feature teardown.
//!
//! Structural changes (transform, revert) happen during evaluation; engine
//! mounts are deferred to the next tick so the new structure is in place
//! before the engine measures it.
//!
//! None of the lifecycle entry points fail. Per-container configuration
//! errors are logged and counted in the returned [`ScanReport`].

use std::time::{Duration, Instant};

use dom_query::{Document, NodeId};
use serde::Serialize;
use tracing::{debug, error, trace, warn};

use crate::breakpoints::ResolvedLayout;
use crate::config::ConverterConfig;
use crate::dom::nodes;
use crate::dom::selectors::get_or_compile;
use crate::dom::{collect_items, DomTransformer, TransformOutcome};
use crate::engine::headless::HeadlessFactory;
use crate::engine::{Direction, EngineFactory};
use crate::error::{CarouselError, Result};
use crate::registry::{InstanceId, InstanceSummary, SliderInstance, SliderInstanceRegistry};
use crate::resize::{ResizeCoordinator, ResizeDecision};
use crate::schedule::{DeferredQueue, DeferredTask};

/// Counts for one scan or evaluation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Candidate containers considered.
    pub found: usize,
    /// Containers converted in this pass.
    pub transformed: usize,
    /// Live carousels updated in place.
    pub reconfigured: usize,
    /// Live carousels reverted to a static grid.
    pub reverted: usize,
    /// Containers left as they were: everything fits, already converted, or a mount is pending.
    pub skipped: usize,
    /// Containers skipped because of a configuration error.
    pub failed: usize,
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickOutcome {
    /// The engine moved one group.
    Advanced(Direction),
    /// The engine moved to this group start.
    Seeked(usize),
    /// The click hit a control that is disabled, hidden or not mounted yet.
    Ignored,
    /// The click did not hit any control of this converter.
    NotHandled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineStatus {
    Unloaded,
    Ready,
    Unavailable,
}

/// A container matched by the container selector.
#[derive(Debug)]
struct Candidate {
    container: NodeId,
    /// Read once at discovery.
    items: Vec<NodeId>,
    instance: Option<InstanceId>,
    /// Bumped on every teardown; deferred work from older generations is stale.
    generation: u64,
    /// Width seen while a mount was pending, replayed once it completes.
    pending_width: Option<u32>,
}

/// Converts every matching grid of one converter type into carousels and back.
#[derive(Debug)]
pub struct GridConverter {
    config: ConverterConfig,
    factory: Box<dyn EngineFactory>,
    transformer: DomTransformer,
    registry: SliderInstanceRegistry,
    candidates: Vec<Candidate>,
    deferred: DeferredQueue,
    resize: ResizeCoordinator,
    width: u32,
    engine: EngineStatus,
}

impl GridConverter {
    /// Create a converter builder.
    pub fn builder(config: ConverterConfig) -> ConverterBuilder {
        ConverterBuilder::new(config)
    }

    /// Validates `config` and creates an idle converter. Nothing is scanned yet.
    pub fn new(config: ConverterConfig, factory: Box<dyn EngineFactory>) -> Result<Self> {
        config.validate()?;
        let transformer = DomTransformer::from_config(&config);
        let resize = ResizeCoordinator::new(Duration::from_millis(config.debounce_ms));
        Ok(Self {
            config,
            factory,
            transformer,
            registry: SliderInstanceRegistry::new(),
            candidates: Vec::new(),
            deferred: DeferredQueue::new(),
            resize,
            width: 0,
            engine: EngineStatus::Unloaded,
        })
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn registry(&self) -> &SliderInstanceRegistry {
        &self.registry
    }

    /// Last viewport width evaluated.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// False once the engine turned out to be unavailable.
    pub fn is_enabled(&self) -> bool {
        self.engine != EngineStatus::Unavailable
    }

    /// Number of containers matched so far.
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Mounts waiting for the next tick.
    pub fn pending_mounts(&self) -> usize {
        self.deferred.len()
    }

    pub fn is_resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    pub fn summaries(&self) -> Vec<InstanceSummary> {
        self.registry.summaries()
    }

    /// The live instance converted from `container`, if any.
    pub fn instance_for(&self, container: NodeId) -> Option<&SliderInstance> {
        self.registry
            .find_by_container(container)
            .and_then(|id| self.registry.get(id))
    }

    /// Discovers containers and evaluates every candidate at `width`.
    pub fn scan(&mut self, doc: &Document, width: u32) -> ScanReport {
        self.width = width;
        if !self.ensure_engine(doc) {
            return ScanReport::default();
        }
        self.discover(doc);
        self.evaluate(doc, width)
    }

    /// Picks up containers inserted since the last scan and drops ones that left the page.
    pub fn rescan(&mut self, doc: &Document) -> ScanReport {
        self.scan(doc, self.width)
    }

    /// Records a viewport resize.
    ///
    /// Live engines see the width immediately so their own breakpoints apply;
    /// structural decisions wait until the burst settles.
    pub fn on_resize(&mut self, doc: &Document, width: u32, now: Instant) {
        if !self.is_enabled() {
            return;
        }
        for id in self.registry.ids() {
            if let Some(instance) = self.registry.get_mut(id) {
                instance.resize_engine(doc, width);
            }
        }
        self.resize.on_resize(width, now);
    }

    /// Runs deferred mounts, then evaluates the settled width once the debounce window has passed.
    ///
    /// Mounts scheduled by that evaluation run on the following tick.
    pub fn tick(&mut self, doc: &Document, now: Instant) -> Option<ScanReport> {
        self.run_deferred(doc);
        let width = self.resize.poll(now)?;
        trace!(converter = %self.config.name, width, "evaluating settled width");
        Some(self.evaluate(doc, width))
    }

    /// Forces any pending resize through and runs deferred work until nothing is left.
    ///
    /// Returns the report of the flushed evaluation, if a resize was pending.
    pub fn settle(&mut self, doc: &Document) -> Option<ScanReport> {
        self.run_deferred(doc);
        let report = self.resize.flush().map(|width| {
            trace!(converter = %self.config.name, width, "evaluating flushed width");
            self.evaluate(doc, width)
        });
        while !self.deferred.is_empty() {
            self.run_deferred(doc);
        }
        report
    }

    /// Applies the tri-state resize policy to every candidate at `width`.
    pub fn evaluate(&mut self, doc: &Document, width: u32) -> ScanReport {
        self.width = width;
        let mut report = ScanReport::default();
        if !self.ensure_engine(doc) {
            return report;
        }
        let layout = self
            .config
            .breakpoints
            .resolve(width, self.config.group_policy);
        for idx in 0..self.candidates.len() {
            report.found += 1;
            self.evaluate_candidate(doc, idx, width, &layout, &mut report);
        }
        report
    }

    /// Runs mounts queued by earlier evaluations. Stale or detached mounts are dropped.
    pub fn run_deferred(&mut self, doc: &Document) {
        for task in self.deferred.drain() {
            match task.task {
                DeferredTask::Mount => self.mount(doc, task.instance, task.generation),
            }
        }
    }

    /// Routes a click on `node` (or one of its ancestors) to the owning carousel.
    pub fn handle_click(&mut self, doc: &Document, node: NodeId) -> ClickOutcome {
        if !self.is_enabled() {
            return ClickOutcome::NotHandled;
        }
        let Some((id, control)) = self.control_for(doc, node) else {
            return ClickOutcome::NotHandled;
        };
        let Some(instance) = self.registry.get_mut(id) else {
            return ClickOutcome::NotHandled;
        };
        if let Some(direction) = instance.direction_of(control) {
            return if instance.advance(doc, direction) {
                ClickOutcome::Advanced(direction)
            } else {
                ClickOutcome::Ignored
            };
        }
        match instance.seek_bullet(doc, control) {
            Some(target) => ClickOutcome::Seeked(target),
            None => ClickOutcome::Ignored,
        }
    }

    /// Drains engine events of every live carousel. Returns how many were handled.
    pub fn pump_events(&mut self, doc: &Document) -> usize {
        let mut handled = 0;
        for id in self.registry.ids() {
            if let Some(instance) = self.registry.get_mut(id) {
                handled += instance.pump(doc);
            }
        }
        handled
    }

    /// Tears down one carousel. The container stays a candidate and may convert again.
    pub fn destroy(&mut self, doc: &Document, id: InstanceId) -> bool {
        match self.candidates.iter().position(|c| c.instance == Some(id)) {
            Some(idx) => {
                self.teardown_candidate(doc, idx);
                true
            }
            None => false,
        }
    }

    /// Tears down every carousel and cancels pending work. Safe when nothing is live.
    pub fn destroy_all(&mut self, doc: &Document) -> usize {
        self.resize.cancel();
        self.deferred.clear();
        for candidate in &mut self.candidates {
            if candidate.instance.take().is_some() {
                candidate.generation += 1;
            }
            candidate.pending_width = None;
        }
        let count = self.registry.destroy_all(doc, &self.transformer);
        if count > 0 {
            debug!(converter = %self.config.name, count, "destroyed all carousels");
        }
        count
    }

    /// Loads the engine on first use. On failure the converter switches itself off for good.
    fn ensure_engine(&mut self, doc: &Document) -> bool {
        match self.engine {
            EngineStatus::Ready => true,
            EngineStatus::Unavailable => false,
            EngineStatus::Unloaded => match self.factory.load() {
                Ok(()) => {
                    self.engine = EngineStatus::Ready;
                    true
                }
                Err(e) => {
                    self.disable(doc, &e);
                    false
                }
            },
        }
    }

    fn disable(&mut self, doc: &Document, err: &CarouselError) {
        if self.engine == EngineStatus::Unavailable {
            return;
        }
        error!(
            converter = %self.config.name,
            error = %err,
            "carousel engine unavailable; grids stay static"
        );
        self.engine = EngineStatus::Unavailable;
        self.destroy_all(doc);
    }

    fn discover(&mut self, doc: &Document) {
        // Containers gone from the page are reverted and forgotten.
        let mut idx = 0;
        while idx < self.candidates.len() {
            if nodes::attached(doc, self.candidates[idx].container).is_some() {
                idx += 1;
                continue;
            }
            self.teardown_candidate(doc, idx);
            self.candidates.remove(idx);
        }

        let Some(matcher) = get_or_compile(&self.config.container_selector) else {
            return;
        };
        for node in doc.select_matcher(&matcher).nodes() {
            if self.candidates.iter().any(|c| c.container == node.id) {
                continue;
            }
            let items = collect_items(doc, node.id, &self.config.item_selector);
            self.candidates.push(Candidate {
                container: node.id,
                items,
                instance: None,
                generation: 0,
                pending_width: None,
            });
        }
    }

    fn evaluate_candidate(
        &mut self,
        doc: &Document,
        idx: usize,
        width: u32,
        layout: &ResolvedLayout,
        report: &mut ScanReport,
    ) {
        let item_count = self.candidates[idx].items.len();
        let current = match self.candidates[idx].instance {
            Some(id) => match self.registry.get(id) {
                Some(instance) if instance.is_busy() => {
                    self.candidates[idx].pending_width = Some(width);
                    report.skipped += 1;
                    return;
                }
                Some(instance) => Some(instance.layout()),
                None => None,
            },
            None => None,
        };

        match ResizeCoordinator::evaluate(current.as_ref(), layout, item_count) {
            ResizeDecision::Initialize => self.initialize(doc, idx, layout, report),
            ResizeDecision::TearDown => {
                self.teardown_candidate(doc, idx);
                report.reverted += 1;
            }
            ResizeDecision::Reconfigure => {
                if let Some(instance) = self.candidates[idx]
                    .instance
                    .and_then(|id| self.registry.get_mut(id))
                {
                    instance.reconfigure(doc, *layout);
                }
                report.reconfigured += 1;
            }
            ResizeDecision::Unchanged => {}
            ResizeDecision::StayStatic => report.skipped += 1,
        }
    }

    fn initialize(
        &mut self,
        doc: &Document,
        idx: usize,
        layout: &ResolvedLayout,
        report: &mut ScanReport,
    ) {
        let id = self.registry.next_id();
        let marker_id = format!("{}-{}", self.config.name, id);
        let candidate = &mut self.candidates[idx];
        let outcome = self.transformer.transform(
            doc,
            candidate.container,
            &candidate.items,
            layout,
            &marker_id,
        );
        match outcome {
            Ok(TransformOutcome::Transformed(handle)) => {
                let instance = SliderInstance::new(id, marker_id, handle, *layout, &self.config);
                self.registry.register(instance);
                candidate.instance = Some(id);
                candidate.pending_width = None;
                self.deferred
                    .push(id, candidate.generation, DeferredTask::Mount);
                report.transformed += 1;
            }
            Ok(TransformOutcome::Skipped(reason)) => {
                debug!(converter = %self.config.name, ?reason, "container left static");
                report.skipped += 1;
            }
            Err(e) => {
                warn!(converter = %self.config.name, error = %e, "skipping container");
                report.failed += 1;
            }
        }
    }

    fn mount(&mut self, doc: &Document, id: InstanceId, generation: u64) {
        let Some(idx) = self
            .candidates
            .iter()
            .position(|c| c.instance == Some(id) && c.generation == generation)
        else {
            debug!(converter = %self.config.name, instance = %id, "stale mount dropped");
            return;
        };
        if nodes::attached(doc, self.candidates[idx].container).is_none() {
            debug!(
                converter = %self.config.name,
                instance = %id,
                "container left the document; mount cancelled"
            );
            self.teardown_candidate(doc, idx);
            return;
        }
        let Some(instance) = self.registry.get_mut(id) else {
            return;
        };

        let (mount, engine_config) = instance.mount_request();
        match self.factory.create(&mount, &engine_config) {
            Ok(engine) => instance.attach(doc, engine),
            Err(e) if e.is_engine_unavailable() => {
                self.disable(doc, &e);
                return;
            }
            Err(e) => {
                warn!(converter = %self.config.name, instance = %id, error = %e, "engine rejected container");
                self.teardown_candidate(doc, idx);
                return;
            }
        }

        if let Some(width) = self.candidates[idx].pending_width.take() {
            let layout = self
                .config
                .breakpoints
                .resolve(width, self.config.group_policy);
            let mut report = ScanReport::default();
            self.evaluate_candidate(doc, idx, width, &layout, &mut report);
        }
    }

    fn teardown_candidate(&mut self, doc: &Document, idx: usize) {
        let candidate = &mut self.candidates[idx];
        candidate.pending_width = None;
        let Some(id) = candidate.instance.take() else {
            return;
        };
        candidate.generation += 1;
        self.deferred.cancel(id);
        if let Some(instance) = self.registry.unregister(id) {
            instance.teardown(doc, &self.transformer);
        }
    }

    fn control_for(&self, doc: &Document, node: NodeId) -> Option<(InstanceId, NodeId)> {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(instance) = self.registry.find_by_control(doc, id) {
                return Some((instance, id));
            }
            if self.registry.find_by_container(id).is_some() {
                return None;
            }
            current = nodes::node(doc, id).and_then(|n| n.parent()).map(|p| p.id);
        }
        None
    }
}

/// Builder for [`GridConverter`].
#[derive(Debug)]
pub struct ConverterBuilder {
    config: ConverterConfig,
    factory: Option<Box<dyn EngineFactory>>,
}

impl ConverterBuilder {
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            config,
            factory: None,
        }
    }

    /// Set the engine factory. Defaults to the headless engine.
    pub fn engine_factory(mut self, factory: impl EngineFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Set the resize debounce window.
    pub fn debounce(mut self, window: Duration) -> Self {
        self.config.debounce_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Validate the config and build the converter.
    pub fn build(self) -> Result<GridConverter> {
        let factory = self
            .factory
            .unwrap_or_else(|| Box::new(HeadlessFactory::new()));
        GridConverter::new(self.config, factory)
    }
}
