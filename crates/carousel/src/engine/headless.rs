// ABOUTME: Deterministic DOM-free carousel engine used by tests and the CLI.
// ABOUTME: Implements snap points, loop wraparound and the breakpoint map of the capability.

use crate::breakpoints::{whole_slides, ResolvedLayout};
use crate::engine::{
    CarouselEngine, Direction, EngineConfig, EngineEvent, EngineFactory, EngineMount,
};
use crate::error::Result;

/// Engine that tracks position arithmetic only.
///
/// Snap points are `0, g, 2g, ...` up to the last index that still fills the
/// view (`slide_count - floor(slides_per_view)`), which is always a snap point
/// itself. In loop mode every index is reachable and movement wraps.
#[derive(Debug, Clone)]
pub struct HeadlessEngine {
    slide_count: usize,
    layout: ResolvedLayout,
    breakpoints: Vec<(u32, ResolvedLayout)>,
    loop_mode: bool,
    active: usize,
    events: Vec<EngineEvent>,
    destroyed: bool,
}

impl HeadlessEngine {
    pub fn new(slide_count: usize, config: &EngineConfig) -> Self {
        Self {
            slide_count,
            layout: config.layout,
            breakpoints: config.breakpoints.clone(),
            loop_mode: config.loop_mode,
            active: 0,
            events: vec![EngineEvent::Init],
            destroyed: false,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn max_index(&self) -> usize {
        if self.loop_mode {
            self.slide_count.saturating_sub(1)
        } else {
            self.slide_count
                .saturating_sub(whole_slides(self.layout.slides_per_view))
        }
    }

    fn snaps(&self) -> Vec<usize> {
        let max = self.max_index();
        let step = self.layout.slides_per_group.max(1);
        let mut snaps: Vec<usize> = (0..max).step_by(step).collect();
        snaps.push(max);
        snaps
    }

    fn move_to(&mut self, index: usize) {
        if index != self.active {
            self.active = index;
            self.events.push(EngineEvent::ActiveIndexChange { index });
        }
    }
}

impl CarouselEngine for HeadlessEngine {
    fn slide_count(&self) -> usize {
        self.slide_count
    }

    fn active_index(&self) -> usize {
        self.active
    }

    fn is_at_start(&self) -> bool {
        !self.loop_mode && self.active == 0
    }

    fn is_at_end(&self) -> bool {
        !self.loop_mode && self.active >= self.max_index()
    }

    fn current_breakpoint(&self) -> Option<u32> {
        Some(self.layout.breakpoint)
    }

    fn loop_enabled(&self) -> bool {
        self.loop_mode
    }

    fn layout(&self) -> ResolvedLayout {
        self.layout
    }

    fn advance(&mut self, direction: Direction) {
        if self.destroyed || self.slide_count == 0 {
            return;
        }
        let step = self.layout.slides_per_group.max(1);
        let target = if self.loop_mode {
            let n = self.slide_count;
            match direction {
                Direction::Next => (self.active + step) % n,
                Direction::Prev => (self.active + n - step % n) % n,
            }
        } else {
            let snaps = self.snaps();
            match direction {
                Direction::Next => snaps
                    .iter()
                    .copied()
                    .find(|&s| s > self.active)
                    .unwrap_or(self.max_index()),
                Direction::Prev => snaps
                    .iter()
                    .rev()
                    .copied()
                    .find(|&s| s < self.active)
                    .unwrap_or(0),
            }
        };
        self.move_to(target);
    }

    fn seek(&mut self, index: usize) {
        if self.destroyed || self.slide_count == 0 {
            return;
        }
        let target = if self.loop_mode {
            index % self.slide_count
        } else {
            index.min(self.max_index())
        };
        self.move_to(target);
    }

    fn update(&mut self, layout: &ResolvedLayout) {
        if self.destroyed {
            return;
        }
        self.layout = *layout;
        let clamped = if self.loop_mode {
            self.active
        } else {
            self.active.min(self.max_index())
        };
        self.move_to(clamped);
    }

    fn resize(&mut self, width: u32) {
        if self.destroyed {
            return;
        }
        let next = self
            .breakpoints
            .iter()
            .rev()
            .find(|(min, _)| *min <= width)
            .map(|(_, layout)| *layout);
        if let Some(layout) = next {
            if layout.breakpoint != self.layout.breakpoint {
                self.update(&layout);
                self.events.push(EngineEvent::BreakpointChange {
                    min_width: layout.breakpoint,
                });
            }
        }
        self.events.push(EngineEvent::Resize { width });
    }

    fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.events.clear();
    }
}

/// Factory producing [`HeadlessEngine`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessFactory;

impl HeadlessFactory {
    pub fn new() -> Self {
        Self
    }
}

impl EngineFactory for HeadlessFactory {
    fn create(&self, mount: &EngineMount, config: &EngineConfig) -> Result<Box<dyn CarouselEngine>> {
        Ok(Box::new(HeadlessEngine::new(mount.slides.len(), config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoints::{BreakpointTable, GroupPolicy};

    fn engine(count: usize, spv: f32, policy: GroupPolicy, loop_mode: bool) -> HeadlessEngine {
        let table = BreakpointTable::from_triples(&[(0, spv, 0.0)]).unwrap();
        let config = EngineConfig {
            layout: table.resolve(0, policy),
            breakpoints: table.resolved_map(policy),
            navigation: None,
            pagination: None,
            loop_mode,
        };
        HeadlessEngine::new(count, &config)
    }

    #[test]
    fn advances_by_group_and_clamps_to_last_full_view() {
        let mut e = engine(10, 4.0, GroupPolicy::MatchView, false);
        assert_eq!(e.take_events(), vec![EngineEvent::Init]);
        assert!(e.is_at_start());

        e.advance(Direction::Next);
        assert_eq!(e.active_index(), 4);
        e.advance(Direction::Next);
        assert_eq!(e.active_index(), 6);
        assert!(e.is_at_end());
        e.advance(Direction::Next);
        assert_eq!(e.active_index(), 6);

        e.advance(Direction::Prev);
        assert_eq!(e.active_index(), 4);
        e.advance(Direction::Prev);
        assert_eq!(e.active_index(), 0);
        e.advance(Direction::Prev);
        assert_eq!(e.active_index(), 0);

        assert_eq!(
            e.take_events(),
            vec![
                EngineEvent::ActiveIndexChange { index: 4 },
                EngineEvent::ActiveIndexChange { index: 6 },
                EngineEvent::ActiveIndexChange { index: 4 },
                EngineEvent::ActiveIndexChange { index: 0 },
            ]
        );
    }

    #[test]
    fn seek_is_clamped_outside_loop_mode() {
        let mut e = engine(10, 4.0, GroupPolicy::MatchView, false);
        e.seek(8);
        assert_eq!(e.active_index(), 6);
        assert!(e.is_at_end());
    }

    #[test]
    fn loop_mode_wraps_and_has_no_boundaries() {
        let mut e = engine(5, 2.0, GroupPolicy::Fixed(1), true);
        e.advance(Direction::Prev);
        assert_eq!(e.active_index(), 4);
        assert!(!e.is_at_start());
        assert!(!e.is_at_end());
        e.advance(Direction::Next);
        assert_eq!(e.active_index(), 0);
        e.seek(7);
        assert_eq!(e.active_index(), 2);
    }

    #[test]
    fn resize_crossing_breakpoint_queues_event() {
        let table = BreakpointTable::from_triples(&[(0, 2.0, 0.0), (992, 4.0, 0.0)]).unwrap();
        let config = EngineConfig {
            layout: table.resolve(500, GroupPolicy::MatchView),
            breakpoints: table.resolved_map(GroupPolicy::MatchView),
            navigation: None,
            pagination: None,
            loop_mode: false,
        };
        let mut e = HeadlessEngine::new(6, &config);
        e.take_events();
        e.seek(4);
        e.resize(1000);
        assert_eq!(e.layout().slides_per_group, 4);
        assert_eq!(e.current_breakpoint(), Some(992));
        assert_eq!(e.active_index(), 2);
        assert_eq!(
            e.take_events(),
            vec![
                EngineEvent::ActiveIndexChange { index: 4 },
                EngineEvent::ActiveIndexChange { index: 2 },
                EngineEvent::BreakpointChange { min_width: 992 },
                EngineEvent::Resize { width: 1000 },
            ]
        );
        e.resize(1100);
        assert_eq!(e.take_events(), vec![EngineEvent::Resize { width: 1100 }]);
    }

    #[test]
    fn destroyed_engine_ignores_commands() {
        let mut e = engine(10, 4.0, GroupPolicy::MatchView, false);
        e.destroy();
        e.advance(Direction::Next);
        assert_eq!(e.active_index(), 0);
        assert!(e.take_events().is_empty());
        assert!(e.is_destroyed());
    }
}
