// ABOUTME: Prev/next navigation state machine and DOM synchronisation for one carousel.
// ABOUTME: Derives Start/Middle/End/Loop from the active group and guards disabled clicks.

//! Navigation controller.
//!
//! State follows the active group index: the first group is `Start` (prev
//! disabled), the last is `End` (next disabled), anything else is `Middle`.
//! A single group is `Single` with both directions disabled. In loop mode
//! there are no boundaries and the state is `Loop`.
//!
//! Visibility is separate from enablement: when every item fits the view the
//! affordances are hidden outright. Both are re-derived on every sync.

use dom_query::{Document, NodeId};
use serde::Serialize;

use crate::breakpoints::ResolvedLayout;
use crate::config::NavVisibility;
use crate::dom::nodes::{self, set_flag, toggle_class};
use crate::engine::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavState {
    Start,
    Middle,
    End,
    Single,
    Loop,
}

impl NavState {
    /// Derives the state for `active_group` out of `group_count` groups.
    pub fn derive(active_group: usize, group_count: usize, loop_mode: bool) -> Self {
        if loop_mode {
            return NavState::Loop;
        }
        let last = group_count.saturating_sub(1);
        if last == 0 {
            NavState::Single
        } else if active_group == 0 {
            NavState::Start
        } else if active_group >= last {
            NavState::End
        } else {
            NavState::Middle
        }
    }

    pub fn prev_enabled(self) -> bool {
        !matches!(self, NavState::Start | NavState::Single)
    }

    pub fn next_enabled(self) -> bool {
        !matches!(self, NavState::End | NavState::Single)
    }

    pub fn allows(self, direction: Direction) -> bool {
        match direction {
            Direction::Prev => self.prev_enabled(),
            Direction::Next => self.next_enabled(),
        }
    }
}

/// Whether prev/next should be shown at all for `item_count` items under `layout`.
pub fn nav_visible(
    item_count: usize,
    layout: &ResolvedLayout,
    loop_mode: bool,
    visibility: NavVisibility,
) -> bool {
    match visibility {
        NavVisibility::AlwaysInLoop if loop_mode => true,
        _ => layout.is_eligible(item_count),
    }
}

/// Keeps the prev/next affordances of one carousel in sync.
#[derive(Debug, Clone)]
pub struct NavigationController {
    prev: NodeId,
    next: NodeId,
    disabled_class: String,
    state: NavState,
    visible: bool,
}

impl NavigationController {
    pub fn new(prev: NodeId, next: NodeId, disabled_class: impl Into<String>) -> Self {
        Self {
            prev,
            next,
            disabled_class: disabled_class.into(),
            state: NavState::Start,
            visible: true,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The direction `node` stands for, if it is one of this controller's affordances.
    pub fn direction_of(&self, node: NodeId) -> Option<Direction> {
        if node == self.prev {
            Some(Direction::Prev)
        } else if node == self.next {
            Some(Direction::Next)
        } else {
            None
        }
    }

    /// Re-derives state and visibility and writes them to the DOM.
    pub fn sync(
        &mut self,
        doc: &Document,
        active_group: usize,
        group_count: usize,
        loop_mode: bool,
        visible: bool,
    ) {
        self.state = NavState::derive(active_group, group_count, loop_mode);
        self.visible = visible;
        self.render(doc, self.prev, self.state.prev_enabled());
        self.render(doc, self.next, self.state.next_enabled());
    }

    /// Returns the advance intent for a click, or `None` when the affordance is
    /// disabled or hidden. A `None` must never reach the engine.
    pub fn click(&self, direction: Direction) -> Option<Direction> {
        (self.visible && self.state.allows(direction)).then_some(direction)
    }

    fn render(&self, doc: &Document, id: NodeId, enabled: bool) {
        let Some(button) = nodes::node(doc, id) else {
            return;
        };
        set_flag(&button, "hidden", !self.visible);
        set_flag(&button, "disabled", !enabled);
        button.set_attr("aria-disabled", if enabled { "false" } else { "true" });
        toggle_class(&button, &self.disabled_class, !enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoints::{BreakpointTable, GroupPolicy};

    #[test]
    fn boundaries_disable_one_direction() {
        let start = NavState::derive(0, 3, false);
        assert_eq!(start, NavState::Start);
        assert!(!start.prev_enabled());
        assert!(start.next_enabled());

        let end = NavState::derive(2, 3, false);
        assert_eq!(end, NavState::End);
        assert!(end.prev_enabled());
        assert!(!end.next_enabled());

        assert_eq!(NavState::derive(1, 3, false), NavState::Middle);
    }

    #[test]
    fn single_group_disables_both_directions() {
        for group_count in [0, 1] {
            let state = NavState::derive(0, group_count, false);
            assert_eq!(state, NavState::Single);
            assert!(!state.allows(Direction::Prev));
            assert!(!state.allows(Direction::Next));
        }
        assert_eq!(NavState::derive(0, 1, true), NavState::Loop);
    }

    #[test]
    fn single_group_click_never_reaches_engine() {
        let (doc, prev, next) = doc_with_buttons();
        let mut nav = NavigationController::new(prev, next, "swiper-button-disabled");
        nav.sync(&doc, 0, 1, false, true);
        assert_eq!(nav.click(Direction::Next), None);
        assert_eq!(nav.click(Direction::Prev), None);
        assert!(doc.select(".swiper-button-next").nodes()[0].has_attr("disabled"));
        assert!(doc.select(".swiper-button-prev").nodes()[0].has_attr("disabled"));
    }

    #[test]
    fn loop_mode_enables_both_directions() {
        for group in 0..3 {
            let state = NavState::derive(group, 3, true);
            assert_eq!(state, NavState::Loop);
            assert!(state.prev_enabled() && state.next_enabled());
        }
    }

    #[test]
    fn visibility_follows_capacity_and_policy() {
        let layout = BreakpointTable::from_triples(&[(0, 4.0, 0.0)])
            .unwrap()
            .resolve(0, GroupPolicy::MatchView);
        assert!(!nav_visible(4, &layout, false, NavVisibility::ByCapacity));
        assert!(nav_visible(5, &layout, false, NavVisibility::ByCapacity));
        assert!(!nav_visible(3, &layout, true, NavVisibility::ByCapacity));
        assert!(nav_visible(3, &layout, true, NavVisibility::AlwaysInLoop));
        assert!(!nav_visible(3, &layout, false, NavVisibility::AlwaysInLoop));
    }

    fn doc_with_buttons() -> (Document, NodeId, NodeId) {
        let doc = Document::from(
            r#"<div><button class="swiper-button-prev"></button><button class="swiper-button-next"></button></div>"#,
        );
        let prev = doc.select(".swiper-button-prev").nodes()[0].id;
        let next = doc.select(".swiper-button-next").nodes()[0].id;
        (doc, prev, next)
    }

    #[test]
    fn sync_writes_disabled_markers() {
        let (doc, prev, next) = doc_with_buttons();
        let mut nav = NavigationController::new(prev, next, "swiper-button-disabled");

        nav.sync(&doc, 0, 3, false, true);
        let prev_node = nodes::node(&doc, prev).unwrap();
        let next_node = nodes::node(&doc, next).unwrap();
        assert!(prev_node.has_attr("disabled"));
        assert!(prev_node.has_class("swiper-button-disabled"));
        assert_eq!(prev_node.attr("aria-disabled").unwrap().to_string(), "true");
        assert!(!next_node.has_attr("disabled"));

        nav.sync(&doc, 2, 3, false, true);
        assert!(!prev_node.has_attr("disabled"));
        assert!(!prev_node.has_class("swiper-button-disabled"));
        assert!(next_node.has_attr("disabled"));
    }

    #[test]
    fn clicks_on_disabled_or_hidden_affordances_are_dropped() {
        let (doc, prev, next) = doc_with_buttons();
        let mut nav = NavigationController::new(prev, next, "swiper-button-disabled");
        nav.sync(&doc, 0, 3, false, true);
        assert_eq!(nav.click(Direction::Prev), None);
        assert_eq!(nav.click(Direction::Next), Some(Direction::Next));

        nav.sync(&doc, 1, 3, false, false);
        assert_eq!(nav.click(Direction::Next), None);
        assert!(nodes::node(&doc, next).unwrap().has_attr("hidden"));
    }

    #[test]
    fn direction_of_maps_owned_nodes() {
        let (_doc, prev, next) = doc_with_buttons();
        let nav = NavigationController::new(prev, next, "off");
        assert_eq!(nav.direction_of(prev), Some(Direction::Prev));
        assert_eq!(nav.direction_of(next), Some(Direction::Next));
    }
}
