// ABOUTME: Pagination groups and bullet rendering for one carousel.
// ABOUTME: Builds group start indices, keeps exactly one active bullet and maps bullet clicks to seeks.

//! Pagination controller.
//!
//! Groups start at `0, g, 2g, ...` while the start is below the item count.
//! One bullet is rendered per group and tagged with `data-group-start`. A
//! carousel with a single group shows no pagination at all.
//!
//! Groups are rebuilt from scratch whenever the group size changes; bullets
//! are never patched in place.

use dom_query::{Document, NodeId};

use crate::dom::nodes::{self, set_flag, toggle_class};

/// Attribute carrying a bullet's group start index.
pub const GROUP_START_ATTR: &str = "data-group-start";

/// Group start indices for `item_count` items advanced `slides_per_group` at a time.
pub fn build_groups(item_count: usize, slides_per_group: usize) -> Vec<usize> {
    (0..item_count).step_by(slides_per_group.max(1)).collect()
}

/// Index of the group holding `active_index`.
///
/// At the end of a non-looping carousel the engine may stop short of the last
/// group start (the last snap fills the view), so `at_end` pins the last group.
pub fn active_group(
    active_index: usize,
    slides_per_group: usize,
    group_count: usize,
    at_end: bool,
) -> usize {
    if group_count == 0 {
        return 0;
    }
    let last = group_count - 1;
    if at_end {
        return last;
    }
    (active_index / slides_per_group.max(1)).min(last)
}

/// Renders and tracks the bullets of one carousel.
#[derive(Debug, Clone)]
pub struct PaginationController {
    element: NodeId,
    bullet_class: String,
    active_class: String,
    groups: Vec<usize>,
    group_size: usize,
    bullets: Vec<NodeId>,
    active: usize,
}

impl PaginationController {
    pub fn new(
        element: NodeId,
        bullet_class: impl Into<String>,
        active_class: impl Into<String>,
    ) -> Self {
        Self {
            element,
            bullet_class: bullet_class.into(),
            active_class: active_class.into(),
            groups: Vec::new(),
            group_size: 1,
            bullets: Vec::new(),
            active: 0,
        }
    }

    pub fn groups(&self) -> &[usize] {
        &self.groups
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn active_group(&self) -> usize {
        self.active
    }

    pub fn bullets(&self) -> &[NodeId] {
        &self.bullets
    }

    pub fn is_visible(&self) -> bool {
        self.groups.len() > 1
    }

    /// Removes every rendered bullet and forgets the groups.
    pub fn clear(&mut self, doc: &Document) {
        for id in self.bullets.drain(..) {
            if let Some(bullet) = nodes::node(doc, id) {
                bullet.remove_from_parent();
            }
        }
        self.groups.clear();
        self.active = 0;
    }

    /// Discards every bullet and renders one per group for the new group size.
    pub fn rebuild(&mut self, doc: &Document, item_count: usize, group_size: usize) {
        self.clear(doc);
        self.group_size = group_size.max(1);
        self.groups = build_groups(item_count, self.group_size);
        self.active = 0;

        let Some(container) = nodes::node(doc, self.element) else {
            return;
        };
        set_flag(&container, "hidden", !self.is_visible());
        if !self.is_visible() {
            return;
        }
        for (n, start) in self.groups.iter().enumerate() {
            let bullet = doc.tree.new_element("span");
            bullet.set_attr("class", &self.bullet_class);
            bullet.set_attr(GROUP_START_ATTR, &start.to_string());
            bullet.set_attr("role", "button");
            bullet.set_attr("tabindex", "0");
            bullet.set_attr("aria-label", &format!("Go to slide group {}", n + 1));
            container.append_child(&bullet);
            self.bullets.push(bullet.id);
        }
        self.render_active(doc);
    }

    /// Moves the active marker to the group holding `active_index`.
    pub fn set_active(&mut self, doc: &Document, active_index: usize, at_end: bool) {
        self.active = active_group(active_index, self.group_size, self.groups.len(), at_end);
        self.render_active(doc);
    }

    /// Group start targeted by a click on `node`, if `node` is one of this carousel's bullets.
    pub fn seek_target(&self, doc: &Document, node: NodeId) -> Option<usize> {
        if !self.bullets.contains(&node) {
            return None;
        }
        nodes::node(doc, node)?
            .attr(GROUP_START_ATTR)
            .and_then(|v| v.parse().ok())
    }

    fn render_active(&self, doc: &Document) {
        for (n, id) in self.bullets.iter().enumerate() {
            let Some(bullet) = nodes::node(doc, *id) else {
                continue;
            };
            let on = n == self.active;
            toggle_class(&bullet, &self.active_class, on);
            if on {
                bullet.set_attr("aria-current", "true");
            } else {
                bullet.remove_attr("aria-current");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVE: &str = "swiper-pagination-bullet-active";

    fn setup() -> (Document, PaginationController) {
        let doc = Document::from(r#"<div class="swiper-pagination"></div>"#);
        let el = doc.select(".swiper-pagination").nodes()[0].id;
        (
            doc,
            PaginationController::new(el, "swiper-pagination-bullet", ACTIVE),
        )
    }

    #[test]
    fn groups_start_every_group_size() {
        assert_eq!(build_groups(10, 4), vec![0, 4, 8]);
        assert_eq!(build_groups(8, 4), vec![0, 4]);
        assert_eq!(build_groups(3, 1), vec![0, 1, 2]);
        assert_eq!(build_groups(0, 4), Vec::<usize>::new());
        assert_eq!(build_groups(3, 0), vec![0, 1, 2]);
    }

    #[test]
    fn active_group_pins_last_at_end() {
        assert_eq!(active_group(0, 4, 3, false), 0);
        assert_eq!(active_group(5, 4, 3, false), 1);
        assert_eq!(active_group(6, 4, 3, true), 2);
        assert_eq!(active_group(40, 4, 3, false), 2);
    }

    #[test]
    fn exactly_one_bullet_is_active() {
        let (doc, mut pagination) = setup();
        pagination.rebuild(&doc, 10, 4);
        assert_eq!(pagination.groups(), &[0, 4, 8]);
        assert_eq!(doc.select(".swiper-pagination-bullet").length(), 3);
        assert_eq!(doc.select(&format!(".{}", ACTIVE)).length(), 1);

        for (index, at_end, expected) in [(4, false, "4"), (6, true, "8"), (0, false, "0")] {
            pagination.set_active(&doc, index, at_end);
            let active = doc.select(&format!(".{}", ACTIVE));
            assert_eq!(active.length(), 1);
            assert_eq!(active.attr(GROUP_START_ATTR).unwrap().to_string(), expected);
        }
    }

    #[test]
    fn single_group_hides_pagination() {
        let (doc, mut pagination) = setup();
        pagination.rebuild(&doc, 4, 4);
        assert!(!pagination.is_visible());
        assert!(doc.select(".swiper-pagination").nodes()[0].has_attr("hidden"));
        assert_eq!(doc.select(".swiper-pagination-bullet").length(), 0);

        pagination.rebuild(&doc, 10, 4);
        assert!(!doc.select(".swiper-pagination").nodes()[0].has_attr("hidden"));
    }

    #[test]
    fn rebuild_replaces_stale_bullets() {
        let (doc, mut pagination) = setup();
        pagination.rebuild(&doc, 10, 2);
        assert_eq!(doc.select(".swiper-pagination-bullet").length(), 5);
        pagination.rebuild(&doc, 10, 5);
        assert_eq!(doc.select(".swiper-pagination-bullet").length(), 2);
        assert_eq!(pagination.groups(), &[0, 5]);
    }

    #[test]
    fn clear_removes_bullets_from_existing_element() {
        let doc = Document::from(r#"<nav class="dots"><i>keep</i></nav>"#);
        let before = doc.select(".dots").html().to_string();
        let el = doc.select(".dots").nodes()[0].id;
        let mut pagination = PaginationController::new(el, "swiper-pagination-bullet", ACTIVE);
        pagination.rebuild(&doc, 10, 4);
        assert_eq!(doc.select(".dots .swiper-pagination-bullet").length(), 3);

        pagination.clear(&doc);
        assert!(pagination.bullets().is_empty());
        assert!(pagination.groups().is_empty());
        assert_eq!(doc.select(".dots .swiper-pagination-bullet").length(), 0);
        assert_eq!(doc.select(".dots i").length(), 1);

        pagination.rebuild(&doc, 10, 4);
        assert_eq!(doc.select(".dots .swiper-pagination-bullet").length(), 3);
        pagination.clear(&doc);
        assert_eq!(doc.select(".dots").html().to_string(), before);
    }

    #[test]
    fn bullet_click_yields_group_start() {
        let (doc, mut pagination) = setup();
        pagination.rebuild(&doc, 10, 4);
        let bullets: Vec<NodeId> = doc
            .select(".swiper-pagination-bullet")
            .nodes()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(pagination.seek_target(&doc, bullets[2]), Some(8));
        assert_eq!(pagination.seek_target(&doc, pagination.element), None);
    }
}
