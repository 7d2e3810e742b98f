// ABOUTME: Debounced viewport resize handling and the initialize/tear-down/reconfigure decision.
// ABOUTME: Coalesces resize bursts (latest width wins) and fires once the window has passed.

//! Resize coordination.
//!
//! [`Debouncer`] coalesces a burst of resize events into one evaluation of
//! the settled width. It is driven by injected timestamps, so callers decide
//! what "now" is and tests need no real timers.
//!
//! [`decide`] is the tri-state policy applied per container once the width
//! settles: a container only changes structure when it crosses the
//! eligibility boundary; otherwise it is reconfigured in place or left alone.

use std::time::{Duration, Instant};

use crate::breakpoints::ResolvedLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    width: u32,
    /// `None` when the window is too long to land on a representable instant.
    deadline: Option<Instant>,
}

/// Latest-wins debouncer for viewport widths.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    pending: Option<Pending>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Records a resize. Every call pushes the deadline back by a full window.
    pub fn push(&mut self, width: u32, now: Instant) {
        self.pending = Some(Pending {
            width,
            deadline: now.checked_add(self.window),
        });
    }

    /// Returns the settled width once `now` has reached the deadline.
    pub fn poll(&mut self, now: Instant) -> Option<u32> {
        match self.pending {
            Some(Pending {
                width,
                deadline: Some(deadline),
            }) if now >= deadline => {
                self.pending = None;
                Some(width)
            }
            _ => None,
        }
    }

    /// Returns the pending width immediately, if any.
    pub fn flush(&mut self) -> Option<u32> {
        self.pending.take().map(|p| p.width)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// What a settled width means for one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDecision {
    /// Static and now eligible: transform and attach.
    Initialize,
    /// Transformed and now ineligible: detach, revert, unregister.
    TearDown,
    /// Transformed, still eligible, layout changed: update in place.
    Reconfigure,
    /// Transformed, still eligible, layout unchanged.
    Unchanged,
    /// Static and still ineligible.
    StayStatic,
}

/// Tri-state resize policy.
pub fn decide(transformed: bool, eligible: bool, layout_changed: bool) -> ResizeDecision {
    match (transformed, eligible) {
        (false, true) => ResizeDecision::Initialize,
        (false, false) => ResizeDecision::StayStatic,
        (true, false) => ResizeDecision::TearDown,
        (true, true) if layout_changed => ResizeDecision::Reconfigure,
        (true, true) => ResizeDecision::Unchanged,
    }
}

/// Debounced resize front end of one converter.
#[derive(Debug, Clone)]
pub struct ResizeCoordinator {
    debouncer: Debouncer,
}

impl ResizeCoordinator {
    pub fn new(window: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(window),
        }
    }

    pub fn on_resize(&mut self, width: u32, now: Instant) {
        self.debouncer.push(width, now);
    }

    /// Returns a width to evaluate once the burst has settled.
    pub fn poll(&mut self, now: Instant) -> Option<u32> {
        self.debouncer.poll(now)
    }

    /// Forces the pending width out without waiting.
    pub fn flush(&mut self) -> Option<u32> {
        self.debouncer.flush()
    }

    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Decision for one container given its current and newly resolved layouts.
    pub fn evaluate(
        current: Option<&ResolvedLayout>,
        resolved: &ResolvedLayout,
        item_count: usize,
    ) -> ResizeDecision {
        let changed = current.map(|c| c != resolved).unwrap_or(true);
        decide(current.is_some(), resolved.is_eligible(item_count), changed)
    }
}
