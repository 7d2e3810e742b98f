// ABOUTME: Next-tick deferred work for structural DOM changes awaiting layout settle.
// ABOUTME: Entries carry an instance id and generation so torn-down instances never run stale work.

use std::collections::VecDeque;

use crate::registry::InstanceId;

/// Work deferred until after the current DOM mutation has been flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Attach the carousel engine to a freshly transformed container.
    Mount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    pub instance: InstanceId,
    /// Candidate generation at scheduling time; stale when it no longer matches.
    pub generation: u64,
    pub task: DeferredTask,
}

/// FIFO of deferred work. Not a timer: the owner drains it on its next tick.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    queue: VecDeque<Deferred>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instance: InstanceId, generation: u64, task: DeferredTask) {
        self.queue.push_back(Deferred {
            instance,
            generation,
            task,
        });
    }

    /// Drops every pending entry for `instance`.
    pub fn cancel(&mut self, instance: InstanceId) {
        self.queue.retain(|d| d.instance != instance);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Takes everything queued so far. Work queued while draining waits for the next drain.
    pub fn drain(&mut self) -> Vec<Deferred> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_is_fifo_and_cancel_is_per_instance() {
        let mut queue = DeferredQueue::new();
        let a = InstanceId::new(1);
        let b = InstanceId::new(2);
        queue.push(a, 0, DeferredTask::Mount);
        queue.push(b, 0, DeferredTask::Mount);
        queue.push(a, 1, DeferredTask::Mount);
        assert_eq!(queue.len(), 3);

        queue.cancel(a);
        assert_eq!(queue.len(), 1);

        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].instance, b);
        assert!(queue.is_empty());
    }
}
