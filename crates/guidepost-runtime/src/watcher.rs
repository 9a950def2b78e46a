#![forbid(unsafe_code)]

//! Resize debouncing and mutation re-observation.
//!
//! Both watchers are plain timers driven by the tour's clock; neither
//! touches the environment. The tour decides what to do when they fire.
//!
//! # Resize
//!
//! [`ResizeDebouncer`] is trailing-edge: every resize pushes the deadline
//! out, and it fires once the window has been quiet for the delay.
//!
//! # Mutations
//!
//! [`MutationWatcher`] remembers the observed root and turns mutation
//! records into settle timers. Only records that add nodes matter: the
//! first added node is re-measured after the settle delay, once late layout
//! has had time to land. Records that only remove nodes are ignored.

use std::time::Duration;

use tracing::trace;

use crate::pipeline::Generation;

/// Trailing-edge debounce for resize notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeDebouncer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl ResizeDebouncer {
    /// Create a debouncer with the given quiet period.
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record a resize at `now`.
    pub fn notify(&mut self, now: Duration) {
        self.deadline = Some(now.saturating_add(self.delay));
    }

    /// Check whether the debounce fired by `now`. Fires at most once per
    /// burst.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop a pending notification.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a notification is waiting.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// One batch of child-list changes under the observed root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord<N> {
    /// Nodes inserted.
    pub added: Vec<N>,
    /// Nodes removed.
    pub removed: Vec<N>,
}

impl<N> MutationRecord<N> {
    /// A record that inserted `nodes`.
    pub fn added(nodes: Vec<N>) -> Self {
        Self {
            added: nodes,
            removed: Vec::new(),
        }
    }

    /// A record that removed `nodes`.
    pub fn removed(nodes: Vec<N>) -> Self {
        Self {
            added: Vec::new(),
            removed: nodes,
        }
    }
}

/// A pending re-measurement of an inserted node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleTimer<N> {
    /// Run the timer was scheduled under.
    pub generation: Generation,
    /// Node to re-measure.
    pub node: N,
    /// When it fires.
    pub due: Duration,
}

/// Observed root plus pending settle timers.
#[derive(Debug, Clone)]
pub struct MutationWatcher<N> {
    root: Option<N>,
    settle: Duration,
    timers: Vec<SettleTimer<N>>,
}

impl<N: Clone> MutationWatcher<N> {
    /// Create a watcher that observes nothing.
    pub fn new(settle: Duration) -> Self {
        Self {
            root: None,
            settle,
            timers: Vec::new(),
        }
    }

    /// Start observing `root`, replacing any previous root.
    pub fn observe(&mut self, root: N) {
        self.root = Some(root);
    }

    /// Stop observing and drop every pending timer.
    pub fn disconnect(&mut self) {
        self.root = None;
        self.timers.clear();
    }

    /// Whether a root is observed.
    pub fn is_observing(&self) -> bool {
        self.root.is_some()
    }

    /// Observed root.
    pub fn root(&self) -> Option<&N> {
        self.root.as_ref()
    }

    /// Handle a record. Returns `true` when a settle timer was scheduled.
    pub fn record(&mut self, record: &MutationRecord<N>, generation: Generation, now: Duration) -> bool {
        let Some(node) = record.added.first() else {
            trace!(target: "guidepost.watch", removed = record.removed.len(), "removal-only mutation ignored");
            return false;
        };
        self.timers.push(SettleTimer {
            generation,
            node: node.clone(),
            due: now.saturating_add(self.settle),
        });
        true
    }

    /// Remove and return the timers due by `now`, oldest first.
    pub fn take_due(&mut self, now: Duration) -> Vec<SettleTimer<N>> {
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|timer| timer.due <= now);
        self.timers = waiting;
        due
    }

    /// Number of pending timers.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }
}
