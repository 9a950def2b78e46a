#![forbid(unsafe_code)]

//! Show-step pipeline runs.
//!
//! Showing a step is a short sequence of stages, some of which await
//! hooks:
//!
//! ```text
//! StepBefore ─▶ TourBefore ─▶ Locate ─▶ Action ─▶ AfterStep ─▶ Done
//!   (hook)        (hook)      (sync)     (hook)     (hook)
//! ```
//!
//! A [`PipelineRun`] records which stage a run has reached and the hook
//! future it is waiting on. The tour advances it; this module only owns the
//! bookkeeping and the polling.
//!
//! # Generations
//!
//! Every run gets a fresh [`Generation`]. Starting a run supersedes the
//! previous one: its future is dropped and its deferred work (scroll
//! completion, mutation settle timers) is discarded when it comes due,
//! because it carries the old generation.
//!
//! # Polling
//!
//! Hook futures are polled with a no-op waker. The host is expected to
//! call [`crate::Tour::tick`] regularly (for example on every animation
//! frame); a future that is still pending is simply polled again on the
//! next call. Futures that are ready immediately complete within the call
//! that started them.

use std::fmt;
use std::task::{Context, Poll};

use futures::FutureExt;

use crate::hooks::{HookError, HookFuture, HookKind};

/// Monotonic id of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    /// The generation after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stage a run is at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// About to start the step's pre-action.
    StepBefore,
    /// About to start the tour's before-step hook.
    TourBefore,
    /// About to resolve the target and dispatch geometry.
    Locate,
    /// About to start the step's main action.
    Action,
    /// About to start the tour's after-step hook.
    AfterStep,
    /// Finished.
    Done,
}

/// Result of polling a run's pending hook.
#[derive(Debug)]
pub enum HookPoll {
    /// Nothing is pending; the run may advance.
    Idle,
    /// The pending hook has not completed.
    Pending,
    /// The pending hook failed.
    Failed(HookKind, HookError),
}

/// Bookkeeping for one show-step run.
pub struct PipelineRun<N> {
    generation: Generation,
    index: usize,
    stage: Stage,
    pending: Option<(HookKind, HookFuture)>,
    node: Option<N>,
    span: tracing::Span,
}

impl<N> PipelineRun<N> {
    /// Start a run for step `index`.
    pub fn new(generation: Generation, index: usize) -> Self {
        let span = tracing::debug_span!(
            target: "guidepost.pipeline",
            "tour.show_step",
            index,
            generation = generation.get(),
        );
        Self {
            generation,
            index,
            stage: Stage::StepBefore,
            pending: None,
            node: None,
            span,
        }
    }

    /// Generation of this run.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Step being shown.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Tracing span covering this run.
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Node resolved by the locate stage.
    pub fn node(&self) -> Option<&N> {
        self.node.as_ref()
    }

    /// Record the resolved node.
    pub fn set_node(&mut self, node: Option<N>) {
        self.node = node;
    }

    /// Hook this run is waiting on, if any.
    pub fn waiting_on(&self) -> Option<HookKind> {
        self.pending.as_ref().map(|(kind, _)| *kind)
    }

    /// Move to `stage`, optionally waiting on a hook first.
    pub fn advance(&mut self, stage: Stage, hook: Option<(HookKind, HookFuture)>) {
        self.stage = stage;
        self.pending = hook;
    }

    /// Poll the pending hook once.
    pub fn poll_pending(&mut self) -> HookPoll {
        let Some((kind, future)) = self.pending.as_mut() else {
            return HookPoll::Idle;
        };
        let kind = *kind;
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        match future.poll_unpin(&mut cx) {
            Poll::Pending => HookPoll::Pending,
            Poll::Ready(result) => {
                self.pending = None;
                match result {
                    Ok(()) => HookPoll::Idle,
                    Err(error) => HookPoll::Failed(kind, error),
                }
            }
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for PipelineRun<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineRun")
            .field("generation", &self.generation)
            .field("index", &self.index)
            .field("stage", &self.stage)
            .field("waiting_on", &self.waiting_on())
            .field("node", &self.node)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::Hook;
    use futures::channel::oneshot;

    #[test]
    fn generations_increase() {
        let g = Generation::default();
        assert!(g.next() > g);
        assert_eq!(g.next().next().get(), 2);
        assert_eq!(g.next().to_string(), "#1");
    }

    #[test]
    fn idle_without_pending_hook() {
        let mut run: PipelineRun<u32> = PipelineRun::new(Generation::default(), 0);
        assert!(matches!(run.poll_pending(), HookPoll::Idle));
        assert_eq!(run.stage(), Stage::StepBefore);
    }

    #[test]
    fn ready_hook_completes_in_one_poll() {
        let mut run: PipelineRun<u32> = PipelineRun::new(Generation::default(), 0);
        let hook = Hook::sync(|_: ()| Ok(()));
        run.advance(Stage::TourBefore, hook.invoke(()).map(|f| (HookKind::StepBefore, f)));
        assert_eq!(run.waiting_on(), Some(HookKind::StepBefore));
        assert!(matches!(run.poll_pending(), HookPoll::Idle));
        assert_eq!(run.waiting_on(), None);
    }

    #[test]
    fn pending_hook_waits_for_signal() {
        let (tx, rx) = oneshot::channel::<()>();
        let mut run: PipelineRun<u32> = PipelineRun::new(Generation::default(), 1);
        let future: HookFuture = Box::pin(async move {
            rx.await.map_err(|_| HookError::new("cancelled"))
        });
        run.advance(Stage::Locate, Some((HookKind::TourBefore, future)));
        assert!(matches!(run.poll_pending(), HookPoll::Pending));
        assert!(matches!(run.poll_pending(), HookPoll::Pending));
        tx.send(()).unwrap();
        assert!(matches!(run.poll_pending(), HookPoll::Idle));
    }

    #[test]
    fn failed_hook_reports_kind() {
        let mut run: PipelineRun<u32> = PipelineRun::new(Generation::default(), 0);
        let hook = Hook::new(|_: ()| async { Err(HookError::new("nope")) });
        run.advance(Stage::AfterStep, hook.invoke(()).map(|f| (HookKind::Action, f)));
        match run.poll_pending() {
            HookPoll::Failed(kind, error) => {
                assert_eq!(kind, HookKind::Action);
                assert_eq!(error.message(), "nope");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
