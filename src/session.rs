//! Merge session state.
//!
//! A [`MergeSession`] is the ephemeral state of one merge invocation: the
//! frozen order it operates on, a phase, and a monotonically non-decreasing
//! progress ratio. State changes are published through a `tokio::sync::watch`
//! channel so the embedding host can drive a progress bar that reflects real
//! completion. A session transitions exactly once to a terminal phase and is
//! then discarded; a new trigger creates a new session, never resumes one.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::collection::FileId;

/// Phase of a merge session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergePhase {
    /// No session in flight.
    Idle,
    /// A session is consuming its snapshot.
    Running,
    /// The session produced an artifact.
    Succeeded,
    /// The session aborted; no artifact was produced.
    Failed,
}

impl MergePhase {
    /// Check whether this phase is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Observable state of the current (or most recent) merge session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Current phase.
    pub phase: MergePhase,

    /// Progress ratio in [0, 1]. Non-decreasing within a session; reaches
    /// 1.0 only together with `Succeeded`.
    pub ratio: f64,
}

impl SessionState {
    /// The state before any merge has been triggered.
    pub fn idle() -> Self {
        Self {
            phase: MergePhase::Idle,
            ratio: 0.0,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Ephemeral state for one merge invocation.
///
/// Created by [`MergePipeline`](crate::pipeline::MergePipeline) when a merge
/// is triggered; publishes into the pipeline's state channel and is dropped
/// after its single terminal transition.
pub struct MergeSession {
    state: Arc<watch::Sender<SessionState>>,
    order: Vec<FileId>,
}

impl MergeSession {
    /// Begin a session over a frozen order, publishing `Running` at ratio 0.
    pub fn begin(state: Arc<watch::Sender<SessionState>>, order: Vec<FileId>) -> Self {
        state.send_replace(SessionState {
            phase: MergePhase::Running,
            ratio: 0.0,
        });
        Self { state, order }
    }

    /// The collection order frozen at the moment the merge started.
    pub fn order(&self) -> &[FileId] {
        &self.order
    }

    /// Publish progress after finishing file `done` of `total`.
    ///
    /// The update is observable through the channel before the driver touches
    /// the next file. The final `total/total` update is withheld here and
    /// folded into [`succeed`](Self::succeed), so 1.0 is only ever observed
    /// together with the `Succeeded` phase.
    pub fn advance(&self, done: usize, total: usize) {
        if total == 0 || done >= total {
            return;
        }
        let ratio = done as f64 / total as f64;
        self.state.send_modify(|state| {
            if state.phase == MergePhase::Running && ratio > state.ratio {
                state.ratio = ratio;
            }
        });
    }

    /// Transition to `Succeeded` at ratio 1.0.
    pub fn succeed(self) {
        self.state.send_modify(|state| {
            if state.phase == MergePhase::Running {
                state.phase = MergePhase::Succeeded;
                state.ratio = 1.0;
            }
        });
    }

    /// Transition to `Failed`, keeping the last published ratio.
    pub fn fail(self) {
        self.state.send_modify(|state| {
            if state.phase == MergePhase::Running {
                state.phase = MergePhase::Failed;
            }
        });
    }
}
