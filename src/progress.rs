//! Progress simulation and submission gating for long backend requests.
//!
//! The backend gives no incremental progress for predict/validate, so the
//! UI animates an estimate that approaches 95% and only completes when the
//! response lands. Cooperative like the rest of the crate: callers poll
//! from their event loop.

use std::time::{Duration, Instant};

use crate::cancel::CancelToken;

/// Fraction the simulation saturates at while the request is in flight.
const SIMULATED_CEILING: f32 = 0.95;

/// What a progress poll reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressState {
    /// Simulated fraction in `[0, 0.95]`.
    Running(f32),
    /// The request finished; show 100% and stop polling.
    Completed,
    /// The user cancelled; previous results stay untouched and no error
    /// is shown.
    Cancelled,
}

/// Time-based progress estimate for one in-flight request.
#[derive(Debug, Clone)]
pub struct ProgressSim {
    started: Instant,
    estimate: Duration,
    token: CancelToken,
    completed: bool,
}

impl ProgressSim {
    /// Start a simulation expecting the request to take roughly `estimate`.
    pub fn start(estimate: Duration, token: CancelToken, now: Instant) -> Self {
        Self {
            started: now,
            estimate: estimate.max(Duration::from_millis(1)),
            token,
            completed: false,
        }
    }

    /// Mark the request as finished successfully.
    pub fn complete(&mut self) {
        self.completed = true;
    }

    /// Current state; linear ramp to the ceiling over the estimate.
    pub fn poll(&self, now: Instant) -> ProgressState {
        if self.completed {
            return ProgressState::Completed;
        }
        if self.token.is_cancelled() {
            return ProgressState::Cancelled;
        }
        let elapsed = now.duration_since(self.started).as_secs_f32();
        let fraction = (elapsed / self.estimate.as_secs_f32()).min(1.0) * SIMULATED_CEILING;
        ProgressState::Running(fraction)
    }
}

/// Kinds of long-running submissions the dashboard can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Predict,
    Validate,
}

/// Tracks the single allowed outstanding submission.
///
/// Overlapping requests are unsupported; the UI disables re-submission
/// while one is outstanding.
#[derive(Debug, Default)]
pub struct RequestTracker {
    active: Option<RequestKind>,
}

impl RequestTracker {
    /// Whether a new submission may start.
    pub fn can_start(&self) -> bool {
        self.active.is_none()
    }

    /// Mark a submission as running. Returns false when one is already
    /// outstanding.
    pub fn mark_started(&mut self, kind: RequestKind) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(kind);
        true
    }

    /// Mark the outstanding submission as finished, however it ended.
    pub fn mark_finished(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<RequestKind> {
        self.active
    }
}
