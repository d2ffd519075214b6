//! Trigger scheduler: at-most-once activation with an optional fire delay.

use serde::{Deserialize, Serialize};

use crate::error::{FxError, Result};
use crate::viewport::{should_fire, Span, Viewport};

/// Two-state activation machine. `Fired` is absorbing: the only way back
/// is an explicit [`TriggerState::rearm`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerState {
    #[default]
    Pending,
    Fired,
}

impl TriggerState {
    /// Pending → Fired. Rejects re-entry into Fired.
    pub fn fire(&mut self) -> Result<()> {
        match self {
            Self::Pending => {
                *self = Self::Fired;
                Ok(())
            }
            Self::Fired => Err(FxError::AlreadyFired),
        }
    }

    pub fn rearm(&mut self) {
        *self = Self::Pending;
    }
}

/// Outcome of one trigger evaluation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Decision {
    /// Not in the trigger band, or already fired.
    Idle,
    /// A delayed fire was scheduled for `deadline`.
    Scheduled { deadline: f64 },
    /// A delayed fire is already in flight; this evaluation is a no-op.
    Waiting,
    /// Fire immediately.
    FireNow,
}

#[derive(Clone, Debug)]
pub struct Trigger {
    state: TriggerState,
    offset_percent: f64,
    delay_ms: f64,
    pending: Option<f64>,
}

impl Trigger {
    pub fn new(offset_percent: f64, delay_ms: f64) -> Self {
        Self {
            state: TriggerState::Pending,
            offset_percent,
            delay_ms,
            pending: None,
        }
    }

    #[inline]
    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Deadline of the in-flight delayed fire, if any.
    #[inline]
    pub fn deadline(&self) -> Option<f64> {
        self.pending
    }

    /// Evaluate the fire condition at `now`.
    pub fn evaluate(&mut self, span: Span, vp: &Viewport, now: f64) -> Decision {
        if self.state == TriggerState::Fired {
            return Decision::Idle;
        }
        if !should_fire(span, vp, self.offset_percent) {
            return Decision::Idle;
        }
        if self.delay_ms > 0.0 {
            if self.pending.is_some() {
                return Decision::Waiting;
            }
            let deadline = now + self.delay_ms;
            self.pending = Some(deadline);
            return Decision::Scheduled { deadline };
        }
        Decision::FireNow
    }

    /// Expire the delay timer. Returns true exactly once per scheduled
    /// deadline, when `now` has reached it.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.pending {
            Some(deadline) if now >= deadline => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Pending → Fired. Any in-flight delay is dropped with the transition.
    pub fn fire(&mut self) -> Result<()> {
        self.pending = None;
        self.state.fire()
    }

    /// Fired → Pending, dropping any stale timer.
    pub fn rearm(&mut self) {
        self.pending = None;
        self.state.rearm();
    }
}
