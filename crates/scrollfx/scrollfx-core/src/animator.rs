//! Per-element state of a scroll-triggered animation.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{AnimationKind, AnimationOptions, Finish};
use crate::error::{FxError, Result};
use crate::ids::{ListenerId, TargetId};
use crate::outputs::{FxEvent, Outputs, RenderOp};
use crate::random::RandomSource;
use crate::stepper::count::COUNT_FRAME_MS;
use crate::stepper::{
    format_count, parse_count_finish, CancelToken, CountFrame, CountStepper, ScrambleFrame,
    ScrambleStepper,
};
use crate::trigger::{Decision, Trigger, TriggerState};
use crate::viewport::{classify, Span, Viewport};

/// Coarse lifecycle of the stepper, reported to hosts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationPhase {
    Idle,
    Running,
    Complete,
    Cancelled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationStatus {
    pub trigger: TriggerState,
    pub phase: AnimationPhase,
}

/// What the element animates toward, resolved at bind time.
#[derive(Clone, Debug, PartialEq)]
enum Goal {
    Count(i64),
    Text(String),
}

#[derive(Debug)]
enum Runner {
    Count {
        stepper: CountStepper,
        next_tick: f64,
    },
    Scramble {
        stepper: ScrambleStepper,
        next_tick: f64,
    },
}

#[derive(Debug)]
enum Phase {
    Idle,
    Running(Runner),
    Complete,
    Cancelled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Outcome {
    Running,
    Complete,
    Cancelled,
}

#[derive(Debug)]
pub struct Animator {
    pub id: TargetId,
    opts: AnimationOptions,
    trigger: Trigger,
    span: Span,
    pub(crate) listener: Option<ListenerId>,
    goal: Goal,
    phase: Phase,
    cancel: CancelToken,
}

impl Animator {
    /// Resolve the finish value from `initial_text` and reset the element
    /// to its starting render.
    pub fn bind(
        id: TargetId,
        opts: AnimationOptions,
        span: Span,
        initial_text: &str,
        out: &mut Outputs,
    ) -> Result<Self> {
        opts.validate()?;
        let goal = resolve_goal(&opts, initial_text)?;

        if opts.finish == Finish::Flag(true) {
            let text = match opts.animation {
                AnimationKind::Count => format_count(opts.start, grouping(&opts)),
                AnimationKind::Scramble => String::new(),
            };
            out.push_op(RenderOp::SetText { target: id, text });
        }

        Ok(Self {
            id,
            trigger: Trigger::new(opts.offset, opts.delay),
            opts,
            span,
            listener: None,
            goal,
            phase: Phase::Idle,
            cancel: CancelToken::new(),
        })
    }

    #[inline]
    pub fn options(&self) -> &AnimationOptions {
        &self.opts
    }

    pub fn set_span(&mut self, span: Span) {
        self.span = span;
    }

    pub fn status(&self) -> AnimationStatus {
        AnimationStatus {
            trigger: self.trigger.state(),
            phase: match self.phase {
                Phase::Idle => AnimationPhase::Idle,
                Phase::Running(_) => AnimationPhase::Running,
                Phase::Complete => AnimationPhase::Complete,
                Phase::Cancelled => AnimationPhase::Cancelled,
            },
        }
    }

    /// Earliest clock value at which this animation has work to do.
    pub fn next_deadline(&self) -> Option<f64> {
        match &self.phase {
            Phase::Idle => self.trigger.deadline(),
            Phase::Running(Runner::Count { next_tick, .. })
            | Phase::Running(Runner::Scramble { next_tick, .. }) => Some(*next_tick),
            Phase::Complete | Phase::Cancelled => None,
        }
    }

    /// Viewport evaluation from a scroll/resize fan-out. Returns true when
    /// the stepper was started by this call.
    pub fn evaluate(
        &mut self,
        vp: &Viewport,
        now: f64,
        out: &mut Outputs,
        rng: &mut dyn RandomSource,
    ) -> bool {
        if self.opts.retrigger
            && self.trigger.state() == TriggerState::Fired
            && matches!(self.phase, Phase::Complete)
            && !classify(self.span, vp).is_intersecting()
        {
            self.rearm(out);
        }

        match self.trigger.evaluate(self.span, vp, now) {
            Decision::Idle | Decision::Waiting => false,
            Decision::Scheduled { deadline } => {
                debug!("target {:?}: fire scheduled for {deadline}", self.id);
                out.push_event(FxEvent::TriggerScheduled {
                    target: self.id,
                    deadline,
                });
                false
            }
            Decision::FireNow => self.start(now, out, rng),
        }
    }

    /// Timer work due at `now`: an expired fire delay, then stepper ticks.
    /// Returns true when a delayed fire started the stepper.
    pub fn advance(&mut self, now: f64, out: &mut Outputs, rng: &mut dyn RandomSource) -> bool {
        if matches!(self.phase, Phase::Idle) && self.trigger.poll(now) {
            return self.start(now, out, rng);
        }
        self.drive(now, false, out, rng);
        false
    }

    /// Invoke the stepper. Refuses to run twice.
    fn start(&mut self, now: f64, out: &mut Outputs, rng: &mut dyn RandomSource) -> bool {
        if let Err(err) = self.trigger.fire() {
            debug!("target {:?}: {err}", self.id);
            return false;
        }
        debug!("target {:?}: {:?} animation started", self.id, self.opts.animation);
        out.push_event(FxEvent::AnimationStarted { target: self.id });
        out.push_op(RenderOp::FadeIn {
            target: self.id,
            duration_ms: self.opts.fade,
        });

        let runner = match &self.goal {
            Goal::Count(finish) => Runner::Count {
                stepper: CountStepper::new(
                    self.opts.start,
                    *finish,
                    self.opts.duration,
                    self.opts.easing,
                    now,
                    self.cancel.clone(),
                )
                .with_delimiter(grouping(&self.opts).map(str::to_string)),
                next_tick: now,
            },
            Goal::Text(text) => {
                out.push_op(RenderOp::SetText {
                    target: self.id,
                    text: String::new(),
                });
                out.push_op(RenderOp::CreateOverlay {
                    target: self.id,
                    fade_ms: self.opts.fade,
                });
                Runner::Scramble {
                    stepper: ScrambleStepper::new(
                        text,
                        &self.opts.code_glyphs,
                        self.opts.duration,
                        self.opts.steps_per_glyph,
                        self.cancel.clone(),
                    ),
                    next_tick: now,
                }
            }
        };
        self.phase = Phase::Running(runner);
        self.drive(now, true, out, rng);
        true
    }

    /// Run the ticks due at `now`. `force` runs one tick boundary even if
    /// none is due yet.
    fn drive(&mut self, now: f64, force: bool, out: &mut Outputs, rng: &mut dyn RandomSource) {
        let id = self.id;
        let Phase::Running(runner) = &mut self.phase else {
            return;
        };

        let outcome = match runner {
            Runner::Count { stepper, next_tick } => {
                if !force && now < *next_tick {
                    return;
                }
                match stepper.step(now) {
                    CountFrame::Tick { text, .. } => {
                        out.push_op(RenderOp::SetText { target: id, text });
                        *next_tick = now + COUNT_FRAME_MS;
                        Outcome::Running
                    }
                    CountFrame::Finished { text } => {
                        out.push_op(RenderOp::SetText { target: id, text });
                        Outcome::Complete
                    }
                    CountFrame::Cancelled => Outcome::Cancelled,
                }
            }
            Runner::Scramble { stepper, next_tick } => {
                // Ticks that fell due since the last call run back to back;
                // only their final render is emitted.
                let mut reveal = None;
                let mut overlay = None;
                let mut outcome = Outcome::Running;
                let mut forced = force;
                while forced || *next_tick <= now {
                    forced = false;
                    match stepper.step(rng) {
                        ScrambleFrame::Tick {
                            reveal: grown,
                            overlay: glyphs,
                        } => {
                            if grown.is_some() {
                                reveal = grown;
                            }
                            overlay = Some(glyphs);
                            *next_tick += stepper.interval_ms();
                        }
                        ScrambleFrame::Finished { text } => {
                            reveal = Some(text);
                            outcome = Outcome::Complete;
                            break;
                        }
                        ScrambleFrame::Cancelled => {
                            outcome = Outcome::Cancelled;
                            break;
                        }
                    }
                }
                if let Some(text) = reveal {
                    out.push_op(RenderOp::SetText { target: id, text });
                }
                match (outcome, overlay) {
                    (Outcome::Running, Some(text)) => {
                        out.push_op(RenderOp::SetOverlayText { target: id, text })
                    }
                    (Outcome::Running, None) => {}
                    _ => out.push_op(RenderOp::RemoveOverlay { target: id }),
                }
                outcome
            }
        };

        match outcome {
            Outcome::Running => {}
            Outcome::Complete => {
                debug!("target {id:?}: animation complete");
                self.phase = Phase::Complete;
                out.push_event(FxEvent::AnimationCompleted { target: id });
            }
            Outcome::Cancelled => {
                debug!("target {id:?}: animation cancelled");
                self.phase = Phase::Cancelled;
                out.push_event(FxEvent::AnimationCancelled { target: id });
            }
        }
    }

    /// Cancel at the current tick boundary. A target that has not fired yet
    /// is moved to Fired so it never starts. Returns false when there was
    /// nothing left to cancel.
    pub fn cancel(&mut self, now: f64, out: &mut Outputs, rng: &mut dyn RandomSource) -> bool {
        self.cancel.cancel();
        match self.phase {
            Phase::Idle => {
                if self.trigger.state() == TriggerState::Pending {
                    let _ = self.trigger.fire();
                }
                self.phase = Phase::Cancelled;
                out.push_event(FxEvent::AnimationCancelled { target: self.id });
                true
            }
            Phase::Running(_) => {
                self.drive(now, true, out, rng);
                true
            }
            Phase::Complete | Phase::Cancelled => false,
        }
    }

    /// Tear down render state owned by this animation (the overlay).
    pub fn teardown(&mut self, out: &mut Outputs) {
        self.cancel.cancel();
        if let Phase::Running(Runner::Scramble { .. }) = self.phase {
            out.push_op(RenderOp::RemoveOverlay { target: self.id });
        }
        self.phase = Phase::Cancelled;
    }

    /// Fired → Pending after a completed run, restoring the start render.
    fn rearm(&mut self, out: &mut Outputs) {
        self.trigger.rearm();
        self.phase = Phase::Idle;
        self.cancel = CancelToken::new();
        let text = match self.goal {
            Goal::Count(_) => format_count(self.opts.start, grouping(&self.opts)),
            Goal::Text(_) => String::new(),
        };
        out.push_op(RenderOp::SetText {
            target: self.id,
            text,
        });
        out.push_event(FxEvent::TriggerRearmed { target: self.id });
        debug!("target {:?}: re-armed", self.id);
    }
}

fn grouping(opts: &AnimationOptions) -> Option<&str> {
    (!opts.no_comma).then_some(opts.delimiter.as_str())
}

fn resolve_goal(opts: &AnimationOptions, initial_text: &str) -> Result<Goal> {
    match opts.animation {
        AnimationKind::Count => {
            let finish = match &opts.finish {
                Finish::Flag(_) => parse_count_finish(initial_text, grouping(opts)),
                Finish::Number(n) if n.is_finite() => Some(n.trunc() as i64),
                Finish::Number(_) => None,
                Finish::Text(text) => parse_count_finish(text, grouping(opts)),
            };
            finish.map(Goal::Count).ok_or_else(|| FxError::InvalidFinish {
                text: match &opts.finish {
                    Finish::Text(text) => text.clone(),
                    Finish::Number(n) => n.to_string(),
                    Finish::Flag(_) => initial_text.to_string(),
                },
            })
        }
        AnimationKind::Scramble => Ok(Goal::Text(match &opts.finish {
            Finish::Flag(_) => initial_text.to_string(),
            Finish::Number(n) => n.to_string(),
            Finish::Text(text) => text.clone(),
        })),
    }
}
