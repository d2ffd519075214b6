//! Engine: owns every bound widget instance, the central dispatcher and the
//! clock-driven timers.
//!
//! Methods:
//! - new, with_random, bind_animation / bind_parallax (+ attribute variants),
//!   unbind_*, cancel, update (geometry → events → timers)
//!
//! Render ops produced outside `update` (binding, unbinding, cancel) are
//! delivered with the next `update` result.

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;

use crate::animator::{AnimationPhase, AnimationStatus, Animator};
use crate::attrs;
use crate::background::{Background, Scope};
use crate::config::{AnimationOptions, Config, ParallaxOptions};
use crate::dispatch::{Dispatcher, EventMask, Listener, ViewportEvent};
use crate::error::{FxError, Result};
use crate::ids::{IdAllocator, ParallaxId, TargetId};
use crate::inputs::{BackgroundInit, ElementInit, GeometryUpdate, HostEvent, Inputs};
use crate::outputs::Outputs;
use crate::parallax::Size;
use crate::random::{RandomSource, SplitMix64};
use crate::trigger::TriggerState;
use crate::viewport::{Span, Viewport};

pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    viewport: Viewport,
    dispatcher: Dispatcher,
    animations: IndexMap<TargetId, Animator>,
    backgrounds: IndexMap<ParallaxId, Background>,
    rng: Box<dyn RandomSource>,
    outputs: Outputs,
    /// Set once `outputs` has been handed to the host.
    flushed: bool,
}

impl Engine {
    /// Create a new engine with the given config and a seeded generator.
    pub fn new(cfg: Config) -> Self {
        Self {
            viewport: cfg.viewport,
            cfg,
            ids: IdAllocator::new(),
            dispatcher: Dispatcher::new(),
            animations: IndexMap::new(),
            backgrounds: IndexMap::new(),
            rng: Box::new(SplitMix64::default()),
            outputs: Outputs::default(),
            flushed: false,
        }
    }

    /// Replace the glyph generator used by scramble overlays.
    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn animation_status(&self, target: TargetId) -> Option<AnimationStatus> {
        self.animations.get(&target).map(Animator::status)
    }

    pub fn background(&self, parallax: ParallaxId) -> Option<&Background> {
        self.backgrounds.get(&parallax)
    }

    /// Drop ops already delivered before new ones are written.
    fn begin_write(&mut self) {
        if self.flushed {
            self.outputs.clear();
            self.flushed = false;
        }
    }

    /// Bind a count/scramble animation to an element. The element is
    /// evaluated against the current viewport right away.
    pub fn bind_animation(
        &mut self,
        opts: AnimationOptions,
        element: &ElementInit,
        now: f64,
    ) -> Result<TargetId> {
        self.begin_write();
        let id = self.ids.alloc_target();
        let span = Span::new(element.top, element.height);
        let mut anim = Animator::bind(id, opts, span, &element.text, &mut self.outputs)?;
        anim.listener = Some(self.dispatcher.subscribe(
            &mut self.ids,
            Listener::Trigger(id),
            EventMask::BOTH,
        ));
        debug!("target {id:?}: bound {:?}", anim.options().animation);

        if self.viewport.height > 0.0 {
            anim.evaluate(&self.viewport, now, &mut self.outputs, &mut *self.rng);
            release_trigger(&mut self.dispatcher, &mut anim);
        }
        self.animations.insert(id, anim);
        Ok(id)
    }

    /// Bind from declarative attributes (`data-animate*` or dataset keys),
    /// with `explicit` options taking precedence.
    pub fn bind_animation_from_attributes<'a, I>(
        &mut self,
        attributes: I,
        explicit: Option<&Value>,
        element: &ElementInit,
        now: f64,
    ) -> Result<TargetId>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let opts = attrs::animation_options(attributes, explicit)?;
        self.bind_animation(opts, element, now)
    }

    pub fn unbind_animation(&mut self, target: TargetId) -> Result<()> {
        self.begin_write();
        let mut anim = self
            .animations
            .shift_remove(&target)
            .ok_or(FxError::TargetNotFound(target))?;
        anim.teardown(&mut self.outputs);
        if let Some(listener) = anim.listener.take() {
            self.dispatcher.unsubscribe(listener);
        }
        debug!("target {target:?}: unbound");
        Ok(())
    }

    /// Cancel an animation at its next tick boundary. Returns false when it
    /// had already finished.
    pub fn cancel(&mut self, target: TargetId, now: f64) -> Result<bool> {
        self.begin_write();
        let anim = self
            .animations
            .get_mut(&target)
            .ok_or(FxError::TargetNotFound(target))?;
        let cancelled = anim.cancel(now, &mut self.outputs, &mut *self.rng);
        release_trigger(&mut self.dispatcher, anim);
        Ok(cancelled)
    }

    /// Bind a parallax/video background to a container.
    pub fn bind_parallax(
        &mut self,
        opts: ParallaxOptions,
        container: &BackgroundInit,
        now: f64,
    ) -> Result<ParallaxId> {
        self.begin_write();
        let id = self.ids.alloc_parallax();
        let bg = Background::bind(
            id,
            opts,
            self.cfg.capabilities,
            container,
            &self.viewport,
            now,
            &mut self.outputs,
        )?;
        self.backgrounds.insert(id, bg);
        Ok(id)
    }

    /// Bind from declarative attributes (`data-background*`).
    pub fn bind_parallax_from_attributes<'a, I>(
        &mut self,
        attributes: I,
        explicit: Option<&Value>,
        container: &BackgroundInit,
        now: f64,
    ) -> Result<ParallaxId>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let opts = attrs::parallax_options(attributes, explicit)?;
        self.bind_parallax(opts, container, now)
    }

    pub fn unbind_parallax(&mut self, parallax: ParallaxId) -> Result<()> {
        self.begin_write();
        let mut bg = self
            .backgrounds
            .shift_remove(&parallax)
            .ok_or(FxError::ParallaxNotFound(parallax))?;
        bg.teardown(&mut self.dispatcher);
        debug!("background {parallax:?}: unbound");
        Ok(())
    }

    /// Advance the engine to `now` with the given inputs, producing outputs.
    pub fn update(&mut self, now: f64, inputs: Inputs) -> &Outputs {
        self.begin_write();

        // 1) Fresh measurements
        for update in inputs.geometry {
            self.apply_geometry(update);
        }

        // 2) Host events in arrival order
        for event in inputs.events {
            self.handle_event(now, event);
        }

        // 3) Timers due at `now`
        self.advance_timers(now);

        self.outputs.frame_requested = self.dispatcher.frame_pending();
        self.outputs.next_deadline = self.next_deadline();
        self.flushed = true;
        &self.outputs
    }

    fn apply_geometry(&mut self, update: GeometryUpdate) {
        match update {
            GeometryUpdate::Target { target, top, height } => {
                match self.animations.get_mut(&target) {
                    Some(anim) => anim.set_span(Span::new(top, height)),
                    None => warn!("geometry for unknown target {target:?} ignored"),
                }
            }
            GeometryUpdate::Container {
                parallax,
                top,
                width,
                height,
            } => match self.backgrounds.get_mut(&parallax) {
                Some(bg) => bg.set_geometry(top, width, height, &self.viewport, &mut self.outputs),
                None => warn!("geometry for unknown background {parallax:?} ignored"),
            },
        }
    }

    fn handle_event(&mut self, now: f64, event: HostEvent) {
        match event {
            HostEvent::Scroll { viewport } => {
                self.viewport = viewport;
                self.fan_out(ViewportEvent::Scroll, now);
            }
            HostEvent::Resize { viewport } => {
                self.viewport = viewport;
                self.fan_out(ViewportEvent::Resize, now);
            }
            HostEvent::AnimationFrame => {
                if !self.dispatcher.take_frame() {
                    debug!("unrequested animation frame ignored");
                    return;
                }
                for bg in self.backgrounds.values() {
                    if bg.is_initialized() {
                        bg.position(&self.viewport, &mut self.outputs);
                    }
                }
            }
            HostEvent::MediaReady {
                parallax,
                layer,
                width,
                height,
            } => {
                let Some(bg) = self.backgrounds.get_mut(&parallax) else {
                    warn!("media ready for unknown background {parallax:?} ignored");
                    return;
                };
                let mut scope = Scope {
                    now,
                    viewport: &self.viewport,
                    dispatcher: &mut self.dispatcher,
                    ids: &mut self.ids,
                    out: &mut self.outputs,
                };
                bg.media_ready(layer, Size::new(width, height), &mut scope);
            }
            HostEvent::ToggleVideo { parallax } => match self.backgrounds.get_mut(&parallax) {
                Some(bg) => {
                    bg.toggle_video(&mut self.outputs);
                }
                None => warn!("toggle for unknown background {parallax:?} ignored"),
            },
            HostEvent::Cancel { target } => {
                if let Err(err) = self.cancel(target, now) {
                    warn!("{err}");
                }
            }
        }
    }

    /// Route a viewport event to every interested listener.
    fn fan_out(&mut self, kind: ViewportEvent, now: f64) {
        for listener in self.dispatcher.listeners(kind) {
            match listener {
                Listener::Trigger(id) => {
                    if let Some(anim) = self.animations.get_mut(&id) {
                        anim.evaluate(&self.viewport, now, &mut self.outputs, &mut *self.rng);
                        release_trigger(&mut self.dispatcher, anim);
                    }
                }
                Listener::Layer(id) => {
                    let Some(bg) = self.backgrounds.get_mut(&id) else {
                        continue;
                    };
                    if kind == ViewportEvent::Resize {
                        bg.rescale(&self.viewport, &mut self.outputs);
                    }
                    self.dispatcher.request_frame();
                }
                Listener::PlayPause(id) => {
                    if let Some(bg) = self.backgrounds.get_mut(&id) {
                        bg.play_pause(&self.viewport, &mut self.outputs);
                    }
                }
            }
        }
    }

    fn advance_timers(&mut self, now: f64) {
        for anim in self.animations.values_mut() {
            anim.advance(now, &mut self.outputs, &mut *self.rng);
            release_trigger(&mut self.dispatcher, anim);
        }
        for bg in self.backgrounds.values_mut() {
            let mut scope = Scope {
                now,
                viewport: &self.viewport,
                dispatcher: &mut self.dispatcher,
                ids: &mut self.ids,
                out: &mut self.outputs,
            };
            bg.advance(&mut scope);
        }
    }

    /// Earliest pending timer across all instances.
    pub fn next_deadline(&self) -> Option<f64> {
        self.animations
            .values()
            .filter_map(Animator::next_deadline)
            .chain(self.backgrounds.values().filter_map(Background::next_deadline))
            .min_by(f64::total_cmp)
    }
}

/// A fired trigger no longer needs viewport events unless it can re-arm.
/// Only completed runs re-arm, so a cancelled target is always released.
fn release_trigger(dispatcher: &mut Dispatcher, anim: &mut Animator) {
    let status = anim.status();
    let rearmable = anim.options().retrigger && status.phase != AnimationPhase::Cancelled;
    if status.trigger == TriggerState::Fired && !rearmable {
        if let Some(listener) = anim.listener.take() {
            dispatcher.unsubscribe(listener);
        }
    }
}
