//! Per-container state of a parallax/video background.

use log::{debug, warn};

use crate::config::{HostCapabilities, ParallaxOptions};
use crate::dispatch::{Dispatcher, EventMask, Listener};
use crate::error::Result;
use crate::ids::{IdAllocator, ListenerId, ParallaxId};
use crate::inputs::{BackgroundInit, MediaLayer};
use crate::media::{plan_media, MediaPlan, Readiness, ViewLossGate};
use crate::outputs::{FallbackReason, FxEvent, Outputs, RenderOp};
use crate::parallax::{Positioner, Size};
use crate::viewport::{Span, Viewport};

/// Fade used when the viewer toggles the video.
pub const TOGGLE_FADE_MS: f64 = 400.0;

const CLASS_NO_VIDEO: &str = "no-video";
const CLASS_IMG_ONLY: &str = "img-only";

/// Engine state a background needs while handling one event.
pub(crate) struct Scope<'a> {
    pub now: f64,
    pub viewport: &'a Viewport,
    pub dispatcher: &'a mut Dispatcher,
    pub ids: &'a mut IdAllocator,
    pub out: &'a mut Outputs,
}

#[derive(Debug)]
pub struct Background {
    pub id: ParallaxId,
    opts: ParallaxOptions,
    plan: MediaPlan,
    /// Cleared when the video never became ready.
    use_video: bool,
    /// `None` in image mode.
    readiness: Option<Readiness>,
    positioner: Positioner,
    span: Span,
    container: Size,
    initialized: bool,
    settle_at: Option<f64>,
    /// Natural size of the fallback image, kept while video is preferred.
    image_size: Option<Size>,
    video_disabled: bool,
    view_loss: ViewLossGate,
    listeners: Vec<ListenerId>,
}

impl Background {
    pub fn bind(
        id: ParallaxId,
        opts: ParallaxOptions,
        caps: HostCapabilities,
        init: &BackgroundInit,
        vp: &Viewport,
        now: f64,
        out: &mut Outputs,
    ) -> Result<Self> {
        opts.validate()?;
        let plan = plan_media(&opts, caps, vp.width);
        let use_video = plan.is_video();
        debug!(
            "background {id:?}: bound in {} mode",
            if use_video { "video" } else { "image" }
        );
        out.push_event(FxEvent::MediaSelected {
            parallax: id,
            plan: plan.clone(),
        });

        let effect = opts.parallax.then_some(opts.parallax_effect);
        let positioner = Positioner::new(
            opts.minimum_video_width,
            effect,
            opts.use_trans3d && caps.transforms_3d,
            init.top,
        );
        let mut bg = Self {
            id,
            readiness: use_video.then(|| Readiness::wait(now, opts.ready_timeout_ms)),
            plan,
            use_video,
            positioner,
            span: Span::new(init.top, init.height),
            container: Size::new(init.width, init.height),
            initialized: false,
            settle_at: None,
            image_size: None,
            video_disabled: init.video_disabled,
            view_loss: ViewLossGate::default(),
            listeners: Vec::new(),
            opts,
        };
        if !use_video {
            bg.mark_control(CLASS_IMG_ONLY, true, out);
        }
        Ok(bg)
    }

    #[inline]
    pub fn options(&self) -> &ParallaxOptions {
        &self.opts
    }

    #[inline]
    pub fn plan(&self) -> &MediaPlan {
        &self.plan
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn uses_video(&self) -> bool {
        self.use_video
    }

    #[inline]
    pub fn positioner(&self) -> &Positioner {
        &self.positioner
    }

    pub fn next_deadline(&self) -> Option<f64> {
        let ready = self.readiness.and_then(|r| r.deadline());
        match (ready, self.settle_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// New container measurements. A size change on an initialized
    /// background rescales right away instead of waiting for a resize.
    pub fn set_geometry(
        &mut self,
        top: f64,
        width: f64,
        height: f64,
        vp: &Viewport,
        out: &mut Outputs,
    ) {
        self.span = Span::new(top, height);
        let container = Size::new(width, height);
        if container == self.container {
            return;
        }
        self.container = container;
        if self.initialized {
            self.rescale(vp, out);
        }
    }

    fn mark_control(&self, class: &str, present: bool, out: &mut Outputs) {
        if let Some(control) = &self.opts.toggle_control_id {
            out.push_op(RenderOp::SetControlClass {
                parallax: self.id,
                control: control.clone(),
                class: class.to_string(),
                present,
            });
        }
    }

    /// A layer reported its natural size.
    pub(crate) fn media_ready(&mut self, layer: MediaLayer, size: Size, scope: &mut Scope<'_>) {
        let id = self.id;
        match layer {
            MediaLayer::Video => {
                let Some(readiness) = self.readiness.as_mut() else {
                    warn!("background {id:?}: video ready signal in image mode ignored");
                    return;
                };
                if !readiness.mark_ready() {
                    debug!("background {id:?}: repeated video ready signal ignored");
                    return;
                }
                scope.out.push_event(FxEvent::MediaReady {
                    parallax: id,
                    layer,
                });
                self.positioner.set_media(size);
                if self.video_disabled {
                    scope.out.push_op(RenderOp::PauseVideo { parallax: id });
                    scope.out.push_op(RenderOp::ShowLayer {
                        parallax: id,
                        layer: MediaLayer::Image,
                        fade_ms: 0.0,
                    });
                    self.mark_control(CLASS_NO_VIDEO, true, scope.out);
                } else {
                    scope.out.push_op(RenderOp::ShowLayer {
                        parallax: id,
                        layer: MediaLayer::Video,
                        fade_ms: 0.0,
                    });
                }
                self.initialize(scope);
            }
            MediaLayer::Image if self.use_video => {
                self.image_size = Some(size);
            }
            MediaLayer::Image => {
                if self.initialized {
                    return;
                }
                scope.out.push_event(FxEvent::MediaReady {
                    parallax: id,
                    layer,
                });
                self.positioner.set_media(size);
                scope.out.push_op(RenderOp::ShowLayer {
                    parallax: id,
                    layer: MediaLayer::Image,
                    fade_ms: 0.0,
                });
                self.initialize(scope);
            }
        }
    }

    /// Timer work due at `scope.now`.
    pub(crate) fn advance(&mut self, scope: &mut Scope<'_>) {
        if let Some(readiness) = self.readiness.as_mut() {
            if readiness.poll(scope.now) {
                self.fall_back(scope);
            }
        }
        if self.settle_at.is_some_and(|at| scope.now >= at) {
            self.settle_at = None;
            self.rescale(scope.viewport, scope.out);
        }
    }

    fn fall_back(&mut self, scope: &mut Scope<'_>) {
        let id = self.id;
        warn!(
            "background {id:?}: video not ready after {}ms, using image",
            self.opts.ready_timeout_ms
        );
        self.use_video = false;
        scope.out.push_op(RenderOp::PauseVideo { parallax: id });
        scope.out.push_op(RenderOp::HideLayer {
            parallax: id,
            layer: MediaLayer::Video,
            fade_ms: 0.0,
        });
        scope.out.push_event(FxEvent::MediaFallback {
            parallax: id,
            reason: FallbackReason::ReadyTimeout,
        });
        self.mark_control(CLASS_IMG_ONLY, true, scope.out);
        if let Some(size) = self.image_size.take() {
            self.media_ready(MediaLayer::Image, size, scope);
        }
    }

    /// One-time setup once media dimensions are known.
    fn initialize(&mut self, scope: &mut Scope<'_>) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        let mask = if self.opts.parallax {
            EventMask::BOTH
        } else {
            EventMask::RESIZE
        };
        self.listeners
            .push(scope.dispatcher.subscribe(scope.ids, Listener::Layer(self.id), mask));
        if self.opts.pause_video_on_view_loss && self.use_video {
            self.listeners.push(scope.dispatcher.subscribe(
                scope.ids,
                Listener::PlayPause(self.id),
                EventMask::SCROLL,
            ));
        }

        self.rescale(scope.viewport, scope.out);
        scope.dispatcher.request_frame();
        self.settle_at = Some(scope.now + self.opts.settle_rescale_ms);
        debug!("background {:?}: initialized", self.id);
    }

    /// Full rescale against the container, then reposition.
    pub fn rescale(&mut self, vp: &Viewport, out: &mut Outputs) {
        if let Some(layout) = self.positioner.rescale(self.container) {
            out.push_op(RenderOp::SetLayerSize {
                parallax: self.id,
                width: layout.width,
                height: layout.height,
            });
            self.position(vp, out);
        }
    }

    /// Reposition for the current scroll offset.
    pub fn position(&self, vp: &Viewport, out: &mut Outputs) {
        let Some(transform) = self.positioner.position(self.span, vp) else {
            return;
        };
        if self.opts.debug {
            debug!(
                "background {:?}: {} at scroll {}",
                self.id, transform, vp.scroll_y
            );
        }
        out.push_op(RenderOp::SetTransform {
            parallax: self.id,
            css: transform.to_css(),
            transform,
        });
    }

    /// Play while the viewer is above the container's bottom edge.
    pub fn play_pause(&mut self, vp: &Viewport, out: &mut Outputs) {
        if !self.use_video || self.video_disabled {
            return;
        }
        match self.view_loss.evaluate(vp.scroll_y, self.container.height) {
            Some(true) => out.push_op(RenderOp::PlayVideo { parallax: self.id }),
            Some(false) => out.push_op(RenderOp::PauseVideo { parallax: self.id }),
            None => {}
        }
    }

    /// Flip the viewer's video preference. Returns false when the toggle
    /// does not apply (image mode, no control, or not initialized yet).
    pub fn toggle_video(&mut self, out: &mut Outputs) -> bool {
        let id = self.id;
        if !self.use_video || self.opts.toggle_control_id.is_none() || !self.initialized {
            debug!("background {id:?}: toggle ignored");
            return false;
        }
        self.video_disabled = !self.video_disabled;
        self.view_loss.reset();
        if self.video_disabled {
            out.push_op(RenderOp::HideLayer {
                parallax: id,
                layer: MediaLayer::Video,
                fade_ms: TOGGLE_FADE_MS,
            });
            out.push_op(RenderOp::PauseVideo { parallax: id });
            out.push_op(RenderOp::ShowLayer {
                parallax: id,
                layer: MediaLayer::Image,
                fade_ms: 0.0,
            });
        } else {
            out.push_op(RenderOp::ShowLayer {
                parallax: id,
                layer: MediaLayer::Video,
                fade_ms: TOGGLE_FADE_MS,
            });
            out.push_op(RenderOp::PlayVideo { parallax: id });
        }
        self.mark_control(CLASS_NO_VIDEO, self.video_disabled, out);
        out.push_event(FxEvent::VideoPreferenceChanged {
            parallax: id,
            disabled: self.video_disabled,
        });
        true
    }

    pub(crate) fn teardown(&mut self, dispatcher: &mut Dispatcher) {
        for listener in self.listeners.drain(..) {
            dispatcher.unsubscribe(listener);
        }
        self.readiness = None;
        self.settle_at = None;
    }
}
