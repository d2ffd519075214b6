//! Output contracts from the engine.
//!
//! Outputs carry render operations for the host to apply to its elements
//! and a separate list of semantic events, plus scheduling hints: whether an
//! animation frame is wanted and when the engine next needs the clock.

use serde::{Deserialize, Serialize};

use crate::ids::{ParallaxId, TargetId};
use crate::inputs::MediaLayer;
use crate::media::MediaPlan;
use crate::parallax::Transform;

/// One mutation of the host's render tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum RenderOp {
    SetText {
        target: TargetId,
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    FadeIn {
        target: TargetId,
        duration_ms: f64,
    },
    /// Insert the scramble overlay right after the element.
    #[serde(rename_all = "camelCase")]
    CreateOverlay {
        target: TargetId,
        fade_ms: f64,
    },
    SetOverlayText {
        target: TargetId,
        text: String,
    },
    RemoveOverlay {
        target: TargetId,
    },
    SetLayerSize {
        parallax: ParallaxId,
        width: f64,
        height: f64,
    },
    SetTransform {
        parallax: ParallaxId,
        css: String,
        transform: Transform,
    },
    #[serde(rename_all = "camelCase")]
    ShowLayer {
        parallax: ParallaxId,
        layer: MediaLayer,
        fade_ms: f64,
    },
    #[serde(rename_all = "camelCase")]
    HideLayer {
        parallax: ParallaxId,
        layer: MediaLayer,
        fade_ms: f64,
    },
    PlayVideo {
        parallax: ParallaxId,
    },
    PauseVideo {
        parallax: ParallaxId,
    },
    /// Add or remove a class on the video toggle control.
    SetControlClass {
        parallax: ParallaxId,
        control: String,
        class: String,
        present: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackReason {
    /// The video never reported readiness within the wait bound.
    ReadyTimeout,
}

/// Discrete semantic signals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
#[non_exhaustive]
pub enum FxEvent {
    TriggerScheduled {
        target: TargetId,
        deadline: f64,
    },
    AnimationStarted {
        target: TargetId,
    },
    AnimationCompleted {
        target: TargetId,
    },
    AnimationCancelled {
        target: TargetId,
    },
    TriggerRearmed {
        target: TargetId,
    },
    /// Media chosen for a background; hosts build the layer markup from it.
    MediaSelected {
        parallax: ParallaxId,
        plan: MediaPlan,
    },
    MediaReady {
        parallax: ParallaxId,
        layer: MediaLayer,
    },
    MediaFallback {
        parallax: ParallaxId,
        reason: FallbackReason,
    },
    /// The viewer's video opt-out flag changed; hosts persist it.
    VideoPreferenceChanged {
        parallax: ParallaxId,
        disabled: bool,
    },
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outputs {
    #[serde(default)]
    pub ops: Vec<RenderOp>,
    #[serde(default)]
    pub events: Vec<FxEvent>,
    /// Deliver a `HostEvent::AnimationFrame` on the next frame.
    #[serde(default)]
    pub frame_requested: bool,
    /// Earliest clock value at which `update` has timer work to do.
    #[serde(default)]
    pub next_deadline: Option<f64>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.ops.clear();
        self.events.clear();
        self.frame_requested = false;
        self.next_deadline = None;
    }

    #[inline]
    pub fn push_op(&mut self, op: RenderOp) {
        self.ops.push(op);
    }

    #[inline]
    pub fn push_event(&mut self, event: FxEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty() && self.events.is_empty()
    }
}
