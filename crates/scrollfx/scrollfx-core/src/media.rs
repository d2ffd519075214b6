//! Background media selection and readiness.
//!
//! Video is preferred; anything that makes it unusable (no host support,
//! narrow viewport, no sources, never becoming playable) falls back to the
//! image path without raising an error.

use serde::{Deserialize, Serialize};

use crate::config::{HostCapabilities, ParallaxOptions};

pub const MP4_MIME: &str = "video/mp4;codecs=\"avc1.42E01E, mp4a.40.2\"";
pub const WEBM_MIME: &str = "video/webm;codecs=\"vp8, vorbis\"";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    pub src: String,
    pub mime: String,
}

/// Which layer a background renders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum MediaPlan {
    Video {
        sources: Vec<MediaSource>,
        captions: Option<String>,
        fallback_image: Option<String>,
    },
    Image {
        src: Option<String>,
    },
}

impl MediaPlan {
    #[inline]
    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video { .. })
    }
}

/// Pick video or image for a background.
pub fn plan_media(opts: &ParallaxOptions, caps: HostCapabilities, viewport_width: f64) -> MediaPlan {
    let narrow = opts
        .mobile_video_min_width
        .is_some_and(|min| viewport_width <= min);
    let has_sources = opts.mp4_src.is_some() || opts.webm_src.is_some();

    if !caps.video || narrow || !has_sources {
        return MediaPlan::Image {
            src: opts.img_src.clone(),
        };
    }

    let mut sources = Vec::with_capacity(2);
    if let Some(src) = &opts.mp4_src {
        sources.push(MediaSource {
            src: src.clone(),
            mime: MP4_MIME.to_string(),
        });
    }
    if let Some(src) = &opts.webm_src {
        sources.push(MediaSource {
            src: src.clone(),
            mime: WEBM_MIME.to_string(),
        });
    }
    MediaPlan::Video {
        sources,
        captions: opts.cap_src.clone(),
        fallback_image: opts.img_src.clone(),
    }
}

/// Bounded wait for media readiness.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Readiness {
    Waiting { deadline: f64 },
    Ready,
    /// The deadline passed first; the fallback path was forced.
    TimedOut,
}

impl Readiness {
    pub fn wait(now: f64, timeout_ms: f64) -> Self {
        Self::Waiting {
            deadline: now + timeout_ms,
        }
    }

    #[inline]
    pub fn deadline(&self) -> Option<f64> {
        match *self {
            Self::Waiting { deadline } => Some(deadline),
            _ => None,
        }
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Waiting { .. })
    }

    /// Ready signal. Returns true only on the first transition out of
    /// waiting.
    pub fn mark_ready(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }
        *self = Self::Ready;
        true
    }

    /// Expire the wait at `now`. Returns true when this call timed it out.
    pub fn poll(&mut self, now: f64) -> bool {
        match *self {
            Self::Waiting { deadline } if now >= deadline => {
                *self = Self::TimedOut;
                true
            }
            _ => false,
        }
    }
}

/// Play/pause decision for a video that should stop when scrolled away.
/// Only changes are reported.
#[derive(Clone, Debug, Default)]
pub struct ViewLossGate {
    playing: Option<bool>,
}

impl ViewLossGate {
    /// `Some(true)` to play, `Some(false)` to pause, `None` when unchanged.
    pub fn evaluate(&mut self, scroll_y: f64, container_height: f64) -> Option<bool> {
        let play = scroll_y < container_height;
        if self.playing == Some(play) {
            return None;
        }
        self.playing = Some(play);
        Some(play)
    }

    /// Forget the last decision (e.g. after a manual toggle).
    pub fn reset(&mut self) {
        self.playing = None;
    }
}
