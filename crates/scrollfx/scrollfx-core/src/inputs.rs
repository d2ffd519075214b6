//! Input contracts for the engine.
//!
//! Hosts (the wasm bridge, tests) collect what happened since the last call
//! into [`Inputs`] and pass it to `Engine::update()` together with the
//! current clock.

use serde::{Deserialize, Serialize};

use crate::ids::{ParallaxId, TargetId};
use crate::viewport::Viewport;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Inputs {
    /// Layout changes, applied before any event.
    #[serde(default)]
    pub geometry: Vec<GeometryUpdate>,
    /// Host events in arrival order.
    #[serde(default)]
    pub events: Vec<HostEvent>,
}

impl Inputs {
    pub fn event(event: HostEvent) -> Self {
        Self {
            geometry: Vec::new(),
            events: vec![event],
        }
    }
}

/// Fresh measurements of a bound element.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GeometryUpdate {
    /// Page top offset and outer height of an animated element.
    #[serde(rename_all = "camelCase")]
    Target {
        target: TargetId,
        top: f64,
        height: f64,
    },
    /// Page top offset and box size of a background container.
    #[serde(rename_all = "camelCase")]
    Container {
        parallax: ParallaxId,
        top: f64,
        width: f64,
        height: f64,
    },
}

/// Which background layer a media signal refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaLayer {
    Video,
    Image,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostEvent {
    Scroll {
        viewport: Viewport,
    },
    Resize {
        viewport: Viewport,
    },
    /// The animation frame requested through `Outputs::frame_requested`.
    AnimationFrame,
    /// A layer can render; `width`/`height` are its natural size.
    #[serde(rename_all = "camelCase")]
    MediaReady {
        parallax: ParallaxId,
        layer: MediaLayer,
        width: f64,
        height: f64,
    },
    /// The video toggle control was activated.
    ToggleVideo {
        parallax: ParallaxId,
    },
    /// Stop an animation at its next tick boundary.
    Cancel {
        target: TargetId,
    },
}

/// Measurements of an animated element at bind time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementInit {
    pub top: f64,
    /// Outer height, margins included.
    pub height: f64,
    /// Rendered text; the finish value when `finish` is `true`.
    pub text: String,
}

/// Measurements and persisted state of a background container at bind time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundInit {
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// The viewer previously opted out of video.
    pub video_disabled: bool,
}
