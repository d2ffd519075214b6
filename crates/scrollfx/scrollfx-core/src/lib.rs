//! scrollfx core (engine-agnostic)
//!
//! Headless engine for viewport-triggered count/scramble animations and
//! parallax/video backgrounds. Hosts feed viewport, geometry and media
//! events into [`Engine::update`] together with their clock and apply the
//! returned render ops.

pub mod animator;
pub mod attrs;
pub mod background;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod ids;
pub mod inputs;
pub mod interp;
pub mod media;
pub mod outputs;
pub mod parallax;
pub mod random;
pub mod stepper;
pub mod trigger;
pub mod viewport;

// Re-exports for consumers (adapters)
pub use animator::{AnimationPhase, AnimationStatus};
pub use background::Background;
pub use config::{AnimationKind, AnimationOptions, Config, Finish, HostCapabilities, ParallaxOptions};
pub use dispatch::{Dispatcher, EventMask, Listener, ViewportEvent};
pub use engine::Engine;
pub use error::{FxError, Result};
pub use ids::{ParallaxId, TargetId};
pub use inputs::{BackgroundInit, ElementInit, GeometryUpdate, HostEvent, Inputs, MediaLayer};
pub use interp::Easing;
pub use media::MediaPlan;
pub use outputs::{FallbackReason, FxEvent, Outputs, RenderOp};
pub use parallax::{Layout, Size, Transform};
pub use random::{FromFn, RandomSource, SplitMix64};
pub use trigger::TriggerState;
pub use viewport::{Span, Viewport, Visibility};
