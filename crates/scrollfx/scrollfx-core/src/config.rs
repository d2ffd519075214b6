//! Typed options for engine and widget instances.
//!
//! Field names serialize in camelCase so the same JSON objects work from
//! declarative attributes, the wasm bridge, and Rust callers.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::{FxError, Result};
use crate::interp::Easing;
use crate::viewport::Viewport;

/// What the host runtime can do. Missing capabilities degrade silently.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostCapabilities {
    /// `<video>` playback is available.
    pub video: bool,
    /// CSS 3D transforms are available.
    pub transforms_3d: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            video: true,
            transforms_3d: true,
        }
    }
}

/// Engine-wide configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub capabilities: HostCapabilities,
    /// Viewport known at construction; replaced by every scroll/resize event.
    pub viewport: Viewport,
}

/// The two supported one-shot effects.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationKind {
    #[default]
    Count,
    Scramble,
}

/// Where the animation ends. `true` reads the element's initial text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Finish {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl Default for Finish {
    fn default() -> Self {
        Self::Flag(true)
    }
}

pub const DEFAULT_AUTO_SELECTOR: &str = "*[data-animate]";
pub const DEFAULT_CODE_GLYPHS: &str =
    "ABCDEFGHIJKLMNOPQRSTUWVXYZ1234567890abcdefghijklmnopqrstuwvxyz";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationOptions {
    pub animation: AnimationKind,
    pub finish: Finish,
    pub easing: Easing,
    /// Milliseconds.
    #[serde(deserialize_with = "number_or_string")]
    pub duration: f64,
    /// Milliseconds between crossing the trigger line and firing; 0 fires at once.
    #[serde(deserialize_with = "number_or_string")]
    pub delay: f64,
    /// Trigger offset, percent of viewport height (0-100).
    #[serde(deserialize_with = "number_or_string")]
    pub offset: f64,
    pub auto_selector: String,
    /// Fade-in duration for the element (and scramble overlay), ms.
    #[serde(deserialize_with = "number_or_string")]
    pub fade: f64,
    pub start: i64,
    pub steps_per_glyph: u32,
    #[serde(deserialize_with = "text_or_number")]
    pub code_glyphs: String,
    #[serde(deserialize_with = "text_or_number")]
    pub delimiter: String,
    /// When true, counts render without thousands grouping.
    pub no_comma: bool,
    /// Re-arm after the element leaves the viewport once the animation has completed.
    pub retrigger: bool,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            animation: AnimationKind::Count,
            finish: Finish::Flag(true),
            easing: Easing::Swing,
            duration: 400.0,
            delay: 0.0,
            offset: 50.0,
            auto_selector: DEFAULT_AUTO_SELECTOR.to_string(),
            fade: 2000.0,
            start: 0,
            steps_per_glyph: 10,
            code_glyphs: DEFAULT_CODE_GLYPHS.to_string(),
            delimiter: ",".to_string(),
            no_comma: true,
            retrigger: false,
        }
    }
}

impl AnimationOptions {
    pub fn validate(&self) -> Result<()> {
        non_negative("duration", self.duration)?;
        non_negative("delay", self.delay)?;
        non_negative("fade", self.fade)?;
        if !(0.0..=100.0).contains(&self.offset) {
            return Err(FxError::invalid(
                "offset",
                format!("{} is outside 0..=100", self.offset),
            ));
        }
        if self.animation == AnimationKind::Scramble {
            if self.steps_per_glyph == 0 {
                return Err(FxError::invalid("stepsPerGlyph", "must be at least 1"));
            }
            if self.code_glyphs.is_empty() {
                return Err(FxError::invalid("codeGlyphs", "alphabet is empty"));
            }
        }
        if let Finish::Flag(false) = self.finish {
            return Err(FxError::invalid("finish", "false is not a finish value"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParallaxOptions {
    #[serde(deserialize_with = "optional_source")]
    pub mp4_src: Option<String>,
    #[serde(deserialize_with = "optional_source")]
    pub webm_src: Option<String>,
    /// WebVTT captions track.
    #[serde(deserialize_with = "optional_source")]
    pub cap_src: Option<String>,
    /// Image used when video is unavailable, and as the video's fallback.
    #[serde(deserialize_with = "optional_source")]
    pub img_src: Option<String>,
    /// Viewports this wide or narrower get the image instead of video.
    #[serde(alias = "mobileVideo", deserialize_with = "optional_number")]
    pub mobile_video_min_width: Option<f64>,
    pub minimum_video_width: f64,
    pub parallax: bool,
    pub parallax_effect: f64,
    pub pause_video_on_view_loss: bool,
    #[serde(rename = "useTrans3D")]
    pub use_trans3d: bool,
    #[serde(alias = "toggleControl", deserialize_with = "optional_source")]
    pub toggle_control_id: Option<String>,
    pub debug: bool,
    /// Upper bound on waiting for the video to become playable.
    pub ready_timeout_ms: f64,
    /// Delay of the one extra rescale after initialization.
    pub settle_rescale_ms: f64,
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        Self {
            mp4_src: None,
            webm_src: None,
            cap_src: None,
            img_src: None,
            mobile_video_min_width: None,
            minimum_video_width: 400.0,
            parallax: true,
            parallax_effect: 1.5,
            pause_video_on_view_loss: false,
            use_trans3d: true,
            toggle_control_id: None,
            debug: false,
            ready_timeout_ms: 2000.0,
            settle_rescale_ms: 1000.0,
        }
    }
}

impl ParallaxOptions {
    pub fn validate(&self) -> Result<()> {
        non_negative("minimumVideoWidth", self.minimum_video_width)?;
        non_negative("readyTimeoutMs", self.ready_timeout_ms)?;
        non_negative("settleRescaleMs", self.settle_rescale_ms)?;
        if !self.parallax_effect.is_finite() {
            return Err(FxError::invalid("parallaxEffect", "must be finite"));
        }
        Ok(())
    }
}

fn non_negative(option: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(FxError::invalid(option, format!("{v} is not a finite, non-negative number")))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
}

/// Accepts `400` as well as `"400"`.
fn number_or_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    match NumberLike::deserialize(d)? {
        NumberLike::Number(n) => Ok(n),
        NumberLike::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("expected a number, got {s:?}"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextLike {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Text options whose attribute value happens to look numeric (`"10"` as a
/// glyph alphabet) arrive as JSON numbers.
fn text_or_number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(match TextLike::deserialize(d)? {
        TextLike::Text(s) => s,
        TextLike::Integer(n) => n.to_string(),
        TextLike::Float(n) => n.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaybeSource {
    Flag(bool),
    Text(String),
    Number(f64),
}

/// `false`, `null` and `""` all mean "not configured".
fn optional_source<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<String>, D::Error> {
    match Option::<MaybeSource>::deserialize(d)? {
        None | Some(MaybeSource::Flag(false)) => Ok(None),
        Some(MaybeSource::Text(s)) if s.is_empty() => Ok(None),
        Some(MaybeSource::Text(s)) => Ok(Some(s)),
        Some(MaybeSource::Number(n)) => Ok(Some(n.to_string())),
        Some(MaybeSource::Flag(true)) => Err(de::Error::custom("expected a string or false")),
    }
}

fn optional_number<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<f64>, D::Error> {
    match Option::<MaybeSource>::deserialize(d)? {
        None | Some(MaybeSource::Flag(false)) => Ok(None),
        Some(MaybeSource::Number(n)) => Ok(Some(n)),
        Some(MaybeSource::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected a number, got {s:?}"))),
        Some(MaybeSource::Flag(true)) => Err(de::Error::custom("expected a number or false")),
    }
}
