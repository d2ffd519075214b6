//! Parallax positioner: scale a background layer to cover its container and
//! translate it proportionally to scroll distance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::viewport::{classify, Span, Viewport};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides finite and positive.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Cover scale for `media` inside `container`, floored so the rendered
/// width never drops below `minimum_width`. `overscan` (the parallax
/// coefficient) is added on top so translation never exposes an edge.
pub fn compute_scale(media: Size, container: Size, minimum_width: f64, overscan: Option<f64>) -> f64 {
    let width_scale = container.width / media.width;
    let height_scale = container.height / media.height;
    let mut scale = height_scale.max(width_scale);
    if scale * media.width < minimum_width {
        scale = minimum_width / media.width;
    }
    if let Some(effect) = overscan {
        scale += effect;
    }
    scale
}

/// Rendered size and centering offsets of the scaled layer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub scale: f64,
    pub width: f64,
    pub height: f64,
    pub base_x: f64,
    pub base_y: f64,
}

impl Layout {
    pub fn compute(media: Size, container: Size, minimum_width: f64, overscan: Option<f64>) -> Self {
        let scale = compute_scale(media, container, minimum_width, overscan);
        let width = scale * media.width;
        let height = scale * media.height;
        Self {
            scale,
            width,
            height,
            base_x: -((width - container.width).trunc() / 2.0),
            base_y: -((height - container.height) / 2.0).trunc(),
        }
    }
}

/// Vertical translation for the current scroll position. Negative scroll
/// (elastic overscroll) is floored at zero.
pub fn parallax_y(base_y: f64, scroll_y: f64, initial_top: f64, effect: f64) -> f64 {
    let scroll = if scroll_y >= 0.0 { scroll_y } else { 0.0 };
    (base_y + (scroll - initial_top) * effect).round()
}

/// Translation applied to the layer. Both forms position identically; the
/// 3D form lets the compositor take over.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Transform {
    Translate3d { x: f64, y: f64 },
    Translate { x: f64, y: f64 },
}

impl Transform {
    pub fn new(x: f64, y: f64, use_3d: bool) -> Self {
        if use_3d {
            Self::Translate3d { x, y }
        } else {
            Self::Translate { x, y }
        }
    }

    pub fn offset(&self) -> (f64, f64) {
        match *self {
            Self::Translate3d { x, y } | Self::Translate { x, y } => (x, y),
        }
    }

    /// CSS `transform` value.
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // + 0.0 turns -0 into 0
        match *self {
            Self::Translate3d { x, y } => write!(f, "translate3d({}px, {}px, 0)", x + 0.0, y + 0.0),
            Self::Translate { x, y } => write!(f, "translate({}px, {}px)", x + 0.0, y + 0.0),
        }
    }
}

/// Per-background positioning state.
#[derive(Clone, Debug)]
pub struct Positioner {
    media: Option<Size>,
    minimum_width: f64,
    effect: Option<f64>,
    use_3d: bool,
    initial_top: f64,
    layout: Option<Layout>,
}

impl Positioner {
    /// `effect` is `None` when parallax is disabled.
    pub fn new(minimum_width: f64, effect: Option<f64>, use_3d: bool, initial_top: f64) -> Self {
        Self {
            media: None,
            minimum_width,
            effect,
            use_3d,
            initial_top,
            layout: None,
        }
    }

    #[inline]
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    #[inline]
    pub fn media(&self) -> Option<Size> {
        self.media
    }

    pub fn set_media(&mut self, media: Size) {
        self.media = media.is_usable().then_some(media);
    }

    /// Full rescale against the container. Returns `None` while media
    /// dimensions are unknown.
    pub fn rescale(&mut self, container: Size) -> Option<Layout> {
        let media = self.media?;
        let layout = Layout::compute(media, container, self.minimum_width, self.effect);
        self.layout = Some(layout);
        Some(layout)
    }

    /// Translation for the current viewport, or `None` when the container
    /// is entirely out of view (or no layout exists yet).
    pub fn position(&self, container: Span, vp: &Viewport) -> Option<Transform> {
        let layout = self.layout?;
        if !classify(container, vp).is_intersecting() {
            return None;
        }
        let y = match self.effect {
            Some(effect) => parallax_y(layout.base_y, vp.scroll_y, self.initial_top, effect),
            None => layout.base_y,
        };
        Some(Transform::new(layout.base_x, y, self.use_3d))
    }
}
