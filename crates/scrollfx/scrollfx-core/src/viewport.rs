//! Viewport monitor: pure visibility and trigger-line predicates.
//!
//! All quantities are page coordinates in CSS pixels. The engine evaluates
//! these on every scroll/resize callback; nothing here mutates state.

use serde::{Deserialize, Serialize};

/// Visible region of the page.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Vertical scroll offset of the page.
    pub scroll_y: f64,
    #[serde(default)]
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_y: f64, width: f64, height: f64) -> Self {
        Self {
            scroll_y,
            width,
            height,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.scroll_y + self.height
    }
}

/// Vertical extent of an element: page top offset and outer height
/// (margins included).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub top: f64,
    pub height: f64,
}

impl Span {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[inline]
    pub fn center(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Where an element sits relative to the viewport band.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Scrolled past: the element ends before the viewport starts.
    Above,
    /// Not reached yet: the element starts after the viewport ends.
    Below,
    Intersecting,
}

impl Visibility {
    #[inline]
    pub fn is_intersecting(self) -> bool {
        self == Self::Intersecting
    }
}

/// Classify `span` against `vp`. Touching edges count as intersecting.
pub fn classify(span: Span, vp: &Viewport) -> Visibility {
    if span.bottom() < vp.scroll_y {
        Visibility::Above
    } else if span.top > vp.bottom() {
        Visibility::Below
    } else {
        Visibility::Intersecting
    }
}

/// Page y of the trigger line for an offset percentage (0 = viewport
/// bottom, 100 = viewport top).
#[inline]
pub fn trigger_line(vp: &Viewport, offset_percent: f64) -> f64 {
    vp.scroll_y + vp.height * (1.0 - offset_percent / 100.0)
}

/// One-shot fire condition: the element intersects the viewport and its
/// vertical center has crossed the trigger line.
pub fn should_fire(span: Span, vp: &Viewport, offset_percent: f64) -> bool {
    classify(span, vp).is_intersecting() && span.center() <= trigger_line(vp, offset_percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_scrolled_past_is_above() {
        let vp = Viewport::new(800.0, 1024.0, 400.0);
        assert_eq!(classify(Span::new(500.0, 200.0), &vp), Visibility::Above);
        assert!(!should_fire(Span::new(500.0, 200.0), &vp, 50.0));
    }

    #[test]
    fn element_past_viewport_bottom_is_below() {
        let vp = Viewport::new(0.0, 1024.0, 400.0);
        assert_eq!(classify(Span::new(401.0, 10.0), &vp), Visibility::Below);
        assert_eq!(
            classify(Span::new(400.0, 10.0), &vp),
            Visibility::Intersecting
        );
    }

    #[test]
    fn center_above_trigger_line_fires() {
        let vp = Viewport::new(0.0, 1024.0, 800.0);
        assert_eq!(trigger_line(&vp, 50.0), 400.0);
        assert!(should_fire(Span::new(100.0, 100.0), &vp, 50.0));
    }

    #[test]
    fn center_below_trigger_line_waits() {
        let vp = Viewport::new(0.0, 1024.0, 800.0);
        // center at 550 > 400
        assert!(!should_fire(Span::new(500.0, 100.0), &vp, 50.0));
        // offset 0 moves the line to the viewport bottom
        assert!(should_fire(Span::new(500.0, 100.0), &vp, 0.0));
    }
}
