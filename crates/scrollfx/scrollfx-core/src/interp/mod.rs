//! Easing registry.
//!
//! Curves are selected by name from configuration (`"linear"`, `"swing"`,
//! ...); unknown names are rejected when options are parsed.

pub mod functions;

use serde::{Deserialize, Serialize};

/// Time-to-progress mapping used by the count stepper.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    #[default]
    Swing,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInOutCubic,
}

impl Easing {
    /// Eased progress for `p`, clamped to [0, 1] first.
    pub fn sample(self, p: f64) -> f64 {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        match self {
            Self::Linear => functions::linear(p),
            Self::Swing => functions::swing(p),
            Self::EaseInQuad => functions::ease_in_quad(p),
            Self::EaseOutQuad => functions::ease_out_quad(p),
            Self::EaseInOutQuad => functions::ease_in_out_quad(p),
            Self::EaseInOutCubic => functions::ease_in_out_cubic(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_serde() {
        let e: Easing = serde_json::from_str("\"easeInOutCubic\"").unwrap();
        assert_eq!(e, Easing::EaseInOutCubic);
        assert!(serde_json::from_str::<Easing>("\"bounce\"").is_err());
    }

    #[test]
    fn sample_clamps_out_of_range_progress() {
        assert_eq!(Easing::Linear.sample(-1.0), 0.0);
        assert_eq!(Easing::Linear.sample(2.0), 1.0);
    }
}
