//! Character-scramble reveal.
//!
//! The primary element shows a growing prefix of the finish text while an
//! overlay next to it shows random glyphs for the part not yet revealed.
//! One more character locks in every `steps_per_glyph` ticks.

use super::CancelToken;
use crate::random::{random_string, RandomSource};

/// One tick of a scramble animation.
#[derive(Clone, Debug, PartialEq)]
pub enum ScrambleFrame {
    Tick {
        /// New primary text when the prefix grew on this tick.
        reveal: Option<String>,
        /// Fresh random overlay text (`total - revealed` glyphs).
        overlay: String,
    },
    /// The full text is revealed; the overlay must be removed.
    Finished { text: String },
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct ScrambleStepper {
    text: Vec<char>,
    alphabet: Vec<char>,
    steps_per_glyph: u64,
    step: u64,
    revealed: usize,
    interval_ms: f64,
    cancel: CancelToken,
    done: bool,
}

impl ScrambleStepper {
    /// `steps_per_glyph` is clamped to at least 1.
    pub fn new(
        finish: &str,
        alphabet: &str,
        duration_ms: f64,
        steps_per_glyph: u32,
        cancel: CancelToken,
    ) -> Self {
        let text: Vec<char> = finish.chars().collect();
        let steps_per_glyph = u64::from(steps_per_glyph.max(1));
        let ticks = text.len() as f64 * steps_per_glyph as f64;
        let interval_ms = if ticks > 0.0 { duration_ms / ticks } else { 0.0 };
        Self {
            text,
            alphabet: alphabet.chars().collect(),
            steps_per_glyph,
            step: 0,
            revealed: 0,
            interval_ms,
            cancel,
            done: false,
        }
    }

    /// Time between ticks: `duration / (len * steps_per_glyph)`.
    #[inline]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    #[inline]
    pub fn total_len(&self) -> usize {
        self.text.len()
    }

    /// Revealed-character counter; exceeds `total_len` by one when done.
    #[inline]
    pub fn revealed_len(&self) -> usize {
        self.revealed
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn prefix(&self, len: usize) -> String {
        self.text[..len.min(self.text.len())].iter().collect()
    }

    pub fn step(&mut self, rng: &mut dyn RandomSource) -> ScrambleFrame {
        if self.done {
            return ScrambleFrame::Finished {
                text: self.prefix(self.text.len()),
            };
        }
        if self.cancel.is_cancelled() {
            return ScrambleFrame::Cancelled;
        }

        self.step += 1;
        let mut reveal = None;
        if self.step % self.steps_per_glyph == 0 {
            self.revealed += 1;
            reveal = Some(self.prefix(self.revealed));
        }

        if self.revealed <= self.text.len() {
            let overlay = random_string(rng, &self.alphabet, self.text.len() - self.revealed);
            ScrambleFrame::Tick { reveal, overlay }
        } else {
            self.done = true;
            ScrambleFrame::Finished {
                text: self.prefix(self.text.len()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SplitMix64;

    #[test]
    fn interval_divides_duration_over_all_ticks() {
        let s = ScrambleStepper::new("abcd", "xy", 800.0, 10, CancelToken::new());
        assert_eq!(s.interval_ms(), 20.0);
        let empty = ScrambleStepper::new("", "xy", 800.0, 10, CancelToken::new());
        assert_eq!(empty.interval_ms(), 0.0);
    }

    #[test]
    fn one_step_per_glyph_reveals_every_tick() {
        let mut rng = SplitMix64::new(1);
        let mut s = ScrambleStepper::new("ab", "#", 100.0, 1, CancelToken::new());
        assert_eq!(
            s.step(&mut rng),
            ScrambleFrame::Tick {
                reveal: Some("a".into()),
                overlay: "#".into()
            }
        );
        assert_eq!(
            s.step(&mut rng),
            ScrambleFrame::Tick {
                reveal: Some("ab".into()),
                overlay: String::new()
            }
        );
        assert_eq!(
            s.step(&mut rng),
            ScrambleFrame::Finished { text: "ab".into() }
        );
        assert!(s.is_done());
        assert_eq!(s.revealed_len(), 3);
    }

    #[test]
    fn empty_text_finishes_after_one_glyph_period() {
        let mut rng = SplitMix64::new(1);
        let mut s = ScrambleStepper::new("", "#", 100.0, 2, CancelToken::new());
        assert_eq!(
            s.step(&mut rng),
            ScrambleFrame::Tick {
                reveal: None,
                overlay: String::new()
            }
        );
        assert_eq!(s.step(&mut rng), ScrambleFrame::Finished { text: String::new() });
    }

    #[test]
    fn multibyte_text_is_sliced_by_char() {
        let mut rng = SplitMix64::new(1);
        let mut s = ScrambleStepper::new("héllo", "*", 100.0, 1, CancelToken::new());
        s.step(&mut rng);
        match s.step(&mut rng) {
            ScrambleFrame::Tick { reveal, overlay } => {
                assert_eq!(reveal.as_deref(), Some("hé"));
                assert_eq!(overlay, "***");
            }
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn cancellation_is_checked_before_each_tick() {
        let mut rng = SplitMix64::new(1);
        let token = CancelToken::new();
        let mut s = ScrambleStepper::new("abc", "#", 100.0, 1, token.clone());
        assert!(matches!(s.step(&mut rng), ScrambleFrame::Tick { .. }));
        token.cancel();
        assert_eq!(s.step(&mut rng), ScrambleFrame::Cancelled);
        assert_eq!(s.revealed_len(), 1);
    }
}
