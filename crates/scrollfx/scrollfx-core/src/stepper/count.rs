//! Numeric count-up/count-down along an easing curve.

use super::CancelToken;
use crate::interp::functions::lerp;
use crate::interp::Easing;

/// Cadence of count frames, matching the usual 13ms effects interval.
pub const COUNT_FRAME_MS: f64 = 13.0;

/// Parse the leading integer of rendered text: optional whitespace, an
/// optional sign, then digits. Anything after the digits is ignored.
/// When `delimiter` is given it is stripped first so `"1,250"` reads as 1250.
pub fn parse_count_finish(text: &str, delimiter: Option<&str>) -> Option<i64> {
    let cleaned;
    let mut s = text;
    if let Some(d) = delimiter.filter(|d| !d.is_empty()) {
        cleaned = text.replace(d, "");
        s = &cleaned;
    }
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Render an integer, optionally grouping thousands with `delimiter`.
pub fn format_count(value: i64, delimiter: Option<&str>) -> String {
    let raw = value.unsigned_abs().to_string();
    let body = match delimiter {
        Some(d) if raw.len() > 3 => {
            let mut out = String::with_capacity(raw.len() + raw.len() / 3 * d.len());
            let lead = raw.len() % 3;
            for (i, ch) in raw.chars().enumerate() {
                if i != 0 && (i + 3 - lead) % 3 == 0 {
                    out.push_str(d);
                }
                out.push(ch);
            }
            out
        }
        _ => raw,
    };
    if value < 0 {
        format!("-{body}")
    } else {
        body
    }
}

/// One tick of a count animation.
#[derive(Clone, Debug, PartialEq)]
pub enum CountFrame {
    /// Intermediate frame; `text` is `ceil(value)`.
    Tick { value: f64, text: String },
    /// Final frame showing the exact finish value.
    Finished { text: String },
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct CountStepper {
    start: i64,
    finish: i64,
    duration_ms: f64,
    easing: Easing,
    started_at: f64,
    delimiter: Option<String>,
    cancel: CancelToken,
    done: bool,
}

impl CountStepper {
    pub fn new(
        start: i64,
        finish: i64,
        duration_ms: f64,
        easing: Easing,
        started_at: f64,
        cancel: CancelToken,
    ) -> Self {
        Self {
            start,
            finish,
            duration_ms,
            easing,
            started_at,
            delimiter: None,
            cancel,
            done: false,
        }
    }

    /// Group thousands with `delimiter` in rendered text.
    pub fn with_delimiter(mut self, delimiter: Option<String>) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Interpolated (possibly fractional) value at `now`.
    pub fn value_at(&self, now: f64) -> f64 {
        lerp(
            self.start as f64,
            self.finish as f64,
            self.easing.sample(self.progress(now)),
        )
    }

    fn progress(&self, now: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Advance to `now`. Once finished, further calls keep returning the
    /// final frame without recomputing.
    pub fn step(&mut self, now: f64) -> CountFrame {
        if self.done {
            return self.finished();
        }
        if self.cancel.is_cancelled() {
            return CountFrame::Cancelled;
        }
        if self.progress(now) >= 1.0 {
            self.done = true;
            return self.finished();
        }
        let value = self.value_at(now);
        CountFrame::Tick {
            value,
            text: format_count(value.ceil() as i64, self.delimiter.as_deref()),
        }
    }

    fn finished(&self) -> CountFrame {
        CountFrame::Finished {
            text: format_count(self.finish, self.delimiter.as_deref()),
        }
    }

    /// Lazily replay the whole animation at a fixed cadence, ending with the
    /// finish frame.
    pub fn frames(&self, cadence_ms: f64) -> impl Iterator<Item = CountFrame> {
        let mut stepper = self.clone();
        let cadence = cadence_ms.max(f64::EPSILON);
        let mut now = self.started_at;
        let mut ended = false;
        std::iter::from_fn(move || {
            if ended {
                return None;
            }
            let frame = stepper.step(now);
            now += cadence;
            if !matches!(frame, CountFrame::Tick { .. }) {
                ended = true;
            }
            Some(frame)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leading_integers() {
        assert_eq!(parse_count_finish("  42 clients", None), Some(42));
        assert_eq!(parse_count_finish("-7", None), Some(-7));
        assert_eq!(parse_count_finish("+3", None), Some(3));
        assert_eq!(parse_count_finish("1,250", None), Some(1));
        assert_eq!(parse_count_finish("1,250", Some(",")), Some(1250));
        assert_eq!(parse_count_finish("n/a", None), None);
        assert_eq!(parse_count_finish("", None), None);
    }

    #[test]
    fn formats_with_grouping() {
        assert_eq!(format_count(0, Some(",")), "0");
        assert_eq!(format_count(999, Some(",")), "999");
        assert_eq!(format_count(1000, Some(",")), "1,000");
        assert_eq!(format_count(1234567, Some(".")), "1.234.567");
        assert_eq!(format_count(-12345, Some(",")), "-12,345");
        assert_eq!(format_count(12345, None), "12345");
    }

    #[test]
    fn zero_duration_finishes_on_first_step() {
        let mut s = CountStepper::new(0, 10, 0.0, Easing::Linear, 0.0, CancelToken::new());
        assert_eq!(
            s.step(0.0),
            CountFrame::Finished {
                text: "10".into()
            }
        );
        assert!(s.is_done());
    }

    #[test]
    fn intermediate_frames_use_ceiling() {
        let mut s = CountStepper::new(0, 10, 100.0, Easing::Linear, 0.0, CancelToken::new());
        match s.step(1.0) {
            CountFrame::Tick { value, text } => {
                assert!((value - 0.1).abs() < 1e-9);
                assert_eq!(text, "1");
            }
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn cancelled_stepper_stops() {
        let token = CancelToken::new();
        let mut s = CountStepper::new(0, 10, 100.0, Easing::Linear, 0.0, token.clone());
        token.cancel();
        assert_eq!(s.step(50.0), CountFrame::Cancelled);
    }
}
