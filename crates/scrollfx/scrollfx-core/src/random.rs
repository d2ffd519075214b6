//! Random glyph strings for the scramble overlay.
//!
//! The engine draws through [`RandomSource`] so hosts can plug in their own
//! generator (the wasm bridge uses `Math.random`) and tests can seed one.

/// Source of uniform floats in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Small seeded SplitMix64 generator. Not cryptographic.
#[derive(Clone, Debug)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl Default for SplitMix64 {
    fn default() -> Self {
        Self::new(0x5EED_F00D)
    }
}

impl RandomSource for SplitMix64 {
    fn next_f64(&mut self) -> f64 {
        // 53 high bits -> [0, 1)
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Adapts a closure (e.g. a host `Math.random` call) into a source.
pub struct FromFn<F>(pub F);

impl<F: FnMut() -> f64> RandomSource for FromFn<F> {
    fn next_f64(&mut self) -> f64 {
        (self.0)()
    }
}

/// `length` glyphs, each picked uniformly from `alphabet` via
/// `floor(random() * alphabet.len())`. An empty alphabet yields an empty
/// string.
pub fn random_string(rng: &mut dyn RandomSource, alphabet: &[char], length: usize) -> String {
    if alphabet.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(length);
    for _ in 0..length {
        let r = rng.next_f64();
        let idx = ((r * alphabet.len() as f64) as usize).min(alphabet.len() - 1);
        out.push(alphabet[idx]);
    }
    out
}
