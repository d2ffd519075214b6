//! Animation steppers for the two one-shot effects.
//!
//! Steppers are plain state machines driven by the engine clock; each call
//! to `step` is one tick and checks the [`CancelToken`] before doing any
//! work.

pub mod count;
pub mod scramble;

use std::cell::Cell;
use std::rc::Rc;

pub use count::{format_count, parse_count_finish, CountFrame, CountStepper};
pub use scramble::{ScrambleFrame, ScrambleStepper};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}
