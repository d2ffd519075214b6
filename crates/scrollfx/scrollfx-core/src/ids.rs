//! Identifiers and simple allocators for bound widget instances.

use serde::{Deserialize, Serialize};

/// Handle of a bound one-shot animation (count or scramble).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Handle of a bound parallax/video background.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParallaxId(pub u32);

/// Handle of a dispatcher subscription.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

/// Monotonic allocator for TargetId, ParallaxId, and ListenerId.
/// Ids are never recycled, so a handle from an unbound instance cannot
/// alias a later one.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_target: u32,
    next_parallax: u32,
    next_listener: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_target(&mut self) -> TargetId {
        let id = TargetId(self.next_target);
        self.next_target = self.next_target.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_parallax(&mut self) -> ParallaxId {
        let id = ParallaxId(self.next_parallax);
        self.next_parallax = self.next_parallax.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        id
    }
}
