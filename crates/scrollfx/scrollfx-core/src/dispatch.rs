//! Central viewport event dispatcher.
//!
//! The engine owns the only scroll/resize subscription; widget instances
//! register a listener here and receive fan-out. Scroll-driven layer
//! updates are coalesced into a single pending animation frame.

use serde::{Deserialize, Serialize};

use crate::ids::{IdAllocator, ListenerId, ParallaxId, TargetId};

/// Which viewport events a listener wants.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMask {
    pub scroll: bool,
    pub resize: bool,
}

impl EventMask {
    pub const SCROLL: Self = Self {
        scroll: true,
        resize: false,
    };
    pub const RESIZE: Self = Self {
        scroll: false,
        resize: true,
    };
    pub const BOTH: Self = Self {
        scroll: true,
        resize: true,
    };

    #[inline]
    pub fn wants(&self, kind: ViewportEvent) -> bool {
        match kind {
            ViewportEvent::Scroll => self.scroll,
            ViewportEvent::Resize => self.resize,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ViewportEvent {
    Scroll,
    Resize,
}

/// What a subscription routes to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Listener {
    /// Trigger evaluation for an animation target.
    Trigger(TargetId),
    /// Layer positioning for a parallax background.
    Layer(ParallaxId),
    /// Play/pause-on-view-loss for a background video.
    PlayPause(ParallaxId),
}

#[derive(Clone, Debug)]
struct Subscription {
    id: ListenerId,
    listener: Listener,
    mask: EventMask,
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    subs: Vec<Subscription>,
    frame_requested: bool,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, ids: &mut IdAllocator, listener: Listener, mask: EventMask) -> ListenerId {
        let id = ids.alloc_listener();
        self.subs.push(Subscription { id, listener, mask });
        id
    }

    /// Remove one subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subs.len();
        self.subs.retain(|s| s.id != id);
        self.subs.len() != before
    }

    /// Remove every subscription routed to `listener`.
    pub fn unsubscribe_listener(&mut self, listener: Listener) {
        self.subs.retain(|s| s.listener != listener);
    }

    pub fn is_subscribed(&self, listener: Listener) -> bool {
        self.subs.iter().any(|s| s.listener == listener)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Listeners interested in `kind`, in subscription order. Collected so
    /// handlers may unsubscribe while the fan-out runs.
    pub fn listeners(&self, kind: ViewportEvent) -> Vec<Listener> {
        self.subs
            .iter()
            .filter(|s| s.mask.wants(kind))
            .map(|s| s.listener)
            .collect()
    }

    /// Ask for an animation frame. Returns true only when no frame was
    /// already pending.
    pub fn request_frame(&mut self) -> bool {
        if self.frame_requested {
            return false;
        }
        self.frame_requested = true;
        true
    }

    #[inline]
    pub fn frame_pending(&self) -> bool {
        self.frame_requested
    }

    /// Consume the pending frame request, if any.
    pub fn take_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }
}
