#![forbid(unsafe_code)]

//! Animation queue: one frame timer multiplexed across animators.
//!
//! Every concurrently running per-frame job in a window (auto-scrolling a
//! drag, easing a scroller) registers an [`Animator`] with the window's
//! [`AnimationQueue`]. The queue keeps a single frame deadline; each frame it
//! runs every animator once, in registration order, against the element tree.
//!
//! # Invariants
//!
//! 1. A frame deadline exists iff at least one animator is registered.
//! 2. `remove()` takes effect immediately: a removed animator never runs again.
//! 3. An animator returning [`AnimatorStatus::Finished`] is dropped after its frame.
//! 4. Missed frames are not replayed; the next frame is scheduled one interval
//!    after the frame that ran.

use std::fmt;

use web_time::{Duration, Instant};

use crate::element::ElementTree;

/// Default frame interval (~60 fps).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Whether an animator wants more frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorStatus {
    Continue,
    Finished,
}

/// A per-frame job.
pub trait Animator {
    /// Advance one frame.
    fn animate(&mut self, tree: &mut ElementTree, now: Instant) -> AnimatorStatus;
}

impl<F> Animator for F
where
    F: FnMut(&mut ElementTree, Instant) -> AnimatorStatus,
{
    fn animate(&mut self, tree: &mut ElementTree, now: Instant) -> AnimatorStatus {
        self(tree, now)
    }
}

/// Identifier returned by [`AnimationQueue::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimatorId(u64);

struct Entry {
    id: AnimatorId,
    animator: Box<dyn Animator>,
}

/// Single-timer multiplexer for per-frame animators.
pub struct AnimationQueue {
    entries: Vec<Entry>,
    interval: Duration,
    next_frame: Option<Instant>,
    next_id: u64,
    frames: u64,
}

impl fmt::Debug for AnimationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationQueue")
            .field("animators", &self.entries.len())
            .field("interval", &self.interval)
            .field("next_frame", &self.next_frame)
            .field("frames", &self.frames)
            .finish()
    }
}

impl Default for AnimationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl AnimationQueue {
    /// Create an empty queue with the given frame interval.
    ///
    /// A zero interval is clamped to 1ms.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            entries: Vec::new(),
            interval: interval.max(Duration::from_millis(1)),
            next_frame: None,
            next_id: 1,
            frames: 0,
        }
    }

    /// Register an animator; the first registration arms the frame timer.
    pub fn add(&mut self, animator: impl Animator + 'static, now: Instant) -> AnimatorId {
        let id = AnimatorId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            animator: Box::new(animator),
        });
        if self.next_frame.is_none() {
            self.next_frame = Some(now + self.interval);
            #[cfg(feature = "tracing")]
            tracing::trace!(interval_ms = self.interval.as_millis() as u64, "animation queue started");
        }
        id
    }

    /// Unregister an animator. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: AnimatorId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if self.entries.is_empty() {
            self.next_frame = None;
        }
        removed
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: AnimatorId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Number of registered animators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no animators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deadline of the next frame, if any animator is registered.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_frame
    }

    /// Total frames run since creation.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run a frame if one is due. Returns `true` if a frame ran.
    pub fn tick(&mut self, now: Instant, tree: &mut ElementTree) -> bool {
        match self.next_frame {
            Some(deadline) if deadline <= now => {}
            _ => return false,
        }
        self.frames += 1;
        self.entries
            .retain_mut(|e| e.animator.animate(tree, now) == AnimatorStatus::Continue);
        self.next_frame = if self.entries.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::trace!(frames = self.frames, "animation queue drained");
            None
        } else {
            Some(now + self.interval)
        };
        true
    }
}
