#![forbid(unsafe_code)]

//! Canonical pointer input.
//!
//! # Design Notes
//!
//! - A host translates its native mouse/touch events into [`PointerEvent`]s.
//! - `target` is optional: when the host already knows the element under the
//!   pointer it passes it along, otherwise the element tree is hit-tested.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;
use web_time::Instant;

use crate::element::ElementId;
use crate::geometry::{Point, Velocity};

/// Kind of raw pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEventKind {
    /// Primary button or finger pressed.
    Down,
    /// Pointer moved while pressed.
    Move,
    /// Primary button or finger released.
    Up,
    /// The host detected a flick and reports its velocity (px/s).
    Flick { velocity: Velocity },
}

/// A raw pointer event as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: Point,
    pub target: Option<ElementId>,
    pub modifiers: Modifiers,
    pub timestamp: Instant,
}

impl PointerEvent {
    /// Create a new event with no modifiers and no explicit target.
    #[must_use]
    pub const fn new(kind: PointerEventKind, position: Point, timestamp: Instant) -> Self {
        Self {
            kind,
            position,
            target: None,
            modifiers: Modifiers::NONE,
            timestamp,
        }
    }

    /// Convenience constructor for a pointer-down.
    #[must_use]
    pub const fn down(x: i32, y: i32, timestamp: Instant) -> Self {
        Self::new(PointerEventKind::Down, Point::new(x, y), timestamp)
    }

    /// Convenience constructor for a pointer-move.
    #[must_use]
    pub const fn moved(x: i32, y: i32, timestamp: Instant) -> Self {
        Self::new(PointerEventKind::Move, Point::new(x, y), timestamp)
    }

    /// Convenience constructor for a pointer-up.
    #[must_use]
    pub const fn up(x: i32, y: i32, timestamp: Instant) -> Self {
        Self::new(PointerEventKind::Up, Point::new(x, y), timestamp)
    }

    /// Convenience constructor for a host flick hint.
    #[must_use]
    pub const fn flick(velocity: Velocity, position: Point, timestamp: Instant) -> Self {
        Self::new(PointerEventKind::Flick { velocity }, position, timestamp)
    }

    /// Set the element the host resolved under the pointer.
    #[must_use]
    pub const fn with_target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the modifier keys held during the event.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether the shift key was held.
    #[inline]
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

bitflags! {
    /// Modifier keys that can be held during a pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Meta/Orange key.
        const META  = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}
