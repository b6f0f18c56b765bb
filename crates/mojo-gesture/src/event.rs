#![forbid(unsafe_code)]

//! Synthesized gesture events.
//!
//! [`GestureEvent`] is what the recognizer dispatches at elements. Every event
//! bubbles and is cancelable: a handler calls
//! [`GestureEvent::prevent_default`] to mark it handled, which the recognizer
//! reads back (an unhandled `dragStart` enables the tap fallback, a handled
//! `hold` suppresses the tap).
//!
//! # Invariants
//! 1. Per gesture: at most one `DragStart`, and every `Dragging` follows it.
//! 2. `Tap` and `DragEnd` are mutually exclusive terminal events.
//! 3. `HoldEnd` is only dispatched after `Hold`.

use std::fmt;

use mojo_core::element::ElementId;
use mojo_core::geometry::{Point, Velocity};
use web_time::Instant;

use crate::recognizer::WindowId;

/// Kind of synthesized gesture event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Tap,
    Hold,
    HoldEnd,
    DragStart,
    Dragging,
    DragEnd,
    Flick,
}

impl GestureKind {
    /// All kinds, in a stable order.
    pub const ALL: [Self; 7] = [
        Self::Tap,
        Self::Hold,
        Self::HoldEnd,
        Self::DragStart,
        Self::Dragging,
        Self::DragEnd,
        Self::Flick,
    ];

    /// Event type name as seen by application code.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tap => "mojo-tap",
            Self::Hold => "mojo-hold",
            Self::HoldEnd => "mojo-hold-end",
            Self::DragStart => "mojo-drag-start",
            Self::Dragging => "mojo-dragging",
            Self::DragEnd => "mojo-drag-end",
            Self::Flick => "mojo-flick",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of the pointer-down that began the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownSnapshot {
    pub target: ElementId,
    pub position: Point,
    pub timestamp: Instant,
    pub shift: bool,
}

/// A gesture event dispatched at an element.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub window: WindowId,
    /// Element the event is dispatched at.
    pub target: ElementId,
    pub down: DownSnapshot,
    /// Pointer position that produced the event.
    pub position: Point,
    /// Filtered distance from the down position (0 on still-filtered axes).
    pub distance: Point,
    /// Filtered movement since the previous `Dragging` event.
    pub delta: Point,
    pub velocity: Velocity,
    pub timestamp: Instant,
    default_prevented: bool,
}

impl GestureEvent {
    pub(crate) fn new(
        kind: GestureKind,
        window: WindowId,
        down: DownSnapshot,
        position: Point,
        timestamp: Instant,
    ) -> Self {
        Self {
            kind,
            window,
            target: down.target,
            down,
            position,
            distance: Point::ZERO,
            delta: Point::ZERO,
            velocity: Velocity::ZERO,
            timestamp,
            default_prevented: false,
        }
    }

    pub(crate) fn with_motion(mut self, distance: Point, delta: Point, velocity: Velocity) -> Self {
        self.distance = distance;
        self.delta = delta;
        self.velocity = velocity;
        self
    }

    /// Mark the event as handled.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a handler marked the event as handled.
    #[inline]
    #[must_use]
    pub const fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = GestureKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), GestureKind::ALL.len());
        assert_eq!(GestureKind::DragStart.to_string(), "mojo-drag-start");
    }

    #[test]
    fn prevent_default_sticks() {
        let t = Instant::now();
        let down = DownSnapshot {
            target: ElementId::from_raw(1),
            position: Point::new(1, 2),
            timestamp: t,
            shift: false,
        };
        let mut ev = GestureEvent::new(GestureKind::Tap, WindowId(0), down, Point::new(1, 2), t);
        assert_eq!(ev.target, down.target);
        assert!(!ev.default_prevented());
        ev.prevent_default();
        assert!(ev.default_prevented());
    }
}
