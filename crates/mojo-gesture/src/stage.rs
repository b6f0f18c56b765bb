#![forbid(unsafe_code)]

//! A stage: one window's element tree plus the per-window machinery the
//! gesture layer drives (timers, the animation queue, drop containers and at
//! most one drag session).
//!
//! Gesture handlers receive `&mut Stage`, so they can start a drag from a
//! `hold` or `dragStart` handler and the session sees the rest of the same
//! gesture.

use mojo_core::animation::AnimationQueue;
use mojo_core::element::{ElementError, ElementId, ElementTree};
use mojo_core::timer::TimerQueue;
use web_time::Instant;

use crate::drag::{DragEnd, DragError, DragOptions, DragOutcome, DragSession};
use crate::drop::{DropClient, DropRegistry};
use crate::event::{GestureEvent, GestureKind};
use crate::recognizer::WindowId;

/// Timers the recognizer arms on a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StageTimer {
    /// The press has been stationary for the hold timeout.
    Hold,
    /// `delayed` feedback becomes visible.
    HighlightDelay,
    /// A `spontaneous` tap flash ends.
    FlashEnd(ElementId),
}

/// One window's element tree and gesture-side state.
#[derive(Debug)]
pub struct Stage {
    id: WindowId,
    tree: ElementTree,
    pub(crate) timers: TimerQueue<StageTimer>,
    animations: AnimationQueue,
    drops: DropRegistry,
    drag: Option<DragSession>,
    pub(crate) persistent_highlight: Option<ElementId>,
    last_drag: Option<DragOutcome>,
}

impl Stage {
    /// Create a stage with an empty document.
    #[must_use]
    pub fn new(id: WindowId) -> Self {
        Self::with_tree(id, ElementTree::new())
    }

    /// Create a stage over an existing tree.
    #[must_use]
    pub fn with_tree(id: WindowId, tree: ElementTree) -> Self {
        Self {
            id,
            tree,
            timers: TimerQueue::new(),
            animations: AnimationQueue::default(),
            drops: DropRegistry::new(),
            drag: None,
            persistent_highlight: None,
            last_drag: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> WindowId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    #[inline]
    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    #[must_use]
    pub fn animations(&self) -> &AnimationQueue {
        &self.animations
    }

    #[must_use]
    pub fn drops(&self) -> &DropRegistry {
        &self.drops
    }

    /// Element currently holding a persistent touch highlight.
    #[must_use]
    pub fn persistent_highlight(&self) -> Option<ElementId> {
        self.persistent_highlight
    }

    /// Earliest pending timer or animation frame.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.timers.next_deadline(), self.animations.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub(crate) fn run_animations(&mut self, now: Instant) -> bool {
        self.animations.tick(now, &mut self.tree)
    }

    // -----------------------------------------------------------------------
    // Drop containers
    // -----------------------------------------------------------------------

    /// Make `element` a drop container handled by `client`.
    pub fn setup_drop_container(
        &mut self,
        element: ElementId,
        client: impl DropClient + 'static,
    ) -> Result<(), ElementError> {
        self.drops.register(&mut self.tree, element, client)
    }

    /// Undo [`setup_drop_container`](Self::setup_drop_container).
    pub fn remove_drop_container(&mut self, element: ElementId) -> bool {
        self.drops.unregister(&mut self.tree, element)
    }

    // -----------------------------------------------------------------------
    // Dragging
    // -----------------------------------------------------------------------

    /// Start dragging `element` among the drop containers under
    /// `container_root`.
    ///
    /// `start_event` is the gesture event that triggered the drag (normally
    /// `hold` or `dragStart`); the rest of that gesture drives the session.
    pub fn start_dragging(
        &mut self,
        container_root: ElementId,
        element: ElementId,
        start_event: &GestureEvent,
        options: DragOptions,
    ) -> Result<(), DragError> {
        if let Some(session) = &self.drag {
            return Err(DragError::AlreadyDragging {
                element: session.element(),
            });
        }
        let session = DragSession::start(
            &mut self.tree,
            &mut self.drops,
            &mut self.animations,
            container_root,
            element,
            start_event,
            options,
        )?;
        self.drag = Some(session);
        Ok(())
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    #[must_use]
    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Outcome of the most recently finished drag.
    #[must_use]
    pub fn last_drag_outcome(&self) -> Option<DragOutcome> {
        self.last_drag
    }

    /// Restore the dragged element's pre-drag styling now.
    pub fn reset_drag_element(&mut self) -> bool {
        match &mut self.drag {
            Some(session) => session.reset_element(&mut self.tree),
            None => false,
        }
    }

    /// End the active drag without dropping.
    pub fn cancel_drag(&mut self) -> Option<DragOutcome> {
        self.finish_drag(DragEnd::Cancel)
    }

    fn finish_drag(&mut self, end: DragEnd) -> Option<DragOutcome> {
        let session = self.drag.take()?;
        let outcome = session.finish(&mut self.tree, &mut self.drops, &mut self.animations, end);
        self.last_drag = Some(outcome);
        Some(outcome)
    }

    /// Whether gesture events at `target` drive the active drag.
    pub(crate) fn drag_tracks(&self, target: ElementId) -> bool {
        self.drag
            .as_ref()
            .is_some_and(|s| s.tracks(&self.tree, target))
    }

    /// Forward a dispatched gesture event to the active drag session.
    pub(crate) fn route_to_drag(&mut self, event: &GestureEvent) {
        if !self.drag_tracks(event.target) {
            return;
        }
        match event.kind {
            GestureKind::Dragging => {
                if let Some(session) = &mut self.drag {
                    session.on_dragging(&mut self.tree, &mut self.drops, event);
                }
            }
            GestureKind::DragEnd => {
                self.finish_drag(DragEnd::Drop);
            }
            GestureKind::Tap => {
                self.finish_drag(DragEnd::Cancel);
            }
            GestureKind::Hold
            | GestureKind::HoldEnd
            | GestureKind::DragStart
            | GestureKind::Flick => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DownSnapshot;
    use mojo_core::geometry::{Point, Rect};

    struct Nop;
    impl DropClient for Nop {}

    fn hold_event(target: ElementId) -> GestureEvent {
        let t = Instant::now();
        let down = DownSnapshot {
            target,
            position: Point::new(10, 10),
            timestamp: t,
            shift: false,
        };
        GestureEvent::new(GestureKind::Hold, WindowId(1), down, Point::new(10, 10), t)
    }

    #[test]
    fn second_drag_is_rejected() {
        let mut stage = Stage::new(WindowId(1));
        let root = stage.tree().root();
        let list = stage
            .tree_mut()
            .create_child(root, "ul", Rect::new(0, 0, 100, 100))
            .unwrap();
        let item = stage
            .tree_mut()
            .create_child(list, "li", Rect::new(0, 0, 100, 20))
            .unwrap();
        stage.setup_drop_container(list, Nop).unwrap();

        let ev = hold_event(item);
        stage.start_dragging(root, item, &ev, DragOptions::new()).unwrap();
        assert_eq!(
            stage.start_dragging(root, item, &ev, DragOptions::new()),
            Err(DragError::AlreadyDragging { element: item })
        );
        assert_eq!(stage.drag_session().and_then(|s| s.original_container()), Some(list));
    }

    #[test]
    fn unknown_element_is_rejected() {
        let mut stage = Stage::new(WindowId(1));
        let root = stage.tree().root();
        let ghost = ElementId::from_raw(99);
        let ev = hold_event(root);
        assert_eq!(
            stage.start_dragging(root, ghost, &ev, DragOptions::new()),
            Err(DragError::UnknownElement(ghost))
        );
        assert!(!stage.is_dragging());
    }

    #[test]
    fn cancel_restores_and_records_outcome() {
        let mut stage = Stage::new(WindowId(1));
        let root = stage.tree().root();
        let item = stage
            .tree_mut()
            .create_child(root, "div", Rect::new(5, 5, 10, 10))
            .unwrap();
        let ev = hold_event(item);
        stage.start_dragging(root, item, &ev, DragOptions::new()).unwrap();
        assert!(stage.tree().has_class(item, "palm-dragging"));

        let outcome = stage.cancel_drag().unwrap();
        assert_eq!(outcome.dropped_in, None);
        assert!(!stage.tree().has_class(item, "palm-dragging"));
        assert_eq!(stage.last_drag_outcome(), Some(outcome));
        assert!(stage.cancel_drag().is_none());
    }

    #[test]
    fn next_deadline_prefers_earliest() {
        let mut stage = Stage::new(WindowId(1));
        assert_eq!(stage.next_deadline(), None);
        let now = Instant::now();
        stage
            .timers
            .schedule_after(now, web_time::Duration::from_millis(500), StageTimer::Hold);
        assert_eq!(
            stage.next_deadline(),
            Some(now + web_time::Duration::from_millis(500))
        );
    }
}
