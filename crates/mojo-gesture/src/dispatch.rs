#![forbid(unsafe_code)]

//! Delivering gesture events to application code.
//!
//! The recognizer hands every synthesized event to a [`GestureHandler`].
//! Closures work directly; [`Listeners`] adds DOM-style per-element
//! registration with bubbling from the target to the root.
//!
//! After the handler returns, the event is forwarded to the stage's drag
//! session (if the event belongs to it). A `dragStart` whose target is being
//! dragged is marked handled so it does not also fall back to a tap.

use std::fmt;

use ahash::AHashMap;
use mojo_core::element::ElementId;

use crate::event::{GestureEvent, GestureKind};
use crate::stage::Stage;

/// Receives synthesized gesture events.
pub trait GestureHandler {
    fn handle_gesture(&mut self, stage: &mut Stage, event: &mut GestureEvent);
}

impl<F> GestureHandler for F
where
    F: FnMut(&mut Stage, &mut GestureEvent),
{
    fn handle_gesture(&mut self, stage: &mut Stage, event: &mut GestureEvent) {
        self(stage, event);
    }
}

/// Handler that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreGestures;

impl GestureHandler for IgnoreGestures {
    fn handle_gesture(&mut self, _stage: &mut Stage, _event: &mut GestureEvent) {}
}

pub(crate) fn dispatch(
    stage: &mut Stage,
    handler: &mut dyn GestureHandler,
    mut event: GestureEvent,
) -> GestureEvent {
    let _span = tracing::trace_span!(
        "mojo.gesture.dispatch",
        kind = event.kind.name(),
        target = %event.target,
        window = event.window.0
    )
    .entered();

    handler.handle_gesture(stage, &mut event);
    if event.kind == GestureKind::DragStart && stage.drag_tracks(event.target) {
        event.prevent_default();
    }
    stage.route_to_drag(&event);

    tracing::trace!(handled = event.default_prevented(), "gesture dispatched");
    event
}

// ---------------------------------------------------------------------------
// Per-element listeners
// ---------------------------------------------------------------------------

/// The event as seen by one listener during bubbling.
pub struct EventContext<'a> {
    event: &'a mut GestureEvent,
    current_target: ElementId,
    propagation_stopped: bool,
}

impl EventContext<'_> {
    #[must_use]
    pub fn event(&self) -> &GestureEvent {
        self.event
    }

    /// Element whose listener is running.
    #[must_use]
    pub fn current_target(&self) -> ElementId {
        self.current_target
    }

    pub fn prevent_default(&mut self) {
        self.event.prevent_default();
    }

    /// Do not bubble past the current element.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

type Listener = Box<dyn FnMut(&mut Stage, &mut EventContext<'_>)>;

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Per-element gesture listeners with bubbling.
#[derive(Default)]
pub struct Listeners {
    entries: AHashMap<(ElementId, GestureKind), Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}

impl Listeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for `kind` on `element` and its descendants.
    pub fn on(
        &mut self,
        element: ElementId,
        kind: GestureKind,
        listener: impl FnMut(&mut Stage, &mut EventContext<'_>) + 'static,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries
            .entry((element, kind))
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        self.entries.retain(|_, list| {
            let before = list.len();
            list.retain(|(lid, _)| *lid != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Total registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GestureHandler for Listeners {
    fn handle_gesture(&mut self, stage: &mut Stage, event: &mut GestureEvent) {
        let path: Vec<ElementId> = stage.tree().ancestors(event.target).collect();
        for element in path {
            let Some(list) = self.entries.get_mut(&(element, event.kind)) else {
                continue;
            };
            let mut cx = EventContext {
                event: &mut *event,
                current_target: element,
                propagation_stopped: false,
            };
            for (_, listener) in list.iter_mut() {
                listener(stage, &mut cx);
            }
            if cx.propagation_stopped {
                break;
            }
        }
    }
}
