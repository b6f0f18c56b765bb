#![forbid(unsafe_code)]

//! Mojo touch public facade crate.
//!
//! Re-exports the types most applications need from `mojo-core` and
//! `mojo-gesture`, a [`Window`] that bundles a stage with its recognizer and
//! listeners, and a prelude.

use std::fmt;

use mojo_core::element::ElementError;
use mojo_gesture::{ConfigError, DragError};

// --- Core re-exports -------------------------------------------------------

pub use mojo_core::element::{ElementId, ElementTree, Positioning, Style};
pub use mojo_core::geometry::{Point, Rect, Velocity};
pub use mojo_core::input::{Modifiers, PointerEvent, PointerEventKind};
pub use mojo_core::{Duration, Instant};

// --- Gesture re-exports ----------------------------------------------------

pub use mojo_gesture::{
    DragOptions, DragOutcome, DropClient, DropClientError, DropResult, EventContext,
    FeedbackMode, GestureConfig, GestureEvent, GestureHandler, GestureKind, GestureRecognizer,
    ListenerId, Listeners, Stage, WindowId,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Mojo applications.
#[derive(Debug)]
pub enum Error {
    /// Element tree operation failed.
    Element(ElementError),
    /// A drag could not be started.
    Drag(DragError),
    /// Gesture configuration could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(err) => write!(f, "{err}"),
            Self::Drag(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Element(err) => Some(err),
            Self::Drag(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<ElementError> for Error {
    fn from(err: ElementError) -> Self {
        Self::Element(err)
    }
}

impl From<DragError> for Error {
    fn from(err: DragError) -> Self {
        Self::Drag(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for Mojo APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Window facade ----------------------------------------------------------

/// One top-level window: its stage, gesture recognizer and listeners.
#[derive(Debug)]
pub struct Window {
    stage: Stage,
    recognizer: GestureRecognizer,
    listeners: Listeners,
}

impl Window {
    /// Create a window with an empty document and default gesture tuning.
    #[must_use]
    pub fn new(id: WindowId) -> Self {
        Self::with_config(id, GestureConfig::default())
    }

    /// Create a window with custom gesture tuning.
    ///
    /// Invalid configurations are rejected with the list of problems.
    pub fn try_with_config(id: WindowId, config: GestureConfig) -> Result<Self> {
        let problems = config.validate();
        if !problems.is_empty() {
            return Err(Error::Config(ConfigError::Validation(problems)));
        }
        Ok(Self::with_config(id, config))
    }

    fn with_config(id: WindowId, config: GestureConfig) -> Self {
        tracing::debug!(window = %id, "window created");
        Self {
            stage: Stage::new(id),
            recognizer: GestureRecognizer::new(config),
            listeners: Listeners::new(),
        }
    }

    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    #[must_use]
    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    pub fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }

    /// Listen for `kind` on `element` (and, by bubbling, its descendants).
    pub fn on(
        &mut self,
        element: ElementId,
        kind: GestureKind,
        listener: impl FnMut(&mut Stage, &mut EventContext<'_>) + 'static,
    ) -> ListenerId {
        self.listeners.on(element, kind, listener)
    }

    /// Feed raw pointer input.
    pub fn pointer(&mut self, event: &PointerEvent) {
        self.recognizer
            .handle_pointer(&mut self.stage, event, &mut self.listeners);
    }

    /// Fire due timers and animation frames. Returns the number of gesture
    /// timers that fired.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.recognizer
            .tick(&mut self.stage, now, &mut self.listeners)
    }

    /// When [`tick`](Self::tick) next has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.stage.next_deadline()
    }

    /// Abort the gesture in progress without dispatching anything.
    pub fn cancel_gesture(&mut self) -> bool {
        self.recognizer.cancel(&mut self.stage)
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        DragOptions, DropClient, DropResult, ElementId, Error, EventContext, GestureEvent,
        GestureKind, Instant, Point, PointerEvent, Rect, Result, Stage, Window, WindowId,
    };

    pub use crate::{core, gesture};
}

pub use mojo_core as core;
pub use mojo_gesture as gesture;
