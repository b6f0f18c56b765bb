// Forbid unsafe in production; deny (with targeted allows) in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Gesture recognition and drag-and-drop sessions.
//!
//! # Role in Mojo
//! `mojo-gesture` sits between raw pointer input and application code. It
//! classifies pointer sequences into gestures, shows touch feedback, and runs
//! drag sessions that move an element between drop containers.
//!
//! # Primary responsibilities
//! - **GestureRecognizer**: per-window state machine producing `tap`, `hold`,
//!   `holdEnd`, `dragStart`, `dragging`, `dragEnd` and `flick`.
//! - **Stage**: one window's element tree with its timers, animation queue,
//!   drop registry and drag session.
//! - **Drag sessions**: element positioning, container hit-testing and
//!   enter/hover/leave/drop callbacks on [`DropClient`]s.
//! - **Auto-scroll**: edge scrolling of the nearest scroller while dragging.
//!
//! # Driving it
//!
//! ```rust,ignore
//! let mut stage = Stage::new(WindowId(0));
//! let mut recognizer = GestureRecognizer::new(GestureConfig::default());
//! let mut listeners = Listeners::new();
//!
//! recognizer.handle_pointer(&mut stage, &PointerEvent::down(10, 10, now), &mut listeners);
//! // ...later, at or after stage.next_deadline():
//! recognizer.tick(&mut stage, now, &mut listeners);
//! ```

pub mod autoscroll;
pub mod config;
pub mod dispatch;
pub mod drag;
pub mod drop;
pub mod event;
pub mod feedback;
pub mod recognizer;
pub mod stage;
pub mod velocity;

pub use config::{ConfigError, GestureConfig};
pub use dispatch::{EventContext, GestureHandler, IgnoreGestures, ListenerId, Listeners};
pub use drag::{AxisLimits, ContainerInfo, DragError, DragOptions, DragOutcome, DragSession};
pub use drop::{DropClient, DropClientError, DropRegistry, DropResult};
pub use event::{DownSnapshot, GestureEvent, GestureKind};
pub use feedback::FeedbackMode;
pub use recognizer::{GestureRecognizer, GestureState, WindowId};
pub use stage::Stage;
