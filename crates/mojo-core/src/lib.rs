// Forbid unsafe in production; deny (with targeted allows) in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: geometry, pointer input, the element tree, timers and animation.
//!
//! # Role in Mojo
//! `mojo-core` is the host-facing layer. A host binding mirrors its document
//! into an [`element::ElementTree`], forwards raw pointer input as
//! [`input::PointerEvent`] values, and drives time through
//! [`timer::TimerQueue`] and [`animation::AnimationQueue`].
//!
//! # Primary responsibilities
//! - **Geometry**: integer page coordinates, rectangles and velocities.
//! - **Input**: canonical pointer events (down, move, up, host flick hints).
//! - **ElementTree**: arena-backed element hierarchy with attributes, classes,
//!   layout bounds, positioning style and scroll offsets.
//! - **Timers**: deadline-ordered single-shot timers with cancellation handles.
//! - **Animation queue**: one frame timer multiplexed across all animators.
//!
//! # How it fits in the system
//! `mojo-gesture` consumes these types to recognize gestures and run drag
//! sessions. Nothing in this crate knows about gestures.

pub mod animation;
pub mod element;
pub mod geometry;
pub mod input;
pub mod timer;

pub use web_time::{Duration, Instant};
