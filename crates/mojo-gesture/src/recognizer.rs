#![forbid(unsafe_code)]

//! Gesture recognition: turns raw pointer input into gesture events.
//!
//! [`GestureRecognizer`] keeps one [`GestureState`] per window for the
//! pointer-down sequence in progress and synthesizes `tap`, `hold`,
//! `holdEnd`, `dragStart`, `dragging`, `dragEnd` and `flick` events, which
//! are dispatched synchronously through a [`GestureHandler`].
//!
//! # State Machine
//!
//! ```text
//! Idle --down--> Armed --move beyond filter--> Dragging --up--> Idle
//!                  |  \--hold timer--> Held --up--> Idle (holdEnd, tap)
//!                  \--up--> Idle (tap)
//! ```
//!
//! Movement is filtered per axis: an axis reports zero distance until its raw
//! distance exceeds the filter distance once, after which it stays live. This
//! lets a vertical list scroll ignore horizontal jitter and vice versa.
//!
//! # Invariants
//!
//! 1. At most one gesture per window. A pointer-down while a gesture is
//!    active is ignored entirely.
//! 2. At most one `dragStart` per gesture, and every `dragging` follows it.
//! 3. `tap` and `dragEnd` never both fire for one gesture.
//! 4. `hold` only fires for a gesture that has not moved.
//! 5. Every terminal transition (up, [`GestureRecognizer::cancel`]) clears the
//!    gesture's timers and non-persistent highlight.
//!
//! # Failure Modes
//!
//! - A pointer-up with negative `y` is a host cancel: no `tap` is sent.
//! - Move/up/flick input without an active gesture is ignored.
//! - A stale timer (handle no longer owned by the active gesture) is ignored.

use std::fmt;

use ahash::AHashMap;
use mojo_core::element::{ElementId, ElementTree};
use mojo_core::geometry::{Point, Velocity};
use mojo_core::input::{PointerEvent, PointerEventKind};
use mojo_core::timer::TimerHandle;
use web_time::Instant;

use crate::config::GestureConfig;
use crate::dispatch::{GestureHandler, dispatch};
use crate::event::{DownSnapshot, GestureEvent, GestureKind};
use crate::feedback::{FeedbackMode, feedback_target, same_feedback_target};
use crate::stage::{Stage, StageTimer};
use crate::velocity::{PointerSample, VelocityTracker};

/// Identifies a top-level window (one [`Stage`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Gesture state
// ---------------------------------------------------------------------------

/// State of one pointer-down sequence.
#[derive(Debug, Clone)]
pub struct GestureState {
    down: DownSnapshot,
    last_pointer: Point,
    last_distance: Point,
    filter_x: bool,
    filter_y: bool,
    velocity: VelocityTracker,
    moved: bool,
    held: bool,
    hold_handled: bool,
    drag_sent: bool,
    drag_handled: bool,
    flick: Option<Velocity>,
    feedback: Option<(ElementId, FeedbackMode)>,
    highlighted: Option<ElementId>,
    hold_timer: Option<TimerHandle>,
    highlight_timer: Option<TimerHandle>,
}

impl GestureState {
    /// Snapshot of the pointer-down.
    #[must_use]
    pub fn down(&self) -> &DownSnapshot {
        &self.down
    }

    #[must_use]
    pub fn last_pointer(&self) -> Point {
        self.last_pointer
    }

    /// Whether movement crossed the filter distance on some axis.
    #[must_use]
    pub fn moved(&self) -> bool {
        self.moved
    }

    #[must_use]
    pub fn held(&self) -> bool {
        self.held
    }

    /// Per-axis filter state: `true` while the axis is still suppressed.
    #[must_use]
    pub fn filtered(&self) -> (bool, bool) {
        (self.filter_x, self.filter_y)
    }

    /// Smoothed velocity in px/s.
    #[must_use]
    pub fn velocity(&self) -> Velocity {
        self.velocity.velocity()
    }

    /// `dragStart` was sent and no handler claimed it.
    #[must_use]
    pub fn drag_unhandled(&self) -> bool {
        self.drag_sent && !self.drag_handled
    }

    /// Element currently showing touch feedback.
    #[must_use]
    pub fn highlighted(&self) -> Option<ElementId> {
        self.highlighted
    }

    fn event(&self, kind: GestureKind, window: WindowId, position: Point, now: Instant) -> GestureEvent {
        GestureEvent::new(kind, window, self.down, position, now)
    }

    fn highlight(&mut self, tree: &mut ElementTree, class: &str, element: ElementId) {
        tree.add_class(element, class);
        self.highlighted = Some(element);
    }

    fn clear_highlight(&mut self, tree: &mut ElementTree, class: &str) {
        if let Some(element) = self.highlighted.take() {
            tree.remove_class(element, class);
        }
    }

    fn cancel_timers(&mut self, stage: &mut Stage) {
        if let Some(handle) = self.hold_timer.take() {
            stage.timers.cancel(handle);
        }
        if let Some(handle) = self.highlight_timer.take() {
            stage.timers.cancel(handle);
        }
    }
}

fn resolve_target(tree: &ElementTree, event: &PointerEvent) -> ElementId {
    event
        .target
        .filter(|t| tree.contains(*t))
        .unwrap_or_else(|| tree.element_at(event.position))
}

// ---------------------------------------------------------------------------
// Recognizer
// ---------------------------------------------------------------------------

/// Per-window gesture recognizer.
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    config: GestureConfig,
    sessions: AHashMap<WindowId, GestureState>,
}

impl GestureRecognizer {
    /// Create a recognizer with the given configuration.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            sessions: AHashMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Whether `window` has a gesture in progress.
    #[must_use]
    pub fn is_active(&self, window: WindowId) -> bool {
        self.sessions.contains_key(&window)
    }

    /// The gesture in progress in `window`.
    #[must_use]
    pub fn state(&self, window: WindowId) -> Option<&GestureState> {
        self.sessions.get(&window)
    }

    /// Number of windows with a gesture in progress.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Feed one raw pointer event for `stage`.
    pub fn handle_pointer(
        &mut self,
        stage: &mut Stage,
        event: &PointerEvent,
        handler: &mut dyn GestureHandler,
    ) {
        let _span = tracing::debug_span!(
            "mojo.gesture.pointer",
            window = stage.id().0,
            x = event.position.x,
            y = event.position.y
        )
        .entered();
        match event.kind {
            PointerEventKind::Down => self.on_down(stage, event),
            PointerEventKind::Move => self.on_move(stage, event, handler),
            PointerEventKind::Up => self.on_up(stage, event, handler),
            PointerEventKind::Flick { velocity } => self.on_flick_hint(stage.id(), velocity),
        }
    }

    /// Fire due timers for `stage` and run a due animation frame.
    ///
    /// Returns the number of gesture timers that fired.
    pub fn tick(
        &mut self,
        stage: &mut Stage,
        now: Instant,
        handler: &mut dyn GestureHandler,
    ) -> usize {
        let mut fired = 0;
        while let Some((handle, timer)) = stage.timers.pop_due(now) {
            fired += 1;
            match timer {
                StageTimer::Hold => self.on_hold_timer(stage, handle, now, handler),
                StageTimer::HighlightDelay => self.on_highlight_timer(stage, handle),
                StageTimer::FlashEnd(element) => self.on_flash_end(stage, element),
            }
        }
        stage.run_animations(now);
        fired
    }

    /// Drop the gesture in progress in `stage` without dispatching anything.
    ///
    /// Returns `false` if no gesture was active.
    pub fn cancel(&mut self, stage: &mut Stage) -> bool {
        let Some(mut state) = self.sessions.remove(&stage.id()) else {
            return false;
        };
        state.cancel_timers(stage);
        state.clear_highlight(stage.tree_mut(), &self.config.highlight_class);
        if stage.drag_tracks(state.down.target) {
            stage.cancel_drag();
        }
        tracing::debug!(window = %stage.id(), "gesture cancelled");
        true
    }

    /// Remove a highlight left behind by a persistent-feedback tap.
    pub fn clear_persistent_highlight(&self, stage: &mut Stage) -> bool {
        let Some(element) = stage.persistent_highlight.take() else {
            return false;
        };
        stage
            .tree_mut()
            .remove_class(element, &self.config.highlight_class);
        true
    }
}

// ---------------------------------------------------------------------------
// Internal state machine
// ---------------------------------------------------------------------------

impl GestureRecognizer {
    fn on_down(&mut self, stage: &mut Stage, event: &PointerEvent) {
        let window = stage.id();
        if self.sessions.contains_key(&window) {
            tracing::trace!(window = %window, "pointer down ignored; gesture already active");
            return;
        }
        self.clear_persistent_highlight(stage);

        let config = &self.config;
        let target = resolve_target(stage.tree(), event);
        let down = DownSnapshot {
            target,
            position: event.position,
            timestamp: event.timestamp,
            shift: event.shift(),
        };
        let mut velocity = VelocityTracker::new(config.velocity_recent_weight);
        velocity.reset(PointerSample {
            position: event.position,
            timestamp: event.timestamp,
        });
        let hold_timer =
            stage
                .timers
                .schedule_after(event.timestamp, config.hold_timeout(), StageTimer::Hold);
        let feedback =
            feedback_target(stage.tree(), target).filter(|(_, mode)| *mode != FeedbackMode::None);

        let mut state = GestureState {
            down,
            last_pointer: event.position,
            last_distance: Point::ZERO,
            filter_x: true,
            filter_y: true,
            velocity,
            moved: false,
            held: false,
            hold_handled: false,
            drag_sent: false,
            drag_handled: false,
            flick: None,
            feedback,
            highlighted: None,
            hold_timer: Some(hold_timer),
            highlight_timer: None,
        };
        if let Some((element, mode)) = feedback {
            if mode.highlights_on_press() {
                state.highlight(stage.tree_mut(), &config.highlight_class, element);
            } else if mode.highlights_after_delay() {
                state.highlight_timer = Some(stage.timers.schedule_after(
                    event.timestamp,
                    config.highlight_delay(),
                    StageTimer::HighlightDelay,
                ));
            }
        }

        tracing::debug!(
            window = %window,
            target = %target,
            feedback = feedback.map(|(_, m)| m.as_str()),
            "gesture started"
        );
        self.sessions.insert(window, state);
    }

    fn on_move(&mut self, stage: &mut Stage, event: &PointerEvent, handler: &mut dyn GestureHandler) {
        let window = stage.id();
        let Self { config, sessions } = self;
        let Some(state) = sessions.get_mut(&window) else {
            return;
        };

        let velocity = state.velocity.record(PointerSample {
            position: event.position,
            timestamp: event.timestamp,
        });
        state.last_pointer = event.position;

        let raw = event.position - state.down.position;
        if state.filter_x && raw.x.abs() > config.filter_distance {
            state.filter_x = false;
        }
        if state.filter_y && raw.y.abs() > config.filter_distance {
            state.filter_y = false;
        }
        if state.filter_x && state.filter_y {
            return;
        }
        let distance = Point::new(
            if state.filter_x { 0 } else { raw.x },
            if state.filter_y { 0 } else { raw.y },
        );

        if !state.moved {
            state.moved = true;
            state.cancel_timers(stage);
            state.clear_highlight(stage.tree_mut(), &config.highlight_class);
            let start = state
                .event(GestureKind::DragStart, window, event.position, event.timestamp)
                .with_motion(distance, Point::ZERO, velocity);
            let start = dispatch(stage, handler, start);
            state.drag_sent = true;
            state.drag_handled = start.default_prevented();
            tracing::debug!(
                window = %window,
                target = %state.down.target,
                handled = state.drag_handled,
                "drag started"
            );
        }

        let delta = distance - state.last_distance;
        state.last_distance = distance;
        let dragging = state
            .event(GestureKind::Dragging, window, event.position, event.timestamp)
            .with_motion(distance, delta, velocity);
        dispatch(stage, handler, dragging);
    }

    fn on_flick_hint(&mut self, window: WindowId, velocity: Velocity) {
        match self.sessions.get_mut(&window) {
            Some(state) => {
                tracing::trace!(window = %window, vx = velocity.x, vy = velocity.y, "flick signaled");
                state.flick = Some(velocity);
            }
            None => tracing::trace!(window = %window, "flick hint ignored; no active gesture"),
        }
    }

    fn on_up(&mut self, stage: &mut Stage, event: &PointerEvent, handler: &mut dyn GestureHandler) {
        let window = stage.id();
        let Some(mut state) = self.sessions.remove(&window) else {
            return;
        };
        let config = &self.config;
        state.cancel_timers(stage);
        state.last_pointer = event.position;

        let up_target = resolve_target(stage.tree(), event);
        let velocity = state.flick.unwrap_or_else(|| state.velocity.velocity());
        if state.flick.is_some() || velocity.exceeds(config.flick_threshold) {
            let flick = state
                .event(GestureKind::Flick, window, event.position, event.timestamp)
                .with_motion(state.last_distance, Point::ZERO, velocity);
            dispatch(stage, handler, flick);
        }

        let mut tapped = false;
        if state.moved {
            if state.drag_unhandled()
                && same_feedback_target(stage.tree(), state.down.target, up_target)
            {
                tracing::debug!(window = %window, "unhandled drag returned to its target; sending tap");
                let tap = state.event(GestureKind::Tap, window, event.position, event.timestamp);
                dispatch(stage, handler, tap);
                tapped = true;
            } else {
                let end = state
                    .event(GestureKind::DragEnd, window, event.position, event.timestamp)
                    .with_motion(state.last_distance, Point::ZERO, velocity);
                dispatch(stage, handler, end);
            }
        } else {
            let mut suppressed = state.hold_handled;
            if state.held {
                let hold_end = state.event(GestureKind::HoldEnd, window, event.position, event.timestamp);
                suppressed |= dispatch(stage, handler, hold_end).default_prevented();
            }
            if event.position.y < 0 {
                tracing::debug!(window = %window, "pointer up with negative y; tap cancelled by host");
            } else if !suppressed {
                let tap = state.event(GestureKind::Tap, window, event.position, event.timestamp);
                dispatch(stage, handler, tap);
                tapped = true;
            }
        }

        Self::finish_feedback(config, stage, &mut state, tapped, event.timestamp);
        if stage.drag_tracks(state.down.target) {
            tracing::debug!(window = %window, "drag session outlived its gesture; cancelling");
            stage.cancel_drag();
        }
        tracing::debug!(
            window = %window,
            moved = state.moved,
            held = state.held,
            tapped,
            "gesture ended"
        );
    }

    fn finish_feedback(
        config: &GestureConfig,
        stage: &mut Stage,
        state: &mut GestureState,
        tapped: bool,
        now: Instant,
    ) {
        let class = config.highlight_class.as_str();
        match state.feedback {
            Some((element, mode)) if tapped && mode.is_persistent() => {
                state.highlight(stage.tree_mut(), class, element);
                state.highlighted = None;
                stage.persistent_highlight = Some(element);
            }
            Some((element, mode)) if tapped && mode.flashes_on_tap() => {
                stage.tree_mut().add_class(element, class);
                stage
                    .timers
                    .schedule_after(now, config.tap_flash(), StageTimer::FlashEnd(element));
            }
            _ => state.clear_highlight(stage.tree_mut(), class),
        }
    }

    fn on_hold_timer(
        &mut self,
        stage: &mut Stage,
        handle: TimerHandle,
        now: Instant,
        handler: &mut dyn GestureHandler,
    ) {
        let window = stage.id();
        let Some(state) = self.sessions.get_mut(&window) else {
            return;
        };
        if state.hold_timer != Some(handle) {
            return;
        }
        state.hold_timer = None;
        if state.moved {
            return;
        }
        state.held = true;
        let hold = state.event(GestureKind::Hold, window, state.last_pointer, now);
        state.hold_handled = dispatch(stage, handler, hold).default_prevented();
        tracing::debug!(window = %window, handled = state.hold_handled, "hold");
    }

    fn on_highlight_timer(&mut self, stage: &mut Stage, handle: TimerHandle) {
        let Some(state) = self.sessions.get_mut(&stage.id()) else {
            return;
        };
        if state.highlight_timer != Some(handle) {
            return;
        }
        state.highlight_timer = None;
        if let (false, Some((element, _))) = (state.moved, state.feedback) {
            state.highlight(stage.tree_mut(), &self.config.highlight_class, element);
        }
    }

    fn on_flash_end(&self, stage: &mut Stage, element: ElementId) {
        let in_use = stage.persistent_highlight == Some(element)
            || self
                .sessions
                .get(&stage.id())
                .is_some_and(|s| s.highlighted == Some(element));
        if !in_use {
            stage
                .tree_mut()
                .remove_class(element, &self.config.highlight_class);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::TOUCH_FEEDBACK_ATTRIBUTE;
    use mojo_core::geometry::Rect;
    use web_time::Duration;

    struct Fixture {
        stage: Stage,
        recognizer: GestureRecognizer,
        item: ElementId,
        t0: Instant,
        log: Vec<(GestureKind, ElementId)>,
    }

    impl Fixture {
        fn new(feedback: Option<&str>) -> Self {
            let mut stage = Stage::new(WindowId(7));
            let root = stage.tree().root();
            let item = stage
                .tree_mut()
                .create_child(root, "div", Rect::new(0, 0, 200, 50))
                .unwrap();
            if let Some(mode) = feedback {
                stage
                    .tree_mut()
                    .set_attribute(item, TOUCH_FEEDBACK_ATTRIBUTE, mode)
                    .unwrap();
            }
            Self {
                stage,
                recognizer: GestureRecognizer::default(),
                item,
                t0: Instant::now(),
                log: Vec::new(),
            }
        }

        fn at(&self, ms: u64) -> Instant {
            self.t0 + Duration::from_millis(ms)
        }

        fn send(&mut self, event: PointerEvent) {
            let log = &mut self.log;
            let mut handler = |_: &mut Stage, ev: &mut GestureEvent| log.push((ev.kind, ev.target));
            self.recognizer
                .handle_pointer(&mut self.stage, &event, &mut handler);
        }

        fn tick(&mut self, ms: u64) -> usize {
            let now = self.at(ms);
            let log = &mut self.log;
            let mut handler = |_: &mut Stage, ev: &mut GestureEvent| log.push((ev.kind, ev.target));
            self.recognizer.tick(&mut self.stage, now, &mut handler)
        }

        fn kinds(&self) -> Vec<GestureKind> {
            self.log.iter().map(|(k, _)| *k).collect()
        }

        fn highlighted(&self) -> bool {
            self.stage.tree().has_class(self.item, "selected")
        }
    }

    // --- Tap tests ---

    #[test]
    fn press_and_release_is_tap() {
        let mut f = Fixture::new(None);
        f.send(PointerEvent::down(10, 10, f.at(0)));
        f.send(PointerEvent::up(10, 10, f.at(50)));
        assert_eq!(f.log, vec![(GestureKind::Tap, f.item)]);
        assert!(!f.recognizer.is_active(WindowId(7)));
    }

    #[test]
    fn jitter_under_filter_distance_is_still_tap() {
        let mut f = Fixture::new(None);
        f.send(PointerEvent::down(10, 10, f.at(0)));
        f.send(PointerEvent::moved(22, 22, f.at(100)));
        f.send(PointerEvent::moved(0, 0, f.at(200)));
        f.send(PointerEvent::up(10, 10, f.at(300)));
        assert_eq!(f.kinds(), vec![GestureKind::Tap]);
    }

    #[test]
    fn negative_y_release_cancels_tap() {
        let mut f = Fixture::new(None);
        f.send(PointerEvent::down(10, 10, f.at(0)));
        f.send(PointerEvent::up(10, -1, f.at(50)));
        assert!(f.log.is_empty());
        assert!(!f.recognizer.is_active(WindowId(7)));
    }

    #[test]
    fn second_down_while_active_is_ignored() {
        let mut f = Fixture::new(None);
        f.send(PointerEvent::down(10, 10, f.at(0)));
        f.send(PointerEvent::down(100, 40, f.at(5)));
        assert_eq!(f.recognizer.state(WindowId(7)).map(|s| s.down().position), Some(Point::new(10, 10)));
        assert_eq!(f.recognizer.active_count(), 1);
        assert!(f.log.is_empty());
    }

    // --- Drag tests ---

    #[test]
    fn drag_beyond_filter_starts_once() {
        let mut f = Fixture::new(None);
        f.send(PointerEvent::down(10, 10, f.at(0)));
        f.send(PointerEvent::moved(10, 30, f.at(100)));
        f.send(PointerEvent::moved(10, 40, f.at(200)));
        f.send(PointerEvent::moved(10, 45, f.at(300)));
        assert_eq!(
            f.kinds(),
            vec![
                GestureKind::DragStart,
                GestureKind::Dragging,
                GestureKind::Dragging,
                GestureKind::Dragging
            ]
        );
        let state = f.recognizer.state(WindowId(7)).unwrap();
        assert_eq!(state.filtered(), (true, false));
        assert!(state.moved());
    }

    #[test]
    fn filtered_axis_reports_zero_distance() {
        let mut f = Fixture::new(None);
        let mut seen = Vec::new();
        let mut handler = |_: &mut Stage, ev: &mut GestureEvent| {
            if ev.kind == GestureKind::Dragging {
                seen.push((ev.distance, ev.delta));
            }
        };
        let t0 = f.t0;
        f.recognizer
            .handle_pointer(&mut f.stage, &PointerEvent::down(50, 10, t0), &mut handler);
        f.recognizer.handle_pointer(
            &mut f.stage,
            &PointerEvent::moved(55, 30, t0 + Duration::from_millis(10)),
            &mut handler,
        );
        f.recognizer.handle_pointer(
            &mut f.stage,
            &PointerEvent::moved(58, 35, t0 + Duration::from_millis(20)),
            &mut handler,
        );
        assert_eq!(
            seen,
            vec![
                (Point::new(0, 20), Point::new(0, 20)),
                (Point::new(0, 25), Point::new(0, 5)),
            ]
        );
    }

    #[test]
    fn handled_drag_ends_with_drag_end() {
        let mut f = Fixture::new(None);
        let mut kinds = Vec::new();
        let mut handler = |_: &mut Stage, ev: &mut GestureEvent| {
            if ev.kind == GestureKind::DragStart {
                ev.prevent_default();
            }
            kinds.push(ev.kind);
        };
        let t0 = f.t0;
        f.recognizer
            .handle_pointer(&mut f.stage, &PointerEvent::down(10, 10, t0), &mut handler);
        f.recognizer.handle_pointer(
            &mut f.stage,
            &PointerEvent::moved(10, 40, t0 + Duration::from_millis(100)),
            &mut handler,
        );
        f.recognizer.handle_pointer(
            &mut f.stage,
            &PointerEvent::up(10, 10, t0 + Duration::from_millis(200)),
            &mut handler,
        );
        assert_eq!(kinds.last(), Some(&GestureKind::DragEnd));
        assert!(!kinds.contains(&GestureKind::Tap));
    }

    #[test]
    fn unhandled_drag_back_on_target_is_tap() {
        let mut f = Fixture::new(Some("immediate"));
        f.send(PointerEvent::down(10, 10, f.at(0)));
        f.send(PointerEvent::moved(10, 40, f.at(200)));
        f.send(PointerEvent::up(20, 20, f.at(300)));
        assert_eq!(
            f.kinds(),
            vec![GestureKind::DragStart, GestureKind::Dragging, GestureKind::Tap]
        );
        assert_eq!(f.log.last().map(|(_, t)| *t), Some(f.item));
    }

    #[test]
    fn unhandled_drag_released_elsewhere_is_drag_end() {
        let mut f = Fixture::new(Some("immediate"));
        f.send(PointerEvent::down(10, 10, f.at(0)));
        f.send(PointerEvent::moved(10, 80, f.at(100)));
        f.send(PointerEvent::up(10, 80, f.at(200)));
        assert_eq!(f.kinds().last(), Some(&GestureKind::DragEnd));
    }

    // --- Hold tests ---

    #[test]
    fn hold_fires_after_timeout() {
        let mut f = Fixture::new(None);
        f.send(PointerEvent::down(10, 10, f.at(0)));
        assert_eq!(f.tick(499), 0);
        assert_eq!(f.tick(500), 1);
        f.send(PointerEvent::up(10, 10, f.at(700)));
        assert_eq!(
            f.kinds(),
            vec![GestureKind::Hold, GestureKind::HoldEnd, GestureKind::Tap]
        );
    }

    #[test]
    fn handled_hold_suppresses_tap() {
        let mut f = Fixture::new(None);
        let mut kinds = Vec::new();
        let mut handler = |_: &mut Stage, ev: &mut GestureEvent| {
            if ev.kind == GestureKind::Hold {
                ev.prevent_default();
            }
            kinds.push(ev.kind);
        };
        let t0 = f.t0;
        f.recognizer
            .handle_pointer(&mut f.stage, &PointerEvent::down(10, 10, t0), &mut handler);
        f.recognizer
            .tick(&mut f.stage, t0 + Duration::from_millis(600), &mut handler);
        f.recognizer.handle_pointer(
            &mut f.stage,
            &PointerEvent::up(10, 10, t0 + Duration::from_millis(700)),
            &mut handler,
        );
        assert_eq!(kinds, vec![GestureKind::Hold, GestureKind::HoldEnd]);
    }

    #[test]
    fn drag_cancels_hold() {
        let mut f = Fixture::new(None);
        f.send(PointerEvent::down(10, 10, f.at(0)));
        f.send(PointerEvent::moved(40, 10, f.at(100)));
        assert_eq!(f.tick(600), 0);
        assert!(!f.kinds().contains(&GestureKind::Hold));
    }

    // --- Flick tests ---

    #[test]
    fn fast_release_flicks_before_drag_end() {
        let mut f = Fixture::new(None);
        f.send(PointerEvent::down(0, 0, f.at(0)));
        f.send(PointerEvent::moved(0, 100, f.at(100)));
        f.send(PointerEvent::moved(0, 200, f.at(200)));
        f.send(PointerEvent::up(0, 200, f.at(210)));
        let kinds = f.kinds();
        let flick = kinds.iter().position(|k| *k == GestureKind::Flick).unwrap();
        assert_eq!(kinds[flick + 1], GestureKind::DragEnd);
    }

    #[test]
    fn signaled_flick_is_reported() {
        let mut f = Fixture::new(None);
        let mut flicks = Vec::new();
        let mut handler = |_: &mut Stage, ev: &mut GestureEvent| {
            if ev.kind == GestureKind::Flick {
                flicks.push(ev.velocity);
            }
        };
        let t0 = f.t0;
        let v = Velocity::new(0.0, -900.0);
        for ev in [
            PointerEvent::down(10, 10, t0),
            PointerEvent::flick(v, Point::new(10, 10), t0 + Duration::from_millis(5)),
            PointerEvent::up(10, 10, t0 + Duration::from_millis(10)),
        ] {
            f.recognizer.handle_pointer(&mut f.stage, &ev, &mut handler);
        }
        assert_eq!(flicks, vec![v]);
    }

    // --- Feedback tests ---

    #[test]
    fn immediate_feedback_highlights_until_release() {
        let mut f = Fixture::new(Some("immediate"));
        f.send(PointerEvent::down(10, 10, f.at(0)));
        assert!(f.highlighted());
        f.send(PointerEvent::up(10, 10, f.at(50)));
        assert!(!f.highlighted());
    }

    #[test]
    fn delayed_feedback_waits_for_timer() {
        let mut f = Fixture::new(Some("delayed"));
        f.send(PointerEvent::down(10, 10, f.at(0)));
        assert!(!f.highlighted());
        f.tick(119);
        assert!(!f.highlighted());
        f.tick(120);
        assert!(f.highlighted());
        f.send(PointerEvent::moved(10, 40, f.at(150)));
        assert!(!f.highlighted());
    }

    #[test]
    fn persistent_feedback_survives_tap_until_next_gesture() {
        let mut f = Fixture::new(Some("immediatePersistent"));
        f.send(PointerEvent::down(10, 10, f.at(0)));
        f.send(PointerEvent::up(10, 10, f.at(50)));
        assert!(f.highlighted());
        assert_eq!(f.stage.persistent_highlight(), Some(f.item));

        f.send(PointerEvent::down(300, 300, f.at(1000)));
        assert!(!f.highlighted());
    }

    #[test]
    fn spontaneous_feedback_flashes_on_tap() {
        let mut f = Fixture::new(Some("spontaneous"));
        f.send(PointerEvent::down(10, 10, f.at(0)));
        assert!(!f.highlighted());
        f.send(PointerEvent::up(10, 10, f.at(50)));
        assert!(f.highlighted());
        f.tick(149);
        assert!(f.highlighted());
        f.tick(150);
        assert!(!f.highlighted());
    }

    // --- Cancel tests ---

    #[test]
    fn cancel_clears_state_without_events() {
        let mut f = Fixture::new(Some("immediate"));
        f.send(PointerEvent::down(10, 10, f.at(0)));
        assert!(f.recognizer.cancel(&mut f.stage));
        assert!(!f.highlighted());
        assert_eq!(f.tick(1000), 0);
        assert!(f.log.is_empty());
        assert!(!f.recognizer.cancel(&mut f.stage));
    }
}
