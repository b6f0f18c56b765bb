#![forbid(unsafe_code)]

//! Drag sessions: moving an element between drop containers.
//!
//! A [`DragSession`] is created by [`Stage::start_dragging`] and driven by the
//! gesture events routed to it: every `dragging` moves the element and
//! re-runs hit testing, `dragEnd` drops, and a `tap` ends the session without
//! dropping.
//!
//! # Invariants
//!
//! 1. At most one container is current at any time.
//! 2. On a container change `dragLeave(old)` is always sent before
//!    `dragEnter(new)`.
//! 3. Container bounds and datatypes are captured once at start.
//! 4. On drop into a different container, `dragRemove` on the original
//!    container precedes `dragDrop` on the new one.
//! 5. Restoring the element is idempotent.
//!
//! # Failure Modes
//!
//! - No drop container under the scene root: logged as a contract violation;
//!   the drag proceeds and never finds a target, so the element snaps back.
//! - Drop-client callback errors are logged and ignored.
//!
//! [`Stage::start_dragging`]: crate::stage::Stage::start_dragging

use std::fmt;
use std::rc::Rc;

use mojo_core::animation::{AnimationQueue, AnimatorId};
use mojo_core::element::{ElementId, ElementTree, Positioning, Style};
use mojo_core::geometry::{Point, Rect};

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::autoscroll::{self, AutoScroller, ScrollShared};
use crate::drop::{DropCallback, DropRegistry};
use crate::event::GestureEvent;

/// Class applied to the dragged element by default.
pub const DEFAULT_DRAGGING_CLASS: &str = "palm-dragging";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options recognized by [`Stage::start_dragging`](crate::stage::Stage::start_dragging).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DragOptions {
    /// Class applied while dragging.
    pub dragging_class: String,
    /// Freeze the vertical axis.
    pub prevent_vertical: bool,
    /// Freeze the horizontal axis.
    pub prevent_horizontal: bool,
    /// When false, the element can never leave its current container.
    pub allow_exit: bool,
    /// Leave the element where it was dropped instead of restoring it.
    pub prevent_drop_reset: bool,
    /// Datatype a container must advertise to accept this drag.
    pub datatype: Option<String>,
    /// Scroll the nearest scroller when the pointer nears its edges.
    pub autoscroll: bool,
    pub min_horizontal_pixel: Option<i32>,
    pub max_horizontal_pixel: Option<i32>,
    pub min_vertical_pixel: Option<i32>,
    pub max_vertical_pixel: Option<i32>,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            dragging_class: DEFAULT_DRAGGING_CLASS.to_owned(),
            prevent_vertical: false,
            prevent_horizontal: false,
            allow_exit: true,
            prevent_drop_reset: false,
            datatype: None,
            autoscroll: false,
            min_horizontal_pixel: None,
            max_horizontal_pixel: None,
            min_vertical_pixel: None,
            max_vertical_pixel: None,
        }
    }
}

impl DragOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the drag to containers advertising `datatype`.
    #[must_use]
    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    /// Allow or forbid leaving the current container.
    #[must_use]
    pub fn with_allow_exit(mut self, allow: bool) -> Self {
        self.allow_exit = allow;
        self
    }

    /// Enable edge auto-scrolling.
    #[must_use]
    pub fn with_autoscroll(mut self, enabled: bool) -> Self {
        self.autoscroll = enabled;
        self
    }

    /// Only move along the vertical axis (e.g. reordering a list).
    #[must_use]
    pub fn vertical_only(mut self) -> Self {
        self.prevent_horizontal = true;
        self.prevent_vertical = false;
        self
    }

    /// Clamp the element's top edge to `[min, max]`.
    #[must_use]
    pub fn with_vertical_range(mut self, min: i32, max: i32) -> Self {
        self.min_vertical_pixel = Some(min);
        self.max_vertical_pixel = Some(max);
        self
    }

    /// Clamp the element's left edge to `[min, max]`.
    #[must_use]
    pub fn with_horizontal_range(mut self, min: i32, max: i32) -> Self {
        self.min_horizontal_pixel = Some(min);
        self.max_horizontal_pixel = Some(max);
        self
    }

    /// Placement constraints these options impose on the dragged element.
    #[must_use]
    pub fn axis_limits(&self) -> AxisLimits {
        AxisLimits {
            frozen_x: self.prevent_horizontal,
            frozen_y: self.prevent_vertical,
            horizontal: (self.min_horizontal_pixel, self.max_horizontal_pixel),
            vertical: (self.min_vertical_pixel, self.max_vertical_pixel),
        }
    }
}

/// Per-axis placement constraints: frozen axes and optional pixel ranges.
///
/// Shared by pointer-driven placement and the auto-scroll animator so both
/// agree on where the element may go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisLimits {
    pub frozen_x: bool,
    pub frozen_y: bool,
    /// `(min, max)` for the left edge.
    pub horizontal: (Option<i32>, Option<i32>),
    /// `(min, max)` for the top edge.
    pub vertical: (Option<i32>, Option<i32>),
}

impl AxisLimits {
    /// Zero the components of `delta` on frozen axes.
    #[must_use]
    pub fn mask(&self, delta: Point) -> Point {
        Point::new(
            if self.frozen_x { 0 } else { delta.x },
            if self.frozen_y { 0 } else { delta.y },
        )
    }

    /// Position for an element at `anchor` asked to move to `proposed`.
    ///
    /// A frozen axis keeps the anchor coordinate and is never clamped.
    #[must_use]
    pub fn constrain(&self, anchor: Point, proposed: Point) -> Point {
        Point::new(
            if self.frozen_x {
                anchor.x
            } else {
                clamp_axis(proposed.x, self.horizontal.0, self.horizontal.1)
            },
            if self.frozen_y {
                anchor.y
            } else {
                clamp_axis(proposed.y, self.vertical.0, self.vertical.1)
            },
        )
    }
}

fn clamp_axis(value: i32, min: Option<i32>, max: Option<i32>) -> i32 {
    let value = min.map_or(value, |m| value.max(m));
    max.map_or(value, |m| value.min(m))
}

/// Set `element`'s style, logging instead of failing when the tree rejects it.
pub(crate) fn update_style(tree: &mut ElementTree, element: ElementId, style: Style) -> bool {
    match tree.set_style(element, style) {
        Ok(()) => true,
        Err(err) => {
            tracing::trace!(element = %element, error = %err, "style update skipped");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from starting a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragError {
    /// The element or container root is not part of the stage's tree.
    UnknownElement(ElementId),
    /// The stage already has an active drag session.
    AlreadyDragging { element: ElementId },
}

impl fmt::Display for DragError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownElement(id) => write!(f, "cannot drag: unknown element {id}"),
            Self::AlreadyDragging { element } => {
                write!(f, "cannot drag: {element} is already being dragged")
            }
        }
    }
}

impl std::error::Error for DragError {}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Snapshot of one drop container taken when the drag starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub element: ElementId,
    pub rect: Rect,
    pub datatype: Option<String>,
}

/// How a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DragEnd {
    /// Pointer released after dragging: drop into the current container.
    Drop,
    /// Gesture resolved to a tap, or the drag was aborted: no drop.
    Cancel,
}

/// Result of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOutcome {
    /// Container the element was dropped into.
    pub dropped_in: Option<ElementId>,
    /// Whether the element changed containers.
    pub changed_container: bool,
}

/// An active drag of one element.
#[derive(Debug)]
pub struct DragSession {
    element: ElementId,
    source: ElementId,
    start: Point,
    original_style: Style,
    added_class: bool,
    containers: Vec<ContainerInfo>,
    current: Option<ElementId>,
    original_container: Option<ElementId>,
    options: DragOptions,
    scroller: Option<(ElementId, Rect)>,
    scroll: Rc<ScrollShared>,
    animator: Option<AnimatorId>,
    restored: bool,
}

impl DragSession {
    pub(crate) fn start(
        tree: &mut ElementTree,
        drops: &mut DropRegistry,
        animations: &mut AnimationQueue,
        container_root: ElementId,
        element: ElementId,
        start_event: &GestureEvent,
        options: DragOptions,
    ) -> Result<Self, DragError> {
        if !tree.contains(container_root) {
            return Err(DragError::UnknownElement(container_root));
        }
        let (Some(rect), Some(original_style)) = (tree.layout_rect(element), tree.style(element))
        else {
            return Err(DragError::UnknownElement(element));
        };

        let containers: Vec<ContainerInfo> = drops
            .containers_within(tree, container_root)
            .into_iter()
            .map(|el| ContainerInfo {
                element: el,
                rect: tree.layout_rect(el).unwrap_or_default(),
                datatype: drops
                    .client(el)
                    .and_then(|c| c.datatype())
                    .map(str::to_owned),
            })
            .collect();
        if containers.is_empty() {
            tracing::warn!(
                element = %element,
                root = %container_root,
                "no drag containers found; element can never be dropped"
            );
        }

        update_style(
            tree,
            element,
            Style {
                position: Positioning::Absolute,
                left: rect.left,
                top: rect.top,
                ..original_style
            },
        );
        let added_class = tree.add_class(element, &options.dragging_class);

        let scroll = Rc::new(ScrollShared::default());
        let scroller = if options.autoscroll {
            autoscroll::find_scroller(tree, element)
                .and_then(|s| tree.layout_rect(s).map(|r| (s, r)))
        } else {
            None
        };
        let animator = scroller.map(|(s, _)| {
            animations.add(
                AutoScroller::new(s, element, Rc::clone(&scroll), options.axis_limits()),
                start_event.timestamp,
            )
        });

        let mut session = Self {
            element,
            source: start_event.target,
            start: rect.origin(),
            original_style,
            added_class,
            containers,
            current: None,
            original_container: None,
            options,
            scroller,
            scroll,
            animator,
            restored: false,
        };
        session.update_container(tree, drops);
        session.original_container = session.current;

        tracing::debug!(
            element = %element,
            containers = session.containers.len(),
            original = ?session.original_container,
            autoscroll = session.animator.is_some(),
            "drag started"
        );
        Ok(session)
    }

    /// The dragged element.
    #[inline]
    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Container the element currently overlaps, if any.
    #[inline]
    #[must_use]
    pub fn current_container(&self) -> Option<ElementId> {
        self.current
    }

    /// Container the element was in when the drag began.
    #[inline]
    #[must_use]
    pub fn original_container(&self) -> Option<ElementId> {
        self.original_container
    }

    /// Container snapshots taken at start, in registration order.
    #[must_use]
    pub fn containers(&self) -> &[ContainerInfo] {
        &self.containers
    }

    /// Options the drag was started with.
    #[must_use]
    pub fn options(&self) -> &DragOptions {
        &self.options
    }

    /// Pre-drag top-left corner.
    #[must_use]
    pub fn start_position(&self) -> Point {
        self.start
    }

    /// Current auto-scroll deltas (pixels per frame).
    #[must_use]
    pub fn scroll_deltas(&self) -> Point {
        self.scroll.deltas.get()
    }

    /// Whether the element has been restored.
    #[must_use]
    pub fn is_restored(&self) -> bool {
        self.restored
    }

    /// Whether gesture events at `target` belong to this session.
    pub(crate) fn tracks(&self, tree: &ElementTree, target: ElementId) -> bool {
        target == self.source || tree.is_inclusive_ancestor(self.element, target)
    }

    /// Apply a `dragging` event: move, auto-scroll, hit-test.
    pub(crate) fn on_dragging(
        &mut self,
        tree: &mut ElementTree,
        drops: &mut DropRegistry,
        event: &GestureEvent,
    ) {
        if self.restored {
            return;
        }
        self.place(tree, event.distance);
        if let Some((_, rect)) = self.scroller {
            let deltas = autoscroll::scroll_deltas(event.position, rect);
            self.scroll
                .deltas
                .set(self.options.axis_limits().mask(deltas));
        }
        self.update_container(tree, drops);
    }

    fn place(&self, tree: &mut ElementTree, distance: Point) {
        let proposed = self.start + distance + self.scroll.adjustment.get();
        let target = self.options.axis_limits().constrain(self.start, proposed);
        if let Some(style) = tree.style(self.element) {
            update_style(
                tree,
                self.element,
                Style {
                    left: target.x,
                    top: target.y,
                    ..style
                },
            );
        }
    }

    fn overlaps(info: &ContainerInfo, rect: &Rect) -> bool {
        info.rect.contains_midpoint_of(rect)
    }

    fn accepts(&self, info: &ContainerInfo) -> bool {
        info.datatype == self.options.datatype
    }

    fn find_container(&self, rect: &Rect) -> Option<ElementId> {
        self.containers
            .iter()
            .find(|info| self.accepts(info) && Self::overlaps(info, rect))
            .map(|info| info.element)
    }

    fn update_container(&mut self, tree: &ElementTree, drops: &mut DropRegistry) {
        let Some(rect) = tree.layout_rect(self.element) else {
            return;
        };
        if let Some(current) = self.current {
            let still_inside = !self.options.allow_exit
                || self
                    .containers
                    .iter()
                    .find(|info| info.element == current)
                    .is_some_and(|info| Self::overlaps(info, &rect));
            if still_inside {
                drops.notify(current, self.element, DropCallback::Hover);
                return;
            }
            let replacement = self.find_container(&rect);
            drops.notify(current, self.element, DropCallback::Leave);
            self.current = replacement;
            tracing::trace!(element = %self.element, left = %current, entered = ?replacement, "drag container changed");
            if let Some(next) = replacement {
                drops.notify(next, self.element, DropCallback::Enter);
            }
        } else if let Some(next) = self.find_container(&rect) {
            self.current = Some(next);
            tracing::trace!(element = %self.element, entered = %next, "drag container entered");
            drops.notify(next, self.element, DropCallback::Enter);
        }
    }

    /// Restore the element's pre-drag style and classes.
    ///
    /// Returns `false` if it was already restored.
    pub fn reset_element(&mut self, tree: &mut ElementTree) -> bool {
        if self.restored {
            return false;
        }
        self.restored = true;
        update_style(tree, self.element, self.original_style);
        if self.added_class {
            tree.remove_class(self.element, &self.options.dragging_class);
        }
        true
    }

    pub(crate) fn finish(
        mut self,
        tree: &mut ElementTree,
        drops: &mut DropRegistry,
        animations: &mut AnimationQueue,
        end: DragEnd,
    ) -> DragOutcome {
        if let Some(id) = self.animator.take() {
            animations.remove(id);
        }
        self.scroll.deltas.set(Point::ZERO);
        if !self.options.prevent_drop_reset {
            self.reset_element(tree);
        }

        let mut outcome = DragOutcome {
            dropped_in: None,
            changed_container: false,
        };
        match (end, self.current) {
            (DragEnd::Drop, Some(target)) => {
                let changed = self.original_container != Some(target);
                if changed {
                    if let Some(origin) = self.original_container {
                        drops.notify(origin, self.element, DropCallback::Remove);
                    }
                }
                drops.notify(
                    target,
                    self.element,
                    DropCallback::Drop {
                        is_new_item: changed,
                    },
                );
                outcome = DragOutcome {
                    dropped_in: Some(target),
                    changed_container: changed,
                };
            }
            (DragEnd::Cancel, Some(current)) => {
                drops.notify(current, self.element, DropCallback::Leave);
            }
            (_, None) => {}
        }

        tracing::debug!(
            element = %self.element,
            end = ?end,
            dropped_in = ?outcome.dropped_in,
            changed = outcome.changed_container,
            "drag finished"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_axis_applies_bounds() {
        assert_eq!(clamp_axis(5, None, None), 5);
        assert_eq!(clamp_axis(-5, Some(0), None), 0);
        assert_eq!(clamp_axis(500, Some(0), Some(100)), 100);
    }

    #[test]
    fn frozen_axis_ignores_motion_and_range() {
        let limits = DragOptions::new()
            .vertical_only()
            .with_horizontal_range(50, 80)
            .with_vertical_range(0, 100)
            .axis_limits();
        let anchor = Point::new(10, 40);
        assert_eq!(limits.constrain(anchor, Point::new(300, 60)), Point::new(10, 60));
        assert_eq!(limits.constrain(anchor, Point::new(300, 500)), Point::new(10, 100));
        assert_eq!(limits.mask(Point::new(30, -20)), Point::new(0, -20));

        let frozen_y = AxisLimits {
            frozen_y: true,
            vertical: (Some(200), None),
            ..AxisLimits::default()
        };
        assert_eq!(frozen_y.constrain(anchor, Point::new(15, 0)), Point::new(15, 40));
    }

    #[test]
    fn style_update_on_missing_element_is_skipped() {
        let mut tree = ElementTree::new();
        let missing = ElementId::from_raw(404);
        assert!(!update_style(&mut tree, missing, Style::default()));
        let root = tree.root();
        let style = Style {
            left: 7,
            ..Style::default()
        };
        assert!(update_style(&mut tree, root, style));
        assert_eq!(tree.style(root).map(|s| s.left), Some(7));
    }

    #[test]
    fn options_builders() {
        let opts = DragOptions::new()
            .with_datatype("row")
            .with_allow_exit(false)
            .with_autoscroll(true)
            .vertical_only()
            .with_vertical_range(0, 300);
        assert_eq!(opts.datatype.as_deref(), Some("row"));
        assert!(!opts.allow_exit);
        assert!(opts.autoscroll);
        assert!(opts.prevent_horizontal);
        assert_eq!(opts.max_vertical_pixel, Some(300));
        assert_eq!(opts.dragging_class, DEFAULT_DRAGGING_CLASS);
    }

    #[test]
    fn drag_error_display() {
        let e = DragError::AlreadyDragging {
            element: ElementId::from_raw(3),
        };
        assert_eq!(e.to_string(), "cannot drag: #3 is already being dragged");
    }
}
