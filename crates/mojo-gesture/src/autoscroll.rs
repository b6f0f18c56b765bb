#![forbid(unsafe_code)]

//! Edge auto-scrolling while dragging.
//!
//! The pointer's position inside a scroller is normalized to a fraction on
//! each axis, `(pointer - edge) / (size - edge)`, and mapped through a fixed
//! 20-entry speed curve with linear interpolation. Near the leading edge the result is
//! positive (content moves toward the trailing edge, revealing what is above
//! or to the left), near the trailing edge it is negative, and across the
//! middle half it is zero. Outside the scroller the curve saturates.
//!
//! [`AutoScroller`] is the per-frame animator that applies the deltas.

use std::cell::Cell;
use std::rc::Rc;

use mojo_core::animation::{Animator, AnimatorStatus};
use mojo_core::element::{ElementId, ElementTree, Style};
use mojo_core::geometry::{Point, Rect};
use web_time::Instant;

use crate::drag::{AxisLimits, update_style};

/// Scroll speed in pixels per frame, indexed by normalized pointer position.
pub const SCROLL_CURVE: [f64; 20] = [
    40.0, 20.0, 10.0, 5.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -2.0, -5.0,
    -10.0, -20.0, -40.0,
];

/// Attribute marking an element as a scrolling container.
pub const SCROLLER_ATTRIBUTE: &str = "x-mojo-scroller";

/// Speed for a pointer at `fraction` of the scroller's extent.
///
/// The curve is sampled at index `fraction * 20`, interpolating linearly
/// between neighbours and clamping to the first/last entry.
#[must_use]
pub fn curve_speed(fraction: f64) -> f64 {
    if fraction.is_nan() {
        return 0.0;
    }
    let last = SCROLL_CURVE.len() - 1;
    let index = fraction * SCROLL_CURVE.len() as f64;
    if index <= 0.0 {
        return SCROLL_CURVE[0];
    }
    if index >= last as f64 {
        return SCROLL_CURVE[last];
    }
    let lower = index.floor() as usize;
    let t = index - lower as f64;
    SCROLL_CURVE[lower] + (SCROLL_CURVE[lower + 1] - SCROLL_CURVE[lower]) * t
}

/// Speed for one axis: the pointer's fraction is
/// `(pointer - start) / (extent - start)`, where `start` is the scroller's
/// leading edge and `extent` its size on that axis. A non-positive
/// denominator yields 0.
#[must_use]
pub fn axis_speed(pointer: i32, start: i32, extent: i32) -> f64 {
    let span = f64::from(extent) - f64::from(start);
    if span <= 0.0 {
        return 0.0;
    }
    curve_speed((f64::from(pointer) - f64::from(start)) / span)
}

/// Per-axis scroll deltas (pixels per frame) for a pointer inside `scroller`.
#[must_use]
pub fn scroll_deltas(pointer: Point, scroller: Rect) -> Point {
    Point::new(
        axis_speed(pointer.x, scroller.left, scroller.width).round() as i32,
        axis_speed(pointer.y, scroller.top, scroller.height).round() as i32,
    )
}

/// Nearest inclusive ancestor of `element` marked as a scroller.
#[must_use]
pub fn find_scroller(tree: &ElementTree, element: ElementId) -> Option<ElementId> {
    tree.closest(element, |el| tree.has_attribute(el, SCROLLER_ATTRIBUTE))
}

/// State shared between a drag session and its auto-scroll animator.
#[derive(Debug, Default)]
pub struct ScrollShared {
    /// Deltas the next frame applies; updated on every pointer move.
    pub deltas: Cell<Point>,
    /// Total content offset the dragged element has been shifted by.
    pub adjustment: Cell<Point>,
}

/// Animator that scrolls a scroller each frame and keeps the dragged element
/// under the pointer.
///
/// Frozen axes never scroll, and the element's shift honours the same pixel
/// ranges as pointer-driven placement.
#[derive(Debug)]
pub struct AutoScroller {
    scroller: ElementId,
    element: ElementId,
    shared: Rc<ScrollShared>,
    limits: AxisLimits,
}

impl AutoScroller {
    /// Create an animator for `element` inside `scroller`.
    #[must_use]
    pub fn new(
        scroller: ElementId,
        element: ElementId,
        shared: Rc<ScrollShared>,
        limits: AxisLimits,
    ) -> Self {
        Self {
            scroller,
            element,
            shared,
            limits,
        }
    }
}

impl Animator for AutoScroller {
    fn animate(&mut self, tree: &mut ElementTree, _now: Instant) -> AnimatorStatus {
        let deltas = self.limits.mask(self.shared.deltas.get());
        if deltas.is_zero() {
            return AnimatorStatus::Continue;
        }
        // Positive deltas move content toward the trailing edge, i.e. reduce
        // the scroll offset.
        let applied = tree.scroll_by(self.scroller, -deltas);
        if applied.is_zero() {
            return AnimatorStatus::Continue;
        }
        self.shared
            .adjustment
            .set(self.shared.adjustment.get() + applied);
        if let Some(style) = tree.style(self.element) {
            let current = Point::new(style.left, style.top);
            let target = self.limits.constrain(current, current + applied);
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
        tracing::trace!(
            scroller = %self.scroller,
            dx = applied.x,
            dy = applied.y,
            "auto-scrolled"
        );
        AnimatorStatus::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mojo_core::element::Positioning;

    #[test]
    fn curve_is_symmetric() {
        for i in 0..SCROLL_CURVE.len() {
            assert_eq!(SCROLL_CURVE[i], -SCROLL_CURVE[SCROLL_CURVE.len() - 1 - i]);
        }
    }

    #[test]
    fn fraction_on_an_entry_returns_it() {
        // 0.05 * 20 = 1.0
        assert_eq!(curve_speed(0.05), 20.0);
        assert_eq!(curve_speed(0.0), 40.0);
    }

    #[test]
    fn interpolates_between_entries() {
        // index 1.5: halfway between 20 and 10
        assert!((curve_speed(0.075) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn saturates_outside_range() {
        assert_eq!(curve_speed(-3.0), 40.0);
        assert_eq!(curve_speed(1.0), -40.0);
        assert_eq!(curve_speed(7.0), -40.0);
        assert_eq!(curve_speed(f64::NAN), 0.0);
    }

    #[test]
    fn middle_is_still() {
        for f in [0.25, 0.4, 0.5, 0.6, 0.7] {
            assert_eq!(curve_speed(f), 0.0, "fraction {f}");
        }
    }

    #[test]
    fn degenerate_scroller_does_not_scroll() {
        assert_eq!(axis_speed(10, 50, 50), 0.0);
        assert_eq!(scroll_deltas(Point::new(5, 5), Rect::new(0, 0, 0, 0)), Point::ZERO);
    }

    #[test]
    fn fraction_is_measured_from_the_scroller_edge() {
        // 20 / (400 - 100): index 1.333, speed 16.67.
        let scroller = Rect::new(0, 100, 200, 400);
        assert_eq!(scroll_deltas(Point::new(100, 120), scroller), Point::new(0, 17));
        assert!((axis_speed(120, 100, 400) - 50.0 / 3.0).abs() < 1e-9);
        // Leading edge further than the size: no span, no scroll.
        assert_eq!(axis_speed(450, 400, 200), 0.0);
    }

    #[test]
    fn deltas_follow_pointer_position() {
        let scroller = Rect::new(0, 0, 200, 400);
        // y fraction 20/400 = 0.05
        let d = scroll_deltas(Point::new(100, 20), scroller);
        assert_eq!(d, Point::new(0, 20));
        let d = scroll_deltas(Point::new(100, 398), scroller);
        assert!(d.y < 0);
    }

    #[test]
    fn animator_scrolls_and_shifts_element() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let scroller = tree.create_child(root, "div", Rect::new(0, 0, 200, 400)).unwrap();
        tree.set_scroll_extent(scroller, Point::new(0, 1000)).unwrap();
        tree.scroll_by(scroller, Point::new(0, 100));
        let item = tree.create_child(scroller, "div", Rect::new(0, 150, 200, 50)).unwrap();
        tree.set_style(
            item,
            Style {
                position: Positioning::Absolute,
                left: 0,
                top: 150,
                z_index: None,
            },
        )
        .unwrap();

        let shared = Rc::new(ScrollShared::default());
        shared.deltas.set(Point::new(0, 40));
        let mut animator =
            AutoScroller::new(scroller, item, Rc::clone(&shared), AxisLimits::default());
        animator.animate(&mut tree, Instant::now());

        assert_eq!(tree.scroll_offset(scroller), Point::new(0, 60));
        assert_eq!(tree.style(item).map(|s| s.top), Some(110));
        assert_eq!(shared.adjustment.get(), Point::new(0, -40));

        // Clamped at the top: only 60 more pixels available.
        shared.deltas.set(Point::new(0, 80));
        animator.animate(&mut tree, Instant::now());
        assert_eq!(tree.scroll_offset(scroller), Point::ZERO);
        assert_eq!(shared.adjustment.get(), Point::new(0, -100));
    }

    #[test]
    fn animator_leaves_frozen_axis_alone() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let scroller = tree.create_child(root, "div", Rect::new(0, 0, 200, 400)).unwrap();
        tree.set_scroll_extent(scroller, Point::new(1000, 1000)).unwrap();
        tree.scroll_by(scroller, Point::new(200, 200));
        let item = tree.create_child(scroller, "div", Rect::new(0, 150, 200, 50)).unwrap();
        tree.set_style(
            item,
            Style {
                position: Positioning::Absolute,
                left: 0,
                top: 150,
                z_index: None,
            },
        )
        .unwrap();

        let limits = AxisLimits {
            frozen_x: true,
            vertical: (Some(130), None),
            ..AxisLimits::default()
        };
        let shared = Rc::new(ScrollShared::default());
        shared.deltas.set(Point::new(30, 40));
        let mut animator = AutoScroller::new(scroller, item, Rc::clone(&shared), limits);
        animator.animate(&mut tree, Instant::now());

        assert_eq!(tree.scroll_offset(scroller), Point::new(200, 160));
        let style = tree.style(item).unwrap();
        assert_eq!((style.left, style.top), (0, 130));
        assert_eq!(shared.adjustment.get(), Point::new(0, -40));
    }
}
