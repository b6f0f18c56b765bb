#![forbid(unsafe_code)]

//! Touch feedback modes.
//!
//! Elements opt into touch feedback declaratively with the
//! [`TOUCH_FEEDBACK_ATTRIBUTE`] attribute. The nearest inclusive ancestor of
//! the pressed element carrying it decides when the highlight class appears
//! and how long it stays. That same ancestor is the "feedback target" used
//! to decide whether an unhandled drag that returned to where it began should
//! still count as a tap.

use mojo_core::element::{ElementId, ElementTree};

/// Attribute naming an element's feedback mode.
pub const TOUCH_FEEDBACK_ATTRIBUTE: &str = "x-mojo-touch-feedback";

/// When and how touch feedback is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackMode {
    /// Highlight on press.
    Immediate,
    /// Highlight after the highlight delay unless the gesture moved or ended.
    Delayed,
    /// No highlight on press; a short flash when the gesture is a tap.
    Spontaneous,
    /// As `Immediate`, but a tap leaves the highlight in place.
    ImmediatePersistent,
    /// As `Delayed`, but a tap leaves the highlight in place.
    DelayedPersistent,
    /// No feedback.
    None,
}

impl FeedbackMode {
    /// Parse an attribute value. Unknown values map to `None`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "immediate" => Self::Immediate,
            "delayed" => Self::Delayed,
            "spontaneous" => Self::Spontaneous,
            "immediatePersistent" => Self::ImmediatePersistent,
            "delayedPersistent" => Self::DelayedPersistent,
            "none" => Self::None,
            other => {
                tracing::debug!(value = other, "unknown touch feedback mode; treating as none");
                Self::None
            }
        }
    }

    /// Attribute spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Delayed => "delayed",
            Self::Spontaneous => "spontaneous",
            Self::ImmediatePersistent => "immediatePersistent",
            Self::DelayedPersistent => "delayedPersistent",
            Self::None => "none",
        }
    }

    /// Highlighted as soon as the pointer goes down.
    #[must_use]
    pub const fn highlights_on_press(self) -> bool {
        matches!(self, Self::Immediate | Self::ImmediatePersistent)
    }

    /// Highlighted once the highlight delay elapses.
    #[must_use]
    pub const fn highlights_after_delay(self) -> bool {
        matches!(self, Self::Delayed | Self::DelayedPersistent)
    }

    /// A tap leaves the highlight in place.
    #[must_use]
    pub const fn is_persistent(self) -> bool {
        matches!(self, Self::ImmediatePersistent | Self::DelayedPersistent)
    }

    /// A tap flashes the highlight briefly.
    #[must_use]
    pub const fn flashes_on_tap(self) -> bool {
        matches!(self, Self::Spontaneous)
    }
}

/// The nearest feedback-attributed inclusive ancestor of `id`, with its mode.
#[must_use]
pub fn feedback_target(tree: &ElementTree, id: ElementId) -> Option<(ElementId, FeedbackMode)> {
    tree.closest_with_attribute(id, TOUCH_FEEDBACK_ATTRIBUTE)
        .map(|(el, value)| (el, FeedbackMode::parse(value)))
}

/// Whether two elements resolve to the same feedback target.
///
/// When neither has a feedback-attributed ancestor the raw elements are
/// compared instead.
#[must_use]
pub fn same_feedback_target(tree: &ElementTree, a: ElementId, b: ElementId) -> bool {
    match (feedback_target(tree, a), feedback_target(tree, b)) {
        (Some((fa, _)), Some((fb, _))) => fa == fb,
        (None, None) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mojo_core::geometry::Rect;

    #[test]
    fn parse_round_trips_known_modes() {
        for mode in [
            FeedbackMode::Immediate,
            FeedbackMode::Delayed,
            FeedbackMode::Spontaneous,
            FeedbackMode::ImmediatePersistent,
            FeedbackMode::DelayedPersistent,
            FeedbackMode::None,
        ] {
            assert_eq!(FeedbackMode::parse(mode.as_str()), mode);
        }
        assert_eq!(FeedbackMode::parse("sparkly"), FeedbackMode::None);
    }

    #[test]
    fn mode_predicates() {
        assert!(FeedbackMode::Immediate.highlights_on_press());
        assert!(!FeedbackMode::Immediate.is_persistent());
        assert!(FeedbackMode::DelayedPersistent.highlights_after_delay());
        assert!(FeedbackMode::DelayedPersistent.is_persistent());
        assert!(FeedbackMode::Spontaneous.flashes_on_tap());
        assert!(!FeedbackMode::None.highlights_on_press());
    }

    #[test]
    fn same_target_compares_feedback_ancestors() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let row = tree.create_child(root, "div", Rect::new(0, 0, 100, 40)).unwrap();
        tree.set_attribute(row, TOUCH_FEEDBACK_ATTRIBUTE, "immediate")
            .unwrap();
        let label = tree.create_child(row, "span", Rect::new(0, 0, 50, 40)).unwrap();
        let icon = tree.create_child(row, "img", Rect::new(50, 0, 50, 40)).unwrap();
        let other = tree.create_child(root, "div", Rect::new(0, 40, 100, 40)).unwrap();

        assert_eq!(feedback_target(&tree, label), Some((row, FeedbackMode::Immediate)));
        assert!(same_feedback_target(&tree, label, icon));
        assert!(!same_feedback_target(&tree, label, other));
        assert!(same_feedback_target(&tree, other, other));
    }
}
