#![forbid(unsafe_code)]

//! Arena-backed element tree.
//!
//! [`ElementTree`] is the host model the gesture core reads and writes in place
//! of a browser DOM. Each element has a tag, a parent, ordered children,
//! string attributes, an ordered class list, layout bounds supplied by the
//! host, a positioning [`Style`] the core may change while dragging, and a
//! scroll offset for scrolling containers.
//!
//! # Invariants
//!
//! 1. The root element always exists and has no parent.
//! 2. An element appears in at most one parent's child list.
//! 3. The parent chain is acyclic (`append_child` rejects cycles).
//! 4. Element ids are never reused; detached elements keep their data.
//!
//! # Coordinates
//!
//! Bounds are page coordinates. An element with [`Positioning::Absolute`] is
//! laid out at `(style.left, style.top)` with the size of its bounds; see
//! [`ElementTree::layout_rect`].

use std::fmt;

use ahash::AHashMap;

use crate::geometry::{Point, Rect};

/// Stable identifier for an element in an [`ElementTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u32);

impl ElementId {
    /// Reconstruct an id from its raw value.
    ///
    /// Ids not issued by a tree are rejected by every tree operation.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors from structural tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementError {
    /// The id does not belong to this tree.
    UnknownElement(ElementId),
    /// Appending would make an element its own ancestor.
    WouldCycle { parent: ElementId, child: ElementId },
    /// The root element cannot be re-parented or detached.
    RootNotMovable,
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownElement(id) => write!(f, "unknown element {id}"),
            Self::WouldCycle { parent, child } => {
                write!(f, "appending {child} under {parent} would create a cycle")
            }
            Self::RootNotMovable => write!(f, "the root element cannot be moved"),
        }
    }
}

impl std::error::Error for ElementError {}

/// How an element participates in layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    /// Laid out by the host; bounds are authoritative.
    #[default]
    Static,
    /// Out of flow, placed at `(left, top)`.
    Absolute,
}

/// Positioning style the core may override (e.g. while an element is dragged).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub position: Positioning,
    pub left: i32,
    pub top: i32,
    pub z_index: Option<i32>,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    attributes: AHashMap<String, String>,
    classes: Vec<String>,
    bounds: Rect,
    style: Style,
    scroll: Point,
    scroll_extent: Point,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            parent: None,
            children: Vec::new(),
            attributes: AHashMap::new(),
            classes: Vec::new(),
            bounds: Rect::default(),
            style: Style::default(),
            scroll: Point::ZERO,
            scroll_extent: Point::ZERO,
        }
    }
}

/// Element hierarchy with attributes, classes, bounds, style and scroll state.
#[derive(Debug, Clone)]
pub struct ElementTree {
    nodes: Vec<Node>,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    /// Create a tree holding only the root (`document`) element.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("document")],
        }
    }

    /// The root element.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Number of elements ever created (attached or not), including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Whether `id` was issued by this tree.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        (id.0 as usize) < self.nodes.len()
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    fn require(&mut self, id: ElementId) -> Result<&mut Node, ElementError> {
        self.node_mut(id).ok_or(ElementError::UnknownElement(id))
    }

    // --- Structure ---------------------------------------------------------

    /// Create a detached element.
    pub fn create(&mut self, tag: &str) -> ElementId {
        let id = ElementId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node::new(tag));
        id
    }

    /// Create an element with the given bounds and append it to `parent`.
    pub fn create_child(
        &mut self,
        parent: ElementId,
        tag: &str,
        bounds: Rect,
    ) -> Result<ElementId, ElementError> {
        if !self.contains(parent) {
            return Err(ElementError::UnknownElement(parent));
        }
        let id = self.create(tag);
        self.set_bounds(id, bounds)?;
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), ElementError> {
        if !self.contains(parent) {
            return Err(ElementError::UnknownElement(parent));
        }
        if !self.contains(child) {
            return Err(ElementError::UnknownElement(child));
        }
        if child == self.root() {
            return Err(ElementError::RootNotMovable);
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(ElementError::WouldCycle { parent, child });
        }
        self.detach(child)?;
        self.require(parent)?.children.push(child);
        self.require(child)?.parent = Some(parent);
        Ok(())
    }

    /// Remove `id` from its parent. Its subtree stays intact.
    pub fn detach(&mut self, id: ElementId) -> Result<(), ElementError> {
        if id == self.root() {
            return Err(ElementError::RootNotMovable);
        }
        let parent = self.require(id)?.parent.take();
        if let Some(parent) = parent {
            self.require(parent)?.children.retain(|c| *c != id);
        }
        Ok(())
    }

    /// Parent of `id`, if attached.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children of `id` in document order.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Tag name of `id`.
    #[must_use]
    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.node(id).map(|n| n.tag.as_str())
    }

    /// Iterate `id` and its ancestors, nearest first.
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.contains(id).then_some(id),
        }
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    #[must_use]
    pub fn is_inclusive_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Whether `id` is attached under the root.
    #[must_use]
    pub fn is_attached(&self, id: ElementId) -> bool {
        self.ancestors(id).last() == Some(self.root())
    }

    /// Nearest inclusive ancestor matching `pred`.
    pub fn closest(
        &self,
        id: ElementId,
        mut pred: impl FnMut(ElementId) -> bool,
    ) -> Option<ElementId> {
        self.ancestors(id).find(|a| pred(*a))
    }

    /// Nearest inclusive ancestor carrying attribute `name`, with its value.
    #[must_use]
    pub fn closest_with_attribute(&self, id: ElementId, name: &str) -> Option<(ElementId, &str)> {
        self.ancestors(id)
            .find_map(|a| self.attribute(a, name).map(|value| (a, value)))
    }

    /// `id` and all its descendants in document (pre-)order.
    #[must_use]
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    // --- Attributes and classes -------------------------------------------

    /// Attribute value, if present.
    #[must_use]
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.node(id)
            .and_then(|n| n.attributes.get(name))
            .map(String::as_str)
    }

    /// Whether the attribute is present.
    #[must_use]
    pub fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set an attribute.
    pub fn set_attribute(
        &mut self,
        id: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), ElementError> {
        self.require(id)?
            .attributes
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> Option<String> {
        self.node_mut(id).and_then(|n| n.attributes.remove(name))
    }

    /// Class list in insertion order.
    #[must_use]
    pub fn classes(&self, id: ElementId) -> &[String] {
        self.node(id).map_or(&[], |n| n.classes.as_slice())
    }

    /// Whether `id` carries `class`.
    #[must_use]
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    /// Add `class`; returns `true` if it was not already present.
    pub fn add_class(&mut self, id: ElementId, class: &str) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        if node.classes.iter().any(|c| c == class) {
            return false;
        }
        node.classes.push(class.to_owned());
        true
    }

    /// Remove `class`; returns `true` if it was present.
    pub fn remove_class(&mut self, id: ElementId, class: &str) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let before = node.classes.len();
        node.classes.retain(|c| c != class);
        node.classes.len() != before
    }

    // --- Layout ------------------------------------------------------------

    /// Host-supplied layout bounds.
    #[must_use]
    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.node(id).map(|n| n.bounds)
    }

    /// Update host-supplied layout bounds.
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) -> Result<(), ElementError> {
        self.require(id)?.bounds = bounds;
        Ok(())
    }

    /// Positioning style.
    #[must_use]
    pub fn style(&self, id: ElementId) -> Option<Style> {
        self.node(id).map(|n| n.style)
    }

    /// Replace the positioning style.
    pub fn set_style(&mut self, id: ElementId, style: Style) -> Result<(), ElementError> {
        self.require(id)?.style = style;
        Ok(())
    }

    /// Where the element currently sits: bounds for static elements, the
    /// style offset with the bounds' size for absolute ones.
    #[must_use]
    pub fn layout_rect(&self, id: ElementId) -> Option<Rect> {
        self.node(id).map(|n| match n.style.position {
            Positioning::Static => n.bounds,
            Positioning::Absolute => n
                .bounds
                .with_origin(Point::new(n.style.left, n.style.top)),
        })
    }

    /// Deepest element whose layout rect contains `point`.
    ///
    /// Later siblings are considered on top of earlier ones. Falls back to
    /// the root when nothing else is hit.
    #[must_use]
    pub fn element_at(&self, point: Point) -> ElementId {
        self.hit(self.root(), point).unwrap_or(self.root())
    }

    fn hit(&self, id: ElementId, point: Point) -> Option<ElementId> {
        for child in self.children(id).iter().rev() {
            if let Some(found) = self.hit(*child, point) {
                return Some(found);
            }
        }
        if id != self.root() && self.layout_rect(id).is_some_and(|r| r.contains(point)) {
            return Some(id);
        }
        None
    }

    // --- Scrolling ---------------------------------------------------------

    /// Current scroll offset.
    #[must_use]
    pub fn scroll_offset(&self, id: ElementId) -> Point {
        self.node(id).map_or(Point::ZERO, |n| n.scroll)
    }

    /// Maximum scroll offset per axis (0 means the axis cannot scroll).
    pub fn set_scroll_extent(&mut self, id: ElementId, extent: Point) -> Result<(), ElementError> {
        let node = self.require(id)?;
        node.scroll_extent = Point::new(extent.x.max(0), extent.y.max(0));
        node.scroll = clamp_scroll(node.scroll, node.scroll_extent);
        Ok(())
    }

    /// Scroll by `delta`, clamped to the extent. Returns the applied change.
    pub fn scroll_by(&mut self, id: ElementId, delta: Point) -> Point {
        let Some(node) = self.node_mut(id) else {
            return Point::ZERO;
        };
        let before = node.scroll;
        node.scroll = clamp_scroll(before + delta, node.scroll_extent);
        node.scroll - before
    }
}

fn clamp_scroll(offset: Point, extent: Point) -> Point {
    Point::new(offset.x.clamp(0, extent.x), offset.y.clamp(0, extent.y))
}

/// Iterator over an element and its ancestors.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    tree: &'a ElementTree,
    next: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
