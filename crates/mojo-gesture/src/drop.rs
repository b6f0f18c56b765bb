#![forbid(unsafe_code)]

//! Drop containers and the drop-client capability.
//!
//! A drop container is an element tagged with [`DROP_CONTAINER_ATTRIBUTE`] and
//! associated with a [`DropClient`]. The drag controller only ever talks to
//! containers through this trait.
//!
//! # Failure Modes
//!
//! Client callbacks return [`DropResult`]. An error is logged with the
//! container and callback name and then dropped: it never aborts the gesture
//! or drag session that triggered it (see [`DropRegistry::notify`]).

use std::fmt;

use ahash::AHashMap;
use mojo_core::element::{ElementError, ElementId, ElementTree};

/// Attribute marking an element as a drop container.
pub const DROP_CONTAINER_ATTRIBUTE: &str = "x-mojo-drop-container";

/// Error returned by a drop-client callback.
#[derive(Debug)]
pub struct DropClientError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl DropClientError {
    /// Create an error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DropClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DropClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<&str> for DropClientError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for DropClientError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Result of a drop-client callback.
pub type DropResult = Result<(), DropClientError>;

/// Capability implemented by anything that accepts dropped elements.
///
/// Every method is optional.
pub trait DropClient {
    /// Datatype tag restricting which drags may enter this container.
    fn datatype(&self) -> Option<&str> {
        None
    }

    /// The dragged element started overlapping this container.
    fn drag_enter(&mut self, _element: ElementId) -> DropResult {
        Ok(())
    }

    /// The dragged element moved while overlapping this container.
    fn drag_hover(&mut self, _element: ElementId) -> DropResult {
        Ok(())
    }

    /// The dragged element stopped overlapping this container.
    fn drag_leave(&mut self, _element: ElementId) -> DropResult {
        Ok(())
    }

    /// The element was dropped here. `is_new_item` is true when it came from
    /// another container.
    fn drag_drop(&mut self, _element: ElementId, _is_new_item: bool) -> DropResult {
        Ok(())
    }

    /// The element originated here and was dropped in another container.
    fn drag_remove(&mut self, _element: ElementId) -> DropResult {
        Ok(())
    }
}

/// Which drop-client callback is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropCallback {
    Enter,
    Hover,
    Leave,
    Drop { is_new_item: bool },
    Remove,
}

impl DropCallback {
    /// Callback name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Enter => "dragEnter",
            Self::Hover => "dragHover",
            Self::Leave => "dragLeave",
            Self::Drop { .. } => "dragDrop",
            Self::Remove => "dragRemove",
        }
    }
}

/// Registered drop containers of one stage.
#[derive(Default)]
pub struct DropRegistry {
    clients: AHashMap<ElementId, Box<dyn DropClient>>,
}

impl fmt::Debug for DropRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropRegistry")
            .field("containers", &self.clients.len())
            .finish()
    }
}

impl DropRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag `element` as a drop container and associate `client` with it.
    ///
    /// Replaces any client previously registered for the element.
    pub fn register(
        &mut self,
        tree: &mut ElementTree,
        element: ElementId,
        client: impl DropClient + 'static,
    ) -> Result<(), ElementError> {
        tree.set_attribute(element, DROP_CONTAINER_ATTRIBUTE, "true")?;
        if self.clients.insert(element, Box::new(client)).is_some() {
            tracing::debug!(container = %element, "replaced drop client");
        }
        Ok(())
    }

    /// Remove the association and the container tag.
    pub fn unregister(&mut self, tree: &mut ElementTree, element: ElementId) -> bool {
        tree.remove_attribute(element, DROP_CONTAINER_ATTRIBUTE);
        self.clients.remove(&element).is_some()
    }

    /// Whether `element` has a registered client.
    #[must_use]
    pub fn is_registered(&self, element: ElementId) -> bool {
        self.clients.contains_key(&element)
    }

    /// The client for `element`.
    #[must_use]
    pub fn client(&self, element: ElementId) -> Option<&dyn DropClient> {
        self.clients.get(&element).map(|c| c.as_ref())
    }

    /// Number of registered containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Registered, tagged containers under `root` (inclusive) in document order.
    #[must_use]
    pub fn containers_within(&self, tree: &ElementTree, root: ElementId) -> Vec<ElementId> {
        tree.descendants(root)
            .into_iter()
            .filter(|el| tree.has_attribute(*el, DROP_CONTAINER_ATTRIBUTE) && self.is_registered(*el))
            .collect()
    }

    /// Invoke `callback` on the container's client, logging and swallowing
    /// any error. Returns `false` if the callback failed.
    pub fn notify(&mut self, container: ElementId, element: ElementId, callback: DropCallback) -> bool {
        let Some(client) = self.clients.get_mut(&container) else {
            tracing::debug!(container = %container, callback = callback.name(), "no drop client registered");
            return true;
        };
        let result = match callback {
            DropCallback::Enter => client.drag_enter(element),
            DropCallback::Hover => client.drag_hover(element),
            DropCallback::Leave => client.drag_leave(element),
            DropCallback::Drop { is_new_item } => client.drag_drop(element, is_new_item),
            DropCallback::Remove => client.drag_remove(element),
        };
        log_failure(container, element, callback, result)
    }
}

fn log_failure(
    container: ElementId,
    element: ElementId,
    callback: DropCallback,
    result: DropResult,
) -> bool {
    match result {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(
                container = %container,
                element = %element,
                callback = callback.name(),
                %error,
                "drop client callback failed"
            );
            false
        }
    }
}
