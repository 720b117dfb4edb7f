//! Listener registration on the shared event target.
//!
//! The dispatcher's event target is shared by the global service's document
//! listener and every attached field's listener. Registration is additive:
//! each registration yields a unique [`ListenerHandle`], and a handle removes
//! exactly its own listener and nothing else.

use std::fmt;

use serde::{Deserialize, Serialize};
use sw_core::ElementId;

/// Identity of one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    /// Returns the raw handle value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// What a listener is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// The process-wide capture listener; sees every keystroke.
    Document,
    /// A field listener; sees events targeted at one element.
    Field(ElementId),
}

/// Ordered set of registered listeners.
///
/// Iteration follows registration order.
///
/// # Examples
///
/// ```
/// use sw_core::ElementId;
/// use sw_field::{ListenerKind, ListenerRegistry};
///
/// let mut registry = ListenerRegistry::new();
/// let document = registry.register(ListenerKind::Document);
/// let field = registry.register(ListenerKind::Field(ElementId(1)));
///
/// assert!(registry.deregister(field));
/// assert!(!registry.deregister(field));
/// assert!(registry.contains(document));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    next: u64,
    listeners: Vec<(ListenerHandle, ListenerKind)>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and returns its handle.
    pub fn register(&mut self, kind: ListenerKind) -> ListenerHandle {
        let handle = ListenerHandle(self.next);
        self.next += 1;
        self.listeners.push((handle, kind));
        handle
    }

    /// Removes the listener registered under `handle`.
    ///
    /// Returns `false` if no such listener is registered.
    pub fn deregister(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        self.listeners.len() != before
    }

    /// Returns `true` if `handle` is registered.
    #[must_use]
    pub fn contains(&self, handle: ListenerHandle) -> bool {
        self.kind(handle).is_some()
    }

    /// Returns what `handle` is registered for.
    #[must_use]
    pub fn kind(&self, handle: ListenerHandle) -> Option<ListenerKind> {
        self.listeners
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|&(_, kind)| kind)
    }

    /// Iterates over field listeners registered for `element`.
    pub fn listeners_for(&self, element: ElementId) -> impl Iterator<Item = ListenerHandle> + '_ {
        self.listeners
            .iter()
            .filter(move |(_, kind)| *kind == ListenerKind::Field(element))
            .map(|&(handle, _)| handle)
    }

    /// Iterates over every field listener.
    pub fn field_listeners(&self) -> impl Iterator<Item = ListenerHandle> + '_ {
        self.listeners
            .iter()
            .filter(|(_, kind)| matches!(kind, ListenerKind::Field(_)))
            .map(|&(handle, _)| handle)
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let mut registry = ListenerRegistry::new();
        let a = registry.register(ListenerKind::Field(ElementId(1)));
        registry.deregister(a);
        let b = registry.register(ListenerKind::Field(ElementId(1)));
        assert_ne!(a, b);
    }

    #[test]
    fn test_deregister_removes_only_own_listener() {
        let mut registry = ListenerRegistry::new();
        let document = registry.register(ListenerKind::Document);
        let first = registry.register(ListenerKind::Field(ElementId(1)));
        let second = registry.register(ListenerKind::Field(ElementId(1)));

        assert!(registry.deregister(first));
        assert!(registry.contains(document));
        assert_eq!(registry.listeners_for(ElementId(1)).collect::<Vec<_>>(), [second]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_iteration_follows_registration_order() {
        let mut registry = ListenerRegistry::new();
        registry.register(ListenerKind::Document);
        let a = registry.register(ListenerKind::Field(ElementId(3)));
        let b = registry.register(ListenerKind::Field(ElementId(1)));
        let c = registry.register(ListenerKind::Field(ElementId(2)));
        assert_eq!(registry.field_listeners().collect::<Vec<_>>(), [a, b, c]);
        assert_eq!(registry.kind(b), Some(ListenerKind::Field(ElementId(1))));
    }

    #[test]
    fn test_handle_display() {
        let mut registry = ListenerRegistry::new();
        let handle = registry.register(ListenerKind::Document);
        assert_eq!(handle.to_string(), "listener-0");
        assert_eq!(handle.get(), 0);
    }
}
