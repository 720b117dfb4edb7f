//! Focus tracking and the "is this scope active" predicate.
//!
//! Directives never inspect ambient UI state. Each one holds a
//! [`FocusProbe`] and asks it whether its [`FocusScope`] is the active target
//! at the moment a code completes.
//!
//! [`FocusTracker`] is the stock probe: the host reports focus changes as a
//! [`FocusPath`] (the focused element plus its ancestor containers), and a
//! scope is active when the focused element is the scope's own element or
//! lies inside one of the containers it watches.
//!
//! ```text
//!  Dispensing (container #10)
//!  ├── Product lookup #1   scope { element: #1, containers: [#10] }
//!  └── Quantity #2         focus path { element: #2, ancestors: [#10] }
//!                          ─► #1's scope is active
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;
use sw_core::ElementId;

/// Queryable focus predicate injected into every directive.
pub trait FocusProbe: Send + Sync {
    /// Returns `true` if `scope` is currently the active input target.
    fn is_active(&self, scope: &FocusScope) -> bool;
}

impl<F> FocusProbe for F
where
    F: Fn(&FocusScope) -> bool + Send + Sync,
{
    fn is_active(&self, scope: &FocusScope) -> bool {
        self(scope)
    }
}

/// The element a directive is attached to plus any containers it watches.
///
/// # Examples
///
/// ```
/// use sw_core::ElementId;
/// use sw_field::FocusScope;
///
/// let scope = FocusScope::new(ElementId(1)).with_container(ElementId(10));
/// assert!(scope.covers(ElementId(1)));
/// assert!(scope.covers(ElementId(10)));
/// assert!(!scope.covers(ElementId(2)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusScope {
    element: ElementId,
    containers: SmallVec<[ElementId; 2]>,
}

impl FocusScope {
    /// Creates a scope covering only `element`.
    #[must_use]
    pub fn new(element: ElementId) -> Self {
        Self {
            element,
            containers: SmallVec::new(),
        }
    }

    /// Adds a watched container.
    #[must_use]
    pub fn with_container(mut self, container: ElementId) -> Self {
        self.watch(container);
        self
    }

    /// Adds a watched container in place. Duplicates are ignored.
    pub fn watch(&mut self, container: ElementId) {
        if container != self.element && !self.containers.contains(&container) {
            self.containers.push(container);
        }
    }

    /// Returns the element the scope is attached to.
    #[inline]
    #[must_use]
    pub const fn element(&self) -> ElementId {
        self.element
    }

    /// Returns the watched containers.
    #[inline]
    #[must_use]
    pub fn containers(&self) -> &[ElementId] {
        &self.containers
    }

    /// Returns `true` if `id` is the scope's element or a watched container.
    #[must_use]
    pub fn covers(&self, id: ElementId) -> bool {
        id == self.element || self.containers.contains(&id)
    }
}

/// The focused element and its ancestors, innermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusPath {
    /// The element holding input focus.
    pub element: ElementId,

    /// Containers enclosing the focused element, innermost first.
    pub ancestors: SmallVec<[ElementId; 4]>,
}

impl FocusPath {
    /// Creates a path for `element` nested in `ancestors`.
    #[must_use]
    pub fn new(element: ElementId, ancestors: impl IntoIterator<Item = ElementId>) -> Self {
        Self {
            element,
            ancestors: ancestors.into_iter().collect(),
        }
    }

    /// Returns `true` if `scope` covers the focused element or an ancestor.
    #[must_use]
    pub fn is_within(&self, scope: &FocusScope) -> bool {
        scope.covers(self.element) || self.ancestors.iter().any(|&a| scope.covers(a))
    }
}

/// Shared, host-updated record of the current focus.
///
/// Clones share state: the dispatcher updates one handle while every
/// directive reads through its own.
///
/// # Examples
///
/// ```
/// use sw_core::ElementId;
/// use sw_field::{FocusProbe, FocusScope, FocusTracker};
///
/// let tracker = FocusTracker::new();
/// let scope = FocusScope::new(ElementId(1));
/// assert!(!tracker.is_active(&scope));
///
/// tracker.focus(ElementId(1), []);
/// assert!(tracker.is_active(&scope));
///
/// tracker.blur();
/// assert!(!tracker.is_active(&scope));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FocusTracker {
    current: Arc<RwLock<Option<FocusPath>>>,
}

impl FocusTracker {
    /// Creates a tracker with nothing focused.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `element`, nested in `ancestors`, gained focus.
    pub fn focus(&self, element: ElementId, ancestors: impl IntoIterator<Item = ElementId>) {
        *self.current.write() = Some(FocusPath::new(element, ancestors));
    }

    /// Records that focus left every element.
    pub fn blur(&self) {
        *self.current.write() = None;
    }

    /// Returns the focused element, if any.
    #[must_use]
    pub fn focused(&self) -> Option<ElementId> {
        self.current.read().as_ref().map(|path| path.element)
    }

    /// Returns a copy of the current focus path.
    #[must_use]
    pub fn path(&self) -> Option<FocusPath> {
        self.current.read().clone()
    }
}

impl FocusProbe for FocusTracker {
    fn is_active(&self, scope: &FocusScope) -> bool {
        self.current
            .read()
            .as_ref()
            .is_some_and(|path| path.is_within(scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT: ElementId = ElementId(1);
    const QUANTITY: ElementId = ElementId(2);
    const NOTES: ElementId = ElementId(3);
    const DISPENSING: ElementId = ElementId(10);
    const FORM: ElementId = ElementId(20);

    #[test]
    fn test_scope_watch_ignores_duplicates() {
        let mut scope = FocusScope::new(PRODUCT);
        scope.watch(DISPENSING);
        scope.watch(DISPENSING);
        scope.watch(PRODUCT);
        assert_eq!(scope.containers(), &[DISPENSING]);
    }

    #[test]
    fn test_focus_on_own_element() {
        let tracker = FocusTracker::new();
        tracker.focus(PRODUCT, [DISPENSING, FORM]);
        assert!(tracker.is_active(&FocusScope::new(PRODUCT)));
        assert!(!tracker.is_active(&FocusScope::new(QUANTITY)));
    }

    #[test]
    fn test_focus_inside_watched_container() {
        let tracker = FocusTracker::new();
        let scope = FocusScope::new(PRODUCT).with_container(DISPENSING);

        tracker.focus(QUANTITY, [DISPENSING, FORM]);
        assert!(tracker.is_active(&scope));

        tracker.focus(NOTES, [FORM]);
        assert!(!tracker.is_active(&scope));
    }

    #[test]
    fn test_clones_share_focus() {
        let tracker = FocusTracker::new();
        let reader = tracker.clone();
        tracker.focus(NOTES, []);
        assert_eq!(reader.focused(), Some(NOTES));
        tracker.blur();
        assert_eq!(reader.path(), None);
    }

    #[test]
    fn test_closure_probe() {
        let always = |_: &FocusScope| true;
        assert!(always.is_active(&FocusScope::new(NOTES)));
    }
}
