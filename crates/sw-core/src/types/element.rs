//! Element identities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of a focusable element or a container of elements.
///
/// The engine never inspects element contents; it only compares identities
/// to decide which scoped field is the active target for a scan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl ElementId {
    /// Creates an element identity.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw identity value.
    #[inline]
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

impl From<u32> for ElementId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_display() {
        assert_eq!(ElementId::new(7).to_string(), "#7");
    }

    #[test]
    fn test_element_from_u32() {
        assert_eq!(ElementId::from(3).get(), 3);
    }
}
