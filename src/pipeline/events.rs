//! Events a host forwards to the controller.

use crate::types::ElementId;

/// A page event, already applied to the page by the host.
///
/// For `Scroll` and `Resize` the host updates the page's scroll offset or
/// viewport first, then dispatches. A `Click` names the innermost element
/// clicked; the controller walks its ancestors the way the event bubbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    Click(ElementId),
    Scroll,
    Resize,
    /// A form was submitted.
    Submit(ElementId),
}

/// Whether the event's default action should still run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dispatch {
    #[default]
    Default,
    Prevented,
}

impl Dispatch {
    pub fn is_prevented(self) -> bool {
        self == Dispatch::Prevented
    }

    /// Combine results from several listeners on the same event.
    pub fn merge(self, other: Dispatch) -> Dispatch {
        if self.is_prevented() || other.is_prevented() {
            Dispatch::Prevented
        } else {
            Dispatch::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_any_prevented() {
        assert_eq!(Dispatch::Default.merge(Dispatch::Default), Dispatch::Default);
        assert_eq!(Dispatch::Default.merge(Dispatch::Prevented), Dispatch::Prevented);
        assert_eq!(Dispatch::Prevented.merge(Dispatch::Default), Dispatch::Prevented);
        assert!(!Dispatch::default().is_prevented());
    }
}
