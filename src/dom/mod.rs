//! Page capability.
//!
//! The controller never touches a concrete document. It drives the [`Page`]
//! trait, which bundles the DOM calls and the window surface (scroll position,
//! viewport height, location) the bindings need.
//!
//! - [`selector`] - selector parsing and matching
//! - [`headless`] - in-memory page used by tests and the terminal preview

pub mod headless;
pub mod selector;

use url::Url;

use crate::relay::FormData;
use crate::types::{DomRect, ElementId, ScrollRequest};

pub use headless::{ElementSpec, HeadlessPage};
pub use selector::{Selector, SelectorTree};

/// Everything the controller reads from or writes to the page.
///
/// Lookups with a selector that fails to parse find nothing.
pub trait Page {
    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// First element in document order matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<ElementId>;

    /// Every element matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<ElementId>;

    /// First descendant of `root` matching `selector`.
    fn query_selector_within(&self, root: ElementId, selector: &str) -> Option<ElementId>;

    fn element_by_id(&self, id: &str) -> Option<ElementId>;

    fn parent_element(&self, el: ElementId) -> Option<ElementId>;

    /// `el` followed by its ancestors, innermost first (the bubbling path).
    fn event_path(&self, el: ElementId) -> Vec<ElementId> {
        let mut path = vec![el];
        let mut current = el;
        while let Some(parent) = self.parent_element(current) {
            path.push(parent);
            current = parent;
        }
        path
    }

    // -------------------------------------------------------------------------
    // Attributes and classes
    // -------------------------------------------------------------------------

    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str);

    fn has_class(&self, el: ElementId, class: &str) -> bool;
    fn add_class(&mut self, el: ElementId, class: &str);
    fn remove_class(&mut self, el: ElementId, class: &str);

    /// `classList.toggle`: flips `class`, or forces it on/off when `force` is
    /// given. Returns whether the class is present afterwards.
    fn toggle_class(&mut self, el: ElementId, class: &str, force: Option<bool>) -> bool {
        let on = force.unwrap_or_else(|| !self.has_class(el, class));
        if on {
            self.add_class(el, class);
        } else {
            self.remove_class(el, class);
        }
        on
    }

    // -------------------------------------------------------------------------
    // Content and style
    // -------------------------------------------------------------------------

    fn style(&self, el: ElementId, property: &str) -> Option<String>;
    fn set_style(&mut self, el: ElementId, property: &str, value: &str);

    fn text(&self, el: ElementId) -> String;
    fn set_text(&mut self, el: ElementId, text: &str);

    fn is_disabled(&self, el: ElementId) -> bool;
    fn set_disabled(&mut self, el: ElementId, disabled: bool);

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    fn offset_height(&self, el: ElementId) -> f32;

    /// Rect relative to the viewport (document position minus scroll).
    fn bounding_client_rect(&self, el: ElementId) -> DomRect;

    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    /// Snapshot of the named fields inside `form`.
    fn form_data(&self, form: ElementId) -> FormData;

    /// Restore every field in `form` to its initial value.
    fn reset_form(&mut self, form: ElementId);

    // -------------------------------------------------------------------------
    // Window
    // -------------------------------------------------------------------------

    fn scroll_y(&self) -> f32;
    fn inner_width(&self) -> f32;
    fn inner_height(&self) -> f32;

    /// Full document height (`documentElement.scrollHeight`).
    fn scroll_height(&self) -> f32;

    fn scroll_to(&mut self, request: ScrollRequest);

    fn location(&self) -> &Url;
}
