//! Mobile nav toggle.
//!
//! The open state lives on the nav container as a class; the toggle button
//! mirrors it in `aria-expanded`.

use log::debug;

use crate::config::{NavConfig, SelectorConfig};
use crate::dom::Page;
use crate::types::ElementId;

/// Handles for the nav toggle button and the nav container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavToggle {
    toggle: ElementId,
    nav: ElementId,
    open_class: String,
}

impl NavToggle {
    /// Look up both elements; `None` unless both exist.
    pub fn bind(page: &dyn Page, selectors: &SelectorConfig, config: &NavConfig) -> Option<Self> {
        let toggle = page.query_selector(&selectors.nav_toggle);
        let nav = page.query_selector(&selectors.nav);
        match (toggle, nav) {
            (Some(toggle), Some(nav)) => Some(Self {
                toggle,
                nav,
                open_class: config.open_class.clone(),
            }),
            _ => {
                debug!(
                    "event=binding_skipped binding=nav toggle_found={} nav_found={}",
                    toggle.is_some(),
                    nav.is_some()
                );
                None
            }
        }
    }

    /// Is a click on `path` a click on the toggle?
    pub fn handles(&self, path: &[ElementId]) -> bool {
        path.contains(&self.toggle)
    }

    pub fn is_open(&self, page: &dyn Page) -> bool {
        page.has_class(self.nav, &self.open_class)
    }

    /// Flip the open state. Returns the new state.
    pub fn toggle(&self, page: &mut dyn Page) -> bool {
        let open = page.toggle_class(self.nav, &self.open_class, None);
        page.set_attribute(self.toggle, "aria-expanded", if open { "true" } else { "false" });
        open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, HeadlessPage};

    fn page() -> HeadlessPage {
        HeadlessPage::builder(
            ElementSpec::new("header")
                .child(
                    ElementSpec::new("button")
                        .id("nav-toggle")
                        .attr("aria-expanded", "false")
                        .child(ElementSpec::new("span").class("bar")),
                )
                .child(ElementSpec::new("nav").id("primary-nav")),
        )
        .build()
        .unwrap()
    }

    fn bound(page: &HeadlessPage) -> NavToggle {
        NavToggle::bind(page, &SelectorConfig::default(), &NavConfig::default()).unwrap()
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut p = page();
        let nav = bound(&p);
        let container = p.element_by_id("primary-nav").unwrap();
        let button = p.element_by_id("nav-toggle").unwrap();
        let before_class = p.attribute(container, "class");
        let before_aria = p.attribute(button, "aria-expanded");

        assert!(nav.toggle(&mut p));
        assert!(nav.is_open(&p));
        assert!(p.has_class(container, "open"));
        assert_eq!(p.attribute(button, "aria-expanded").as_deref(), Some("true"));

        assert!(!nav.toggle(&mut p));
        assert!(!nav.is_open(&p));
        assert_eq!(p.attribute(container, "class"), before_class);
        assert_eq!(p.attribute(button, "aria-expanded"), before_aria);
    }

    #[test]
    fn test_handles_clicks_inside_toggle() {
        let p = page();
        let nav = bound(&p);
        let bar = p.query_selector(".bar").unwrap();

        assert!(nav.handles(&p.event_path(bar)));
        let container = p.element_by_id("primary-nav").unwrap();
        assert!(!nav.handles(&p.event_path(container)));
    }

    #[test]
    fn test_bind_requires_both_elements() {
        let p = HeadlessPage::builder(ElementSpec::new("button").id("nav-toggle"))
            .build()
            .unwrap();
        assert!(NavToggle::bind(&p, &SelectorConfig::default(), &NavConfig::default()).is_none());
    }
}
