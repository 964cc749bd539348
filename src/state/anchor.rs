//! Smooth in-page anchor scrolling.
//!
//! Every `a[href^="#"]` present at mount scrolls to its target with the
//! sticky header's height (plus a gap) kept clear above it. Links with an
//! empty or bare `#` href, or whose target does not exist, fall through to
//! the browser's default behavior.

use log::debug;

use crate::config::{NavConfig, ScrollConfig, SelectorConfig};
use crate::dom::Page;
use crate::types::{ElementId, ScrollBehavior, ScrollRequest};

/// Document offset to scroll to so `target_top` lands below the header.
///
/// `target_top` is viewport-relative (`getBoundingClientRect().top`).
pub fn scroll_target_top(target_top: f32, scroll_y: f32, header_offset: f32) -> f32 {
    target_top + scroll_y - header_offset
}

/// Anchor links and what they need to compute a scroll.
#[derive(Debug, Clone)]
pub struct AnchorScroll {
    anchors: Vec<ElementId>,
    header: Option<ElementId>,
    /// Nav container closed after a jump, and its toggle when the page has one.
    nav: Option<ElementId>,
    toggle: Option<ElementId>,
    open_class: String,
    gap: f32,
    behavior: ScrollBehavior,
}

impl AnchorScroll {
    /// `None` when the page has no in-page anchors.
    pub fn bind(
        page: &dyn Page,
        selectors: &SelectorConfig,
        config: &ScrollConfig,
        nav: &NavConfig,
    ) -> Option<Self> {
        let anchors = page.query_selector_all(&selectors.anchors);
        if anchors.is_empty() {
            debug!("event=binding_skipped binding=anchor reason=no_anchors");
            return None;
        }
        Some(Self {
            anchors,
            header: page.query_selector(&selectors.header),
            nav: page.query_selector(&selectors.nav),
            toggle: page.query_selector(&selectors.nav_toggle),
            open_class: nav.open_class.clone(),
            gap: config.header_gap,
            behavior: if config.smooth {
                ScrollBehavior::Smooth
            } else {
                ScrollBehavior::Auto
            },
        })
    }

    pub fn anchors(&self) -> &[ElementId] {
        &self.anchors
    }

    /// Innermost anchor on the click path, if any.
    pub fn anchor_for(&self, path: &[ElementId]) -> Option<ElementId> {
        path.iter().copied().find(|el| self.anchors.contains(el))
    }

    /// Header height plus the gap, or 0 without a header.
    pub fn header_offset(&self, page: &dyn Page) -> f32 {
        match self.header {
            Some(header) => page.offset_height(header) + self.gap,
            None => 0.0,
        }
    }

    /// Handle a click on `anchor`. Returns the scroll issued, or `None` when
    /// the click is left to the default action.
    pub fn click(&self, page: &mut dyn Page, anchor: ElementId) -> Option<ScrollRequest> {
        let href = page.attribute(anchor, "href").unwrap_or_default();
        if href.is_empty() || href == "#" {
            return None;
        }
        let Some(target) = page.query_selector(&href) else {
            debug!("event=anchor_target_missing href={}", href);
            return None;
        };

        let top = scroll_target_top(
            page.bounding_client_rect(target).top(),
            page.scroll_y(),
            self.header_offset(page),
        );
        let request = ScrollRequest {
            top,
            behavior: self.behavior,
        };
        page.scroll_to(request);

        if self.close_menu(page) {
            debug!("event=nav_closed by=anchor");
        }
        Some(request)
    }

    /// Close the nav if it is open. Returns whether anything changed.
    fn close_menu(&self, page: &mut dyn Page) -> bool {
        let Some(nav) = self.nav else {
            return false;
        };
        if !page.has_class(nav, &self.open_class) {
            return false;
        }
        page.remove_class(nav, &self.open_class);
        if let Some(toggle) = self.toggle {
            page.set_attribute(toggle, "aria-expanded", "false");
        }
        true
    }
}
