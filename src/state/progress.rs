//! Scroll progress bar.

use log::debug;

use crate::config::SelectorConfig;
use crate::dom::Page;
use crate::types::ElementId;

/// Percentage of the scrollable distance covered, in `[0, 100]`.
///
/// A page that cannot scroll (`max_scroll <= 0`) reports 0.
pub fn progress_percent(scrolled: f32, max_scroll: f32) -> f32 {
    if max_scroll <= 0.0 || !max_scroll.is_finite() {
        return 0.0;
    }
    (scrolled / max_scroll * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollProgress {
    bar: ElementId,
}

impl ScrollProgress {
    pub fn bind(page: &dyn Page, selectors: &SelectorConfig) -> Option<Self> {
        match page.query_selector(&selectors.progress) {
            Some(bar) => Some(Self { bar }),
            None => {
                debug!("event=binding_skipped binding=progress reason=no_bar");
                None
            }
        }
    }

    pub fn bar(&self) -> ElementId {
        self.bar
    }

    /// Recompute and write the bar width. Returns the percentage written.
    pub fn update(&self, page: &mut dyn Page) -> f32 {
        let max_scroll = page.scroll_height() - page.inner_height();
        let percent = progress_percent(page.scroll_y(), max_scroll);
        page.set_style(self.bar, "width", &format!("{percent}%"));
        percent
    }
}
