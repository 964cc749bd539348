//! Layout Module - Block geometry for headless pages
//!
//! Headless pages have no CSS engine. Every element is laid out as a
//! full-width flex column: an explicit height is honored, otherwise the box
//! grows to fit its children. That is enough to give sections, headers and
//! reveal items realistic document positions for scrolling and intersection.
//!
//! - [`taffy_bridge`] - converts the element tree into a Taffy tree and back

mod taffy_bridge;

pub use taffy_bridge::compute_block_layout;

use crate::types::DomRect;

/// One element as the layout pass sees it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutInput {
    /// Index of the parent in the same input slice; must precede the child.
    pub parent: Option<usize>,
    /// Fixed height in CSS pixels; `None` sizes to content.
    pub height: Option<f32>,
    /// Excluded from layout (`display: none`).
    pub hidden: bool,
}

/// Result of a layout pass, indexed like the input slice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedLayout {
    /// Document-space rects (origin at the top of the document).
    pub rects: Vec<DomRect>,
    /// Height of all content.
    pub content_height: f32,
}

impl ComputedLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rect for `index`, zero-sized when out of range.
    pub fn rect(&self, index: usize) -> DomRect {
        self.rects.get(index).copied().unwrap_or_default()
    }
}
