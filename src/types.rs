//! Core types shared by every binding.
//!
//! - [`ElementId`] - opaque handle to a page element
//! - [`DomRect`] - client-space rectangle (what `getBoundingClientRect` reports)
//! - [`ScrollRequest`] / [`ScrollBehavior`] - window scroll commands
//! - [`Rgba`] - CSS colors used for status messages
//! - [`Features`] - which bindings a mounted controller wired up

use std::fmt;

// =============================================================================
// Element handles
// =============================================================================

/// Opaque handle to an element owned by a [`Page`](crate::dom::Page).
///
/// Handles are only meaningful for the page that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl ElementId {
    /// Raw index into the owning page's element storage.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DomRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DomRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Same rect shifted vertically by `dy`.
    pub fn translate_y(&self, dy: f32) -> Self {
        Self { y: self.y + dy, ..*self }
    }

    /// Overlap of two rects.
    ///
    /// Edge-adjacent rects produce a zero-area intersection (`Some`), disjoint
    /// rects produce `None`.
    pub fn intersection(&self, other: &DomRect) -> Option<DomRect> {
        let left = self.left().max(other.left());
        let right = self.right().min(other.right());
        let top = self.top().max(other.top());
        let bottom = self.bottom().min(other.bottom());

        if right < left || bottom < top {
            return None;
        }

        Some(DomRect::new(left, top, right - left, bottom - top))
    }
}

// =============================================================================
// Scrolling
// =============================================================================

/// How the window should move to a scroll target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Jump immediately.
    #[default]
    Auto,
    /// Animated scroll.
    Smooth,
}

/// A `window.scrollTo` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f32,
    pub behavior: ScrollBehavior,
}

// =============================================================================
// Colors
// =============================================================================

/// RGBA color as written into inline `color` styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Status color for errors (`#b91c1c`).
    pub const STATUS_ERROR: Self = Self::rgb(0xb9, 0x1c, 0x1c);
    /// Status color while a request is in flight (`#1d4ed8`).
    pub const STATUS_PENDING: Self = Self::rgb(0x1d, 0x4e, 0xd8);
    /// Status color for a delivered message (`#166534`).
    pub const STATUS_SUCCESS: Self = Self::rgb(0x16, 0x65, 0x34);

    /// CSS hex form; alpha is only emitted when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// =============================================================================
// Feature set (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Bindings wired by a mounted controller.
    ///
    /// A binding is left out when its elements are missing from the page or
    /// when the configuration disables it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Features: u16 {
        const NONE = 0;
        const NAV_TOGGLE = 1 << 0;
        const SMOOTH_SCROLL = 1 << 1;
        const SECTION_HIGHLIGHT = 1 << 2;
        const REVEAL = 1 << 3;
        const SCROLL_PROGRESS = 1 << 4;
        const FOOTER_YEAR = 1 << 5;
        const CONTACT_FORM = 1 << 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_overlap() {
        let a = DomRect::new(0.0, 0.0, 100.0, 100.0);
        let b = DomRect::new(0.0, 50.0, 100.0, 100.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i, DomRect::new(0.0, 50.0, 100.0, 50.0));
        assert_eq!(i.area(), 5000.0);
    }

    #[test]
    fn test_intersection_edge_and_disjoint() {
        let a = DomRect::new(0.0, 0.0, 100.0, 100.0);
        let edge = DomRect::new(0.0, 100.0, 100.0, 10.0);
        let far = DomRect::new(0.0, 200.0, 100.0, 10.0);

        assert_eq!(a.intersection(&edge).map(|r| r.area()), Some(0.0));
        assert!(a.intersection(&far).is_none());
    }

    #[test]
    fn test_rgba_hex() {
        assert_eq!(Rgba::STATUS_ERROR.to_hex(), "#b91c1c");
        assert_eq!(Rgba::STATUS_PENDING.to_hex(), "#1d4ed8");
        assert_eq!(Rgba::new(0, 0, 0, 128).to_string(), "#00000080");
    }

    #[test]
    fn test_features_compose() {
        let f = Features::NAV_TOGGLE | Features::CONTACT_FORM;
        assert!(f.contains(Features::NAV_TOGGLE));
        assert!(!f.contains(Features::REVEAL));
        assert_eq!(Features::default(), Features::NONE);
    }
}
