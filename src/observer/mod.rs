//! Intersection observation capability.
//!
//! "Observe an element, report when its visibility crosses a threshold."
//! Bindings only talk to [`IntersectionHost`]; a browser host forwards native
//! observer callbacks, the headless host ([`GeometryObserverHost`]) computes
//! them from page geometry, and tests push batches by hand.
//!
//! # Example
//!
//! ```ignore
//! let options = ObserverOptions::new(0.5, RootMargin::parse("-20% 0px -30% 0px")?);
//! let observer = host.create_observer(options);
//! host.observe(observer, section);
//!
//! for batch in host.take_records(&page) {
//!     for entry in batch.entries { /* ... */ }
//! }
//! ```

mod geometry;

use cssparser::{Parser, ParserInput, Token};
use serde::{Deserialize, Deserializer};

use crate::dom::Page;
use crate::error::ConfigError;
use crate::types::{DomRect, ElementId};

pub use geometry::GeometryObserverHost;

// =============================================================================
// OPTIONS
// =============================================================================

/// A root margin length.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MarginLength {
    #[default]
    Zero,
    Px(f32),
    /// Percentage of the root's height (top/bottom) or width (left/right).
    Percent(f32),
}

impl MarginLength {
    fn parse(parser: &mut Parser<'_, '_>) -> Option<Self> {
        match *parser.next().ok()? {
            Token::Dimension {
                value, ref unit, ..
            } if unit.eq_ignore_ascii_case("px") => Some(MarginLength::Px(value)),
            Token::Percentage {
                unit_value,
                int_value,
                ..
            } => Some(MarginLength::Percent(
                int_value.map_or(unit_value * 100.0, |n| n as f32),
            )),
            // Unitless zero is the only unitless length CSS allows
            Token::Number { value, .. } if value == 0.0 => Some(MarginLength::Zero),
            _ => None,
        }
    }

    /// Resolve against the root dimension on the same axis.
    pub fn resolve(self, basis: f32) -> f32 {
        match self {
            MarginLength::Zero => 0.0,
            MarginLength::Px(px) => px,
            MarginLength::Percent(p) => basis * p / 100.0,
        }
    }
}

/// CSS-style `rootMargin` (`"top right bottom left"`, 1 to 4 values).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    pub fn parse(src: &str) -> Result<Self, ConfigError> {
        let mut input = ParserInput::new(src);
        let mut parser = Parser::new(&mut input);
        let mut values = Vec::new();
        while !parser.is_exhausted() {
            let length = MarginLength::parse(&mut parser)
                .ok_or_else(|| ConfigError::RootMargin(src.to_string()))?;
            values.push(length);
        }

        let (top, right, bottom, left) = match values.as_slice() {
            [] => return Ok(Self::default()),
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => return Err(ConfigError::RootMargin(src.to_string())),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    /// Grow (positive) or shrink (negative) `root` by this margin.
    pub fn apply(&self, root: DomRect) -> DomRect {
        let top = self.top.resolve(root.height);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);
        let right = self.right.resolve(root.width);

        DomRect::new(
            root.x - left,
            root.y - top,
            (root.width + left + right).max(0.0),
            (root.height + top + bottom).max(0.0),
        )
    }
}

impl<'de> Deserialize<'de> for RootMargin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RootMargin::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Options for one observer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObserverOptions {
    /// Visibility ratios that trigger a report, ascending.
    pub thresholds: Vec<f32>,
    #[serde(default)]
    pub root_margin: RootMargin,
}

impl ObserverOptions {
    pub fn new(threshold: f32, root_margin: RootMargin) -> Self {
        Self {
            thresholds: vec![threshold],
            root_margin,
        }
    }

    /// Thresholds clamped to `[0, 1]`, sorted, deduplicated; `[0]` when empty.
    pub fn normalized_thresholds(&self) -> Vec<f32> {
        let mut t: Vec<f32> = self
            .thresholds
            .iter()
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .collect();
        t.sort_by(f32::total_cmp);
        t.dedup();
        if t.is_empty() {
            t.push(0.0);
        }
        t
    }
}

// =============================================================================
// ENTRIES
// =============================================================================

/// Handle for an observer created through an [`IntersectionHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub usize);

/// One visibility report for one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub is_intersecting: bool,
    pub intersection_ratio: f32,
}

impl IntersectionEntry {
    pub fn entering(target: ElementId, ratio: f32) -> Self {
        Self {
            target,
            is_intersecting: true,
            intersection_ratio: ratio,
        }
    }

    pub fn leaving(target: ElementId) -> Self {
        Self {
            target,
            is_intersecting: false,
            intersection_ratio: 0.0,
        }
    }
}

/// Entries delivered to one observer callback, in host order.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionBatch {
    pub observer: ObserverId,
    pub entries: Vec<IntersectionEntry>,
}

// =============================================================================
// HOST
// =============================================================================

/// Capability: create observers, (un)observe targets, collect reports.
pub trait IntersectionHost {
    fn create_observer(&mut self, options: ObserverOptions) -> ObserverId;

    fn observe(&mut self, observer: ObserverId, target: ElementId);

    /// Stop reporting `target` to `observer`. Unknown pairs are ignored.
    fn unobserve(&mut self, observer: ObserverId, target: ElementId);

    /// Reports that became due since the previous call, one batch per
    /// observer that has entries.
    fn take_records(&mut self, page: &dyn Page) -> Vec<IntersectionBatch>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_margin_parse() {
        let m = RootMargin::parse("-20% 0px -30% 0px").unwrap();
        assert_eq!(m.top, MarginLength::Percent(-20.0));
        assert_eq!(m.right, MarginLength::Px(0.0));
        assert_eq!(m.bottom, MarginLength::Percent(-30.0));
        assert_eq!(m.left, MarginLength::Px(0.0));

        let m = RootMargin::parse("10px").unwrap();
        assert_eq!(m.left, MarginLength::Px(10.0));

        let m = RootMargin::parse("0 5%").unwrap();
        assert_eq!(m.top, MarginLength::Zero);
        assert_eq!(m.right, MarginLength::Percent(5.0));
        assert_eq!(m.bottom, MarginLength::Zero);

        assert_eq!(RootMargin::parse("").unwrap(), RootMargin::default());
        assert!(RootMargin::parse("10em").is_err());
        assert!(RootMargin::parse("5").is_err());
        assert!(RootMargin::parse("1px 2px 3px 4px 5px").is_err());
        assert!(RootMargin::parse("10px,5px").is_err());

        let m = RootMargin::parse("  12.5PX  -7%\t").unwrap();
        assert_eq!(m.top, MarginLength::Px(12.5));
        assert_eq!(m.right, MarginLength::Percent(-7.0));
    }

    #[test]
    fn test_root_margin_apply_shrinks_viewport() {
        let m = RootMargin::parse("-20% 0px -30% 0px").unwrap();
        let root = m.apply(DomRect::new(0.0, 0.0, 1000.0, 1000.0));
        assert_eq!(root, DomRect::new(0.0, 200.0, 1000.0, 500.0));

        let m = RootMargin::parse("0px 0px -5% 0px").unwrap();
        let root = m.apply(DomRect::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(root.bottom(), 570.0);
    }

    #[test]
    fn test_thresholds_normalized() {
        let o = ObserverOptions {
            thresholds: vec![0.5, 2.0, -1.0, 0.5, f32::NAN],
            root_margin: RootMargin::default(),
        };
        assert_eq!(o.normalized_thresholds(), vec![0.0, 0.5, 1.0]);

        let empty = ObserverOptions {
            thresholds: vec![],
            root_margin: RootMargin::default(),
        };
        assert_eq!(empty.normalized_thresholds(), vec![0.0]);
    }

    #[test]
    fn test_options_deserialize() {
        let o: ObserverOptions =
            serde_json::from_str(r#"{"thresholds": [0.2], "root_margin": "0px 0px -5% 0px"}"#)
                .unwrap();
        assert_eq!(o.thresholds, vec![0.2]);
        assert_eq!(o.root_margin.bottom, MarginLength::Percent(-5.0));

        let bad = serde_json::from_str::<ObserverOptions>(r#"{"thresholds": [], "root_margin": "x"}"#);
        assert!(bad.is_err());
    }
}
