//! Footer year.
//!
//! Written once at mount and never recomputed, so a page left open across
//! New Year keeps the old year.

use chrono::Datelike;
use log::debug;

use crate::config::SelectorConfig;
use crate::dom::Page;
use crate::types::ElementId;

/// Source of the current calendar year.
pub trait Clock {
    fn current_year(&self) -> i32;
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        chrono::Local::now().year()
    }
}

/// Always reports the same year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
    fn current_year(&self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterYear {
    target: ElementId,
}

impl FooterYear {
    pub fn bind(page: &dyn Page, selectors: &SelectorConfig) -> Option<Self> {
        let target = page.query_selector(&selectors.year);
        if target.is_none() {
            debug!("event=binding_skipped binding=year reason=no_element");
        }
        target.map(|target| Self { target })
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    pub fn apply(&self, page: &mut dyn Page, clock: &dyn Clock) -> i32 {
        let year = clock.current_year();
        page.set_text(self.target, &year.to_string());
        year
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, HeadlessPage};

    #[test]
    fn test_writes_clock_year() {
        let mut p = HeadlessPage::builder(
            ElementSpec::new("footer").child(ElementSpec::new("span").id("current-year").text("2020")),
        )
        .build()
        .unwrap();
        let year = FooterYear::bind(&p, &SelectorConfig::default()).unwrap();

        assert_eq!(year.apply(&mut p, &FixedClock(2031)), 2031);
        assert_eq!(p.text(year.target()), "2031");
    }

    #[test]
    fn test_system_clock_is_plausible() {
        assert!(SystemClock.current_year() >= 2024);
    }

    #[test]
    fn test_missing_element() {
        let p = HeadlessPage::builder(ElementSpec::new("footer")).build().unwrap();
        assert!(FooterYear::bind(&p, &SelectorConfig::default()).is_none());
    }
}
