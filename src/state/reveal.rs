//! One-shot reveal animation on viewport entry.
//!
//! Reveal elements get a staggered `transition-delay` at mount so rows of up
//! to `stagger_group` cascade. The first intersecting report for an element
//! adds the revealed class and unobserves it; the element never goes back.

use std::collections::HashSet;

use log::debug;

use crate::config::{RevealConfig, SelectorConfig};
use crate::dom::Page;
use crate::observer::{IntersectionEntry, IntersectionHost, ObserverId};
use crate::types::ElementId;

/// `(index mod group) * step`, with a zero group treated as no stagger.
pub fn stagger_delay_ms(index: usize, group: usize, step: u32) -> u32 {
    if group == 0 {
        return 0;
    }
    (index % group) as u32 * step
}

#[derive(Debug)]
pub struct Reveal {
    observer: ObserverId,
    items: Vec<ElementId>,
    revealed: HashSet<ElementId>,
    revealed_class: String,
}

impl Reveal {
    /// Stagger and observe every reveal element. `None` when there are none,
    /// in which case no observer is created.
    pub fn bind(
        page: &mut dyn Page,
        observers: &mut dyn IntersectionHost,
        selectors: &SelectorConfig,
        config: &RevealConfig,
    ) -> Option<Self> {
        let items = page.query_selector_all(&selectors.reveal);
        if items.is_empty() {
            debug!("event=binding_skipped binding=reveal reason=no_items");
            return None;
        }

        for (index, &item) in items.iter().enumerate() {
            let delay = stagger_delay_ms(index, config.stagger_group, config.stagger_ms);
            page.set_style(item, "transition-delay", &format!("{delay}ms"));
        }

        let observer = observers.create_observer(config.observer.clone());
        for &item in &items {
            observers.observe(observer, item);
        }

        Some(Self {
            observer,
            items,
            revealed: HashSet::new(),
            revealed_class: config.revealed_class.clone(),
        })
    }

    pub fn observer(&self) -> ObserverId {
        self.observer
    }

    pub fn items(&self) -> &[ElementId] {
        &self.items
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    /// Apply one observer batch. Returns the elements revealed by it.
    pub fn on_batch(
        &mut self,
        page: &mut dyn Page,
        observers: &mut dyn IntersectionHost,
        entries: &[IntersectionEntry],
    ) -> Vec<ElementId> {
        let mut newly = Vec::new();

        for entry in entries.iter().filter(|e| e.is_intersecting) {
            // Hosts may still deliver entries queued before the unobserve
            if !self.revealed.insert(entry.target) {
                continue;
            }
            page.add_class(entry.target, &self.revealed_class);
            observers.unobserve(self.observer, entry.target);
            newly.push(entry.target);
        }

        newly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, HeadlessPage};
    use crate::observer::GeometryObserverHost;

    fn page(count: usize) -> HeadlessPage {
        HeadlessPage::builder(
            ElementSpec::new("main").children(
                (0..count).map(|i| ElementSpec::new("div").id(&format!("card-{i}")).class("reveal").height(400.0)),
            ),
        )
        .viewport(1000.0, 1000.0)
        .build()
        .unwrap()
    }

    fn bind(page: &mut HeadlessPage, host: &mut GeometryObserverHost) -> Reveal {
        Reveal::bind(page, host, &SelectorConfig::default(), &RevealConfig::default()).unwrap()
    }

    #[test]
    fn test_stagger_delay() {
        assert_eq!(stagger_delay_ms(0, 6, 60), 0);
        assert_eq!(stagger_delay_ms(5, 6, 60), 300);
        assert_eq!(stagger_delay_ms(6, 6, 60), 0);
        assert_eq!(stagger_delay_ms(7, 6, 60), 60);
        assert_eq!(stagger_delay_ms(3, 0, 60), 0);
    }

    #[test]
    fn test_bind_sets_delays_and_observes() {
        let mut p = page(8);
        let mut host = GeometryObserverHost::new();
        let reveal = bind(&mut p, &mut host);

        let delays: Vec<_> = reveal
            .items()
            .iter()
            .map(|&el| p.style(el, "transition-delay").unwrap())
            .collect();
        assert_eq!(
            delays,
            vec!["0ms", "60ms", "120ms", "180ms", "240ms", "300ms", "0ms", "60ms"]
        );
        assert_eq!(host.observed(reveal.observer()).len(), 8);
    }

    #[test]
    fn test_reveal_is_one_shot() {
        let mut p = page(3);
        let mut host = GeometryObserverHost::new();
        let mut reveal = bind(&mut p, &mut host);
        let first = reveal.items()[0];

        let newly = reveal.on_batch(&mut p, &mut host, &[IntersectionEntry::entering(first, 0.3)]);
        assert_eq!(newly, vec![first]);
        assert!(p.has_class(first, "in-view"));
        assert!(!host.observed(reveal.observer()).contains(&first));

        let class_before = p.attribute(first, "class");
        let newly = reveal.on_batch(
            &mut p,
            &mut host,
            &[
                IntersectionEntry::leaving(first),
                IntersectionEntry::entering(first, 1.0),
            ],
        );
        assert!(newly.is_empty());
        assert_eq!(p.attribute(first, "class"), class_before);
        assert_eq!(reveal.revealed_count(), 1);
    }

    #[test]
    fn test_leaving_entries_do_not_reveal() {
        let mut p = page(2);
        let mut host = GeometryObserverHost::new();
        let mut reveal = bind(&mut p, &mut host);
        let second = reveal.items()[1];

        assert!(reveal
            .on_batch(&mut p, &mut host, &[IntersectionEntry::leaving(second)])
            .is_empty());
        assert_eq!(reveal.revealed_count(), 0);
        assert!(!p.has_class(second, "in-view"));
    }

    #[test]
    fn test_no_items_creates_no_observer() {
        let mut p = HeadlessPage::builder(ElementSpec::new("main")).build().unwrap();
        let mut host = GeometryObserverHost::new();
        assert!(Reveal::bind(&mut p, &mut host, &SelectorConfig::default(), &RevealConfig::default()).is_none());
        assert!(host.options(crate::observer::ObserverId(0)).is_none());
    }
}
