//! Nav link highlighting for the section in view.
//!
//! Sections are observed with a narrowed root so the section sitting in the
//! upper-middle of the viewport wins. When one batch carries several
//! intersecting sections, they are applied in batch order and the last one
//! decides the active link.

use log::debug;

use crate::config::{HighlightConfig, SelectorConfig};
use crate::dom::Page;
use crate::observer::{IntersectionEntry, IntersectionHost, ObserverId};
use crate::types::ElementId;

#[derive(Debug, Clone)]
pub struct SectionHighlight {
    observer: ObserverId,
    sections: Vec<ElementId>,
    links: Vec<ElementId>,
    active_class: String,
}

impl SectionHighlight {
    /// Observe every section. `None` when the page has no sections.
    pub fn bind(
        page: &dyn Page,
        observers: &mut dyn IntersectionHost,
        selectors: &SelectorConfig,
        config: &HighlightConfig,
    ) -> Option<Self> {
        let sections = page.query_selector_all(&selectors.sections);
        if sections.is_empty() {
            debug!("event=binding_skipped binding=highlight reason=no_sections");
            return None;
        }

        let observer = observers.create_observer(config.observer.clone());
        for &section in &sections {
            observers.observe(observer, section);
        }

        Some(Self {
            observer,
            sections,
            links: page.query_selector_all(&selectors.nav_links),
            active_class: config.active_class.clone(),
        })
    }

    pub fn observer(&self) -> ObserverId {
        self.observer
    }

    pub fn sections(&self) -> &[ElementId] {
        &self.sections
    }

    /// Apply one observer batch. Returns the id of the section that ended up
    /// active, if any entry was intersecting.
    pub fn on_batch(&self, page: &mut dyn Page, entries: &[IntersectionEntry]) -> Option<String> {
        let mut current = None;

        for entry in entries.iter().filter(|e| e.is_intersecting) {
            let id = page.attribute(entry.target, "id").unwrap_or_default();
            let fragment = format!("#{id}");

            for &link in &self.links {
                let active = page.attribute(link, "href").as_deref() == Some(fragment.as_str());
                page.toggle_class(link, &self.active_class, Some(active));
            }
            current = Some(id);
        }

        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, HeadlessPage};
    use crate::observer::GeometryObserverHost;

    fn page() -> HeadlessPage {
        let links = ["about", "work", "contact"].map(|id| {
            ElementSpec::new("a")
                .class("nav-link")
                .attr("href", &format!("#{id}"))
        });
        let sections = ["about", "work", "contact"]
            .map(|id| ElementSpec::new("section").id(id).height(800.0));

        HeadlessPage::builder(
            ElementSpec::new("body")
                .child(ElementSpec::new("nav").children(links))
                .child(ElementSpec::new("main").children(sections))
                .child(ElementSpec::new("section").id("stray").height(100.0)),
        )
        .viewport(1000.0, 800.0)
        .build()
        .unwrap()
    }

    fn active_links(page: &HeadlessPage) -> Vec<String> {
        page.query_selector_all(".nav-link.active")
            .into_iter()
            .filter_map(|l| page.attribute(l, "href"))
            .collect()
    }

    #[test]
    fn test_bind_observes_main_sections_only() {
        let p = page();
        let mut host = GeometryObserverHost::new();
        let highlight = SectionHighlight::bind(
            &p,
            &mut host,
            &SelectorConfig::default(),
            &HighlightConfig::default(),
        )
        .unwrap();

        assert_eq!(host.observed(highlight.observer()).len(), 3);
        assert_eq!(highlight.sections().len(), 3);
        assert_eq!(
            host.options(highlight.observer()).unwrap().thresholds,
            vec![0.5]
        );
    }

    #[test]
    fn test_single_active_link() {
        let mut p = page();
        let mut host = GeometryObserverHost::new();
        let highlight = SectionHighlight::bind(
            &p,
            &mut host,
            &SelectorConfig::default(),
            &HighlightConfig::default(),
        )
        .unwrap();
        let work = p.element_by_id("work").unwrap();
        let about = p.element_by_id("about").unwrap();

        let current = highlight.on_batch(&mut p, &[IntersectionEntry::entering(work, 0.6)]);
        assert_eq!(current.as_deref(), Some("work"));
        assert_eq!(active_links(&p), vec!["#work"]);

        // Leaving entries change nothing
        let current = highlight.on_batch(&mut p, &[IntersectionEntry::leaving(work)]);
        assert_eq!(current, None);
        assert_eq!(active_links(&p), vec!["#work"]);

        highlight.on_batch(&mut p, &[IntersectionEntry::entering(about, 0.5)]);
        assert_eq!(active_links(&p), vec!["#about"]);
    }

    #[test]
    fn test_last_intersecting_entry_wins() {
        let mut p = page();
        let mut host = GeometryObserverHost::new();
        let highlight = SectionHighlight::bind(
            &p,
            &mut host,
            &SelectorConfig::default(),
            &HighlightConfig::default(),
        )
        .unwrap();
        let about = p.element_by_id("about").unwrap();
        let work = p.element_by_id("work").unwrap();
        let contact = p.element_by_id("contact").unwrap();

        let current = highlight.on_batch(
            &mut p,
            &[
                IntersectionEntry::entering(contact, 0.7),
                IntersectionEntry::entering(about, 0.5),
                IntersectionEntry::leaving(work),
            ],
        );
        assert_eq!(current.as_deref(), Some("about"));
        assert_eq!(active_links(&p), vec!["#about"]);
    }

    #[test]
    fn test_no_sections_no_binding() {
        let p = HeadlessPage::builder(ElementSpec::new("main")).build().unwrap();
        let mut host = GeometryObserverHost::new();
        assert!(SectionHighlight::bind(
            &p,
            &mut host,
            &SelectorConfig::default(),
            &HighlightConfig::default()
        )
        .is_none());
    }
}
