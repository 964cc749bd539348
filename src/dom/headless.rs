//! Headless page - an in-memory document with real geometry.
//!
//! Pages are described with [`ElementSpec`] trees, flattened into document
//! order, and laid out with Taffy (see [`crate::layout`]). Scrolling is
//! instantaneous; every `scroll_to` call is also recorded so callers can
//! inspect what was requested.
//!
//! # Example
//!
//! ```ignore
//! use folio_interact::dom::{ElementSpec, HeadlessPage};
//!
//! let page = HeadlessPage::builder(
//!     ElementSpec::new("body")
//!         .child(ElementSpec::new("header").class("site-header").height(64.0))
//!         .child(ElementSpec::new("main").child(ElementSpec::new("section").id("about").height(900.0))),
//! )
//! .viewport(1280.0, 720.0)
//! .location("https://folio.example/")
//! .build()?;
//! ```

use std::borrow::Cow;

use log::debug;
use selectors::OpaqueElement;
use url::Url;

use super::selector::{Selector, SelectorTree};
use super::Page;
use crate::layout::{compute_block_layout, ComputedLayout, LayoutInput};
use crate::relay::FormData;
use crate::types::{DomRect, ElementId, ScrollRequest};

const FORM_FIELD_TAGS: [&str; 3] = ["input", "textarea", "select"];

// =============================================================================
// ELEMENT SPEC (builder)
// =============================================================================

/// Declarative description of an element and its subtree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementSpec {
    tag: String,
    attrs: Vec<(String, String)>,
    classes: Vec<String>,
    text: String,
    height: Option<f32>,
    value: Option<String>,
    hidden: bool,
    children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(mut self, class: &str) -> Self {
        for c in class.split_whitespace() {
            if !self.classes.iter().any(|existing| existing == c) {
                self.classes.push(c.to_string());
            }
        }
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attrs.push((name, value.to_string())),
        }
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Fixed height in CSS pixels.
    pub fn height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    /// Initial value of a form field (also what `reset` restores).
    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ElementSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

// =============================================================================
// FLATTENED STORAGE
// =============================================================================

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    classes: Vec<String>,
    style: Vec<(String, String)>,
    text: String,
    parent: Option<usize>,
    height: Option<f32>,
    value: Option<String>,
    default_value: Option<String>,
    hidden: bool,
}

fn flatten(spec: ElementSpec, parent: Option<usize>, out: &mut Vec<Element>) {
    let index = out.len();
    out.push(Element {
        tag: spec.tag,
        attrs: spec.attrs,
        classes: spec.classes,
        style: Vec::new(),
        text: spec.text,
        parent,
        height: spec.height,
        default_value: spec.value.clone(),
        value: spec.value,
        hidden: spec.hidden,
    });
    for child in spec.children {
        flatten(child, Some(index), out);
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builder for [`HeadlessPage`].
pub struct HeadlessPageBuilder {
    root: ElementSpec,
    width: f32,
    height: f32,
    location: String,
}

impl HeadlessPageBuilder {
    /// Viewport size in CSS pixels (default 1280x720).
    pub fn viewport(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Page URL (default `http://localhost/`).
    pub fn location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }

    pub fn build(self) -> Result<HeadlessPage, url::ParseError> {
        let location = Url::parse(&self.location)?;
        let mut elements = Vec::new();
        flatten(self.root, None, &mut elements);

        let mut page = HeadlessPage {
            elements,
            layout: ComputedLayout::new(),
            scroll_y: 0.0,
            inner_width: self.width.max(0.0),
            inner_height: self.height.max(0.0),
            location,
            scroll_requests: Vec::new(),
        };
        page.relayout();
        Ok(page)
    }
}

// =============================================================================
// HEADLESS PAGE
// =============================================================================

/// In-memory [`Page`] implementation.
#[derive(Debug, Clone)]
pub struct HeadlessPage {
    elements: Vec<Element>,
    layout: ComputedLayout,
    scroll_y: f32,
    inner_width: f32,
    inner_height: f32,
    location: Url,
    scroll_requests: Vec<ScrollRequest>,
}

impl HeadlessPage {
    pub fn builder(root: ElementSpec) -> HeadlessPageBuilder {
        HeadlessPageBuilder {
            root,
            width: 1280.0,
            height: 720.0,
            location: "http://localhost/".to_string(),
        }
    }

    /// Number of elements in the document.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Largest valid scroll offset.
    pub fn max_scroll(&self) -> f32 {
        (self.scroll_height() - self.inner_height).max(0.0)
    }

    /// Move the window, clamped to the scrollable range.
    pub fn set_scroll_y(&mut self, y: f32) {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
    }

    pub fn scroll_by(&mut self, dy: f32) {
        self.set_scroll_y(self.scroll_y + dy);
    }

    /// Change the viewport size and lay the document out again.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.inner_width = width.max(0.0);
        self.inner_height = height.max(0.0);
        self.relayout();
        self.set_scroll_y(self.scroll_y);
    }

    /// Type into a form field.
    pub fn set_value(&mut self, el: ElementId, value: &str) {
        if let Some(element) = self.elements.get_mut(el.index()) {
            element.value = Some(value.to_string());
        }
    }

    pub fn value(&self, el: ElementId) -> Option<&str> {
        self.elements.get(el.index())?.value.as_deref()
    }

    /// Every `scroll_to` call made so far, oldest first.
    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.scroll_requests
    }

    fn relayout(&mut self) {
        let inputs: Vec<LayoutInput> = self
            .elements
            .iter()
            .map(|e| LayoutInput {
                parent: e.parent,
                height: e.height,
                hidden: e.hidden,
            })
            .collect();
        self.layout = compute_block_layout(&inputs, self.inner_width);
    }

    fn get(&self, el: ElementId) -> Option<&Element> {
        self.elements.get(el.index())
    }

    fn get_mut(&mut self, el: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(el.index())
    }

    fn is_descendant(&self, el: usize, ancestor: usize) -> bool {
        let mut current = self.elements.get(el).and_then(|e| e.parent);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.elements[p].parent;
        }
        false
    }

    fn parse(selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(s) => Some(s),
            Err(err) => {
                debug!("event=selector_rejected selector={selector:?} error={err}");
                None
            }
        }
    }

    fn ids(&self) -> impl Iterator<Item = ElementId> {
        (0..self.elements.len()).map(ElementId)
    }
}

impl SelectorTree for HeadlessPage {
    fn local_name(&self, el: ElementId) -> &str {
        self.get(el).map(|e| e.tag.as_str()).unwrap_or("")
    }

    /// Classes live apart from the other attributes and are joined on demand.
    fn attr(&self, el: ElementId, name: &str) -> Option<Cow<'_, str>> {
        let element = self.get(el)?;
        if name == "class" {
            return Some(Cow::Owned(element.classes.join(" ")));
        }
        element
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| Cow::Borrowed(v.as_str()))
    }

    fn contains_class(&self, el: ElementId, class: &str) -> bool {
        self.get(el).is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.get(el)?.parent.map(ElementId)
    }

    fn children(&self, el: ElementId) -> Vec<ElementId> {
        (el.index() + 1..self.elements.len())
            .filter(|&index| self.elements[index].parent == Some(el.index()))
            .map(ElementId)
            .collect()
    }

    fn has_text(&self, el: ElementId) -> bool {
        self.get(el).is_some_and(|e| !e.text.is_empty())
    }

    fn opaque(&self, el: ElementId) -> OpaqueElement {
        match self.get(el) {
            Some(element) => OpaqueElement::new(element),
            None => OpaqueElement::new(self),
        }
    }
}

impl Page for HeadlessPage {
    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        let selector = Self::parse(selector)?;
        self.ids().find(|&el| selector.matches(self, el))
    }

    fn query_selector_all(&self, selector: &str) -> Vec<ElementId> {
        let Some(selector) = Self::parse(selector) else {
            return Vec::new();
        };
        self.ids().filter(|&el| selector.matches(self, el)).collect()
    }

    fn query_selector_within(&self, root: ElementId, selector: &str) -> Option<ElementId> {
        let selector = Self::parse(selector)?;
        self.ids()
            .skip(root.index() + 1)
            .filter(|el| self.is_descendant(el.index(), root.index()))
            .find(|&el| selector.matches(self, el))
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.ids()
            .find(|&el| SelectorTree::attr(self, el, "id").as_deref() == Some(id))
    }

    fn parent_element(&self, el: ElementId) -> Option<ElementId> {
        SelectorTree::parent(self, el)
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        SelectorTree::attr(self, el, name).map(Cow::into_owned)
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let Some(element) = self.get_mut(el) else {
            return;
        };
        if name == "class" {
            element.classes = value.split_whitespace().map(str::to_string).collect();
            element.classes.dedup();
            return;
        }
        match element.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => element.attrs.push((name, value.to_string())),
        }
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.contains_class(el, class)
    }

    fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(element) = self.get_mut(el) {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(element) = self.get_mut(el) {
            element.classes.retain(|c| c != class);
        }
    }

    fn style(&self, el: ElementId, property: &str) -> Option<String> {
        self.get(el)?
            .style
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.clone())
    }

    fn set_style(&mut self, el: ElementId, property: &str, value: &str) {
        let Some(element) = self.get_mut(el) else {
            return;
        };
        match element.style.iter_mut().find(|(k, _)| k == property) {
            Some(slot) => slot.1 = value.to_string(),
            None => element.style.push((property.to_string(), value.to_string())),
        }
    }

    /// Own text followed by descendant text, like `textContent`.
    fn text(&self, el: ElementId) -> String {
        let Some(element) = self.get(el) else {
            return String::new();
        };
        let mut out = element.text.clone();
        for index in el.index() + 1..self.elements.len() {
            if self.is_descendant(index, el.index()) {
                out.push_str(&self.elements[index].text);
            }
        }
        out
    }

    /// Replaces the element's own text; children are kept so handles stay valid.
    fn set_text(&mut self, el: ElementId, text: &str) {
        let Some(element) = self.get_mut(el) else {
            return;
        };
        element.text = text.to_string();
        // textContent replaces the subtree; descendants stay as empty nodes
        for index in el.index() + 1..self.elements.len() {
            if self.is_descendant(index, el.index()) {
                self.elements[index].text.clear();
            }
        }
    }

    fn is_disabled(&self, el: ElementId) -> bool {
        SelectorTree::attr(self, el, "disabled").is_some()
    }

    fn set_disabled(&mut self, el: ElementId, disabled: bool) {
        let Some(element) = self.get_mut(el) else {
            return;
        };
        element.attrs.retain(|(k, _)| k != "disabled");
        if disabled {
            element.attrs.push(("disabled".to_string(), String::new()));
        }
    }

    fn offset_height(&self, el: ElementId) -> f32 {
        self.layout.rect(el.index()).height
    }

    fn bounding_client_rect(&self, el: ElementId) -> DomRect {
        self.layout.rect(el.index()).translate_y(-self.scroll_y)
    }

    fn form_data(&self, form: ElementId) -> FormData {
        let mut data = FormData::new();
        for index in form.index() + 1..self.elements.len() {
            if !self.is_descendant(index, form.index()) {
                continue;
            }
            let element = &self.elements[index];
            if !FORM_FIELD_TAGS.contains(&element.tag.as_str()) {
                continue;
            }
            let el = ElementId(index);
            if self.is_disabled(el) {
                continue;
            }
            let Some(name) = SelectorTree::attr(self, el, "name") else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            data.append(name.into_owned(), element.value.clone().unwrap_or_default());
        }
        data
    }

    fn reset_form(&mut self, form: ElementId) {
        for index in form.index() + 1..self.elements.len() {
            if self.is_descendant(index, form.index()) {
                let element = &mut self.elements[index];
                element.value = element.default_value.clone();
            }
        }
    }

    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    fn inner_width(&self) -> f32 {
        self.inner_width
    }

    fn inner_height(&self) -> f32 {
        self.inner_height
    }

    fn scroll_height(&self) -> f32 {
        self.layout.content_height.max(self.inner_height)
    }

    fn scroll_to(&mut self, request: ScrollRequest) {
        self.scroll_requests.push(request);
        self.set_scroll_y(request.top);
    }

    fn location(&self) -> &Url {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScrollBehavior;

    fn page() -> HeadlessPage {
        HeadlessPage::builder(
            ElementSpec::new("body")
                .child(ElementSpec::new("header").class("site-header").height(64.0))
                .child(
                    ElementSpec::new("main")
                        .child(ElementSpec::new("section").id("about").height(800.0))
                        .child(ElementSpec::new("section").id("work").class("reveal").height(600.0)),
                )
                .child(
                    ElementSpec::new("form")
                        .id("contact-form")
                        .child(ElementSpec::new("input").attr("name", "name").value(""))
                        .child(ElementSpec::new("input").attr("name", "email").value("a@b.c"))
                        .child(ElementSpec::new("input").attr("name", "locked").attr("disabled", ""))
                        .child(ElementSpec::new("textarea").attr("name", "message"))
                        .child(
                            ElementSpec::new("button")
                                .attr("type", "submit")
                                .text("Send Message"),
                        ),
                ),
        )
        .viewport(1000.0, 500.0)
        .build()
        .unwrap()
    }

    #[test]
    fn test_queries() {
        let p = page();
        let about = p.element_by_id("about").unwrap();
        assert_eq!(p.query_selector("#about"), Some(about));
        assert_eq!(p.query_selector_all("main section[id]").len(), 2);
        assert_eq!(p.query_selector(".reveal"), p.element_by_id("work"));
        assert_eq!(p.query_selector("#missing"), None);
        assert_eq!(p.query_selector("a["), None);
        assert_eq!(p.query_selector("main > #work"), p.element_by_id("work"));
        assert_eq!(p.query_selector("body > section"), None);

        let form = p.element_by_id("contact-form").unwrap();
        let button = p.query_selector_within(form, r#"button[type="submit"]"#).unwrap();
        assert_eq!(p.text(button), "Send Message");
        assert_eq!(p.query_selector_within(about, "button"), None);
    }

    #[test]
    fn test_geometry_and_scroll() {
        let mut p = page();
        let work = p.element_by_id("work").unwrap();
        assert_eq!(p.bounding_client_rect(work).top(), 864.0);
        assert_eq!(p.scroll_height(), 1464.0);
        assert_eq!(p.max_scroll(), 964.0);

        p.set_scroll_y(400.0);
        assert_eq!(p.bounding_client_rect(work).top(), 464.0);

        p.scroll_to(ScrollRequest {
            top: 5000.0,
            behavior: ScrollBehavior::Smooth,
        });
        assert_eq!(p.scroll_y(), 964.0);
        assert_eq!(p.scroll_requests().len(), 1);

        p.set_scroll_y(-20.0);
        assert_eq!(p.scroll_y(), 0.0);
    }

    #[test]
    fn test_short_page_scroll_height_is_viewport() {
        let p = HeadlessPage::builder(ElementSpec::new("body").height(100.0))
            .viewport(800.0, 600.0)
            .build()
            .unwrap();
        assert_eq!(p.scroll_height(), 600.0);
        assert_eq!(p.max_scroll(), 0.0);
    }

    #[test]
    fn test_classes_and_attributes() {
        let mut p = page();
        let about = p.element_by_id("about").unwrap();

        assert!(p.toggle_class(about, "open", None));
        assert!(p.has_class(about, "open"));
        assert!(!p.toggle_class(about, "open", None));
        assert!(p.toggle_class(about, "active", Some(true)));
        assert!(p.toggle_class(about, "active", Some(true)));
        assert_eq!(p.attribute(about, "class").as_deref(), Some("active"));

        p.set_attribute(about, "aria-expanded", "true");
        assert_eq!(p.attribute(about, "aria-expanded").as_deref(), Some("true"));

        p.set_style(about, "width", "10%");
        p.set_style(about, "width", "20%");
        assert_eq!(p.style(about, "width").as_deref(), Some("20%"));
    }

    #[test]
    fn test_form_data_and_reset() {
        let mut p = page();
        let form = p.element_by_id("contact-form").unwrap();
        let name = p.query_selector_within(form, r#"input[name="name"]"#).unwrap();

        p.set_value(name, "Ada");
        let data = p.form_data(form);
        let pairs: Vec<_> = data.iter().collect();
        assert_eq!(
            pairs,
            vec![("name", "Ada"), ("email", "a@b.c"), ("message", "")]
        );

        p.reset_form(form);
        assert_eq!(p.value(name), Some(""));
    }

    #[test]
    fn test_resize_relayouts_and_clamps() {
        let mut p = page();
        p.set_scroll_y(964.0);
        p.resize(1000.0, 1000.0);
        assert_eq!(p.scroll_y(), 464.0);
    }
}
