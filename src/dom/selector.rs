//! Selector parsing and matching.
//!
//! Implements selector parsing and matching using the selectors crate. Any
//! tree that implements [`SelectorTree`] can be queried; [`TreeElement`] is
//! the bridge that exposes one of its elements to the matcher.
//!
//! Besides the structural selectors the crate provides (type, id, class,
//! attribute operators, combinators, `:first-child` and friends) the
//! `:disabled` and `:enabled` pseudo-classes are understood.

use std::borrow::{Borrow, Cow};
use std::fmt;

use cssparser::{ParseError, Parser as CssParser, ParserInput, ToCss};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::context::QuirksMode;
use selectors::matching::{
    matches_selector, ElementSelectorFlags, MatchingContext, MatchingForInvalidation,
    MatchingMode, NeedsSelectorFlags, SelectorCaches,
};
use selectors::parser::{ParseRelative, SelectorImpl, SelectorList, SelectorParseErrorKind};
use selectors::{Element, OpaqueElement};

use crate::error::SelectorError;
use crate::types::ElementId;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
const FORM_CONTROL_TAGS: [&str; 5] = ["button", "input", "select", "textarea", "fieldset"];

// =============================================================================
// TREE ACCESS
// =============================================================================

/// Read access a selector needs to match against an element tree.
pub trait SelectorTree {
    /// Lowercase tag name.
    fn local_name(&self, el: ElementId) -> &str;
    fn attr(&self, el: ElementId, name: &str) -> Option<Cow<'_, str>>;
    fn contains_class(&self, el: ElementId, class: &str) -> bool;
    fn parent(&self, el: ElementId) -> Option<ElementId>;
    /// Element children of `el`, in document order.
    fn children(&self, el: ElementId) -> Vec<ElementId>;
    /// Whether `el` carries text of its own.
    fn has_text(&self, el: ElementId) -> bool;
    /// Stable identity of `el` for the matcher's caches.
    fn opaque(&self, el: ElementId) -> OpaqueElement;
}

// =============================================================================
// SELECTOR IMPL
// =============================================================================

/// String atom used for every name and value in a parsed selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssString(pub String);

impl From<&str> for CssString {
    fn from(s: &str) -> Self {
        CssString(s.to_string())
    }
}

impl From<String> for CssString {
    fn from(s: String) -> Self {
        CssString(s)
    }
}

impl std::ops::Deref for CssString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CssString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssString {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

impl precomputed_hash::PrecomputedHash for CssString {
    fn precomputed_hash(&self) -> u32 {
        // FNV-1a; only needs to be stable within a process
        self.0
            .bytes()
            .fold(0x811c_9dc5_u32, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSelectorImpl;

impl SelectorImpl for PageSelectorImpl {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssString;
    type LocalName = CssString;
    type NamespacePrefix = CssString;
    type NamespaceUrl = CssString;
    type BorrowedLocalName = str;
    type BorrowedNamespaceUrl = str;

    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = PseudoElement;
}

/// Pseudo-classes that depend on element state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    Disabled,
    Enabled,
}

impl selectors::parser::NonTSPseudoClass for PseudoClass {
    type Impl = PageSelectorImpl;

    fn is_active_or_hover(&self) -> bool {
        false
    }

    fn is_user_action_state(&self) -> bool {
        false
    }
}

impl ToCss for PseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        match self {
            PseudoClass::Disabled => dest.write_str(":disabled"),
            PseudoClass::Enabled => dest.write_str(":enabled"),
        }
    }
}

/// Pseudo-elements never match a page element, so none are parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoElement {}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = PageSelectorImpl;
}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

struct PageSelectorParser;

impl<'i> selectors::parser::Parser<'i> for PageSelectorParser {
    type Impl = PageSelectorImpl;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_non_ts_pseudo_class(
        &self,
        location: cssparser::SourceLocation,
        name: cssparser::CowRcStr<'i>,
    ) -> Result<PseudoClass, ParseError<'i, Self::Error>> {
        match &*name {
            "disabled" => Ok(PseudoClass::Disabled),
            "enabled" => Ok(PseudoClass::Enabled),
            _ => Err(location.new_custom_error(
                SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name),
            )),
        }
    }
}

// =============================================================================
// SELECTOR
// =============================================================================

/// A parsed selector list.
#[derive(Clone)]
pub struct Selector {
    source: String,
    list: SelectorList<PageSelectorImpl>,
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(src: &str) -> Result<Self, SelectorError> {
        let mut input = ParserInput::new(src);
        let mut parser = CssParser::new(&mut input);
        let list = SelectorList::parse(&PageSelectorParser, &mut parser, ParseRelative::No)
            .map_err(|err| SelectorError::Invalid {
                selector: src.to_string(),
                reason: format!("{:?}", err.kind),
            })?;
        Ok(Self {
            source: src.to_string(),
            list,
        })
    }

    /// Does `el` match this selector within `tree`?
    pub fn matches<T: SelectorTree>(&self, tree: &T, el: ElementId) -> bool {
        let element = TreeElement::new(tree, el);
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut caches,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );
        self.list
            .slice()
            .iter()
            .any(|selector| matches_selector(selector, 0, None, &element, &mut context))
    }
}

// =============================================================================
// ELEMENT BRIDGE
// =============================================================================

/// One element of a [`SelectorTree`], as the matcher sees it.
pub struct TreeElement<'a, T> {
    tree: &'a T,
    id: ElementId,
}

impl<'a, T> TreeElement<'a, T> {
    fn new(tree: &'a T, id: ElementId) -> Self {
        Self { tree, id }
    }
}

impl<T> Clone for TreeElement<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TreeElement<'_, T> {}

impl<T> fmt::Debug for TreeElement<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TreeElement").field(&self.id).finish()
    }
}

impl<'a, T: SelectorTree> TreeElement<'a, T> {
    fn with_id(&self, id: ElementId) -> Self {
        Self::new(self.tree, id)
    }

    fn siblings(&self) -> Vec<ElementId> {
        self.tree
            .parent(self.id)
            .map(|parent| self.tree.children(parent))
            .unwrap_or_default()
    }

    fn sibling_at(&self, offset: isize) -> Option<Self> {
        let siblings = self.siblings();
        let index = siblings.iter().position(|&s| s == self.id)?;
        let target = index.checked_add_signed(offset)?;
        siblings.get(target).map(|&id| self.with_id(id))
    }

    fn is_disabled(&self) -> bool {
        self.tree.attr(self.id, "disabled").is_some()
    }

    fn is_form_control(&self) -> bool {
        FORM_CONTROL_TAGS.contains(&self.tree.local_name(self.id))
    }
}

impl<'a, T: SelectorTree> Element for TreeElement<'a, T> {
    type Impl = PageSelectorImpl;

    fn opaque(&self) -> OpaqueElement {
        self.tree.opaque(self.id)
    }

    fn parent_element(&self) -> Option<Self> {
        self.tree.parent(self.id).map(|id| self.with_id(id))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_at(-1)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_at(1)
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &str) -> bool {
        self.tree.local_name(self.id) == local_name
    }

    fn has_namespace(&self, ns: &str) -> bool {
        ns.is_empty() || ns == HTML_NAMESPACE
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.tree.local_name(self.id) == other.tree.local_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssString>,
        local_name: &CssString,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        if let NamespaceConstraint::Specific(url) = ns {
            if !self.has_namespace(url) {
                return false;
            }
        }
        let Some(value) = self.tree.attr(self.id, local_name) else {
            return false;
        };

        match operation {
            AttrSelectorOperation::Exists => true,
            AttrSelectorOperation::WithValue {
                operator,
                case_sensitivity,
                value: expected,
            } => operator.eval_str(&value, expected, *case_sensitivity),
        }
    }

    fn match_non_ts_pseudo_class(
        &self,
        pseudo: &PseudoClass,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        match pseudo {
            PseudoClass::Disabled => self.is_form_control() && self.is_disabled(),
            PseudoClass::Enabled => self.is_form_control() && !self.is_disabled(),
        }
    }

    fn match_pseudo_element(
        &self,
        pseudo: &PseudoElement,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        match *pseudo {}
    }

    fn is_link(&self) -> bool {
        matches!(self.tree.local_name(self.id), "a" | "area" | "link")
            && self.tree.attr(self.id, "href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn assigned_slot(&self) -> Option<Self> {
        None
    }

    fn has_id(&self, id: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        let Some(actual) = self.tree.attr(self.id, "id") else {
            return false;
        };
        match case_sensitivity {
            CaseSensitivity::CaseSensitive => *actual == **id,
            CaseSensitivity::AsciiCaseInsensitive => actual.eq_ignore_ascii_case(id),
        }
    }

    fn has_class(&self, class: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        match case_sensitivity {
            CaseSensitivity::CaseSensitive => self.tree.contains_class(self.id, class),
            CaseSensitivity::AsciiCaseInsensitive => self
                .tree
                .attr(self.id, "class")
                .is_some_and(|classes| {
                    classes
                        .split_ascii_whitespace()
                        .any(|c| c.eq_ignore_ascii_case(class))
                }),
        }
    }

    fn imported_part(&self, _name: &CssString) -> Option<CssString> {
        None
    }

    fn is_part(&self, _name: &CssString) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        !self.tree.has_text(self.id) && self.tree.children(self.id).is_empty()
    }

    fn is_root(&self) -> bool {
        self.tree.parent(self.id).is_none()
    }

    fn first_element_child(&self) -> Option<Self> {
        self.tree
            .children(self.id)
            .first()
            .map(|&id| self.with_id(id))
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn has_custom_state(&self, _name: &CssString) -> bool {
        false
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}
