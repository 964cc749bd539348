//! Mount API - wiring the bindings onto a page.
//!
//! Mounting looks every element up once, wires the bindings whose elements
//! exist, applies the startup effects (progress width, footer year, reveal
//! delays) and delivers the first intersection reports. After that the host
//! forwards events through [`PageController::dispatch`].
//!
//! # Example
//!
//! ```ignore
//! use folio_interact::pipeline::{PageController, PageEvent};
//!
//! let mut controller = PageController::builder(page, GeometryObserverHost::new())
//!     .config(config)
//!     .mount();
//!
//! controller.page_mut().set_scroll_y(640.0);
//! controller.dispatch(PageEvent::Scroll);
//!
//! if controller.dispatch(PageEvent::Click(link)).is_prevented() {
//!     // the controller handled navigation itself
//! }
//! ```

use log::{debug, info};

use crate::config::ControllerConfig;
use crate::dom::Page;
use crate::error::RelayError;
use crate::observer::{IntersectionBatch, IntersectionHost};
use crate::relay::{HttpRelay, RelayResponse, RelayTransport};
use crate::state::{
    AnchorScroll, Clock, ContactForm, FooterYear, FormStatus, NavToggle, PageState, Reveal,
    ScrollProgress, SectionHighlight, SubmitPhase, SystemClock,
};
use crate::types::{ElementId, Features};

use super::events::{Dispatch, PageEvent};

// =============================================================================
// Builder
// =============================================================================

/// Collects the collaborators of a [`PageController`] before mounting.
pub struct ControllerBuilder<P: Page, O: IntersectionHost> {
    page: P,
    observers: O,
    config: ControllerConfig,
    transport: Option<Box<dyn RelayTransport>>,
    clock: Option<Box<dyn Clock>>,
    enabled: Features,
}

impl<P: Page, O: IntersectionHost> ControllerBuilder<P, O> {
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Relay client for the contact form. Defaults to [`HttpRelay`].
    pub fn transport(mut self, transport: impl RelayTransport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Clock for the footer year. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Restrict which bindings may be wired. All are enabled by default.
    pub fn features(mut self, enabled: Features) -> Self {
        self.enabled = enabled;
        self
    }

    /// Wire the bindings and run the startup effects.
    pub fn mount(self) -> PageController<P, O> {
        let ControllerBuilder {
            mut page,
            mut observers,
            config,
            transport,
            clock,
            enabled,
        } = self;
        let selectors = &config.selectors;
        let state = PageState::new();

        let nav = enabled
            .contains(Features::NAV_TOGGLE)
            .then(|| NavToggle::bind(&page, selectors, &config.nav))
            .flatten();

        let anchors = enabled
            .contains(Features::SMOOTH_SCROLL)
            .then(|| AnchorScroll::bind(&page, selectors, &config.scroll, &config.nav))
            .flatten();

        let highlight = enabled
            .contains(Features::SECTION_HIGHLIGHT)
            .then(|| SectionHighlight::bind(&page, &mut observers, selectors, &config.highlight))
            .flatten();

        let reveal = enabled
            .contains(Features::REVEAL)
            .then(|| Reveal::bind(&mut page, &mut observers, selectors, &config.reveal))
            .flatten();

        let progress = enabled
            .contains(Features::SCROLL_PROGRESS)
            .then(|| ScrollProgress::bind(&page, selectors))
            .flatten();
        if let Some(progress) = &progress {
            state.progress.set(progress.update(&mut page));
        }

        let year = enabled
            .contains(Features::FOOTER_YEAR)
            .then(|| FooterYear::bind(&page, selectors))
            .flatten();
        if let Some(year) = &year {
            let clock = clock.unwrap_or_else(|| Box::new(SystemClock));
            let written = year.apply(&mut page, clock.as_ref());
            debug!("event=footer_year year={}", written);
        }

        let contact = enabled
            .contains(Features::CONTACT_FORM)
            .then(|| ContactForm::bind(&page, selectors, &config.contact))
            .flatten();

        let mut features = Features::NONE;
        features.set(Features::NAV_TOGGLE, nav.is_some());
        features.set(Features::SMOOTH_SCROLL, anchors.is_some());
        features.set(Features::SECTION_HIGHLIGHT, highlight.is_some());
        features.set(Features::REVEAL, reveal.is_some());
        features.set(Features::SCROLL_PROGRESS, progress.is_some());
        features.set(Features::FOOTER_YEAR, year.is_some());
        features.set(Features::CONTACT_FORM, contact.is_some());

        if let Some(nav) = &nav {
            state.nav_open.set(nav.is_open(&page));
        }

        let mut controller = PageController {
            page,
            observers,
            config,
            transport: transport.unwrap_or_else(|| Box::new(HttpRelay::new())),
            features,
            state,
            nav,
            anchors,
            highlight,
            reveal,
            progress,
            contact,
        };

        info!("event=controller_mounted features={:?}", features);
        controller.flush_intersections();
        controller
    }
}

// =============================================================================
// Controller
// =============================================================================

/// The mounted page controller.
pub struct PageController<P: Page, O: IntersectionHost> {
    page: P,
    observers: O,
    config: ControllerConfig,
    transport: Box<dyn RelayTransport>,
    features: Features,
    state: PageState,
    nav: Option<NavToggle>,
    anchors: Option<AnchorScroll>,
    highlight: Option<SectionHighlight>,
    reveal: Option<Reveal>,
    progress: Option<ScrollProgress>,
    contact: Option<ContactForm>,
}

impl<P: Page, O: IntersectionHost> PageController<P, O> {
    pub fn builder(page: P, observers: O) -> ControllerBuilder<P, O> {
        ControllerBuilder {
            page,
            observers,
            config: ControllerConfig::default(),
            transport: None,
            clock: None,
            enabled: Features::all(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Mutable page access for the host (scrolling, resizing, typing).
    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn observers(&self) -> &O {
        &self.observers
    }

    pub fn observers_mut(&mut self) -> &mut O {
        &mut self.observers
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Bindings that were wired at mount.
    pub fn features(&self) -> Features {
        self.features
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn contact(&self) -> Option<&ContactForm> {
        self.contact.as_ref()
    }

    pub fn reveal(&self) -> Option<&Reveal> {
        self.reveal.as_ref()
    }

    pub fn highlight(&self) -> Option<&SectionHighlight> {
        self.highlight.as_ref()
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn dispatch(&mut self, event: PageEvent) -> Dispatch {
        match event {
            PageEvent::Click(target) => self.on_click(target),
            PageEvent::Scroll | PageEvent::Resize => {
                self.update_progress();
                self.flush_intersections();
                Dispatch::Default
            }
            PageEvent::Submit(form) => self.on_submit(form),
        }
    }

    fn on_click(&mut self, target: ElementId) -> Dispatch {
        let path = self.page.event_path(target);
        let mut result = Dispatch::Default;

        if let Some(nav) = self.nav.as_ref().filter(|nav| nav.handles(&path)) {
            let open = nav.toggle(&mut self.page);
            debug!("event=nav_toggled open={}", open);
        }

        if let Some(anchors) = &self.anchors {
            if let Some(anchor) = anchors.anchor_for(&path) {
                if let Some(request) = anchors.click(&mut self.page, anchor) {
                    debug!("event=anchor_scroll top={}", request.top);
                    result = result.merge(Dispatch::Prevented);
                }
            }
        }

        self.sync_nav();
        result
    }

    fn on_submit(&mut self, form: ElementId) -> Dispatch {
        let Some(contact) = self.contact.as_mut() else {
            return Dispatch::Default;
        };
        if contact.form() != form {
            return Dispatch::Default;
        }

        let status = contact.submit(&mut self.page, self.transport.as_ref());
        if let Some(status) = status {
            self.state.status.set(Some(status));
        }
        self.state.submitting.set(contact.is_in_flight());
        Dispatch::Prevented
    }

    /// Run the first submission phase only. `None` without a contact form.
    ///
    /// Hosts with their own transport pair this with
    /// [`complete_submit`](Self::complete_submit).
    pub fn begin_submit(&mut self) -> Option<SubmitPhase> {
        let contact = self.contact.as_mut()?;
        let phase = contact.begin(&mut self.page);
        if let Some(status) = contact.last_status() {
            self.state.status.set(Some(status.clone()));
        }
        self.state.submitting.set(contact.is_in_flight());
        Some(phase)
    }

    /// Finish the submission started by [`begin_submit`](Self::begin_submit).
    pub fn complete_submit(
        &mut self,
        result: Result<RelayResponse, RelayError>,
    ) -> Option<FormStatus> {
        let contact = self.contact.as_mut()?;
        let status = contact.complete(&mut self.page, result)?;
        self.state.status.set(Some(status.clone()));
        self.state.submitting.set(false);
        Some(status)
    }

    // -------------------------------------------------------------------------
    // Intersections
    // -------------------------------------------------------------------------

    /// Pull due reports from the observer host and deliver them.
    pub fn flush_intersections(&mut self) {
        let batches = self.observers.take_records(&self.page);
        for batch in batches {
            self.deliver(batch);
        }
    }

    /// Route one observer batch to the binding that owns the observer.
    /// Batches for unknown observers are ignored.
    pub fn deliver(&mut self, batch: IntersectionBatch) {
        if let Some(highlight) = &self.highlight {
            if highlight.observer() == batch.observer {
                if let Some(id) = highlight.on_batch(&mut self.page, &batch.entries) {
                    debug!("event=section_active id={}", id);
                    self.state.active_section.set(Some(id));
                }
                return;
            }
        }

        if let Some(reveal) = self.reveal.as_mut() {
            if reveal.observer() == batch.observer {
                let newly = reveal.on_batch(&mut self.page, &mut self.observers, &batch.entries);
                if !newly.is_empty() {
                    debug!("event=revealed count={}", newly.len());
                    self.state.revealed.set(reveal.revealed_count());
                }
            }
        }
    }

    fn update_progress(&mut self) {
        if let Some(progress) = &self.progress {
            self.state.progress.set(progress.update(&mut self.page));
        }
    }

    fn sync_nav(&self) {
        if let Some(nav) = &self.nav {
            let open = nav.is_open(&self.page);
            if self.state.nav_open.get() != open {
                self.state.nav_open.set(open);
            }
        }
    }
}
