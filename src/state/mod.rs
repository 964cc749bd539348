//! State Module - The page bindings and their reactive state
//!
//! Each binding owns the element handles it looked up at mount and reacts to
//! one kind of event:
//!
//! - **nav** - mobile nav open/close toggle
//! - **anchor** - smooth in-page anchor scrolling under the sticky header
//! - **highlight** - nav link highlighting for the section in view
//! - **reveal** - one-shot reveal animation on viewport entry
//! - **progress** - scroll progress bar width
//! - **year** - footer year injection
//! - **contact** - contact form relay submission
//!
//! The page's classes and attributes stay the source of truth. [`PageState`]
//! mirrors them into signals so renderers can react without polling the page.

pub mod anchor;
pub mod contact;
pub mod highlight;
pub mod nav;
pub mod progress;
pub mod reveal;
pub mod year;

use spark_signals::{signal, Signal};

use crate::types::Rgba;

pub use anchor::AnchorScroll;
pub use contact::{ContactForm, SubmissionTicket, SubmitPhase};
pub use highlight::SectionHighlight;
pub use nav::NavToggle;
pub use progress::{progress_percent, ScrollProgress};
pub use reveal::{stagger_delay_ms, Reveal};
pub use year::{Clock, FixedClock, FooterYear, SystemClock};

// =============================================================================
// FORM STATUS
// =============================================================================

/// Tone of the contact form status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Pending,
    Success,
    Error,
}

impl StatusTone {
    pub fn color(self) -> Rgba {
        match self {
            StatusTone::Pending => Rgba::STATUS_PENDING,
            StatusTone::Success => Rgba::STATUS_SUCCESS,
            StatusTone::Error => Rgba::STATUS_ERROR,
        }
    }
}

/// What the status element currently says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormStatus {
    pub text: String,
    pub tone: StatusTone,
}

impl FormStatus {
    pub fn new(text: impl Into<String>, tone: StatusTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

// =============================================================================
// PAGE STATE (signals)
// =============================================================================

/// Reactive snapshot of the controller's observable state.
#[derive(Clone)]
pub struct PageState {
    /// Mobile nav open.
    pub nav_open: Signal<bool>,
    /// Id of the section whose nav link is active.
    pub active_section: Signal<Option<String>>,
    /// Scroll progress in percent.
    pub progress: Signal<f32>,
    /// Number of reveal elements already shown.
    pub revealed: Signal<usize>,
    /// Last status message written by the contact form.
    pub status: Signal<Option<FormStatus>>,
    /// A submission is in flight.
    pub submitting: Signal<bool>,
}

impl PageState {
    pub fn new() -> Self {
        Self {
            nav_open: signal(false),
            active_section: signal(None),
            progress: signal(0.0),
            revealed: signal(0),
            status: signal(None),
            submitting: signal(false),
        }
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new()
    }
}
