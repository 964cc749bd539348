//! # folio-interact
//!
//! Interactivity controller for static portfolio pages.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity.
//!
//! ## Architecture
//!
//! The controller never owns a document. It drives two capabilities:
//!
//! - [`Page`] - DOM lookups, class/attribute/style mutation, window geometry
//! - [`IntersectionHost`] - "observe this element, report threshold crossings"
//!
//! plus a [`RelayTransport`] for the contact form. A browser binding, the
//! in-memory [`HeadlessPage`] and test fakes all plug in the same way.
//!
//! ```text
//! mount → look elements up once → wire bindings → startup effects
//! dispatch(PageEvent) → nav / anchor / progress / contact
//! take_records → deliver(batch) → highlight / reveal
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (ElementId, DomRect, Rgba, Features)
//! - [`dom`] - Page capability, selectors, headless page
//! - [`layout`] - Taffy block layout for headless pages
//! - [`observer`] - Intersection capability and the geometry host
//! - [`relay`] - Form relay protocol and the HTTP transport
//! - [`state`] - The seven page bindings and their signals
//! - [`pipeline`] - `PageController`, events and mounting
//! - [`config`] - Serde configuration
//! - [`logging`] - File logger setup
//! - [`preview`] - Terminal preview support

pub mod config;
pub mod dom;
pub mod error;
pub mod layout;
pub mod logging;
pub mod observer;
pub mod pipeline;
pub mod preview;
pub mod relay;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::ControllerConfig;
pub use error::{ConfigError, Error, RelayError, Result, SelectorError};

pub use dom::{ElementSpec, HeadlessPage, Page, Selector};

pub use observer::{
    GeometryObserverHost, IntersectionBatch, IntersectionEntry, IntersectionHost, ObserverId,
    ObserverOptions, RootMargin,
};

pub use relay::{FormData, HttpRelay, RelayOutcome, RelayReply, RelayResponse, RelayTransport};

pub use state::{
    progress_percent, stagger_delay_ms, Clock, FixedClock, FormStatus, PageState, StatusTone,
    SubmitPhase, SystemClock,
};

pub use pipeline::{ControllerBuilder, Dispatch, PageController, PageEvent};
