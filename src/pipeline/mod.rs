//! Controller Pipeline
//!
//! Connects host events to the page bindings.
//!
//! ```text
//! host event → PageController::dispatch → binding(s) → Page mutations
//!                                              └─────→ PageState signals
//! observer host → take_records → PageController::deliver → highlight / reveal
//! ```
//!
//! - [`events`] - `PageEvent` and the `Dispatch` result
//! - [`mount`] - `PageController` and its builder

pub mod events;
pub mod mount;

pub use events::{Dispatch, PageEvent};
pub use mount::{ControllerBuilder, PageController};
