//! Choreo Host Abstraction Layer
//!
//! This crate provides the platform-agnostic types and traits the scroll
//! choreography engine is built against:
//!
//! - [`ScrollHost`] - capability trait for element resolution, geometry
//!   queries, scroll position, and the frame clock
//! - [`ElementHandle`] - opaque borrowed reference to a host-owned element
//! - [`Target`] - selector/handle union accepted by `observe`
//! - [`ResolveError`] - the single hard failure of the registration path
//!
//! # Host Implementations
//!
//! - `choreo_harness` - deterministic in-memory host for tests and
//!   headless runs
//! - platform adapters map these capabilities onto a real document (DOM,
//!   native scene tree) and its frame clock
//!
//! # Example
//!
//! ```ignore
//! use choreo_core::prelude::*;
//!
//! fn watch(host: &dyn ScrollHost) -> Result<Vec<ElementHandle>> {
//!     host.resolve(&Target::from(".card"))
//! }
//! ```

mod error;
mod geometry;
mod host;
mod target;

// Re-export all public types
pub use error::{ResolveError, Result};
pub use geometry::{ElementBox, Offset, Size};
pub use host::{ElementHandle, EventHandler, FrameCallback, FrameToken, ScrollHost};
pub use target::Target;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{ResolveError, Result};
    pub use crate::geometry::{ElementBox, Offset, Size};
    pub use crate::host::{ElementHandle, EventHandler, FrameCallback, FrameToken, ScrollHost};
    pub use crate::target::Target;
}
