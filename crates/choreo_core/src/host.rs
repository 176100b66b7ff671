//! Host capability trait
//!
//! The engine never touches a real document: everything it needs from the
//! environment - element resolution, geometry queries, the scroll position,
//! and a frame clock - is expressed as the [`ScrollHost`] trait. Platform
//! adapters implement it over a browser DOM, a native scene tree, or an
//! in-memory fixture.

use std::sync::Arc;

use crate::error::Result;
use crate::geometry::{Offset, Size};
use crate::target::Target;

/// Opaque reference to a host-owned element.
///
/// Handles are borrowed tokens into the host document; the engine stores
/// and compares them but never owns or frees the underlying element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to a pending frame request, used to cancel it.
///
/// Tokens are minted by [`ScrollHost::request_frame`] and are only
/// meaningful to the host that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

impl FrameToken {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Callback invoked by the host when a requested frame fires.
pub type FrameCallback = Arc<dyn Fn() + Send + Sync>;

/// Handler invoked by the host on scroll/resize activity.
pub type EventHandler = Arc<dyn Fn() + Send + Sync>;

/// Capabilities the engine requires from its environment.
///
/// The trait is object-safe; the engine holds it as `Arc<dyn ScrollHost>`.
/// All methods take `&self`: hosts that need mutation use interior
/// mutability, matching the engine's cooperative single-threaded model.
pub trait ScrollHost: Send + Sync {
    /// Resolve a target into an ordered list of element handles.
    ///
    /// Fails when the result would be empty.
    fn resolve(&self, target: &Target) -> Result<Vec<ElementHandle>>;

    /// Cumulative offset of the element from the document origin,
    /// compensating for scrolled ancestor containers.
    ///
    /// Returns `None` for a detached or invisible element (no box).
    fn offset_of(&self, element: ElementHandle) -> Option<Offset>;

    /// Rendered size of the element, `None` when it has no box.
    fn size_of(&self, element: ElementHandle) -> Option<Size>;

    /// Current viewport height.
    fn viewport_height(&self) -> f32;

    /// Current raw scroll position along the document axis.
    fn scroll_position(&self) -> f32;

    /// Arm a single next-frame callback and return a token for it.
    ///
    /// The callback must be invoked asynchronously on the next frame tick,
    /// never synchronously from inside this call.
    fn request_frame(&self, callback: FrameCallback) -> FrameToken;

    /// Cancel a pending frame request. Unknown or already-fired tokens are
    /// ignored.
    fn cancel_frame(&self, token: FrameToken);

    /// Subscribe to scroll activity. Hosts should request passive
    /// (non-blocking) delivery where the platform supports it.
    fn add_scroll_listener(&self, handler: EventHandler);

    /// Subscribe to viewport resize activity.
    fn add_resize_listener(&self, handler: EventHandler);
}
