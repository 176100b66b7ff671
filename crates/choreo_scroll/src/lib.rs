//! Choreo Scroll Engine
//!
//! Converts continuous viewport scroll into discrete per-element lifecycle
//! events: enter, continuous per-frame update, and exit.
//!
//! # Features
//!
//! - **Single frame chain**: one pending next-frame request, restarted on
//!   scroll activity, terminated when nothing needs another frame
//! - **Activation windows**: per-element, per-trigger scroll intervals
//!   with anchor points and extra offsets, viewport-normalized
//! - **Enter/exit state machine**: no double-fires, no skipped resets;
//!   fire-once triggers retire themselves
//! - **Optional smoothing**: exponential low-pass of the displayed scroll
//!   position with a one-unit snap
//! - **Self-pruning registry**: elements whose triggers all retired are
//!   removed the same frame, empty groups follow
//!
//! # Example
//!
//! ```ignore
//! use choreo_scroll::{Scroller, TriggerSpec, Anchor};
//!
//! let scroller = Scroller::new(host);
//! scroller
//!     .observe(".card")?
//!     .add(TriggerSpec::new().on_enter(|el, pos, _| reveal(el, pos)))
//!     .add(
//!         TriggerSpec::new()
//!             .anchor(Anchor::Middle)
//!             .on_frame(|el, pos, delta| parallax(el, pos, delta)),
//!     );
//! ```

pub mod scheduler;
pub mod scroll;
pub mod trigger;
pub mod watcher;
pub mod window;

pub use scheduler::{
    global_scroller, try_global_scroller, ObserveOptions, Scroller, ScrollerHandle, Watcher,
};
pub use scroll::{ScrollState, Smoothing};
pub use trigger::{Activation, TriggerCallback, TriggerSpec};
pub use watcher::{ElementCallback, GroupId, ObservedElement, WatcherGroup};
pub use window::{ActivationWindow, Anchor};
