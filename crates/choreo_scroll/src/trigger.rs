//! Trigger configuration and the enter/exit state machine
//!
//! A [`TriggerSpec`] describes when and how a watcher group reacts to the
//! scroll position: an anchor point, an optional extra offset, and up to
//! three callbacks (enter, exit, continuous per-frame). Each observed
//! element carries one [`Activation`] per trigger, a two-state machine
//! (idle/entered) driven once per frame against the element's activation
//! window.

use std::fmt;
use std::sync::Arc;

use crate::watcher::ObservedElement;
use crate::window::{ActivationWindow, Anchor};

/// Callback invoked with `(element, scroll_position, scroll_delta)`.
///
/// The element is a frame-local snapshot taken at evaluation time, so the
/// callback observes a consistent view even if the registry changes before
/// it runs.
pub type TriggerCallback = Arc<dyn Fn(&ObservedElement, f32, f32) + Send + Sync>;

/// Configuration for one trigger attached to a watcher group.
///
/// Built with a consuming builder:
///
/// ```ignore
/// let spec = TriggerSpec::new()
///     .anchor(Anchor::Middle)
///     .offset(120.0)
///     .on_enter(|el, pos, _| println!("{:?} entered at {pos}", el.handle));
/// ```
///
/// A trigger with neither a continuous nor an exit callback retires itself
/// after its first enter (fire-once).
#[derive(Clone, Default)]
pub struct TriggerSpec {
    pub(crate) offset: Option<f32>,
    pub(crate) anchor: Anchor,
    pub(crate) on_enter: Option<TriggerCallback>,
    pub(crate) on_exit: Option<TriggerCallback>,
    pub(crate) on_frame: Option<TriggerCallback>,
}

impl TriggerSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra pixels added to the activation threshold.
    pub fn offset(mut self, pixels: f32) -> Self {
        self.offset = Some(pixels);
        self
    }

    /// Which point of the element the threshold tracks (default: top).
    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Invoked once on the idle → entered transition.
    pub fn on_enter<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ObservedElement, f32, f32) + Send + Sync + 'static,
    {
        self.on_enter = Some(Arc::new(callback));
        self
    }

    /// Invoked once on the entered → idle transition.
    pub fn on_exit<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ObservedElement, f32, f32) + Send + Sync + 'static,
    {
        self.on_exit = Some(Arc::new(callback));
        self
    }

    /// Invoked every frame while the scroll position stays in the window.
    ///
    /// A trigger with a continuous callback keeps the frame chain alive
    /// for as long as it remains in view.
    pub fn on_frame<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ObservedElement, f32, f32) + Send + Sync + 'static,
    {
        self.on_frame = Some(Arc::new(callback));
        self
    }

    /// Whether this trigger retires itself after its first enter.
    pub fn is_fire_once(&self) -> bool {
        self.on_frame.is_none() && self.on_exit.is_none()
    }
}

impl fmt::Debug for TriggerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerSpec")
            .field("offset", &self.offset)
            .field("anchor", &self.anchor)
            .field("on_enter", &self.on_enter.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .field("on_frame", &self.on_frame.is_some())
            .finish()
    }
}

/// What one evaluation step produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Evaluation {
    /// The idle → entered transition fired this step
    pub entered: bool,
    /// The entered → idle transition fired this step
    pub exited: bool,
    /// The position is in-window and the trigger wants a per-frame callback
    pub continuous: bool,
}

/// Per-trigger activation state for one observed element.
#[derive(Clone, Copy, Debug)]
pub struct Activation {
    pub(crate) enabled: bool,
    pub(crate) window: Option<ActivationWindow>,
    pub(crate) entered: bool,
}

impl Activation {
    pub(crate) fn fresh() -> Self {
        Self {
            enabled: true,
            window: None,
            entered: false,
        }
    }

    /// Whether the trigger still participates in evaluation.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the state machine currently sits in the entered state.
    pub fn is_entered(&self) -> bool {
        self.entered
    }

    /// The computed activation window, `None` when geometry was never
    /// computable for the element.
    pub fn window(&self) -> Option<ActivationWindow> {
        self.window
    }

    /// Drive the state machine one frame against the given position.
    ///
    /// Disabled or window-less activations are skipped without side
    /// effects. Entering and leaving always pass through idle: a second
    /// enter requires an intervening excursion outside the window.
    pub(crate) fn evaluate(&mut self, spec: &TriggerSpec, position: f32) -> Evaluation {
        let mut outcome = Evaluation::default();
        if !self.enabled {
            return outcome;
        }
        let Some(window) = self.window else {
            return outcome;
        };

        if window.contains(position) {
            if !self.entered {
                self.entered = true;
                outcome.entered = true;
                if spec.is_fire_once() {
                    self.enabled = false;
                }
            }
            if spec.on_frame.is_some() {
                outcome.continuous = true;
            }
        } else if self.entered {
            // The state reset is unconditional; the exit callback is not
            self.entered = false;
            outcome.exited = true;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> TriggerCallback {
        Arc::new(|_, _, _| {})
    }

    fn activation(top: f32, bottom: f32) -> Activation {
        Activation {
            enabled: true,
            window: Some(ActivationWindow { top, bottom }),
            entered: false,
        }
    }

    #[test]
    fn test_enter_fires_once_per_excursion() {
        let spec = TriggerSpec {
            on_exit: Some(noop()),
            ..TriggerSpec::new()
        };
        let mut act = activation(100.0, 200.0);

        let first = act.evaluate(&spec, 150.0);
        assert!(first.entered);
        let second = act.evaluate(&spec, 160.0);
        assert!(!second.entered);
        assert!(act.is_entered());
    }

    #[test]
    fn test_exit_resets_state_and_allows_reentry() {
        let spec = TriggerSpec {
            on_exit: Some(noop()),
            ..TriggerSpec::new()
        };
        let mut act = activation(100.0, 200.0);

        act.evaluate(&spec, 150.0);
        let out = act.evaluate(&spec, 250.0);
        assert!(out.exited);
        assert!(!act.is_entered());

        let back = act.evaluate(&spec, 150.0);
        assert!(back.entered);
    }

    #[test]
    fn test_exit_resets_even_without_exit_callback() {
        let spec = TriggerSpec {
            on_frame: Some(noop()),
            ..TriggerSpec::new()
        };
        let mut act = activation(100.0, 200.0);

        act.evaluate(&spec, 150.0);
        let out = act.evaluate(&spec, 250.0);
        assert!(out.exited);
        assert!(!act.is_entered());
    }

    #[test]
    fn test_fire_once_disables_after_enter() {
        let spec = TriggerSpec::new().on_enter(|_, _, _| {});
        assert!(spec.is_fire_once());

        let mut act = activation(100.0, 200.0);
        let out = act.evaluate(&spec, 150.0);
        assert!(out.entered);
        assert!(!act.is_enabled());

        // Re-entering later produces nothing
        act.evaluate(&spec, 250.0);
        let again = act.evaluate(&spec, 150.0);
        assert_eq!(again, Evaluation::default());
    }

    #[test]
    fn test_continuous_requested_every_in_window_frame() {
        let spec = TriggerSpec {
            on_frame: Some(noop()),
            ..TriggerSpec::new()
        };
        let mut act = activation(100.0, 200.0);

        assert!(act.evaluate(&spec, 150.0).continuous);
        assert!(act.evaluate(&spec, 151.0).continuous);
        assert!(!act.evaluate(&spec, 250.0).continuous);
    }

    #[test]
    fn test_missing_window_is_skipped() {
        let spec = TriggerSpec {
            on_exit: Some(noop()),
            ..TriggerSpec::new()
        };
        let mut act = Activation::fresh();

        assert_eq!(act.evaluate(&spec, 0.0), Evaluation::default());
        assert!(act.is_enabled());
        assert!(!act.is_entered());
    }

    #[test]
    fn test_idle_outside_window_stays_idle() {
        let spec = TriggerSpec {
            on_exit: Some(noop()),
            ..TriggerSpec::new()
        };
        let mut act = activation(100.0, 200.0);

        let out = act.evaluate(&spec, 50.0);
        assert_eq!(out, Evaluation::default());
    }
}
