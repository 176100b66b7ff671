//! Activation window computation
//!
//! An activation window is the scroll-position interval `[top, bottom)` in
//! which a trigger counts as in view. It is derived from the element's
//! document-space box, the trigger's anchor and extra offset, and the
//! viewport height.

use choreo_core::ElementBox;

/// Which point of the element the activation threshold tracks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Anchor {
    /// The element's top edge (default)
    #[default]
    Top,
    /// The element's vertical midpoint
    Middle,
    /// The element's bottom edge
    Bottom,
}

/// The scroll-position interval `[top, bottom)` for one trigger on one
/// element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivationWindow {
    pub top: f32,
    pub bottom: f32,
}

impl ActivationWindow {
    /// Compute the window for a trigger over an element box.
    ///
    /// The raw threshold is the element's top, shifted by the extra offset
    /// and the anchor point, then normalized against the viewport: an
    /// element whose anchor sits inside the first viewport is reachable
    /// from position 0, while one further down only becomes reachable once
    /// the scroll position has carried its anchor past the viewport's
    /// leading edge.
    pub fn compute(
        element: &ElementBox,
        offset: Option<f32>,
        anchor: Anchor,
        viewport_height: f32,
    ) -> Self {
        let height = element.height();
        let mut top = element.top;
        let bottom = element.bottom;

        if let Some(extra) = offset {
            top += extra;
        }

        match anchor {
            Anchor::Top => {}
            Anchor::Middle => top += height / 2.0,
            Anchor::Bottom => top += height,
        }

        if top > viewport_height {
            top -= viewport_height;
        } else {
            top = 0.0;
        }

        Self { top, bottom }
    }

    /// Whether a scroll position falls inside the half-open window.
    pub fn contains(&self, position: f32) -> bool {
        position >= self.top && position < self.bottom
    }
}
