//! Watcher registry records
//!
//! A watcher group is an ordered element set sharing one list of attached
//! triggers, registered together by a single `observe` call. Each observed
//! element carries its document-space box and one activation per trigger.

use std::fmt;
use std::sync::Arc;

use choreo_core::{ElementBox, ElementHandle, ScrollHost};
use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::trigger::{Activation, TriggerSpec};
use crate::window::ActivationWindow;

new_key_type! {
    /// Handle to a registered watcher group
    pub struct GroupId;
}

/// Callback receiving a single observed element (registration and geometry
/// hooks).
pub type ElementCallback = Arc<dyn Fn(&ObservedElement) + Send + Sync>;

/// One element tracked by a watcher group.
///
/// The handle stays owned by the host document; the record only caches the
/// element's box and per-trigger activation state between geometry passes.
#[derive(Clone)]
pub struct ObservedElement {
    pub handle: ElementHandle,
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
    pub(crate) activations: SmallVec<[Activation; 4]>,
}

impl ObservedElement {
    pub(crate) fn new(handle: ElementHandle) -> Self {
        Self {
            handle,
            top: 0.0,
            bottom: 0.0,
            left: 0.0,
            right: 0.0,
            activations: SmallVec::new(),
        }
    }

    /// Per-trigger activation state, in trigger attachment order.
    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }

    fn apply_box(&mut self, b: ElementBox) {
        self.top = b.top;
        self.bottom = b.bottom;
        self.left = b.left;
        self.right = b.right;
    }
}

impl fmt::Debug for ObservedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedElement")
            .field("handle", &self.handle)
            .field("top", &self.top)
            .field("bottom", &self.bottom)
            .field("activations", &self.activations.len())
            .finish()
    }
}

/// Which geometry pass to run over a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GeometryPass {
    /// Registration or trigger attachment: activations are rebuilt fresh
    /// (`enabled = true`, `entered = false`)
    Rebuild,
    /// Resize or explicit recalculation: windows are recomputed in place,
    /// `enabled`/`entered` are preserved
    Refresh,
}

/// An element set plus its attached triggers.
pub struct WatcherGroup {
    pub(crate) elements: Vec<ObservedElement>,
    pub(crate) triggers: Vec<TriggerSpec>,
    pub(crate) on_geometry: Option<ElementCallback>,
}

impl WatcherGroup {
    pub(crate) fn new(handles: Vec<ElementHandle>, on_geometry: Option<ElementCallback>) -> Self {
        Self {
            elements: handles.into_iter().map(ObservedElement::new).collect(),
            triggers: Vec::new(),
            on_geometry,
        }
    }

    pub fn elements(&self) -> &[ObservedElement] {
        &self.elements
    }

    pub fn triggers(&self) -> &[TriggerSpec] {
        &self.triggers
    }

    /// Recompute every element's box and activation windows.
    ///
    /// An element the host reports no box for (detached, invisible) keeps
    /// `window = None` on its activations, which the evaluator skips; the
    /// trigger simply never fires.
    pub(crate) fn compute_geometry(&mut self, host: &dyn ScrollHost, pass: GeometryPass) {
        let viewport_height = host.viewport_height();

        for element in &mut self.elements {
            let element_box = host
                .offset_of(element.handle)
                .zip(host.size_of(element.handle))
                .map(|(offset, size)| ElementBox::from_parts(offset, size));
            if let Some(b) = element_box {
                element.apply_box(b);
            }

            match pass {
                GeometryPass::Rebuild => {
                    element.activations.clear();
                    for spec in &self.triggers {
                        let mut activation = Activation::fresh();
                        activation.window = element_box.map(|b| {
                            ActivationWindow::compute(&b, spec.offset, spec.anchor, viewport_height)
                        });
                        element.activations.push(activation);
                    }
                }
                GeometryPass::Refresh => {
                    debug_assert_eq!(element.activations.len(), self.triggers.len());
                    for (activation, spec) in element.activations.iter_mut().zip(&self.triggers) {
                        activation.window = element_box.map(|b| {
                            ActivationWindow::compute(&b, spec.offset, spec.anchor, viewport_height)
                        });
                    }
                }
            }
        }
    }
}

impl fmt::Debug for WatcherGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherGroup")
            .field("elements", &self.elements.len())
            .field("triggers", &self.triggers.len())
            .field("on_geometry", &self.on_geometry.is_some())
            .finish()
    }
}
