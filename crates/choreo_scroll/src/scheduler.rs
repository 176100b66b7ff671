//! Scroll engine scheduler
//!
//! Owns the watcher registry and the single chained next-frame request.
//! Watchers are registered through [`Scroller::observe`]; each frame tick
//! advances the scroll state, walks the registry in registration order,
//! invokes trigger callbacks, prunes retired watchers, and decides whether
//! the chain continues.
//!
//! All per-frame bookkeeping (the firing list, the continuation flag) is
//! local to one tick; nothing about the "currently evaluated" group or
//! element outlives the frame.

use std::sync::{Arc, Mutex, OnceLock, Weak};

use choreo_core::{FrameCallback, FrameToken, ResolveError, ScrollHost, Target};
use slotmap::SlotMap;

use crate::scroll::{ScrollState, Smoothing};
use crate::trigger::{TriggerCallback, TriggerSpec};
use crate::watcher::{ElementCallback, GeometryPass, GroupId, ObservedElement, WatcherGroup};

// ============================================================================
// Global Scroller State
// ============================================================================

static GLOBAL_SCROLLER: OnceLock<Scroller> = OnceLock::new();

/// Get or construct the process-wide scroller.
///
/// The first call constructs the engine against `host` and wires its
/// scroll and resize listeners; every subsequent call returns the same
/// instance and ignores its argument.
///
/// # Example
///
/// ```ignore
/// use choreo_scroll::{global_scroller, TriggerSpec};
///
/// let scroller = global_scroller(host);
/// scroller
///     .observe(".hero")?
///     .add(TriggerSpec::new().on_enter(|el, pos, _| reveal(el, pos)));
/// ```
pub fn global_scroller(host: Arc<dyn ScrollHost>) -> &'static Scroller {
    GLOBAL_SCROLLER.get_or_init(|| Scroller::new(host))
}

/// Get the global scroller if it has been constructed.
pub fn try_global_scroller() -> Option<&'static Scroller> {
    GLOBAL_SCROLLER.get()
}

// ============================================================================
// Frame Chain
// ============================================================================

/// The single chained next-frame request.
///
/// At most one host frame callback is pending at any time: arming first
/// cancels the pending request, so a burst of scroll events restarts the
/// chain instead of stacking callbacks.
struct FrameChain {
    host: Weak<dyn ScrollHost>,
    pending: Mutex<Option<FrameToken>>,
}

impl FrameChain {
    fn new(host: Weak<dyn ScrollHost>) -> Self {
        Self {
            host,
            pending: Mutex::new(None),
        }
    }

    /// Arm the next frame, cancelling any pending request first.
    fn arm(&self, callback: FrameCallback) {
        let Some(host) = self.host.upgrade() else {
            return;
        };
        if let Some(token) = self.pending.lock().unwrap().take() {
            host.cancel_frame(token);
        }
        let token = host.request_frame(callback);
        *self.pending.lock().unwrap() = Some(token);
    }

    /// Forget the pending token once its callback has fired.
    fn acknowledge(&self) {
        self.pending.lock().unwrap().take();
    }

    /// Cancel any pending frame request. Idempotent.
    fn stop(&self) {
        let Some(host) = self.host.upgrade() else {
            return;
        };
        if let Some(token) = self.pending.lock().unwrap().take() {
            host.cancel_frame(token);
            tracing::trace!("frame chain stopped");
        }
    }
}

// ============================================================================
// Scroller
// ============================================================================

/// Internal state of the scroll engine
struct Inner {
    groups: SlotMap<GroupId, WatcherGroup>,
    /// Registration order; evaluation and pruning walk this list
    order: Vec<GroupId>,
    scroll: ScrollState,
}

/// Callback firing collected during a sweep, invoked after the registry
/// lock is released
type Firing = (TriggerCallback, ObservedElement);

/// The scroll choreography engine.
///
/// Tracks scroll position once per display frame and, for every registered
/// element and every trigger attached to it, decides whether an
/// enter/exit/continuous transition occurred. Groups are evaluated in
/// registration order, elements in resolution order, triggers in
/// attachment order, so callback sequencing is deterministic.
///
/// Cloning is shallow; all clones share the same registry and frame chain.
/// Construction wires the host's scroll and resize listeners, which live
/// for the engine's lifetime.
#[derive(Clone)]
pub struct Scroller {
    inner: Arc<Mutex<Inner>>,
    chain: Arc<FrameChain>,
    host: Arc<dyn ScrollHost>,
}

impl Scroller {
    /// Construct an engine with smoothing disabled.
    pub fn new(host: Arc<dyn ScrollHost>) -> Self {
        Self::with_smoothing(host, Smoothing::disabled())
    }

    /// Construct an engine with the given smoothing configuration.
    pub fn with_smoothing(host: Arc<dyn ScrollHost>, smoothing: Smoothing) -> Self {
        let initial = host.scroll_position();
        let scroller = Self {
            inner: Arc::new(Mutex::new(Inner {
                groups: SlotMap::with_key(),
                order: Vec::new(),
                scroll: ScrollState::new(initial, smoothing),
            })),
            chain: Arc::new(FrameChain::new(Arc::downgrade(&host))),
            host,
        };
        scroller.wire_listeners();
        tracing::debug!(initial, "scroller constructed");
        scroller
    }

    fn wire_listeners(&self) {
        let handle = self.handle();
        self.host.add_scroll_listener(Arc::new(move || {
            if let Some(scroller) = handle.upgrade() {
                scroller.on_scroll();
            }
        }));

        let handle = self.handle();
        self.host.add_resize_listener(Arc::new(move || {
            if let Some(scroller) = handle.upgrade() {
                scroller.on_resize();
            }
        }));
    }

    /// Get a weak handle for storing in host callbacks and watchers.
    ///
    /// It won't keep the engine alive; operations through a dead handle
    /// degrade to no-ops.
    pub fn handle(&self) -> ScrollerHandle {
        ScrollerHandle {
            inner: Arc::downgrade(&self.inner),
            chain: Arc::downgrade(&self.chain),
            host: Arc::downgrade(&self.host),
        }
    }

    /// Register a watcher group for `target` with no registration hooks.
    ///
    /// Resolution failure is the only hard error: it surfaces here,
    /// synchronously, and nothing is registered. The returned [`Watcher`]
    /// chains trigger attachment.
    pub fn observe(&self, target: impl Into<Target>) -> Result<Watcher, ResolveError> {
        self.observe_with(target, ObserveOptions::new())
    }

    /// Register a watcher group with registration hooks.
    ///
    /// `on_init` runs once per resolved element immediately, before the
    /// first geometry pass; `on_geometry` runs once per element after
    /// every geometry pass over the group.
    pub fn observe_with(
        &self,
        target: impl Into<Target>,
        options: ObserveOptions,
    ) -> Result<Watcher, ResolveError> {
        let target = target.into();
        let handles = self.host.resolve(&target)?;

        let mut group = WatcherGroup::new(handles, options.on_geometry);
        if let Some(on_init) = &options.on_init {
            for element in group.elements() {
                on_init(element);
            }
        }
        group.compute_geometry(self.host.as_ref(), GeometryPass::Rebuild);
        let firings = geometry_firings(&group);

        let id = {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.groups.insert(group);
            inner.order.push(id);
            id
        };
        for (callback, element) in firings {
            callback(&element);
        }

        tracing::debug!(?id, ?target, "watcher group registered");
        Ok(Watcher {
            engine: self.handle(),
            group: id,
        })
    }

    /// Scroll event entry point: re-read the host position and restart the
    /// frame chain.
    pub fn on_scroll(&self) {
        let position = self.host.scroll_position();
        self.inner.lock().unwrap().scroll.set_target(position);
        self.request_frame();
    }

    /// Resize event entry point: refresh geometry for every group.
    pub fn on_resize(&self) {
        self.recalculate();
    }

    /// Frame tick entry point.
    ///
    /// Advances the scroll state, evaluates every enabled trigger, prunes
    /// retired elements and empty groups, invokes the collected callbacks,
    /// then re-arms the chain iff any continuous callback fired or
    /// smoothing has not yet converged.
    pub fn on_frame(&self) {
        self.chain.acknowledge();

        let mut firings: Vec<Firing> = Vec::new();
        let mut continuous_needed = false;

        let (position, delta, smoothing_active) = {
            let mut inner = self.inner.lock().unwrap();
            let smoothing_active = inner.scroll.update();
            let position = inner.scroll.current();
            let delta = inner.scroll.delta();

            let mut gi = 0;
            while gi < inner.order.len() {
                let group_id = inner.order[gi];
                let mut group_empty = true;
                if let Some(group) = inner.groups.get_mut(group_id) {
                    sweep_group(group, position, &mut firings, &mut continuous_needed);
                    group_empty = group.elements.is_empty();
                }
                if group_empty {
                    inner.groups.remove(group_id);
                    inner.order.remove(gi);
                    tracing::debug!(?group_id, "watcher group pruned");
                } else {
                    gi += 1;
                }
            }

            (position, delta, smoothing_active)
        };

        for (callback, element) in firings {
            callback(&element, position, delta);
        }

        if continuous_needed || smoothing_active {
            self.request_frame();
        }
    }

    /// Re-run the geometry pass for every group without altering trigger
    /// state: windows are refreshed, `entered`/`enabled` are preserved.
    pub fn recalculate(&self) {
        let mut firings: Vec<(ElementCallback, ObservedElement)> = Vec::new();
        {
            let mut inner = self.inner.lock().unwrap();
            for gi in 0..inner.order.len() {
                let group_id = inner.order[gi];
                if let Some(group) = inner.groups.get_mut(group_id) {
                    group.compute_geometry(self.host.as_ref(), GeometryPass::Refresh);
                    firings.extend(geometry_firings(group));
                }
            }
        }
        for (callback, element) in firings {
            callback(&element);
        }
    }

    /// Clear the entire registry.
    ///
    /// Any pending frame runs down naturally: the next tick over an empty
    /// registry terminates the chain.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.groups.clear();
        inner.order.clear();
        tracing::debug!("registry reset");
    }

    /// Cancel any pending frame request. Idempotent.
    pub fn stop(&self) {
        self.chain.stop();
    }

    /// Number of live watcher groups.
    pub fn group_count(&self) -> usize {
        self.inner.lock().unwrap().order.len()
    }

    fn request_frame(&self) {
        let handle = self.handle();
        self.chain.arm(Arc::new(move || {
            if let Some(scroller) = handle.upgrade() {
                scroller.on_frame();
            }
        }));
    }
}

/// Evaluate every element and trigger of one group, pruning elements whose
/// activations have all been disabled (order-preserving removal; the loop
/// index is not advanced past a removal).
fn sweep_group(
    group: &mut WatcherGroup,
    position: f32,
    firings: &mut Vec<Firing>,
    continuous_needed: &mut bool,
) {
    let mut ei = 0;
    while ei < group.elements.len() {
        {
            let element = &mut group.elements[ei];
            for (ti, spec) in group.triggers.iter().enumerate() {
                let outcome = {
                    let Some(activation) = element.activations.get_mut(ti) else {
                        continue;
                    };
                    activation.evaluate(spec, position)
                };

                if outcome.entered {
                    if let Some(callback) = &spec.on_enter {
                        firings.push((callback.clone(), element.clone()));
                    }
                }
                if outcome.continuous {
                    *continuous_needed = true;
                    if let Some(callback) = &spec.on_frame {
                        firings.push((callback.clone(), element.clone()));
                    }
                }
                if outcome.exited {
                    if let Some(callback) = &spec.on_exit {
                        firings.push((callback.clone(), element.clone()));
                    }
                }
            }
        }

        let retired = group.elements[ei]
            .activations
            .iter()
            .all(|activation| !activation.enabled);
        if retired {
            group.elements.remove(ei);
        } else {
            ei += 1;
        }
    }
}

fn geometry_firings(group: &WatcherGroup) -> Vec<(ElementCallback, ObservedElement)> {
    match &group.on_geometry {
        Some(callback) => group
            .elements
            .iter()
            .map(|element| (callback.clone(), element.clone()))
            .collect(),
        None => Vec::new(),
    }
}

// ============================================================================
// Scroller Handle
// ============================================================================

/// A weak handle to the scroll engine.
///
/// Stored inside host callbacks and [`Watcher`]s so they don't keep the
/// engine alive.
#[derive(Clone)]
pub struct ScrollerHandle {
    inner: Weak<Mutex<Inner>>,
    chain: Weak<FrameChain>,
    host: Weak<dyn ScrollHost>,
}

impl ScrollerHandle {
    /// Reconstruct a strong engine reference; `None` once the engine has
    /// been dropped.
    pub fn upgrade(&self) -> Option<Scroller> {
        Some(Scroller {
            inner: self.inner.upgrade()?,
            chain: self.chain.upgrade()?,
            host: self.host.upgrade()?,
        })
    }

    /// Check if the engine is still alive.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

// ============================================================================
// Observe Options & Watcher
// ============================================================================

/// Optional registration hooks for [`Scroller::observe_with`].
#[derive(Clone, Default)]
pub struct ObserveOptions {
    on_init: Option<ElementCallback>,
    on_geometry: Option<ElementCallback>,
}

impl ObserveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoked once per resolved element at registration, before the first
    /// geometry pass.
    pub fn on_init<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ObservedElement) + Send + Sync + 'static,
    {
        self.on_init = Some(Arc::new(callback));
        self
    }

    /// Invoked once per element after every geometry pass over the group.
    pub fn on_geometry<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ObservedElement) + Send + Sync + 'static,
    {
        self.on_geometry = Some(Arc::new(callback));
        self
    }
}

/// Chainable handle to a registered watcher group.
///
/// ```ignore
/// scroller
///     .observe(".card")?
///     .add(TriggerSpec::new().on_enter(reveal))
///     .add(TriggerSpec::new().anchor(Anchor::Bottom).on_exit(dismiss));
/// ```
#[derive(Clone)]
pub struct Watcher {
    engine: ScrollerHandle,
    group: GroupId,
}

impl Watcher {
    /// Attach a trigger to every element of this group.
    ///
    /// Rebuilds the group's activation state, then re-reads the live
    /// scroll position and restarts the frame chain so the new trigger is
    /// evaluated promptly. No-ops when the engine or the group is gone.
    pub fn add(&self, spec: TriggerSpec) -> &Watcher {
        let Some(scroller) = self.engine.upgrade() else {
            return self;
        };

        let firings = {
            let mut inner = scroller.inner.lock().unwrap();
            let Some(group) = inner.groups.get_mut(self.group) else {
                return self;
            };
            group.triggers.push(spec);
            group.compute_geometry(scroller.host.as_ref(), GeometryPass::Rebuild);
            geometry_firings(group)
        };
        for (callback, element) in firings {
            callback(&element);
        }

        scroller.on_scroll();
        self
    }

    /// Whether the engine and this group are both still live.
    pub fn is_alive(&self) -> bool {
        match self.engine.upgrade() {
            Some(scroller) => scroller
                .inner
                .lock()
                .unwrap()
                .groups
                .contains_key(self.group),
            None => false,
        }
    }
}
