//! Deterministic in-memory scroll host
//!
//! Implements `ScrollHost` over a scripted document: elements are inserted
//! with fixed geometry, scroll and resize are driven explicitly, and
//! requested frames run only when pumped. Everything is synchronous and
//! single-threaded, so a test controls exactly when each frame fires.

use std::sync::{Arc, Mutex};

use choreo_core::{
    ElementHandle, EventHandler, FrameCallback, FrameToken, Offset, ResolveError, Result,
    ScrollHost, Size, Target,
};
use rustc_hash::FxHashMap;

struct ElementRecord {
    offset: Offset,
    size: Size,
    detached: bool,
}

struct HostInner {
    elements: FxHashMap<u64, ElementRecord>,
    selectors: FxHashMap<String, Vec<ElementHandle>>,
    next_element: u64,
    next_token: u64,
    scroll_position: f32,
    viewport_height: f32,
    frames: Vec<(FrameToken, FrameCallback)>,
    scroll_listeners: Vec<EventHandler>,
    resize_listeners: Vec<EventHandler>,
}

/// Scriptable scroll host.
///
/// # Example
///
/// ```ignore
/// let host = HarnessHost::new(800.0);
/// host.insert_block(".card", 2000.0, 100.0);
///
/// let scroller = Scroller::new(host.clone());
/// scroller.observe(".card")?.add(spec);
///
/// host.scroll_to(1500.0);
/// host.run_frames(16);
/// ```
pub struct HarnessHost {
    inner: Mutex<HostInner>,
}

impl HarnessHost {
    pub fn new(viewport_height: f32) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(HostInner {
                elements: FxHashMap::default(),
                selectors: FxHashMap::default(),
                next_element: 1,
                next_token: 1,
                scroll_position: 0.0,
                viewport_height,
                frames: Vec::new(),
                scroll_listeners: Vec::new(),
                resize_listeners: Vec::new(),
            }),
        })
    }

    /// Insert an element with explicit geometry, registered under
    /// `selector`. Repeated inserts under one selector accumulate in
    /// insertion order.
    pub fn insert(&self, selector: &str, offset: Offset, size: Size) -> ElementHandle {
        let mut inner = self.inner.lock().unwrap();
        let handle = ElementHandle::new(inner.next_element);
        inner.next_element += 1;
        inner.elements.insert(
            handle.raw(),
            ElementRecord {
                offset,
                size,
                detached: false,
            },
        );
        inner
            .selectors
            .entry(selector.to_owned())
            .or_default()
            .push(handle);
        handle
    }

    /// Insert a full-width block element at the given document top.
    pub fn insert_block(&self, selector: &str, top: f32, height: f32) -> ElementHandle {
        self.insert(selector, Offset::new(top, 0.0), Size::new(100.0, height))
    }

    /// Mark an element detached: geometry queries return `None` until it
    /// is placed again.
    pub fn detach(&self, element: ElementHandle) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(record) = inner.elements.get_mut(&element.raw()) {
            record.detached = true;
        }
    }

    /// Move an element to a new document offset (re-attaching it if
    /// detached). Takes effect on the next geometry pass.
    pub fn place(&self, element: ElementHandle, offset: Offset) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(record) = inner.elements.get_mut(&element.raw()) {
            record.offset = offset;
            record.detached = false;
        }
    }

    /// Set the scroll position and deliver a scroll event to subscribers.
    pub fn scroll_to(&self, position: f32) {
        let listeners = {
            let mut inner = self.inner.lock().unwrap();
            inner.scroll_position = position;
            inner.scroll_listeners.clone()
        };
        for listener in listeners {
            listener();
        }
    }

    /// Set the viewport height and deliver a resize event to subscribers.
    pub fn resize_viewport(&self, viewport_height: f32) {
        let listeners = {
            let mut inner = self.inner.lock().unwrap();
            inner.viewport_height = viewport_height;
            inner.resize_listeners.clone()
        };
        for listener in listeners {
            listener();
        }
    }

    /// Number of armed frame requests (the engine keeps at most one).
    pub fn pending_frames(&self) -> usize {
        self.inner.lock().unwrap().frames.len()
    }

    /// Fire the oldest pending frame callback. Returns `false` when no
    /// frame was pending.
    pub fn pump(&self) -> bool {
        let callback = {
            let mut inner = self.inner.lock().unwrap();
            if inner.frames.is_empty() {
                return false;
            }
            inner.frames.remove(0).1
        };
        callback();
        true
    }

    /// Pump frames until the chain goes idle or `max` frames have run.
    /// Returns the number of frames that ran.
    pub fn run_frames(&self, max: usize) -> usize {
        let mut ran = 0;
        while ran < max && self.pump() {
            ran += 1;
        }
        ran
    }
}

impl ScrollHost for HarnessHost {
    fn resolve(&self, target: &Target) -> Result<Vec<ElementHandle>> {
        let inner = self.inner.lock().unwrap();
        match target {
            Target::Selector(selector) => match inner.selectors.get(selector) {
                Some(handles) if !handles.is_empty() => Ok(handles.clone()),
                _ => Err(ResolveError::NoMatch(selector.clone())),
            },
            Target::Selectors(selectors) => {
                let mut handles = Vec::new();
                for selector in selectors {
                    if let Some(found) = inner.selectors.get(selector) {
                        handles.extend(found.iter().copied());
                    }
                }
                if handles.is_empty() {
                    Err(ResolveError::Empty)
                } else {
                    Ok(handles)
                }
            }
            Target::Element(handle) => Ok(vec![*handle]),
            Target::Elements(handles) => {
                if handles.is_empty() {
                    Err(ResolveError::Empty)
                } else {
                    Ok(handles.clone())
                }
            }
        }
    }

    fn offset_of(&self, element: ElementHandle) -> Option<Offset> {
        let inner = self.inner.lock().unwrap();
        inner
            .elements
            .get(&element.raw())
            .filter(|record| !record.detached)
            .map(|record| record.offset)
    }

    fn size_of(&self, element: ElementHandle) -> Option<Size> {
        let inner = self.inner.lock().unwrap();
        inner
            .elements
            .get(&element.raw())
            .filter(|record| !record.detached)
            .map(|record| record.size)
    }

    fn viewport_height(&self) -> f32 {
        self.inner.lock().unwrap().viewport_height
    }

    fn scroll_position(&self) -> f32 {
        self.inner.lock().unwrap().scroll_position
    }

    fn request_frame(&self, callback: FrameCallback) -> FrameToken {
        let mut inner = self.inner.lock().unwrap();
        let token = FrameToken::new(inner.next_token);
        inner.next_token += 1;
        inner.frames.push((token, callback));
        tracing::trace!(?token, "frame requested");
        token
    }

    fn cancel_frame(&self, token: FrameToken) {
        let mut inner = self.inner.lock().unwrap();
        inner.frames.retain(|(pending, _)| *pending != token);
    }

    fn add_scroll_listener(&self, handler: EventHandler) {
        self.inner.lock().unwrap().scroll_listeners.push(handler);
    }

    fn add_resize_listener(&self, handler: EventHandler) {
        self.inner.lock().unwrap().resize_listeners.push(handler);
    }
}
