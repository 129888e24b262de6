use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Viewport lifecycle events consumed by the overlay engine.
///
/// Zoom and center payloads are optional because legacy host event shapes omit
/// them; handlers fall back to the viewport's live state in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewportEvent {
    /// A pan (or resize) finished; the viewport's pixel bounds changed
    PanEnd,
    /// An animated zoom transition is starting
    ZoomBegin,
    /// Fired once per zoom transition with the transition target
    ZoomStep {
        zoom: Option<f64>,
        center: Option<LatLng>,
    },
    /// An animated zoom transition finished
    ZoomEnd { zoom: Option<f64> },
    /// Single non-animated view change (legacy hosts with no begin/step/end)
    ViewReset {
        zoom: Option<f64>,
        center: Option<LatLng>,
    },
}

impl ViewportEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ViewportEvent::PanEnd => EventKind::PanEnd,
            ViewportEvent::ZoomBegin => EventKind::ZoomBegin,
            ViewportEvent::ZoomStep { .. } => EventKind::ZoomStep,
            ViewportEvent::ZoomEnd { .. } => EventKind::ZoomEnd,
            ViewportEvent::ViewReset { .. } => EventKind::ViewReset,
        }
    }
}

/// Event categories a listener can register for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    PanEnd,
    ZoomBegin,
    ZoomStep,
    ZoomEnd,
    ViewReset,
}

/// Cancel token returned by `subscribe`; passing it back to `unsubscribe`
/// removes exactly that registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

/// A single registration held by the overlay so attach/detach stays symmetric
#[derive(Debug, Clone, Copy)]
pub struct EventBinding {
    pub kind: EventKind,
    pub handle: ListenerHandle,
}

/// Event registration and delivery queue for the reference viewport.
///
/// Events are queued on emit and drained by the embedding event loop, which
/// dispatches them to the overlay synchronously.
#[derive(Debug, Default)]
pub struct EventEmitter {
    listeners: Vec<(ListenerHandle, EventKind)>,
    queue: VecDeque<ViewportEvent>,
    next_handle: u64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in an event kind
    pub fn subscribe(&mut self, kind: EventKind) -> ListenerHandle {
        self.next_handle += 1;
        let handle = ListenerHandle(self.next_handle);
        self.listeners.push((handle, kind));
        handle
    }

    /// Removes a registration; unknown handles are ignored
    pub fn unsubscribe(&mut self, handle: ListenerHandle) {
        self.listeners.retain(|(h, _)| *h != handle);
    }

    /// Queues an event if any listener registered for its kind
    pub fn emit(&mut self, event: ViewportEvent) {
        let kind = event.kind();
        if self.listeners.iter().any(|(_, k)| *k == kind) {
            self.queue.push_back(event);
        }
    }

    /// Drains all queued events for dispatch
    pub fn drain(&mut self) -> Vec<ViewportEvent> {
        self.queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
