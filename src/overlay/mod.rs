//! Overlay lifecycle: attach/detach, draw dispatch and event routing around
//! the synchronizer core.

pub mod anchor;
pub mod options;
pub mod projection;
pub mod rounding;
pub mod sync;

pub use anchor::OriginAnchor;
pub use options::OverlayOptions;
pub use projection::Projection;
pub use sync::{SyncState, Synchronizer, Transform};

use crate::animation::driver::{NativeZoomDriver, TimedZoomDriver, ZoomDriver};
use crate::events::{EventBinding, EventKind, ViewportEvent};
use crate::overlay::rounding::with_rounding_disabled;
use crate::traits::{MapHost, NodeId, VectorSurface};
use crate::{OverlayError, Result};

/// Host capability variant, detected once at attach and held for the
/// instance's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostProfile {
    /// Separate zoom-begin/step/end events
    Modern,
    /// Single combined view-reset event
    Legacy,
}

impl HostProfile {
    fn event_kinds(self) -> &'static [EventKind] {
        match self {
            HostProfile::Modern => &[
                EventKind::PanEnd,
                EventKind::ZoomBegin,
                EventKind::ZoomStep,
                EventKind::ZoomEnd,
            ],
            HostProfile::Legacy => &[EventKind::PanEnd, EventKind::ViewReset],
        }
    }

    fn accepts(self, kind: EventKind) -> bool {
        self.event_kinds().contains(&kind)
    }
}

/// Handle to the overlay's root group passed to the draw callback, with the
/// small node-manipulation vocabulary drawing routines need
pub struct Selection<'a> {
    surface: &'a mut dyn VectorSurface,
    root: NodeId,
}

impl<'a> Selection<'a> {
    fn new(surface: &'a mut dyn VectorSurface, root: NodeId) -> Self {
        Self { surface, root }
    }

    /// The overlay's root group node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Creates a child group under the root
    pub fn append_group(&mut self) -> Result<NodeId> {
        self.surface.create_group(Some(self.root))
    }

    /// Sets a string attribute on a node
    pub fn attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.surface.set_attribute(node, name, value)
    }

    /// Removes a node and its children
    pub fn remove(&mut self, node: NodeId) {
        self.surface.remove_node(node);
    }

    /// Direct access to the underlying surface
    pub fn surface(&mut self) -> &mut dyn VectorSurface {
        self.surface
    }
}

/// Drawing routine supplied by the caller; invoked with the root selection,
/// the projection adapter and the host's live zoom
pub type DrawCallback = Box<dyn FnMut(&mut Selection<'_>, &Projection<'_>, f64)>;

struct Attached {
    root: NodeId,
    anchor: OriginAnchor,
    sync: Synchronizer,
    bindings: Vec<EventBinding>,
    profile: HostProfile,
}

/// Vector overlay kept glued to a pannable, zoomable map viewport.
///
/// Construct with a draw callback, then [`attach`](Self::attach) to a host
/// viewport and surface. The embedding event loop forwards viewport events
/// through [`handle_event`](Self::handle_event) and, when the timed
/// animation fallback is in use, pumps [`tick_animation`](Self::tick_animation)
/// from its timer.
pub struct SvgOverlay {
    options: OverlayOptions,
    draw_callback: DrawCallback,
    attached: Option<Attached>,
}

impl SvgOverlay {
    /// Creates an overlay with default options
    pub fn new<F>(draw_callback: F) -> Self
    where
        F: FnMut(&mut Selection<'_>, &Projection<'_>, f64) + 'static,
    {
        Self::with_options(draw_callback, OverlayOptions::default())
    }

    pub fn with_options<F>(draw_callback: F, options: OverlayOptions) -> Self
    where
        F: FnMut(&mut Selection<'_>, &Projection<'_>, f64) + 'static,
    {
        Self {
            options,
            draw_callback: Box::new(draw_callback),
            attached: None,
        }
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// Zoom level of the last committed transform, if attached
    pub fn committed_zoom(&self) -> Option<f64> {
        self.attached.as_ref().map(|a| a.sync.committed_zoom())
    }

    /// Currently applied transform, if attached
    pub fn transform(&self) -> Option<Transform> {
        self.attached.as_ref().map(|a| a.sync.transform())
    }

    /// The root group node on the surface, if attached
    pub fn root(&self) -> Option<NodeId> {
        self.attached.as_ref().map(|a| a.root)
    }

    /// Projection adapter over the current committed state
    pub fn projection<'a>(&'a self, host: &'a dyn MapHost) -> Result<Projection<'a>> {
        let attached = self.attached.as_ref().ok_or(OverlayError::NotAttached)?;
        Ok(Projection::new(
            host,
            &attached.anchor,
            attached.sync.committed_zoom(),
        ))
    }

    /// Attaches to a host viewport: creates the root group, captures the
    /// origin anchor, detects capabilities, subscribes to events and runs the
    /// initial draw. Attaching twice is a no-op.
    pub fn attach(
        &mut self,
        host: &mut dyn MapHost,
        surface: &mut dyn VectorSurface,
    ) -> Result<()> {
        if self.attached.is_some() {
            log::debug!("overlay already attached");
            return Ok(());
        }

        let root = surface.create_group(None)?;
        let anchor = OriginAnchor::capture(host);

        let profile = if host.capabilities().animated_zoom {
            HostProfile::Modern
        } else {
            HostProfile::Legacy
        };

        let driver: Box<dyn ZoomDriver> = if self.options.zoom_animate
            && !self.options.js_animation
            && surface.supports_transform_animation()
        {
            Box::new(NativeZoomDriver::new())
        } else {
            Box::new(TimedZoomDriver::new())
        };

        let bindings = profile
            .event_kinds()
            .iter()
            .map(|&kind| EventBinding {
                kind,
                handle: host.subscribe(kind),
            })
            .collect();

        sync::update_surface_box(host, surface, &anchor);
        self.attached = Some(Attached {
            root,
            anchor,
            sync: Synchronizer::new(host.zoom(), driver),
            bindings,
            profile,
        });

        self.draw(host, surface)
    }

    /// Detaches from the host: cancels any in-flight animation, removes the
    /// event registrations and the surface node. Idempotent.
    pub fn detach(&mut self, host: &mut dyn MapHost, surface: &mut dyn VectorSurface) {
        if let Some(mut attached) = self.attached.take() {
            attached.sync.cancel_animation(surface);
            for binding in &attached.bindings {
                host.unsubscribe(binding.handle);
            }
            surface.remove_node(attached.root);
        }
    }

    /// Invokes the caller's draw routine with the current projection. The
    /// host's pixel rounding is disabled for the duration of the callback and
    /// restored afterwards, even if the callback panics.
    pub fn draw(&mut self, host: &dyn MapHost, surface: &mut dyn VectorSurface) -> Result<()> {
        let attached = self.attached.as_ref().ok_or(OverlayError::NotAttached)?;
        let projection = Projection::new(host, &attached.anchor, attached.sync.committed_zoom());
        let root = attached.root;
        let callback = &mut self.draw_callback;

        with_rounding_disabled(host, || {
            let mut selection = Selection::new(surface, root);
            callback(&mut selection, &projection, host.zoom());
        });
        Ok(())
    }

    /// Routes one viewport event through the synchronizer and performs the
    /// redraw it requests
    pub fn handle_event(
        &mut self,
        host: &dyn MapHost,
        surface: &mut dyn VectorSurface,
        event: &ViewportEvent,
    ) -> Result<()> {
        let outcome = match self.attached.as_mut() {
            Some(attached) => {
                if !attached.profile.accepts(event.kind()) {
                    return Ok(());
                }
                attached.sync.handle_event(
                    event,
                    host,
                    surface,
                    &attached.anchor,
                    attached.root,
                    &self.options,
                )
            }
            None => return Ok(()),
        };

        if outcome.redraw {
            self.draw(host, surface)?;
        }
        if let Some(attached) = self.attached.as_mut() {
            attached.sync.finish_commit();
        }
        Ok(())
    }

    /// Advances the timed-interpolation fallback; returns whether an
    /// animation is still in flight. No-op with the native driver.
    pub fn tick_animation(&mut self, surface: &mut dyn VectorSurface) -> bool {
        match self.attached.as_mut() {
            Some(attached) => attached.sync.tick(surface, attached.root),
            None => false,
        }
    }
}
