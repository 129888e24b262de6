use crate::animation::driver::ZoomDriver;
use crate::animation::interpolation::Interpolation;
use crate::core::constants::{SURFACE_PADDING, ZOOM_ANIMATION_MS};
use crate::core::geo::{LatLng, Point};
use crate::events::ViewportEvent;
use crate::overlay::anchor::OriginAnchor;
use crate::overlay::options::OverlayOptions;
use crate::traits::{MapHost, NodeId, VectorSurface};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Translate and scale currently applied (or in flight) on the drawing
/// surface's root group, relative to its parent.
///
/// After a committed zoom transition from `z0` to `z1`, `scale` is exactly
/// `2^(z1 - z0)` and `translate` is the anchor's pixel shift at the new view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translate: Point,
    pub scale: f64,
}

impl Transform {
    pub fn new(translate: Point, scale: f64) -> Self {
        Self { translate, scale }
    }

    pub fn identity() -> Self {
        Self::new(Point::new(0.0, 0.0), 1.0)
    }

    /// Interpolates toward another transform with normalized progress `t`
    pub fn lerp(&self, other: &Transform, t: f64) -> Transform {
        Transform {
            translate: Point::new(
                Interpolation::linear(self.translate.x, other.translate.x, t),
                Interpolation::linear(self.translate.y, other.translate.y, t),
            ),
            scale: Interpolation::linear(self.scale, other.scale, t),
        }
    }

    /// Renders the SVG-style transform attribute value
    pub fn to_attribute(&self) -> String {
        format!(
            "translate({},{}) scale({},{})",
            self.translate.x, self.translate.y, self.scale, self.scale
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Synchronizer phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    AnimatingZoom,
    /// Finalize window between zoom-end arriving and the commit redraw
    /// finishing; events landing here are ignored
    CommittingZoom,
}

/// What the overlay should do after a handled event
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOutcome {
    pub redraw: bool,
}

struct ZoomTarget {
    zoom: f64,
    transform: Transform,
}

/// State machine translating viewport lifecycle events into transform updates
/// on the drawing surface's root group.
pub struct Synchronizer {
    state: SyncState,
    committed_zoom: f64,
    transform: Transform,
    anim_start: Transform,
    pending: Option<ZoomTarget>,
    hidden: bool,
    driver: Box<dyn ZoomDriver>,
}

impl Synchronizer {
    pub fn new(committed_zoom: f64, driver: Box<dyn ZoomDriver>) -> Self {
        Self {
            state: SyncState::Idle,
            committed_zoom,
            transform: Transform::identity(),
            anim_start: Transform::identity(),
            pending: None,
            hidden: false,
            driver,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Zoom level at which the applied transform was last finalized
    pub fn committed_zoom(&self) -> f64 {
        self.committed_zoom
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Dispatches one viewport event through the state machine
    pub fn handle_event(
        &mut self,
        event: &ViewportEvent,
        host: &dyn MapHost,
        surface: &mut dyn VectorSurface,
        anchor: &OriginAnchor,
        root: NodeId,
        options: &OverlayOptions,
    ) -> SyncOutcome {
        match event {
            ViewportEvent::PanEnd => self.on_pan_end(host, surface, anchor, options),
            ViewportEvent::ZoomBegin => self.on_zoom_begin(surface, root, options),
            ViewportEvent::ZoomStep { zoom, center } => {
                self.on_zoom_step(host, surface, anchor, root, *zoom, *center)
            }
            ViewportEvent::ZoomEnd { zoom } => {
                self.on_zoom_end(host, surface, anchor, root, *zoom, options)
            }
            ViewportEvent::ViewReset { zoom, center } => {
                self.on_view_reset(host, surface, anchor, root, *zoom, *center, options)
            }
        }
    }

    fn on_pan_end(
        &mut self,
        host: &dyn MapHost,
        surface: &mut dyn VectorSurface,
        anchor: &OriginAnchor,
        options: &OverlayOptions,
    ) -> SyncOutcome {
        if self.state != SyncState::Idle {
            // Spurious pan-end mid-zoom; recomputing the box here flickers
            log::debug!("ignoring pan-end during {:?}", self.state);
            return SyncOutcome::default();
        }

        update_surface_box(host, surface, anchor);
        SyncOutcome {
            redraw: options.pan_draw,
        }
    }

    fn on_zoom_begin(
        &mut self,
        surface: &mut dyn VectorSurface,
        root: NodeId,
        options: &OverlayOptions,
    ) -> SyncOutcome {
        if self.state == SyncState::CommittingZoom {
            return SyncOutcome::default();
        }

        if options.zoom_hide && !self.hidden {
            surface.set_visible(root, false);
            self.hidden = true;
        }

        if options.zoom_animate {
            // Snapshot the in-flight value before disposing a superseded
            // animation so the new transition starts where the old one left off
            let start = self.driver.current().unwrap_or(self.transform);
            self.driver.cancel(surface);
            self.anim_start = start;
            self.pending = None;
            self.state = SyncState::AnimatingZoom;
        }
        SyncOutcome::default()
    }

    fn on_zoom_step(
        &mut self,
        host: &dyn MapHost,
        surface: &mut dyn VectorSurface,
        anchor: &OriginAnchor,
        root: NodeId,
        zoom: Option<f64>,
        center: Option<LatLng>,
    ) -> SyncOutcome {
        if self.state != SyncState::AnimatingZoom {
            // Animation disabled or begin never fired; zoom-end will commit
            log::debug!("ignoring zoom-step in {:?}", self.state);
            return SyncOutcome::default();
        }

        let target_zoom = zoom.unwrap_or_else(|| {
            log::debug!("zoom-step without zoom, using live viewport zoom");
            host.zoom()
        });
        let target_center = center.unwrap_or_else(|| host.center());
        let target = self.transform_for(host, anchor, target_zoom, &target_center);

        self.pending = Some(ZoomTarget {
            zoom: target_zoom,
            transform: target,
        });

        if let Err(err) = self.driver.start(
            surface,
            root,
            self.anim_start,
            target,
            Duration::from_millis(ZOOM_ANIMATION_MS),
        ) {
            // Degrade to applying the target directly; zoom-end still commits
            log::warn!("zoom animation unavailable, applying target: {err}");
            apply_transform(surface, root, &target);
        }
        SyncOutcome::default()
    }

    fn on_zoom_end(
        &mut self,
        host: &dyn MapHost,
        surface: &mut dyn VectorSurface,
        anchor: &OriginAnchor,
        root: NodeId,
        zoom: Option<f64>,
        options: &OverlayOptions,
    ) -> SyncOutcome {
        match self.state {
            SyncState::AnimatingZoom => {
                self.state = SyncState::CommittingZoom;
                // Dispose before snapping so the animation cannot fight the
                // final attribute write; a superseded handle is a no-op
                self.driver.cancel(surface);

                let target = self.pending.take().unwrap_or_else(|| {
                    let target_zoom = zoom.unwrap_or_else(|| host.zoom());
                    ZoomTarget {
                        zoom: target_zoom,
                        transform: self.transform_for(host, anchor, target_zoom, &host.center()),
                    }
                });
                self.commit(surface, root, target, options)
            }
            SyncState::Idle => {
                // Host committed a zoom without an animated transition
                self.state = SyncState::CommittingZoom;
                let target_zoom = zoom.unwrap_or_else(|| {
                    log::debug!("zoom-end without zoom, using live viewport zoom");
                    host.zoom()
                });
                let target = ZoomTarget {
                    zoom: target_zoom,
                    transform: self.transform_for(host, anchor, target_zoom, &host.center()),
                };
                self.commit(surface, root, target, options)
            }
            SyncState::CommittingZoom => SyncOutcome::default(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn on_view_reset(
        &mut self,
        host: &dyn MapHost,
        surface: &mut dyn VectorSurface,
        anchor: &OriginAnchor,
        root: NodeId,
        zoom: Option<f64>,
        center: Option<LatLng>,
        options: &OverlayOptions,
    ) -> SyncOutcome {
        if self.state == SyncState::CommittingZoom {
            return SyncOutcome::default();
        }
        if self.state == SyncState::AnimatingZoom {
            self.driver.cancel(surface);
            self.pending = None;
        }
        self.state = SyncState::CommittingZoom;

        let target_zoom = zoom.unwrap_or_else(|| {
            log::debug!("view-reset without zoom, using live viewport zoom");
            host.zoom()
        });
        let target_center = center.unwrap_or_else(|| host.center());
        let target = ZoomTarget {
            zoom: target_zoom,
            transform: self.transform_for(host, anchor, target_zoom, &target_center),
        };
        self.commit(surface, root, target, options)
    }

    /// Target transform for a transition toward `(zoom, center)`:
    /// `scale = 2^(zoom - committed)`, translate = anchor shift at the target
    fn transform_for(
        &self,
        host: &dyn MapHost,
        anchor: &OriginAnchor,
        zoom: f64,
        center: &LatLng,
    ) -> Transform {
        Transform::new(
            anchor.pixel_shift_at(host, zoom, center),
            2_f64.powf(zoom - self.committed_zoom),
        )
    }

    /// Snaps the transform to the exact target, commits the zoom and restores
    /// visibility; the caller redraws and then calls `finish_commit`
    fn commit(
        &mut self,
        surface: &mut dyn VectorSurface,
        root: NodeId,
        target: ZoomTarget,
        options: &OverlayOptions,
    ) -> SyncOutcome {
        apply_transform(surface, root, &target.transform);
        self.transform = target.transform;
        self.committed_zoom = target.zoom;

        if self.hidden {
            surface.set_visible(root, true);
            self.hidden = false;
        }

        SyncOutcome {
            redraw: options.zoom_draw,
        }
    }

    /// Leaves the commit window; called by the overlay after the commit
    /// redraw has run
    pub fn finish_commit(&mut self) {
        if self.state == SyncState::CommittingZoom {
            self.state = SyncState::Idle;
        }
    }

    /// Advances the timed interpolation fallback, if one is in flight
    pub fn tick(&mut self, surface: &mut dyn VectorSurface, root: NodeId) -> bool {
        self.driver.tick(surface, root)
    }

    /// Disposes any in-flight animation; used on detach
    pub fn cancel_animation(&mut self, surface: &mut dyn VectorSurface) {
        self.driver.cancel(surface);
        self.pending = None;
    }
}

/// Writes a transform to the root group's transform attribute; a surface
/// refusing the write is logged, not fatal
fn apply_transform(surface: &mut dyn VectorSurface, root: NodeId, transform: &Transform) {
    if let Err(err) = surface.set_attribute(root, "transform", &transform.to_attribute()) {
        log::warn!("could not write transform attribute: {err}");
    }
}

/// Repositions the surface's viewport-tracking box to cover the visible area
/// with margin on every edge. The box lives in the overlay's anchor-relative
/// layer frame, so its origin moves as the map pans.
pub(crate) fn update_surface_box(
    host: &dyn MapHost,
    surface: &mut dyn VectorSurface,
    anchor: &OriginAnchor,
) {
    let size = host.size();
    let pad = size.multiply(SURFACE_PADDING);
    let top_left = anchor
        .pixel_shift_at(host, host.zoom(), &host.center())
        .multiply(-1.0);

    surface.set_viewport_box(top_left.subtract(&pad), size.add(&pad.multiply(2.0)));
}
