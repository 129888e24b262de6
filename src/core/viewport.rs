use crate::core::constants::{EARTH_RADIUS, TILE_SIZE};
use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::events::{EventEmitter, EventKind, ListenerHandle, ViewportEvent};
use crate::traits::{HostCapabilities, MapHost};
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};

/// Reference host viewport: center, zoom, screen size and Web Mercator
/// projection, with the event emission and pixel-rounding behavior the
/// overlay engine expects from a real map component.
///
/// Projection output is rounded to integer pixels by default, matching
/// web-map hosts; the engine disables rounding around its own calls.
#[derive(Debug)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
    /// Whether this host emits separate zoom-begin/step/end events
    animated_zoom: bool,
    /// Rounding switch on projection output
    rounding: AtomicBool,
    events: EventEmitter,
}

impl Viewport {
    /// Creates a new viewport with animated-zoom events enabled
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(0.0, 18.0),
            size,
            min_zoom: 0.0,
            max_zoom: 18.0,
            animated_zoom: true,
            rounding: AtomicBool::new(true),
            events: EventEmitter::new(),
        }
    }

    /// Creates a legacy-shaped viewport that only emits combined
    /// view-reset events
    pub fn new_legacy(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            animated_zoom: false,
            ..Self::new(center, zoom, size)
        }
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    /// Raw Web Mercator projection (EPSG:3857) to world pixels, no rounding
    fn project_raw(&self, lat_lng: &LatLng, zoom: f64) -> Point {
        let scale = f64::from(TILE_SIZE) * 2_f64.powf(zoom);

        let lat = LatLng::clamp_lat(lat_lng.lat);
        let x = lat_lng.lng.to_radians() * EARTH_RADIUS;
        let y = ((PI / 4.0 + lat.to_radians() / 2.0).tan().ln()) * EARTH_RADIUS;

        let world = 2.0 * PI * EARTH_RADIUS;
        let pixel_x = (x + PI * EARTH_RADIUS) / world * scale;
        let pixel_y = (-y + PI * EARTH_RADIUS) / world * scale;

        Point::new(pixel_x, pixel_y)
    }

    /// Inverse Web Mercator projection from world pixels
    fn unproject_raw(&self, pixel: &Point, zoom: f64) -> LatLng {
        let scale = f64::from(TILE_SIZE) * 2_f64.powf(zoom);
        let world = 2.0 * PI * EARTH_RADIUS;

        let x = (pixel.x / scale) * world - PI * EARTH_RADIUS;
        let y = PI * EARTH_RADIUS - (pixel.y / scale) * world;

        let lng = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();

        LatLng::new(lat, lng)
    }

    fn maybe_round(&self, point: Point) -> Point {
        if self.rounding.load(Ordering::Relaxed) {
            point.rounded()
        } else {
            point
        }
    }

    /// Resizes the viewport; the surface box no longer covers the view,
    /// so this counts as a pan for event purposes
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
        self.events.emit(ViewportEvent::PanEnd);
    }

    /// Pans the viewport by the given pixel offset
    pub fn pan(&mut self, delta: Point) {
        let center_px = self.project_raw(&self.center, self.zoom);
        self.center = self.unproject_raw(&center_px.add(&delta), self.zoom);
        self.events.emit(ViewportEvent::PanEnd);
    }

    /// Zooms to a new level around the current center
    pub fn zoom_to(&mut self, zoom: f64) {
        let center = self.center;
        self.set_view(center, zoom);
    }

    /// Moves the view to a new center and zoom, emitting the event sequence
    /// appropriate for this host's capabilities
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);

        if self.animated_zoom {
            self.events.emit(ViewportEvent::ZoomBegin);
            self.events.emit(ViewportEvent::ZoomStep {
                zoom: Some(zoom),
                center: Some(center),
            });
            self.center = center;
            self.zoom = zoom;
            self.events.emit(ViewportEvent::ZoomEnd { zoom: Some(zoom) });
        } else {
            self.center = center;
            self.zoom = zoom;
            self.events.emit(ViewportEvent::ViewReset {
                zoom: Some(zoom),
                center: Some(center),
            });
        }
    }

    /// Drains queued events for dispatch by the embedding event loop
    pub fn drain_events(&mut self) -> Vec<ViewportEvent> {
        self.events.drain()
    }

    /// Number of live listener registrations
    pub fn listener_count(&self) -> usize {
        self.events.listener_count()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

impl MapHost for Viewport {
    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn size(&self) -> Point {
        self.size
    }

    fn pixel_origin(&self) -> Point {
        self.pixel_origin_at(self.zoom, &self.center)
    }

    fn pixel_origin_at(&self, zoom: f64, center: &LatLng) -> Point {
        let origin = self
            .project_raw(center, zoom)
            .subtract(&self.size.multiply(0.5));
        self.maybe_round(origin)
    }

    fn project(&self, coord: &LatLng, zoom: f64) -> Point {
        self.maybe_round(self.project_raw(coord, zoom))
    }

    fn unproject(&self, point: &Point, zoom: f64) -> LatLng {
        self.unproject_raw(point, zoom)
    }

    fn bounds(&self) -> LatLngBounds {
        let center_px = self.project_raw(&self.center, self.zoom);
        let half = self.size.multiply(0.5);
        let nw = self.unproject_raw(&center_px.subtract(&half), self.zoom);
        let se = self.unproject_raw(&center_px.add(&half), self.zoom);

        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    fn pixel_rounding(&self) -> bool {
        self.rounding.load(Ordering::Relaxed)
    }

    fn set_pixel_rounding(&self, enabled: bool) {
        self.rounding.store(enabled, Ordering::Relaxed);
    }

    fn capabilities(&self) -> HostCapabilities {
        HostCapabilities {
            animated_zoom: self.animated_zoom,
        }
    }

    fn subscribe(&mut self, kind: EventKind) -> ListenerHandle {
        self.events.subscribe(kind)
    }

    fn unsubscribe(&mut self, handle: ListenerHandle) {
        self.events.unsubscribe(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(
            LatLng::new(40.7128, -74.0060),
            10.0,
            Point::new(800.0, 600.0),
        );

        assert_eq!(viewport.zoom, 10.0);
        assert_eq!(viewport.center.lat, 40.7128);
        assert_eq!(viewport.size.x, 800.0);
        assert!(viewport.capabilities().animated_zoom);
        assert!(!Viewport::new_legacy(LatLng::default(), 1.0, Point::new(100.0, 100.0))
            .capabilities()
            .animated_zoom);
    }

    #[test]
    fn test_projection_round_trip() {
        let viewport = Viewport::default();
        viewport.set_pixel_rounding(false);

        let coord = LatLng::new(47.3769, 8.5417);
        for zoom in [0.0, 5.0, 12.0, 18.0] {
            let pixel = viewport.project(&coord, zoom);
            let back = viewport.unproject(&pixel, zoom);
            assert!((back.lat - coord.lat).abs() < 1e-9);
            assert!((back.lng - coord.lng).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rounding_default_on() {
        let viewport = Viewport::default();
        let pixel = viewport.project(&LatLng::new(47.3769, 8.5417), 10.0);
        assert_eq!(pixel.x, pixel.x.round());
        assert_eq!(pixel.y, pixel.y.round());

        viewport.set_pixel_rounding(false);
        let precise = viewport.project(&LatLng::new(47.3769, 8.5417), 10.0);
        assert!(precise.x.fract() != 0.0 || precise.y.fract() != 0.0);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(2.0, 15.0);

        viewport.zoom_to(1.0); // Below minimum
        assert_eq!(viewport.zoom, 2.0);

        viewport.zoom_to(20.0); // Above maximum
        assert_eq!(viewport.zoom, 15.0);
    }

    #[test]
    fn test_pan_emits_pan_end() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 1.0, Point::new(512.0, 512.0));
        viewport.subscribe(EventKind::PanEnd);

        let original_center = viewport.center;
        viewport.pan(Point::new(10.0, 10.0));

        assert_ne!(viewport.center, original_center);
        assert_eq!(viewport.drain_events(), vec![ViewportEvent::PanEnd]);
    }

    #[test]
    fn test_resize_counts_as_pan() {
        let mut viewport = Viewport::default();
        viewport.subscribe(EventKind::PanEnd);

        viewport.set_size(Point::new(1024.0, 768.0));
        assert_eq!(viewport.size, Point::new(1024.0, 768.0));
        assert_eq!(viewport.drain_events(), vec![ViewportEvent::PanEnd]);
    }

    #[test]
    fn test_animated_zoom_event_sequence() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 5.0, Point::new(512.0, 512.0));
        for kind in [EventKind::ZoomBegin, EventKind::ZoomStep, EventKind::ZoomEnd] {
            viewport.subscribe(kind);
        }

        viewport.zoom_to(6.0);
        let events = viewport.drain_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ViewportEvent::ZoomBegin);
        assert!(matches!(events[1], ViewportEvent::ZoomStep { zoom: Some(z), .. } if z == 6.0));
        assert_eq!(events[2], ViewportEvent::ZoomEnd { zoom: Some(6.0) });
    }

    #[test]
    fn test_legacy_view_reset() {
        let mut viewport =
            Viewport::new_legacy(LatLng::new(0.0, 0.0), 10.0, Point::new(512.0, 512.0));
        viewport.subscribe(EventKind::ViewReset);

        viewport.set_view(LatLng::new(1.0, 1.0), 12.0);
        let events = viewport.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ViewportEvent::ViewReset { zoom: Some(z), .. } if z == 12.0));
    }

    #[test]
    fn test_bounds_contain_center() {
        let viewport = Viewport::new(LatLng::new(40.0, -74.0), 8.0, Point::new(800.0, 600.0));
        let bounds = viewport.bounds();
        assert!(bounds.contains(&viewport.center));
        assert!(bounds.south_west.lat < bounds.north_east.lat);
        assert!(bounds.south_west.lng < bounds.north_east.lng);
    }
}
