use crate::core::geo::{LatLng, Point};
use crate::overlay::rounding::with_rounding_disabled;
use crate::traits::MapHost;

/// Fixed geographic reference point for the overlay's local coordinate space.
///
/// Captured once when the overlay attaches: the geographic point sitting
/// under the surface's local (0,0). The pixel offset to that point is
/// recomputed from `geo_origin` on every call rather than accumulated, so the
/// host's internal pixel rounding can never make the anchor drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginAnchor {
    geo_origin: LatLng,
    zoom_at_capture: f64,
}

impl OriginAnchor {
    /// Reads the host's current state and anchors the geographic point at the
    /// viewport's pixel origin
    pub fn capture(host: &dyn MapHost) -> Self {
        let zoom = host.zoom();
        let geo_origin =
            with_rounding_disabled(host, || host.unproject(&host.pixel_origin(), zoom));

        Self {
            geo_origin,
            zoom_at_capture: zoom,
        }
    }

    /// The anchored geographic point; never changes while attached
    pub fn geo_origin(&self) -> LatLng {
        self.geo_origin
    }

    /// Zoom level at which the anchor was captured
    pub fn zoom_at_capture(&self) -> f64 {
        self.zoom_at_capture
    }

    /// Pixel offset of the anchored point from the surface's top-left at the
    /// given zoom and center, computed with sub-pixel precision
    pub fn pixel_shift_at(&self, host: &dyn MapHost, zoom: f64, center: &LatLng) -> Point {
        with_rounding_disabled(host, || {
            host.project(&self.geo_origin, zoom)
                .subtract(&host.pixel_origin_at(zoom, center))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::viewport::Viewport;

    #[test]
    fn test_capture_records_zoom() {
        let viewport = Viewport::new(LatLng::new(40.0, -74.0), 10.0, Point::new(800.0, 600.0));
        let anchor = OriginAnchor::capture(&viewport);

        assert_eq!(anchor.zoom_at_capture(), 10.0);
        assert!(anchor.geo_origin().is_valid());
    }

    #[test]
    fn test_shift_zero_at_capture_state() {
        let viewport = Viewport::new(LatLng::new(40.0, -74.0), 10.0, Point::new(800.0, 600.0));
        let anchor = OriginAnchor::capture(&viewport);

        let shift = anchor.pixel_shift_at(&viewport, 10.0, &viewport.center);
        assert!(shift.x.abs() < 1e-6);
        assert!(shift.y.abs() < 1e-6);
    }

    #[test]
    fn test_shift_recomputed_not_accumulated() {
        let viewport = Viewport::new(LatLng::new(40.0, -74.0), 10.0, Point::new(800.0, 600.0));
        let anchor = OriginAnchor::capture(&viewport);
        let center = viewport.center;

        // Asking for the same zoom repeatedly must give bit-identical results
        let first = anchor.pixel_shift_at(&viewport, 12.0, &center);
        for _ in 0..10 {
            assert_eq!(anchor.pixel_shift_at(&viewport, 12.0, &center), first);
        }
    }

    #[test]
    fn test_shift_leaves_rounding_restored() {
        let viewport = Viewport::new(LatLng::new(40.0, -74.0), 10.0, Point::new(800.0, 600.0));
        let anchor = OriginAnchor::capture(&viewport);

        assert!(viewport.pixel_rounding());
        anchor.pixel_shift_at(&viewport, 11.5, &viewport.center);
        assert!(viewport.pixel_rounding());
    }
}
