use crate::core::constants::{EARTH_CIRCUMFERENCE, TILE_SIZE};
use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::overlay::anchor::OriginAnchor;
use crate::overlay::rounding::with_rounding_disabled;
use crate::traits::MapHost;

/// Conversion between geographic coordinates and the overlay's local pixel
/// space, handed to every draw callback invocation.
///
/// Stateless per call: each conversion recomputes from the anchor's
/// authoritative geographic origin at the requested zoom. When the zoom
/// argument is omitted, conversions use the synchronizer's committed zoom
/// (not the host's live zoom), so geometry computed mid-animation stays
/// consistent with the last fully-committed transform.
pub struct Projection<'a> {
    host: &'a dyn MapHost,
    anchor: &'a OriginAnchor,
    committed_zoom: f64,
}

impl<'a> Projection<'a> {
    pub fn new(host: &'a dyn MapHost, anchor: &'a OriginAnchor, committed_zoom: f64) -> Self {
        Self {
            host,
            anchor,
            committed_zoom,
        }
    }

    /// Projects a geographic coordinate into local surface pixels.
    ///
    /// `geo_to_local(anchor.geo_origin(), _)` is (0,0) at every zoom.
    pub fn geo_to_local(&self, coord: &LatLng, zoom: Option<f64>) -> Point {
        let z = zoom.unwrap_or(self.committed_zoom);
        with_rounding_disabled(self.host, || {
            self.host
                .project(coord, z)
                .subtract(&self.host.project(&self.anchor.geo_origin(), z))
        })
    }

    /// Inverse of [`geo_to_local`](Self::geo_to_local)
    pub fn local_to_geo(&self, point: &Point, zoom: Option<f64>) -> LatLng {
        let z = zoom.unwrap_or(self.committed_zoom);
        with_rounding_disabled(self.host, || {
            let origin = self.host.project(&self.anchor.geo_origin(), z);
            self.host.unproject(&point.add(&origin), z)
        })
    }

    /// Local pixels per meter at the given zoom (default: committed zoom),
    /// from the standard 256px-per-world relationship at zoom 0
    pub fn units_per_meter(&self, zoom: Option<f64>) -> f64 {
        let z = zoom.unwrap_or(self.committed_zoom);
        f64::from(TILE_SIZE) * 2_f64.powf(z) / EARTH_CIRCUMFERENCE
    }

    /// The zoom conversions use when no explicit zoom is given
    pub fn committed_zoom(&self) -> f64 {
        self.committed_zoom
    }

    /// Passthrough: the host's live zoom level
    pub fn zoom(&self) -> f64 {
        self.host.zoom()
    }

    /// Passthrough: the host's current geographic bounds
    pub fn bounds(&self) -> LatLngBounds {
        self.host.bounds()
    }
}
