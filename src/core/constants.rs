//! Core constants derived from Leaflet defaults and common web-map conventions.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Web Mercator sphere radius in meters (EPSG:3857).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Equatorial circumference of the projection sphere in meters.
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_017.0;

/// Latitude beyond which the Web Mercator projection degenerates.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Extra margin kept around the viewport by the drawing surface,
/// as a fraction of the viewport size on each edge.
pub const SURFACE_PADDING: f64 = 0.1;

/// Duration of an interpolated zoom transition in milliseconds.
pub const ZOOM_ANIMATION_MS: u64 = 250;
