//! Overlet keeps a vector drawing surface glued to a pannable, zoomable map
//! viewport.
//!
//! The engine captures a geographic origin anchor when an overlay attaches,
//! projects drawing coordinates relative to that anchor, and reacts to the
//! host's pan and zoom lifecycle by animating and committing a single
//! translate-and-scale transform on the overlay's root group. Drawn geometry
//! stays registered with the map without re-projecting every shape on every
//! frame.
//!
//! # Example
//!
//! ```
//! use overlet::core::geo::{LatLng, Point};
//! use overlet::core::viewport::Viewport;
//! use overlet::surface::MemorySurface;
//! use overlet::SvgOverlay;
//!
//! let mut map = Viewport::new(LatLng::new(47.37, 8.54), 12.0, Point::new(800.0, 600.0));
//! let mut surface = MemorySurface::new();
//!
//! let mut overlay = SvgOverlay::new(|selection, projection, _zoom| {
//!     let local = projection.geo_to_local(&LatLng::new(47.38, 8.55), None);
//!     let marker = selection.append_group().unwrap();
//!     selection
//!         .attr(marker, "transform", &format!("translate({},{})", local.x, local.y))
//!         .unwrap();
//! });
//! overlay.attach(&mut map, &mut surface).unwrap();
//!
//! map.zoom_to(13.0);
//! for event in map.drain_events() {
//!     overlay.handle_event(&map, &mut surface, &event).unwrap();
//! }
//! assert_eq!(overlay.committed_zoom(), Some(13.0));
//! ```

pub mod animation;
pub mod core;
pub mod events;
pub mod overlay;
pub mod prelude;
pub mod surface;
pub mod traits;

pub use crate::overlay::{
    OriginAnchor, OverlayOptions, Projection, Selection, SvgOverlay, SyncState, Transform,
};
pub use crate::traits::{AnimationHandle, HostCapabilities, MapHost, NodeId, VectorSurface};

use thiserror::Error;

/// Errors surfaced by the overlay engine
#[derive(Debug, Error)]
pub enum OverlayError {
    /// A required collaborator is absent from the environment
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// Operation requires the overlay to be attached to a host
    #[error("overlay is not attached to a map host")]
    NotAttached,

    /// The vector surface rejected an operation
    #[error("surface error: {0}")]
    Surface(String),

    /// Overlay options could not be parsed
    #[error("invalid overlay options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, OverlayError>;
