//! Convenient re-exports for overlay embedding code

pub use crate::core::geo::{LatLng, LatLngBounds, Point};
pub use crate::core::viewport::Viewport;
pub use crate::events::{EventKind, ViewportEvent};
pub use crate::overlay::{
    OriginAnchor, OverlayOptions, Projection, Selection, SvgOverlay, Transform,
};
pub use crate::surface::MemorySurface;
pub use crate::traits::{AnimationHandle, HostCapabilities, MapHost, NodeId, VectorSurface};
pub use crate::{OverlayError, Result};
