//! Trait boundaries for the two external collaborators: the host map viewport
//! and the vector rendering surface. The engine only ever talks to these
//! traits; `core::viewport::Viewport` and `surface::MemorySurface` are the
//! in-crate reference implementations.

use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::events::{EventKind, ListenerHandle};
use crate::overlay::sync::Transform;
use crate::Result;
use std::time::Duration;

/// What the host viewport can do, detected once at attach time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Host emits separate zoom-begin/step/end events; hosts without this
    /// only offer the combined view-reset event
    pub animated_zoom: bool,
}

/// The host map viewport boundary.
///
/// The overlay reads pan/zoom state and projection math through this trait and
/// registers for lifecycle events. The pixel-rounding switch mirrors the
/// host's own coordinate rounding behavior: projection output is rounded to
/// integer pixels by default, and the engine temporarily disables it (through
/// [`crate::overlay::rounding::with_rounding_disabled`]) whenever it needs
/// sub-pixel precision.
pub trait MapHost {
    fn zoom(&self) -> f64;
    fn center(&self) -> LatLng;
    fn size(&self) -> Point;

    /// Pixel origin (top-left geographic reference in world pixel space) at
    /// the current zoom and center
    fn pixel_origin(&self) -> Point;

    /// Pixel origin the viewport would have at the given zoom and center
    fn pixel_origin_at(&self, zoom: f64, center: &LatLng) -> Point;

    /// Projects a geographic coordinate to world pixel space at the given zoom
    fn project(&self, coord: &LatLng, zoom: f64) -> Point;

    /// Inverse of `project`
    fn unproject(&self, point: &Point, zoom: f64) -> LatLng;

    /// Current geographic bounds of the viewport
    fn bounds(&self) -> LatLngBounds;

    /// Whether projection output is currently rounded to integer pixels
    fn pixel_rounding(&self) -> bool;

    /// Toggles projection rounding. Interior-mutable; single writer at a time,
    /// always restored before control returns to another caller.
    fn set_pixel_rounding(&self, enabled: bool);

    fn capabilities(&self) -> HostCapabilities;

    fn subscribe(&mut self, kind: EventKind) -> ListenerHandle;
    fn unsubscribe(&mut self, handle: ListenerHandle);
}

/// Identifies a node created on the vector surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Identifies a declarative animation created on the vector surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(pub u64);

/// The vector rendering surface boundary.
///
/// Node creation, attribute updates and the native declarative animation
/// primitive live behind this trait; the engine never touches the surface's
/// node representation directly.
pub trait VectorSurface {
    /// Creates a nested group node, optionally under a parent
    fn create_group(&mut self, parent: Option<NodeId>) -> Result<NodeId>;

    /// Sets a string-valued attribute on a node
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()>;

    /// Shows or hides a node
    fn set_visible(&mut self, node: NodeId, visible: bool);

    /// Removes a node and its children; unknown nodes are ignored
    fn remove_node(&mut self, node: NodeId);

    /// Positions the surface's viewport-tracking box (origin and size in
    /// layer pixel coordinates)
    fn set_viewport_box(&mut self, origin: Point, size: Point);

    /// Whether the surface offers a native declarative transform animation
    fn supports_transform_animation(&self) -> bool;

    /// Starts a native animation driving `node`'s transform attribute from
    /// `from` to `to` over `duration`
    fn begin_transform_animation(
        &mut self,
        node: NodeId,
        from: &Transform,
        to: &Transform,
        duration: Duration,
    ) -> Result<AnimationHandle>;

    /// Disposes a native animation; a stale or unknown handle is a no-op
    fn cancel_transform_animation(&mut self, handle: AnimationHandle);
}
