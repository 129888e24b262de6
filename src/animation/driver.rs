//! Zoom transition animation strategies.
//!
//! Chosen once at attach time: hosts whose surface offers a declarative
//! transform animation get [`NativeZoomDriver`]; everything else (and callers
//! forcing `js_animation`) gets [`TimedZoomDriver`], a timed interpolation
//! advanced by the host's timer facility. Both paths reach the same final
//! transform because the synchronizer snaps to the exact target on zoom-end;
//! only the visual interpolation differs.

use crate::animation::interpolation::EasingFunction;
use crate::overlay::sync::Transform;
use crate::traits::{AnimationHandle, NodeId, VectorSurface};
use crate::Result;
use instant::Instant;
use std::time::Duration;

/// One zoom transition animation at a time; superseded transitions must be
/// cancelled before a new one starts.
pub trait ZoomDriver {
    /// Begins driving `node`'s transform from `from` to `to` over `duration`
    fn start(
        &mut self,
        surface: &mut dyn VectorSurface,
        node: NodeId,
        from: Transform,
        to: Transform,
        duration: Duration,
    ) -> Result<()>;

    /// Advances a timed interpolation, writing the current transform to the
    /// surface. No-op for native animations, which run on the host timeline.
    /// Returns whether an animation is still in flight.
    fn tick(&mut self, surface: &mut dyn VectorSurface, node: NodeId) -> bool;

    /// The in-flight interpolated transform, when the driver can know it
    fn current(&self) -> Option<Transform>;

    /// Cancels and disposes the active animation; stale handles are a no-op
    fn cancel(&mut self, surface: &mut dyn VectorSurface);

    fn is_active(&self) -> bool;
}

/// Delegates the transition to the surface's declarative animation primitive
#[derive(Debug, Default)]
pub struct NativeZoomDriver {
    handle: Option<AnimationHandle>,
}

impl NativeZoomDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ZoomDriver for NativeZoomDriver {
    fn start(
        &mut self,
        surface: &mut dyn VectorSurface,
        node: NodeId,
        from: Transform,
        to: Transform,
        duration: Duration,
    ) -> Result<()> {
        if let Some(previous) = self.handle.take() {
            surface.cancel_transform_animation(previous);
        }
        self.handle = Some(surface.begin_transform_animation(node, &from, &to, duration)?);
        Ok(())
    }

    fn tick(&mut self, _surface: &mut dyn VectorSurface, _node: NodeId) -> bool {
        self.handle.is_some()
    }

    fn current(&self) -> Option<Transform> {
        // The host timeline owns the in-flight value
        None
    }

    fn cancel(&mut self, surface: &mut dyn VectorSurface) {
        if let Some(handle) = self.handle.take() {
            surface.cancel_transform_animation(handle);
        }
    }

    fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

struct TransformTween {
    from: Transform,
    to: Transform,
    started: Instant,
    duration: Duration,
    last_progress: f64,
}

/// Timed interpolation fallback for surfaces without a native animation
/// primitive. The embedding event loop advances it via
/// [`crate::overlay::SvgOverlay::tick_animation`].
pub struct TimedZoomDriver {
    tween: Option<TransformTween>,
    easing: EasingFunction,
}

impl TimedZoomDriver {
    pub fn new() -> Self {
        Self {
            tween: None,
            easing: EasingFunction::EaseOutCubic,
        }
    }

    /// Writes the transform for normalized progress `t`; returns whether the
    /// tween remains active
    fn apply_progress(&mut self, surface: &mut dyn VectorSurface, node: NodeId, t: f64) -> bool {
        let Some(tween) = self.tween.as_mut() else {
            return false;
        };

        let t = t.clamp(0.0, 1.0);
        tween.last_progress = t;
        let current = tween.from.lerp(&tween.to, self.easing.apply(t));
        if let Err(err) = surface.set_attribute(node, "transform", &current.to_attribute()) {
            log::warn!("zoom tween could not write transform: {err}");
            self.tween = None;
            return false;
        }

        if t >= 1.0 {
            self.tween = None;
            false
        } else {
            true
        }
    }
}

impl Default for TimedZoomDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoomDriver for TimedZoomDriver {
    fn start(
        &mut self,
        _surface: &mut dyn VectorSurface,
        _node: NodeId,
        from: Transform,
        to: Transform,
        duration: Duration,
    ) -> Result<()> {
        self.tween = Some(TransformTween {
            from,
            to,
            started: Instant::now(),
            duration,
            last_progress: 0.0,
        });
        Ok(())
    }

    fn tick(&mut self, surface: &mut dyn VectorSurface, node: NodeId) -> bool {
        let Some(tween) = self.tween.as_ref() else {
            return false;
        };
        let elapsed = tween.started.elapsed().as_secs_f64();
        let t = if tween.duration.is_zero() {
            1.0
        } else {
            elapsed / tween.duration.as_secs_f64()
        };
        self.apply_progress(surface, node, t)
    }

    fn current(&self) -> Option<Transform> {
        let tween = self.tween.as_ref()?;
        Some(
            tween
                .from
                .lerp(&tween.to, self.easing.apply(tween.last_progress)),
        )
    }

    fn cancel(&mut self, _surface: &mut dyn VectorSurface) {
        self.tween = None;
    }

    fn is_active(&self) -> bool {
        self.tween.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;
    use crate::surface::MemorySurface;

    fn transforms() -> (Transform, Transform) {
        (
            Transform::identity(),
            Transform::new(Point::new(100.0, -50.0), 2.0),
        )
    }

    #[test]
    fn test_native_driver_handle_lifecycle() {
        let mut surface = MemorySurface::new();
        let node = surface.create_group(None).unwrap();
        let mut driver = NativeZoomDriver::new();
        let (from, to) = transforms();

        driver
            .start(&mut surface, node, from, to, Duration::from_millis(250))
            .unwrap();
        assert!(driver.is_active());
        assert_eq!(surface.animations_created(), 1);

        driver.cancel(&mut surface);
        assert!(!driver.is_active());
        assert_eq!(surface.animations_disposed(), 1);

        // Cancelling again is a no-op, not an error
        driver.cancel(&mut surface);
        assert_eq!(surface.animations_disposed(), 1);
    }

    #[test]
    fn test_native_driver_supersede_disposes_previous() {
        let mut surface = MemorySurface::new();
        let node = surface.create_group(None).unwrap();
        let mut driver = NativeZoomDriver::new();
        let (from, to) = transforms();

        driver
            .start(&mut surface, node, from, to, Duration::from_millis(250))
            .unwrap();
        driver
            .start(&mut surface, node, from, to, Duration::from_millis(250))
            .unwrap();

        assert_eq!(surface.animations_created(), 2);
        assert_eq!(surface.animations_disposed(), 1);
        assert_eq!(surface.active_animations(), 1);
    }

    #[test]
    fn test_timed_driver_interpolates() {
        let mut surface = MemorySurface::new();
        let node = surface.create_group(None).unwrap();
        let mut driver = TimedZoomDriver::new();
        let (from, to) = transforms();

        driver
            .start(&mut surface, node, from, to, Duration::from_millis(250))
            .unwrap();
        assert!(driver.is_active());

        assert!(driver.apply_progress(&mut surface, node, 0.0));
        assert_eq!(
            surface.attribute(node, "transform").unwrap(),
            from.to_attribute()
        );

        // Completion writes the exact target and deactivates the tween
        assert!(!driver.apply_progress(&mut surface, node, 1.0));
        assert_eq!(
            surface.attribute(node, "transform").unwrap(),
            to.to_attribute()
        );
        assert!(!driver.is_active());
    }

    #[test]
    fn test_timed_driver_current_mid_flight() {
        let mut surface = MemorySurface::new();
        let node = surface.create_group(None).unwrap();
        let mut driver = TimedZoomDriver::new();
        let (from, to) = transforms();

        driver
            .start(&mut surface, node, from, to, Duration::from_millis(250))
            .unwrap();
        driver.apply_progress(&mut surface, node, 0.5);

        let current = driver.current().unwrap();
        assert!(current.scale > from.scale);
        assert!(current.scale < to.scale);

        driver.cancel(&mut surface);
        assert!(driver.current().is_none());
    }

    #[test]
    fn test_zero_duration_completes_on_first_tick() {
        let mut surface = MemorySurface::new();
        let node = surface.create_group(None).unwrap();
        let mut driver = TimedZoomDriver::new();
        let (from, to) = transforms();

        driver
            .start(&mut surface, node, from, to, Duration::ZERO)
            .unwrap();
        assert!(!driver.tick(&mut surface, node));
        assert_eq!(
            surface.attribute(node, "transform").unwrap(),
            to.to_attribute()
        );
    }
}
