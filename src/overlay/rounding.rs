//! Scoped suppression of the host's pixel rounding.
//!
//! The host rounds projection output to integer pixels by default, which is
//! fine for its own bookkeeping but ruins the sub-pixel translate/scale math
//! this engine needs. Every projection call made for the engine's own
//! purposes runs inside [`with_rounding_disabled`]; the previous rounding
//! state is restored on every exit path, including panics in the wrapped
//! closure.

use crate::traits::MapHost;

/// Restores the host's rounding state on drop
struct RoundingGuard<'a> {
    host: &'a dyn MapHost,
    previous: bool,
}

impl<'a> RoundingGuard<'a> {
    fn disable(host: &'a dyn MapHost) -> Self {
        let previous = host.pixel_rounding();
        host.set_pixel_rounding(false);
        Self { host, previous }
    }
}

impl Drop for RoundingGuard<'_> {
    fn drop(&mut self) {
        self.host.set_pixel_rounding(self.previous);
    }
}

/// Runs `f` with the host's pixel rounding disabled, restoring the original
/// state afterwards even if `f` panics. Nesting is safe: each level restores
/// the state it observed.
pub fn with_rounding_disabled<T>(host: &dyn MapHost, f: impl FnOnce() -> T) -> T {
    let _guard = RoundingGuard::disable(host);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, Point};
    use crate::core::viewport::Viewport;
    use crate::traits::MapHost;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_disabled_inside_restored_after() {
        let viewport = Viewport::default();
        assert!(viewport.pixel_rounding());

        let inside = with_rounding_disabled(&viewport, || viewport.pixel_rounding());
        assert!(!inside);
        assert!(viewport.pixel_rounding());
    }

    #[test]
    fn test_nesting_restores_each_level() {
        let viewport = Viewport::default();
        with_rounding_disabled(&viewport, || {
            with_rounding_disabled(&viewport, || {
                assert!(!viewport.pixel_rounding());
            });
            // Inner guard restores the already-disabled state
            assert!(!viewport.pixel_rounding());
        });
        assert!(viewport.pixel_rounding());
    }

    #[test]
    fn test_restored_on_panic() {
        let viewport = Viewport::default();
        let result = catch_unwind(AssertUnwindSafe(|| {
            with_rounding_disabled(&viewport, || {
                panic!("draw callback blew up");
            })
        }));
        assert!(result.is_err());
        assert!(viewport.pixel_rounding());
    }

    #[test]
    fn test_projection_precise_inside_guard() {
        let viewport = Viewport::new(LatLng::new(35.0, 139.0), 10.0, Point::new(800.0, 600.0));
        let precise = with_rounding_disabled(&viewport, || {
            viewport.project(&LatLng::new(35.0, 139.0), 10.0)
        });
        let rounded = viewport.project(&LatLng::new(35.0, 139.0), 10.0);
        assert_eq!(rounded, rounded.rounded());
        assert!(precise.distance_to(&rounded) <= 2.0_f64.sqrt() / 2.0 + 1e-12);
    }
}
