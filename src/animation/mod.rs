pub mod driver;
pub mod interpolation;

pub use driver::{NativeZoomDriver, TimedZoomDriver, ZoomDriver};
pub use interpolation::{EasingFunction, Interpolation};
