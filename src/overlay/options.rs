use crate::Result;
use serde::{Deserialize, Serialize};

/// Overlay behavior options.
///
/// JSON field names use the camelCase spelling hosts conventionally pass
/// (`zoomHide`, `zoomDraw`, ...); unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct OverlayOptions {
    /// Hide the surface during zoom transitions when the host supports it
    pub zoom_hide: bool,
    /// Redraw automatically on every committed zoom change
    pub zoom_draw: bool,
    /// Use interpolated zoom transitions when the host supports them
    pub zoom_animate: bool,
    /// Force the timed-interpolation fallback even when the surface offers a
    /// native animation primitive
    pub js_animation: bool,
    /// Redraw on every pan-end
    pub pan_draw: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            zoom_hide: false,
            zoom_draw: true,
            zoom_animate: true,
            js_animation: false,
            pan_draw: false,
        }
    }
}

impl OverlayOptions {
    /// Parses options from structured JSON, filling omitted fields with
    /// defaults
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = OverlayOptions::default();
        assert!(!options.zoom_hide);
        assert!(options.zoom_draw);
        assert!(options.zoom_animate);
        assert!(!options.js_animation);
        assert!(!options.pan_draw);
    }

    #[test]
    fn test_from_json_partial() {
        let options = OverlayOptions::from_json(json!({ "zoomHide": true })).unwrap();
        assert!(options.zoom_hide);
        assert!(options.zoom_draw); // untouched default
    }

    #[test]
    fn test_from_json_rejects_unknown() {
        assert!(OverlayOptions::from_json(json!({ "zoomHidden": true })).is_err());
    }
}
