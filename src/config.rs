//! Render configuration.
//!
//! Everything here has a sensible default so `RenderConfig::default()` is a
//! complete, usable configuration. The struct is serde-serializable so
//! callers can load it from JSON alongside their document pipeline.

use serde::{Deserialize, Serialize};

/// Configuration for one rendering call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Base font size in points.
    pub font_size: f64,

    /// Decimal places for coordinates written into the SVG.
    pub precision: usize,

    /// Emit each glyph as a reusable `<symbol>` + `<use>` (SVG 2 style).
    /// When false, every glyph is written as an inline `<path>`, which
    /// renders correctly in strict SVG 1.1 viewers.
    pub symbol_reuse: bool,

    /// Move `<symbol>` definitions into a `<defs>` block at the top of the
    /// document instead of interleaving them with content.
    pub defs: bool,

    /// Floor for script scaling: glyphs never shrink below
    /// `font_size * min_size_fraction` no matter how deeply nested.
    pub min_size_fraction: f64,

    /// Default draw color. None inherits from the surrounding document.
    pub color: Option<String>,

    /// Default background fill behind the expression.
    pub background: Option<String>,

    /// Stroke each layout node's bounding box in blue (debugging aid).
    pub debug_bbox: bool,

    /// Stroke each layout node's baseline in red (debugging aid).
    pub debug_baseline: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            precision: 4,
            symbol_reuse: true,
            defs: false,
            min_size_fraction: 0.3,
            color: None,
            background: None,
            debug_bbox: false,
            debug_baseline: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = RenderConfig::default();
        assert_eq!(cfg.font_size, 24.0);
        assert_eq!(cfg.min_size_fraction, 0.3);
        assert!(cfg.symbol_reuse);
        assert!(!cfg.debug_bbox);
    }

    #[test]
    fn test_config_roundtrip_json() {
        let cfg = RenderConfig {
            precision: 2,
            symbol_reuse: false,
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: RenderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.precision, 2);
        assert!(!back.symbol_reuse);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: RenderConfig = serde_json::from_str(r#"{"fontSize": 12.0}"#).unwrap();
        assert_eq!(cfg.font_size, 12.0);
        assert_eq!(cfg.precision, 4);
    }
}
