//! Drawing primitives produced by layout.
//!
//! A layout tree bottoms out in these: positioned glyphs and the rules,
//! boxes, ellipses and diagonals that fraction bars, radicals and
//! enclosures are made of. Lines are drawn as filled rectangles so color
//! applies through `fill` without disturbing glyph strokes.
//!
//! Bounding boxes are y-up relative to the primitive's placement point;
//! dimensions are in output (pixel) units.

use crate::font::{BBox, Glyph};

/// A glyph scheduled for drawing at a specific size.
#[derive(Debug, Clone)]
pub struct GlyphDrawable {
    pub glyph: Glyph,
    /// Point size the glyph is rendered at.
    pub size: f64,
    /// size / units-per-em, for converting the glyph's font-unit metrics.
    pub em_scale: f64,
}

#[derive(Debug, Clone)]
pub enum Drawable {
    Glyph(GlyphDrawable),
    /// Horizontal rule extending right from the placement point, centered
    /// vertically on it.
    HLine { length: f64, thickness: f64 },
    /// Vertical rule extending down from the placement point, centered
    /// horizontally on it.
    VLine { height: f64, thickness: f64 },
    /// Stroked rectangle with its bottom-left at the placement point.
    Rect {
        width: f64,
        height: f64,
        thickness: f64,
        corner_radius: Option<f64>,
    },
    /// Stroked ellipse inscribed in the same box as [`Drawable::Rect`].
    Ellipse {
        width: f64,
        height: f64,
        thickness: f64,
    },
    /// Line from (0, height) down to (width, 0) in SVG coordinates. A
    /// negative height slants the other way.
    Diagonal {
        width: f64,
        height: f64,
        thickness: f64,
        arrow: bool,
    },
}

impl Drawable {
    /// Bounding box relative to the placement point, y-up.
    pub fn bbox(&self) -> BBox {
        match self {
            Drawable::Glyph(g) => g.glyph.bbox.scaled(g.em_scale),
            Drawable::HLine { length, thickness } => {
                BBox::new(0.0, *length, -thickness / 2.0, thickness / 2.0)
            }
            Drawable::VLine { height, thickness } => BBox::new(0.0, *thickness, 0.0, *height),
            Drawable::Rect { width, height, .. } | Drawable::Ellipse { width, height, .. } => {
                BBox::new(0.0, *width, 0.0, *height)
            }
            Drawable::Diagonal { width, height, .. } => BBox::new(0.0, *width, 0.0, *height),
        }
    }

    /// Horizontal advance after drawing.
    pub fn x_advance(&self) -> f64 {
        match self {
            Drawable::Glyph(g) => g.glyph.advance * g.em_scale,
            Drawable::HLine { length, .. } => *length,
            Drawable::VLine { .. } => 0.0,
            Drawable::Rect { width, .. }
            | Drawable::Ellipse { width, .. }
            | Drawable::Diagonal { width, .. } => *width,
        }
    }

    /// Extra bbox room an arrowhead needs past the line end.
    pub fn arrow_extent(&self) -> (f64, f64) {
        if let Drawable::Diagonal {
            width,
            height,
            thickness,
            arrow: true,
        } = self
        {
            let theta = (-height).atan2(*width);
            let reach = 10.0 + thickness * 2.0;
            (reach * theta.cos(), reach * theta.sin())
        } else {
            (0.0, 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::GlyphRef;
    use ttf_parser::GlyphId;

    #[test]
    fn test_glyph_bbox_scaled() {
        let d = Drawable::Glyph(GlyphDrawable {
            glyph: Glyph {
                gref: GlyphRef::Real(GlyphId(5)),
                advance: 600.0,
                bbox: BBox::new(50.0, 550.0, -100.0, 700.0),
            },
            size: 24.0,
            em_scale: 0.024,
        });
        let b = d.bbox();
        assert!((b.xmax - 13.2).abs() < 1e-9);
        assert!((b.ymin + 2.4).abs() < 1e-9);
        assert!((d.x_advance() - 14.4).abs() < 1e-9);
    }

    #[test]
    fn test_hline_centered_on_baseline() {
        let d = Drawable::HLine {
            length: 40.0,
            thickness: 2.0,
        };
        let b = d.bbox();
        assert_eq!(b.ymin, -1.0);
        assert_eq!(b.ymax, 1.0);
        assert_eq!(d.x_advance(), 40.0);
    }

    #[test]
    fn test_diagonal_arrow_extends_bbox() {
        let d = Drawable::Diagonal {
            width: 30.0,
            height: -40.0,
            thickness: 1.0,
            arrow: true,
        };
        let (aw, ah) = d.arrow_extent();
        assert!(aw > 0.0);
        assert!(ah > 0.0);
        let no_arrow = Drawable::Diagonal {
            width: 30.0,
            height: -40.0,
            thickness: 1.0,
            arrow: false,
        };
        assert_eq!(no_arrow.arrow_extent(), (0.0, 0.0));
    }
}
