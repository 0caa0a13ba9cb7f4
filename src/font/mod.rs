//! # Math Font
//!
//! Wraps a loaded OpenType font and exposes the pieces the layout engine
//! needs: glyph lookup, outline metrics, shaped text runs, and the decoded
//! MATH table (constants, per-glyph info, variants, kerning).
//!
//! A font without a MATH table cannot be used for math layout, so
//! construction fails up front rather than degrading later.

pub mod kerning;
pub mod math;
pub mod variants;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use ttf_parser::GlyphId;

use crate::error::MathError;
use math::MathConstants;

/// Bounding box in y-up coordinates relative to the baseline.
/// Invariant: `xmin <= xmax` and `ymin <= ymax` for every constructed box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BBox {
    pub const ZERO: BBox = BBox {
        xmin: 0.0,
        xmax: 0.0,
        ymin: 0.0,
        ymax: 0.0,
    };

    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Scale all four coordinates by a factor.
    pub fn scaled(&self, s: f64) -> BBox {
        BBox::new(self.xmin * s, self.xmax * s, self.ymin * s, self.ymax * s)
    }
}

/// Reference to either a real font glyph or a composite assembled from
/// extender parts. Assembled glyphs carry their full recipe instead of
/// borrowing a sentinel id from the real glyph space.
#[derive(Debug, Clone)]
pub enum GlyphRef {
    Real(GlyphId),
    Assembled(Arc<AssembledGlyph>),
}

/// A composite glyph built from repeated assembly parts.
/// Part positions are in font units relative to the composite's origin.
#[derive(Debug, Clone)]
pub struct AssembledGlyph {
    pub parts: Vec<PlacedPart>,
    pub bbox: BBox,
    pub advance: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PlacedPart {
    pub glyph: GlyphId,
    pub dx: f64,
    pub dy: f64,
}

/// A glyph handle with its metrics in font units.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub gref: GlyphRef,
    pub advance: f64,
    pub bbox: BBox,
}

impl Glyph {
    /// The real glyph id, if this is not an assembled composite.
    pub fn id(&self) -> Option<GlyphId> {
        match self.gref {
            GlyphRef::Real(id) => Some(id),
            GlyphRef::Assembled(_) => None,
        }
    }
}

/// One glyph of a shaped text run, with advance in font units.
#[derive(Debug, Clone)]
pub struct ShapedGlyph {
    pub glyph: Glyph,
    pub ch: char,
    pub x_advance: f64,
}

/// A loaded math font. Borrows the raw font bytes for its lifetime.
pub struct MathFont<'a> {
    face: rustybuzz::Face<'a>,
    consts: MathConstants,
    units_per_em: f64,
}

impl std::fmt::Debug for MathFont<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MathFont")
            .field("consts", &self.consts)
            .field("units_per_em", &self.units_per_em)
            .finish_non_exhaustive()
    }
}

impl<'a> MathFont<'a> {
    /// Parse font data and decode its MATH constants.
    ///
    /// Fails if the data is not a valid font or the font carries no MATH
    /// table; there is no meaningful fallback for math layout.
    pub fn new(data: &'a [u8]) -> Result<Self, MathError> {
        let face = rustybuzz::Face::from_slice(data, 0)
            .ok_or_else(|| MathError::Font("could not parse font data".to_string()))?;
        let math = face
            .tables()
            .math
            .ok_or_else(|| MathError::Font("font has no MATH table".to_string()))?;
        let constants = math
            .constants
            .ok_or_else(|| MathError::Font("font MATH table has no constants".to_string()))?;
        let consts = MathConstants::from_table(&constants);
        let units_per_em = f64::from(face.units_per_em());
        Ok(Self {
            face,
            consts,
            units_per_em,
        })
    }

    pub fn units_per_em(&self) -> f64 {
        self.units_per_em
    }

    pub fn consts(&self) -> &MathConstants {
        &self.consts
    }

    fn math(&self) -> ttf_parser::math::Table<'a> {
        // Presence was checked at construction.
        self.face.tables().math.unwrap()
    }

    /// Look up the glyph for a character, falling back to .notdef.
    pub fn glyph_for_char(&self, ch: char) -> Glyph {
        let id = self.face.glyph_index(ch).unwrap_or(GlyphId(0));
        self.glyph_by_id(id)
    }

    /// Metrics for a real glyph id.
    pub fn glyph_by_id(&self, id: GlyphId) -> Glyph {
        let advance = f64::from(self.face.glyph_hor_advance(id).unwrap_or(0));
        let bbox = self
            .face
            .glyph_bounding_box(id)
            .map(|r| {
                BBox::new(
                    f64::from(r.x_min),
                    f64::from(r.x_max),
                    f64::from(r.y_min),
                    f64::from(r.y_max),
                )
            })
            .unwrap_or(BBox::ZERO);
        Glyph {
            gref: GlyphRef::Real(id),
            advance,
            bbox,
        }
    }

    /// Shape a text run. `script_context` enables the `ssty` feature so
    /// glyphs like prime marks swap to their script-sized forms.
    pub fn shape_run(&self, text: &str, script_context: bool) -> Vec<ShapedGlyph> {
        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        let features = if script_context {
            vec![rustybuzz::Feature::new(
                ttf_parser::Tag::from_bytes(b"ssty"),
                1,
                ..,
            )]
        } else {
            Vec::new()
        };
        let output = rustybuzz::shape(&self.face, &features, buffer);
        let chars: Vec<char> = text.chars().collect();
        let infos = output.glyph_infos();
        let positions = output.glyph_positions();
        let mut char_index_by_byte: HashMap<u32, usize> = HashMap::new();
        for (i, (byte, _)) in text.char_indices().enumerate() {
            char_index_by_byte.insert(byte as u32, i);
        }
        infos
            .iter()
            .zip(positions.iter())
            .map(|(info, pos)| {
                let ch = char_index_by_byte
                    .get(&info.cluster)
                    .and_then(|&i| chars.get(i))
                    .copied()
                    .unwrap_or('\u{FFFD}');
                ShapedGlyph {
                    glyph: self.glyph_by_id(GlyphId(info.glyph_id as u16)),
                    ch,
                    x_advance: f64::from(pos.x_advance),
                }
            })
            .collect()
    }

    /// Italics correction for a glyph, in font units.
    pub fn italic_correction(&self, id: GlyphId) -> Option<f64> {
        let value = self
            .math()
            .glyph_info?
            .italic_corrections?
            .get(id)
            .map(|v| f64::from(v.value))?;
        (value != 0.0).then_some(value)
    }

    /// Top accent attachment point for a glyph, in font units.
    pub fn top_accent(&self, id: GlyphId) -> Option<f64> {
        self.math()
            .glyph_info?
            .top_accent_attachments?
            .get(id)
            .map(|v| f64::from(v.value))
    }

    /// Whether the glyph is flagged as an extended (stretchy) shape.
    pub fn is_extended_shape(&self, id: GlyphId) -> bool {
        self.math()
            .glyph_info
            .and_then(|gi| gi.extended_shapes)
            .and_then(|cov| cov.get(id))
            .is_some()
    }

    /// Whether the font carries any per-glyph kerning data at all.
    pub fn has_kern_info(&self) -> bool {
        self.math()
            .glyph_info
            .map(|gi| gi.kern_infos.is_some())
            .unwrap_or(false)
    }

    /// Decode the four-corner kerning record for a glyph.
    pub fn kern_record(&self, id: GlyphId) -> Option<math::KernRecord> {
        let infos = self.math().glyph_info?.kern_infos?;
        let info = infos.get(id)?;
        Some(math::KernRecord::from_table(&info))
    }

    /// Decode the variant construction (size variants + assembly recipe)
    /// for a glyph along the given axis.
    pub fn construction(&self, id: GlyphId, vertical: bool) -> Option<math::Construction> {
        let variants = self.math().variants?;
        let constructions = if vertical {
            variants.vertical_constructions
        } else {
            variants.horizontal_constructions
        };
        constructions
            .get(id)
            .map(|c| math::Construction::from_table(&c))
    }

    /// Minimum connector overlap for glyph assembly, in font units.
    pub fn min_connector_overlap(&self) -> f64 {
        self.math()
            .variants
            .map(|v| f64::from(v.min_connector_overlap))
            .unwrap_or(0.0)
    }

    /// Outline a real glyph through the given builder.
    pub fn outline(&self, id: GlyphId, builder: &mut dyn ttf_parser::OutlineBuilder) -> bool {
        self.face.outline_glyph(id, builder).is_some()
    }
}

/// Process-wide cache of font bytes keyed by canonical path.
///
/// Fonts are read-only after load, so concurrent renders only contend on
/// the map itself.
pub struct FontCache {
    fonts: Mutex<HashMap<PathBuf, Arc<Vec<u8>>>>,
}

impl FontCache {
    fn new() -> Self {
        Self {
            fonts: Mutex::new(HashMap::new()),
        }
    }

    /// The shared process-wide cache.
    pub fn global() -> &'static FontCache {
        static CACHE: OnceLock<FontCache> = OnceLock::new();
        CACHE.get_or_init(FontCache::new)
    }

    /// Load font bytes, reading from disk only on first use.
    pub fn load(&self, path: &Path) -> Result<Arc<Vec<u8>>, MathError> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let mut fonts = self
            .fonts
            .lock()
            .map_err(|_| MathError::Font("font cache poisoned".to_string()))?;
        if let Some(data) = fonts.get(&key) {
            return Ok(Arc::clone(data));
        }
        let data = std::fs::read(path)
            .map_err(|e| MathError::Font(format!("could not read {}: {e}", path.display())))?;
        let data = Arc::new(data);
        fonts.insert(key, Arc::clone(&data));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_dimensions() {
        let b = BBox::new(-2.0, 10.0, -3.0, 5.0);
        assert_eq!(b.width(), 12.0);
        assert_eq!(b.height(), 8.0);
    }

    #[test]
    fn test_bbox_scaled() {
        let b = BBox::new(0.0, 100.0, -50.0, 50.0).scaled(0.5);
        assert_eq!(b.xmax, 50.0);
        assert_eq!(b.ymin, -25.0);
    }

    #[test]
    fn test_font_rejects_garbage() {
        let err = MathFont::new(&[0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, MathError::Font(_)));
    }

    #[test]
    fn test_glyph_ref_id() {
        let g = Glyph {
            gref: GlyphRef::Real(GlyphId(42)),
            advance: 500.0,
            bbox: BBox::ZERO,
        };
        assert_eq!(g.id(), Some(GlyphId(42)));
    }

    #[test]
    fn test_font_cache_missing_file() {
        let err = FontCache::global()
            .load(Path::new("/nonexistent/font.otf"))
            .unwrap_err();
        assert!(matches!(err, MathError::Font(_)));
    }
}
