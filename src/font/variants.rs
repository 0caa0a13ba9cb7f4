//! Stretchable glyph resolution.
//!
//! Fences, radicals, accents and large operators come in pre-drawn size
//! variants; past the largest variant the font supplies an assembly recipe
//! (repeatable extender parts joined with overlapping connectors). Sizing
//! is planned purely on the recipe numbers, then realized against the font.

use std::sync::Arc;

use ttf_parser::GlyphId;

use super::math::{AssemblyRecipe, Construction};
use super::{AssembledGlyph, BBox, Glyph, GlyphRef, MathFont, PlacedPart};

/// First pre-drawn variant at least as large as requested, scanning in
/// the font's increasing-size order. `None` when nothing reaches the
/// size (or the list is empty).
pub fn select_variant(construction: &Construction, req_size: f64) -> Option<GlyphId> {
    construction
        .variants
        .iter()
        .find(|v| v.advance >= req_size)
        .map(|v| v.glyph)
}

/// Resolve a glyph at the requested size along the given axis, in font
/// units. Falls back to the base glyph when the font has no construction
/// for it, and to the largest variant when nothing reaches the size.
pub fn stretched_glyph(font: &MathFont, base: &Glyph, req_size: f64, vertical: bool) -> Glyph {
    let Some(id) = base.id() else {
        return base.clone();
    };
    let Some(construction) = font.construction(id, vertical) else {
        return base.clone();
    };
    if let Some(variant) = select_variant(&construction, req_size) {
        return font.glyph_by_id(variant);
    }
    if let Some(recipe) = &construction.assembly {
        return assemble(font, recipe, req_size, vertical);
    }
    match construction.variants.last() {
        Some(v) => font.glyph_by_id(v.glyph),
        None => base.clone(),
    }
}

/// Offsets (along the stretch axis, from the start of the composite) for
/// each part of a planned assembly.
#[derive(Debug, Clone)]
pub struct AssemblyPlan {
    pub parts: Vec<(GlyphId, f64)>,
    /// Achieved size along the stretch axis.
    pub size: f64,
}

/// Choose an extender repeat count and per-joint overlap so the assembled
/// size meets `req_size` as closely as the connectors allow.
pub fn plan_assembly(recipe: &AssemblyRecipe, req_size: f64, min_overlap: f64) -> AssemblyPlan {
    let has_extenders = recipe.parts.iter().any(|p| p.extender);
    let mut chosen = Vec::new();
    let mut natural = 0.0;
    // Fixed parts alone may already cover the request.
    for repeats in 0..=64u32 {
        chosen.clear();
        for part in &recipe.parts {
            let times = if part.extender { repeats } else { 1 };
            for _ in 0..times {
                chosen.push(*part);
            }
        }
        natural = chosen.iter().map(|p| p.full_advance).sum::<f64>()
            - min_overlap * (chosen.len().saturating_sub(1)) as f64;
        if natural >= req_size || !has_extenders {
            break;
        }
    }
    // Distribute the excess over the joints so the total lands on req_size,
    // never overlapping more than the connectors provide.
    let joints = chosen.len().saturating_sub(1);
    let extra = if joints > 0 && natural > req_size {
        (natural - req_size) / joints as f64
    } else {
        0.0
    };
    let overlap = min_overlap + extra;
    let mut parts = Vec::with_capacity(chosen.len());
    let mut cursor = 0.0;
    for (i, part) in chosen.iter().enumerate() {
        if i > 0 {
            cursor -= overlap;
        }
        parts.push((part.glyph, cursor));
        cursor += part.full_advance;
    }
    AssemblyPlan {
        parts,
        size: cursor.max(0.0),
    }
}

/// Realize an assembly plan as a composite glyph. Vertical composites are
/// centered on the math axis; horizontal ones grow rightwards from the
/// origin.
pub fn assemble(font: &MathFont, recipe: &AssemblyRecipe, req_size: f64, vertical: bool) -> Glyph {
    let plan = plan_assembly(recipe, req_size, font.min_connector_overlap());
    let bottom = if vertical {
        font.consts().axis_height - plan.size / 2.0
    } else {
        0.0
    };
    let mut placed = Vec::with_capacity(plan.parts.len());
    let mut bbox: Option<BBox> = None;
    let mut max_cross = 0.0f64;
    for &(id, offset) in &plan.parts {
        let part = font.glyph_by_id(id);
        let (dx, dy) = if vertical {
            (0.0, bottom + offset)
        } else {
            (offset, 0.0)
        };
        placed.push(PlacedPart { glyph: id, dx, dy });
        let pb = BBox::new(
            part.bbox.xmin + dx,
            part.bbox.xmax + dx,
            part.bbox.ymin + dy,
            part.bbox.ymax + dy,
        );
        bbox = Some(match bbox {
            Some(b) => BBox::new(
                b.xmin.min(pb.xmin),
                b.xmax.max(pb.xmax),
                b.ymin.min(pb.ymin),
                b.ymax.max(pb.ymax),
            ),
            None => pb,
        });
        max_cross = max_cross.max(part.advance);
    }
    let bbox = bbox.unwrap_or(BBox::ZERO);
    let advance = if vertical { max_cross } else { plan.size };
    Glyph {
        gref: GlyphRef::Assembled(Arc::new(AssembledGlyph {
            parts: placed,
            bbox,
            advance,
        })),
        advance,
        bbox,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::math::{AssemblyPart, VariantRecord};

    fn paren_construction() -> Construction {
        Construction {
            variants: vec![
                VariantRecord {
                    glyph: GlyphId(10),
                    advance: 700.0,
                },
                VariantRecord {
                    glyph: GlyphId(11),
                    advance: 1100.0,
                },
                VariantRecord {
                    glyph: GlyphId(12),
                    advance: 1900.0,
                },
            ],
            assembly: None,
        }
    }

    #[test]
    fn test_select_variant_first_fit() {
        let c = paren_construction();
        assert_eq!(select_variant(&c, 800.0), Some(GlyphId(11)));
        assert_eq!(select_variant(&c, 1100.0), Some(GlyphId(11)));
        assert_eq!(select_variant(&c, 1901.0), None);
    }

    #[test]
    fn test_select_variant_grows_with_request() {
        let c = paren_construction();
        let mut prev = 0.0;
        for req in [200.0, 700.0, 900.0, 1500.0, 1900.0] {
            let id = select_variant(&c, req).unwrap();
            let advance = c.variants.iter().find(|v| v.glyph == id).unwrap().advance;
            assert!(advance >= req);
            assert!(advance >= prev);
            prev = advance;
        }
    }

    #[test]
    fn test_select_variant_nonpositive_request_takes_first() {
        let c = paren_construction();
        assert_eq!(select_variant(&c, 0.0), Some(GlyphId(10)));
        assert_eq!(select_variant(&c, -5.0), Some(GlyphId(10)));
    }

    #[test]
    fn test_select_variant_empty_list() {
        let c = Construction {
            variants: Vec::new(),
            assembly: None,
        };
        assert_eq!(select_variant(&c, 100.0), None);
    }

    fn brace_recipe() -> AssemblyRecipe {
        // Bottom hook, extender, middle, extender, top hook.
        let part = |glyph, extender| AssemblyPart {
            glyph: GlyphId(glyph),
            start_connector: 100.0,
            end_connector: 100.0,
            full_advance: 500.0,
            extender,
        };
        AssemblyRecipe {
            italics_correction: 0.0,
            parts: vec![
                part(1, false),
                part(2, true),
                part(3, false),
                part(2, true),
                part(4, false),
            ],
        }
    }

    #[test]
    fn test_plan_meets_requested_size() {
        let plan = plan_assembly(&brace_recipe(), 3000.0, 50.0);
        assert!(plan.size >= 3000.0 - 1e-6);
        assert!(plan.size <= 3000.0 + 1e-6);
    }

    #[test]
    fn test_plan_adds_extenders_for_large_sizes() {
        let small = plan_assembly(&brace_recipe(), 1000.0, 50.0);
        let large = plan_assembly(&brace_recipe(), 6000.0, 50.0);
        assert!(large.parts.len() > small.parts.len());
    }

    #[test]
    fn test_plan_offsets_increase() {
        let plan = plan_assembly(&brace_recipe(), 3000.0, 50.0);
        for pair in plan.parts.windows(2) {
            assert!(pair[1].1 > pair[0].1);
        }
        assert_eq!(plan.parts[0].1, 0.0);
    }

    #[test]
    fn test_plan_skips_extenders_when_fixed_parts_suffice() {
        // Hooks and middle alone span 1400; a 1200 request needs no
        // extender copies.
        let plan = plan_assembly(&brace_recipe(), 1200.0, 50.0);
        assert_eq!(plan.parts.len(), 3);
        assert!((plan.size - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_without_extenders_uses_natural_size() {
        let recipe = AssemblyRecipe {
            italics_correction: 0.0,
            parts: vec![
                AssemblyPart {
                    glyph: GlyphId(1),
                    start_connector: 0.0,
                    end_connector: 0.0,
                    full_advance: 400.0,
                    extender: false,
                },
                AssemblyPart {
                    glyph: GlyphId(2),
                    start_connector: 0.0,
                    end_connector: 0.0,
                    full_advance: 400.0,
                    extender: false,
                },
            ],
        };
        let plan = plan_assembly(&recipe, 10_000.0, 20.0);
        assert_eq!(plan.parts.len(), 2);
        assert!((plan.size - 780.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_single_part() {
        let recipe = AssemblyRecipe {
            italics_correction: 0.0,
            parts: vec![AssemblyPart {
                glyph: GlyphId(7),
                start_connector: 0.0,
                end_connector: 0.0,
                full_advance: 600.0,
                extender: false,
            }],
        };
        let plan = plan_assembly(&recipe, 200.0, 10.0);
        assert_eq!(plan.parts.len(), 1);
        assert_eq!(plan.size, 600.0);
    }
}
