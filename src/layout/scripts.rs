//! Sub- and superscript attachment.
//!
//! Scripts are placed against the base's last glyph: the MATH corner kern
//! tables cut the script horizontally into the base, and the shift
//! constants (adjusted for extended-shape bases) set the vertical offset.
//! Operators with movable limits in display style get their scripts
//! stacked above/below instead.

use crate::font::kerning::{kern_sub, kern_super, KernGlyph};
use crate::font::{BBox, Glyph, MathFont};
use crate::model::{ElementKind, MathElement};
use crate::style::MathStyle;

use super::{build, operators, LayoutCtx, LayoutFlags, LayoutNode, OpParams};

/// Where a script lands relative to the end of its base.
pub(crate) struct Placement {
    /// Horizontal offset from the base's right edge.
    pub x: f64,
    /// Vertical offset in SVG coordinates (negative is up).
    pub y: f64,
    /// Advance the construct gains past the base.
    pub advance: f64,
}

/// Thin space padding after a script attached to a spelled-out identifier.
fn script_pad(base: &LayoutNode, node: &LayoutNode) -> f64 {
    if base.multichar {
        node.ems_px(3.0 / 18.0)
    } else {
        0.0
    }
}

/// Corner kern tables are keyed by glyph id; assembled composites carry
/// none and take the geometric estimate instead.
fn kernable(glyph: &Glyph, has_kern_info: bool) -> bool {
    has_kern_info && glyph.id().is_some()
}

/// Movable-limits operators carry a trailing rspace in their advance;
/// inline scripts tuck back under it.
fn rspace_backout(op: Option<&OpParams>) -> f64 {
    match op {
        Some(p) if p.movable_limits => p.rspace,
        _ => 0.0,
    }
}

pub(crate) fn place_super(
    base: &LayoutNode,
    sup: &LayoutNode,
    node: &LayoutNode,
    font: &MathFont,
) -> Placement {
    let consts = font.consts();
    let em = node.em_scale;
    if base.op.as_ref().is_some_and(|p| p.movable_limits) && base.style.display_style {
        return Placement {
            x: -base.bbox.xmax / 2.0 - sup.bbox.width() / 2.0,
            y: -base.bbox.ymax - consts.upper_limit_gap_min * em + sup.bbox.ymin,
            advance: 0.0,
        };
    }
    let mut x = -node.ems_px(rspace_backout(base.op.as_ref()));
    let mut shift_up = consts.superscript_shift_up;
    if let Some(lastg) = base.last_glyph() {
        if let Some(italic) = lastg.glyph.id().and_then(|id| font.italic_correction(id)) {
            // Integrals already slant their scripts via kerning.
            if !base.last_char().is_some_and(operators::is_integral_char) {
                x += italic * em;
            }
        }
        match sup.first_glyph() {
            Some(firstg) if kernable(&lastg.glyph, font.has_kern_info()) => {
                let base_record = lastg.glyph.id().and_then(|id| font.kern_record(id));
                let sup_record = firstg.glyph.id().and_then(|id| font.kern_record(id));
                let extended = lastg.glyph.id().is_some_and(|id| font.is_extended_shape(id));
                let (kern, shift) = kern_super(
                    consts,
                    KernGlyph {
                        bbox: lastg.glyph.bbox,
                        record: base_record.as_ref(),
                    },
                    extended,
                    KernGlyph {
                        bbox: firstg.glyph.bbox,
                        record: sup_record.as_ref(),
                    },
                );
                x += kern * em;
                shift_up = shift;
            }
            Some(_) => {
                shift_up = lastg.glyph.bbox.ymax - sup.bbox.height() / 2.0 / em;
            }
            None => {
                shift_up = lastg.glyph.bbox.ymax;
            }
        }
    }
    Placement {
        x,
        y: -shift_up * em,
        advance: x + sup.bbox.xmax + script_pad(base, node),
    }
}

pub(crate) fn place_sub(
    base: &LayoutNode,
    sub: &LayoutNode,
    node: &LayoutNode,
    font: &MathFont,
) -> Placement {
    let consts = font.consts();
    let em = node.em_scale;
    if base.op.as_ref().is_some_and(|p| p.movable_limits) && base.style.display_style {
        return Placement {
            x: -base.bbox.xmax / 2.0 - sub.bbox.width() / 2.0,
            y: -base.bbox.ymin + consts.lower_limit_gap_min * em + sub.bbox.ymax,
            advance: 0.0,
        };
    }
    let mut x = -node.ems_px(rspace_backout(base.op.as_ref()));
    let mut shift_dn = consts.subscript_shift_down;
    if let Some(lastg) = base.last_glyph() {
        if let Some(italic) = lastg.glyph.id().and_then(|id| font.italic_correction(id)) {
            // Tuck the subscript under an integral's slant.
            if base.last_char().is_some_and(operators::is_integral_char) {
                x -= italic * em;
            }
        }
        match sub.first_glyph() {
            Some(firstg) if kernable(&lastg.glyph, font.has_kern_info()) => {
                let base_record = lastg.glyph.id().and_then(|id| font.kern_record(id));
                let sub_record = firstg.glyph.id().and_then(|id| font.kern_record(id));
                let (kern, shift) = kern_sub(
                    consts,
                    KernGlyph {
                        bbox: lastg.glyph.bbox,
                        record: base_record.as_ref(),
                    },
                    KernGlyph {
                        bbox: firstg.glyph.bbox,
                        record: sub_record.as_ref(),
                    },
                );
                x += kern * em;
                shift_dn = shift;
            }
            Some(_) => {
                shift_dn = -lastg.glyph.bbox.ymin + sub.bbox.height() / 2.0 / em;
            }
            None => {
                shift_dn = -lastg.glyph.bbox.ymin;
            }
        }
    }
    Placement {
        x,
        y: shift_dn * em,
        advance: x + sub.bbox.xmax + script_pad(base, node),
    }
}

/// Extra separation needed when a subscript's top crowds a superscript's
/// bottom. Inputs are SVG-coordinate edge positions.
fn script_gap_correction(gap_min: f64, sub_top: f64, sup_bottom: f64) -> f64 {
    if sub_top - sup_bottom < gap_min {
        gap_min - sub_top + sup_bottom
    } else {
        0.0
    }
}

/// Bounding box of a single-script construct. An empty base collapses the
/// box onto the script.
fn script_bbox(base: &BBox, script: &BBox, y: f64, advance: f64) -> BBox {
    let xmax = base.xmax + advance;
    if base.ymax <= base.ymin {
        BBox::new(0.0, xmax, -y, -y + script.ymax)
    } else {
        BBox::new(
            base.xmin,
            xmax,
            base.ymin.min(-y + script.ymin),
            base.ymax.max(-y + script.ymax),
        )
    }
}

pub fn layout_scripts(
    element: &MathElement,
    ctx: &LayoutCtx,
    style: MathStyle,
    flags: LayoutFlags,
) -> LayoutNode {
    let mut node = LayoutNode::new(element.kind, style, ctx);
    node.phantom = flags.phantom;
    let empty = MathElement::new(ElementKind::Mrow);
    let child = |i: usize| element.children.get(i).unwrap_or(&empty);

    let mut base_flags = flags.inherit();
    base_flags.tight = true;
    let base = build(
        child(0),
        ctx,
        Some(&node.style),
        node.style.script_level,
        base_flags,
    );
    let level = node.style.script_level.saturating_add(1);
    let script = |idx: usize, sup: bool| {
        let mut f = flags.inherit();
        f.tight = true;
        f.sup = sup;
        f.sub = !sup;
        build(child(idx), ctx, Some(&node.style), level, f)
    };

    let basew = base.bbox.xmax;
    match element.kind {
        ElementKind::Msup => {
            let sup = script(1, true);
            let p = place_super(&base, &sup, &node, ctx.font);
            node.bbox = script_bbox(&base.bbox, &sup.bbox, p.y, p.advance);
            node.push_node(base, 0.0, 0.0);
            node.push_node(sup, basew + p.x, p.y);
        }
        ElementKind::Msub => {
            let sub = script(1, false);
            let p = place_sub(&base, &sub, &node, ctx.font);
            node.bbox = script_bbox(&base.bbox, &sub.bbox, p.y, p.advance);
            node.push_node(base, 0.0, 0.0);
            node.push_node(sub, basew + p.x, p.y);
        }
        _ => {
            let sub = script(1, false);
            let sup = script(2, true);
            let mut ps = place_sub(&base, &sub, &node, ctx.font);
            let mut pu = place_super(&base, &sup, &node, ctx.font);
            let gap = ctx.font.consts().sub_superscript_gap_min * node.em_scale;
            let diff =
                script_gap_correction(gap, ps.y - sub.bbox.ymax, pu.y - sup.bbox.ymin);
            ps.y += diff / 2.0;
            pu.y -= diff / 2.0;
            let advance = ps.advance.max(pu.advance);
            node.bbox = BBox::new(
                base.bbox.xmin,
                basew + advance,
                base.bbox.ymin.min(-ps.y + sub.bbox.ymin),
                base.bbox.ymax.max(-pu.y + sup.bbox.ymax),
            );
            node.push_node(base, 0.0, 0.0);
            node.push_node(sub, basew + ps.x, ps.y);
            node.push_node(sup, basew + pu.x, pu.y);
        }
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{AssembledGlyph, GlyphRef};
    use std::sync::Arc;
    use ttf_parser::GlyphId;

    #[test]
    fn test_kern_lookup_skips_assembled_bases() {
        let real = Glyph {
            gref: GlyphRef::Real(GlyphId(5)),
            advance: 500.0,
            bbox: BBox::new(0.0, 480.0, 0.0, 650.0),
        };
        assert!(kernable(&real, true));
        assert!(!kernable(&real, false));

        // A stretched bracket built from parts has no glyph id, so the
        // corner kern path must not run for it.
        let tall_bbox = BBox::new(0.0, 300.0, -2400.0, 2400.0);
        let assembled = Glyph {
            gref: GlyphRef::Assembled(Arc::new(AssembledGlyph {
                parts: Vec::new(),
                bbox: tall_bbox,
                advance: 300.0,
            })),
            advance: 300.0,
            bbox: tall_bbox,
        };
        assert!(!kernable(&assembled, true));
    }

    #[test]
    fn test_rspace_backout_only_for_movable_limits() {
        let mut op = OpParams {
            rspace: 2.0 / 18.0,
            ..OpParams::default()
        };
        assert_eq!(rspace_backout(Some(&op)), 0.0);
        op.movable_limits = true;
        assert!((rspace_backout(Some(&op)) - 2.0 / 18.0).abs() < 1e-12);
        assert_eq!(rspace_backout(None), 0.0);
    }

    #[test]
    fn test_gap_correction_only_when_crowded() {
        // Sub top well below sup bottom: nothing to do.
        assert_eq!(script_gap_correction(4.0, 10.0, 2.0), 0.0);
        // Crowded by 3 units against a 4 unit minimum.
        let diff = script_gap_correction(4.0, 3.0, 2.0);
        assert_eq!(diff, 3.0);
    }

    #[test]
    fn test_script_bbox_with_base() {
        let base = BBox::new(0.5, 10.0, -2.0, 7.0);
        let script = BBox::new(0.0, 5.0, -1.0, 4.0);
        let b = script_bbox(&base, &script, -6.0, 4.5);
        assert_eq!(b.xmin, 0.5);
        assert_eq!(b.xmax, 14.5);
        assert_eq!(b.ymin, -2.0);
        assert_eq!(b.ymax, 10.0);
    }

    #[test]
    fn test_script_bbox_empty_base() {
        let base = BBox::ZERO;
        let script = BBox::new(0.0, 5.0, -1.0, 4.0);
        let b = script_bbox(&base, &script, -6.0, 5.0);
        assert_eq!(b.xmin, 0.0);
        assert_eq!(b.ymin, 6.0);
        assert_eq!(b.ymax, 10.0);
    }
}
