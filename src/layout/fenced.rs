//! Fenced groups (`mfenced`).
//!
//! Contents (with optional separators interleaved) are wrapped in fence
//! glyphs sized as vertical variants tall enough for the row. When the
//! row still sticks out past the variant, the fence is re-resolved at
//! twice the row's larger half-extent so it stays centered on the axis.

use crate::font::variants::stretched_glyph;
use crate::font::{BBox, Glyph};
use crate::model::{ElementKind, MathElement};
use crate::style::MathStyle;

use super::{
    build, trailing_kind, Drawable, GlyphDrawable, LayoutCtx, LayoutFlags, LayoutNode,
};

/// Interleave separator operators between fenced children. The last
/// separator repeats when there are more gaps than separators.
fn interleave(kids: &[MathElement], separators: &str) -> Vec<MathElement> {
    let seps: Vec<char> = separators.chars().collect();
    if kids.len() <= 1 || seps.is_empty() {
        return kids.to_vec();
    }
    let mut out = Vec::with_capacity(kids.len() * 2 - 1);
    for (i, kid) in kids.iter().enumerate() {
        out.push(kid.clone());
        if i + 1 < kids.len() {
            let ch = seps.get(i).copied().unwrap_or(*seps.last().unwrap());
            let mut mo = MathElement::new(ElementKind::Mo);
            mo.text = ch.to_string();
            out.push(mo);
        }
    }
    out
}

/// Right-side padding the row's trailing element already added, removed
/// so the close fence hugs the contents. Fractions pad a thin space;
/// scripts pad the font's spaceAfterScript.
fn close_fence_trim(
    trailing: ElementKind,
    space_after_script: f64,
    em_scale: f64,
    glyph_size: f64,
) -> f64 {
    match trailing {
        ElementKind::Mfrac => 3.0 / 18.0 * glyph_size,
        ElementKind::Msub | ElementKind::Msup | ElementKind::Msubsup => {
            space_after_script * em_scale
        }
        _ => 0.0,
    }
}

pub fn layout_fenced(
    element: &MathElement,
    ctx: &LayoutCtx,
    style: MathStyle,
    flags: LayoutFlags,
) -> LayoutNode {
    let mut node = LayoutNode::new(ElementKind::Mfenced, style, ctx);
    node.phantom = flags.phantom;
    let open = element.attr("open").unwrap_or("(").to_string();
    let close = element.attr("close").unwrap_or(")").to_string();
    let separators = element.attr("separators").unwrap_or(",").replace(' ', "");

    let mut inner = MathElement::new(ElementKind::Mrow);
    inner.children = interleave(&element.children, &separators);
    let row = build(
        &inner,
        ctx,
        Some(&node.style),
        node.style.script_level,
        flags.inherit(),
    );

    let em = node.em_scale;
    let size_char = open.chars().next().or_else(|| close.chars().next());
    let base_glyph = size_char.map(|ch| ctx.font.glyph_for_char(ch));

    // Fence height in pixels and the resolved open glyph.
    let row_empty = row.children.is_empty();
    let (height, open_glyph, fence_bbox) = match &base_glyph {
        Some(g) if row_empty => {
            let px = g.bbox.scaled(em);
            (px.height(), Some(g.clone()), px)
        }
        Some(g) => {
            let px = g.bbox.scaled(em);
            let mut height = row.bbox.ymax.max(px.ymax) - row.bbox.ymin.min(px.ymin);
            let mut variant = stretched_glyph(ctx.font, g, height / em, true);
            let vpx = variant.bbox.scaled(em);
            if row.bbox.ymax > vpx.ymax || row.bbox.ymin < vpx.ymin {
                height = row.bbox.ymax.max(-row.bbox.ymin) * 2.0;
                variant = stretched_glyph(ctx.font, g, height / em, true);
            }
            (height, Some(variant), row.bbox)
        }
        None => (row.bbox.height(), None, row.bbox),
    };

    let push_fence = |node: &mut LayoutNode, glyph: Glyph, x: f64| -> (f64, BBox) {
        let advance = glyph.advance * em;
        let px = glyph.bbox.scaled(em);
        node.push_draw(
            Drawable::Glyph(GlyphDrawable {
                glyph,
                size: node.glyph_size,
                em_scale: em,
            }),
            x,
            0.0,
        );
        (advance, px)
    };

    let mut x = 0.0;
    let mut glyph_ymin = 0.0f64;
    let mut glyph_ymax = 0.0f64;
    if !open.is_empty() {
        if let Some(glyph) = open_glyph {
            let (advance, px) = push_fence(&mut node, glyph, x);
            x += advance;
            glyph_ymin = glyph_ymin.min(px.ymin);
            glyph_ymax = glyph_ymax.max(px.ymax);
        }
    }
    let row_trailing = trailing_kind(&row);
    if !element.children.is_empty() {
        node.push_node(row, x, 0.0);
        x += fence_bbox.xmax;
    }
    if !close.is_empty() {
        x -= close_fence_trim(
            row_trailing,
            ctx.font.consts().space_after_script,
            em,
            node.glyph_size,
        );
        if let Some(ch) = close.chars().next() {
            let glyph = stretched_glyph(ctx.font, &ctx.font.glyph_for_char(ch), height / em, true);
            let (advance, px) = push_fence(&mut node, glyph, x);
            x += advance;
            glyph_ymin = glyph_ymin.min(px.ymin);
            glyph_ymax = glyph_ymax.max(px.ymax);
        }
    }
    node.bbox = BBox::new(
        0.0,
        x,
        glyph_ymin.min(fence_bbox.ymin),
        glyph_ymax.max(fence_bbox.ymax),
    );
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mi(text: &str) -> MathElement {
        let mut el = MathElement::new(ElementKind::Mi);
        el.text = text.to_string();
        el
    }

    #[test]
    fn test_interleave_repeats_last_separator() {
        let kids = vec![mi("a"), mi("b"), mi("c")];
        let out = interleave(&kids, ",;");
        assert_eq!(out.len(), 5);
        assert_eq!(out[1].text, ",");
        assert_eq!(out[3].text, ";");
        let out = interleave(&kids, ",");
        assert_eq!(out[3].text, ",");
    }

    #[test]
    fn test_interleave_skips_single_child() {
        let kids = vec![mi("a")];
        let out = interleave(&kids, ",");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_interleave_no_separators() {
        let kids = vec![mi("a"), mi("b")];
        let out = interleave(&kids, "");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_close_fence_trim_by_trailing_kind() {
        let frac = close_fence_trim(ElementKind::Mfrac, 40.0, 0.024, 24.0);
        assert!((frac - 24.0 * 3.0 / 18.0).abs() < 1e-12);
        for kind in [ElementKind::Msub, ElementKind::Msup, ElementKind::Msubsup] {
            let trim = close_fence_trim(kind, 40.0, 0.024, 24.0);
            assert!((trim - 40.0 * 0.024).abs() < 1e-12);
        }
        assert_eq!(close_fence_trim(ElementKind::Mi, 40.0, 0.024, 24.0), 0.0);
    }
}
