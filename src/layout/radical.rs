//! Radical layout (`msqrt`, `mroot`).
//!
//! The radical sign is resolved as a vertical variant tall enough for the
//! base, the overbar runs from the sign across the base (plus the last
//! glyph's italic correction), and a root degree is raised along the sign
//! by the font's radicalDegreeBottomRaisePercent.

use crate::font::math::MathConstants;
use crate::font::variants::stretched_glyph;
use crate::font::BBox;
use crate::model::{ElementKind, MathElement};
use crate::style::MathStyle;

use super::{build, Drawable, GlyphDrawable, LayoutCtx, LayoutFlags, LayoutNode};

/// Clearance between the base and the overbar, in font units. Display
/// style takes the roomier DisplayStyle gap.
fn radical_gap(consts: &MathConstants, display: bool) -> f64 {
    if display {
        consts.radical_display_style_vertical_gap
    } else {
        consts.radical_vertical_gap
    }
}

pub fn layout_radical(
    element: &MathElement,
    ctx: &LayoutCtx,
    style: MathStyle,
    flags: LayoutFlags,
) -> LayoutNode {
    let mut node = LayoutNode::new(element.kind, style, ctx);
    node.phantom = flags.phantom;
    let level = node.style.script_level;
    let empty = MathElement::new(ElementKind::Mrow);

    // msqrt wraps all children; mroot splits base and degree.
    let (base, degree) = if element.kind == ElementKind::Mroot {
        let base = build(
            element.children.first().unwrap_or(&empty),
            ctx,
            Some(&node.style),
            level,
            flags.inherit(),
        );
        let degree = element.children.get(1).map(|el| {
            build(
                el,
                ctx,
                Some(&node.style),
                level.saturating_add(1),
                flags.inherit(),
            )
        });
        (base, degree)
    } else if element.children.len() == 1 {
        let base = build(
            &element.children[0],
            ctx,
            Some(&node.style),
            level,
            flags.inherit(),
        );
        (base, None)
    } else {
        let mut row = MathElement::new(ElementKind::Mrow);
        row.children = element.children.clone();
        let base = build(&row, ctx, Some(&node.style), level, flags.inherit());
        (base, None)
    };

    let consts = ctx.font.consts();
    let em = node.em_scale;
    let height = base.bbox.height();
    let radical = stretched_glyph(
        ctx.font,
        &ctx.font.glyph_for_char('\u{221A}'),
        height / em,
        true,
    );
    let rad_bbox = radical.bbox.scaled(em);

    // Shift the sign so the overbar clears the base by the minimum gap.
    let gap = radical_gap(consts, node.style.display_style) * em;
    let rtop = base.bbox.ymax + gap + consts.radical_rule_thickness * em;
    let yrad = if base.bbox.ymin < rad_bbox.ymin || rad_bbox.ymax < base.bbox.ymax + gap {
        -(rtop - rad_bbox.ymax)
    } else {
        0.0
    };
    let ytop = yrad - rad_bbox.ymax;

    let mut x = 0.0;
    let mut degree_top: Option<f64> = None;
    if let Some(deg) = degree {
        x += consts.radical_kern_before_degree * em;
        let ydeg = ytop * consts.radical_degree_bottom_raise_percent / 100.0;
        degree_top = Some(-ydeg + deg.bbox.ymax);
        let advance = deg.bbox.xmax;
        node.push_node(deg, x, ydeg);
        x += advance + consts.radical_kern_after_degree * em;
    }

    let rad_advance = rad_bbox.xmax;
    node.push_draw(
        Drawable::Glyph(GlyphDrawable {
            glyph: radical,
            size: node.glyph_size,
            em_scale: em,
        }),
        x,
        yrad,
    );
    x += rad_advance;

    let mut width = base.bbox.width();
    if let Some(italic) = base
        .last_glyph()
        .and_then(|g| g.glyph.id())
        .and_then(|id| ctx.font.italic_correction(id))
    {
        width += italic * em;
    }

    let base_bbox = base.bbox;
    node.push_node(base, x, 0.0);
    node.push_draw(
        Drawable::HLine {
            length: width,
            thickness: consts.radical_rule_thickness * em,
        },
        x,
        yrad - rad_bbox.ymax,
    );

    let ymin = (-yrad + rad_bbox.ymin).min(base_bbox.ymin);
    let mut ymax = -yrad + rad_bbox.ymax;
    if let Some(top) = degree_top {
        ymax = ymax.max(top);
    }
    node.bbox = BBox::new(rad_bbox.xmin, x + width, ymin, ymax);
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_style_widens_overbar_gap() {
        let c = MathConstants::default();
        assert_eq!(radical_gap(&c, false), c.radical_vertical_gap);
        assert_eq!(radical_gap(&c, true), c.radical_display_style_vertical_gap);
        assert!(radical_gap(&c, true) > radical_gap(&c, false));
    }
}
