//! Enclosures (`menclose`).
//!
//! Draws boxes, circles, strikes, arrows and edge rules around the base.
//! All rules share the radical rule thickness; padding is twice that.

use crate::font::BBox;
use crate::model::{ElementKind, MathElement};
use crate::style::MathStyle;

use super::{build, Drawable, LayoutCtx, LayoutFlags, LayoutNode};

pub fn layout_enclose(
    element: &MathElement,
    ctx: &LayoutCtx,
    style: MathStyle,
    flags: LayoutFlags,
) -> LayoutNode {
    let mut node = LayoutNode::new(ElementKind::Menclose, style, ctx);
    node.phantom = flags.phantom;
    let level = node.style.script_level;
    let empty = MathElement::new(ElementKind::Mrow);

    let base = if element.children.len() == 1 {
        build(
            &element.children[0],
            ctx,
            Some(&node.style),
            level,
            flags.inherit(),
        )
    } else if element.children.is_empty() {
        build(&empty, ctx, Some(&node.style), level, flags.inherit())
    } else {
        let mut row = MathElement::new(ElementKind::Mrow);
        row.children = element.children.clone();
        build(&row, ctx, Some(&node.style), level, flags.inherit())
    };

    let notation: Vec<&str> = element
        .attr("notation")
        .unwrap_or("box")
        .split_whitespace()
        .collect();
    let has = |name: &str| notation.contains(&name);

    let em = node.em_scale;
    let lw = ctx.font.consts().radical_rule_thickness * em;
    let pad = lw * 2.0;
    let height = base.bbox.height() + pad * 2.0;
    let width = base.bbox.width() + pad * 2.0;
    let mut basex = pad;
    let mut xarrow = 0.0;
    let mut yarrow = 0.0;

    let box_y = -base.bbox.ymax + height - pad;
    if has("box") {
        node.push_draw(
            Drawable::Rect {
                width,
                height,
                thickness: lw,
                corner_radius: None,
            },
            0.0,
            box_y,
        );
    }
    if has("circle") {
        node.push_draw(
            Drawable::Ellipse {
                width,
                height,
                thickness: lw,
            },
            0.0,
            box_y,
        );
    }
    if has("roundedbox") {
        node.push_draw(
            Drawable::Rect {
                width,
                height,
                thickness: lw,
                corner_radius: Some(lw * 4.0),
            },
            0.0,
            box_y,
        );
    }
    if has("top") || has("longdiv") || has("actuarial") {
        node.push_draw(
            Drawable::HLine {
                length: width,
                thickness: lw,
            },
            0.0,
            -base.bbox.ymax - pad,
        );
    }
    if has("bottom") || has("madruwb") || has("phasorangle") {
        node.push_draw(
            Drawable::HLine {
                length: width,
                thickness: lw,
            },
            0.0,
            -base.bbox.ymin + pad,
        );
    }
    if has("right") || has("madruwb") || has("actuarial") {
        node.push_draw(
            Drawable::VLine {
                height,
                thickness: lw,
            },
            base.bbox.xmax + pad * 2.0,
            -base.bbox.ymax - pad,
        );
    }
    if has("left") || has("longdiv") {
        node.push_draw(
            Drawable::VLine {
                height,
                thickness: lw,
            },
            0.0,
            -base.bbox.ymax - pad,
        );
    }
    if has("verticalstrike") {
        node.push_draw(
            Drawable::VLine {
                height,
                thickness: lw,
            },
            width / 2.0,
            -base.bbox.ymax - pad,
        );
    }
    if has("horizontalstrike") {
        node.push_draw(
            Drawable::HLine {
                length: width,
                thickness: lw,
            },
            0.0,
            -base.bbox.ymin - height / 2.0,
        );
    }
    if has("updiagonalstrike") {
        node.push_draw(
            Drawable::Diagonal {
                width,
                height: -height,
                thickness: lw,
                arrow: false,
            },
            0.0,
            -base.bbox.ymin - height + pad,
        );
    }
    if has("downdiagonalstrike") {
        node.push_draw(
            Drawable::Diagonal {
                width,
                height,
                thickness: lw,
                arrow: false,
            },
            0.0,
            -base.bbox.ymin + pad,
        );
    }
    if has("phasorangle") {
        node.push_draw(
            Drawable::Diagonal {
                width: height / 3.0,
                height: -height,
                thickness: lw,
                arrow: false,
            },
            0.0,
            -base.bbox.ymin - height + pad,
        );
        // Shift the base right so it sits under the angle.
        basex += height / 4.0;
    }
    if has("updiagonalarrow") {
        let arrow = Drawable::Diagonal {
            width,
            height: -height,
            thickness: lw,
            arrow: true,
        };
        let (aw, ah) = arrow.arrow_extent();
        xarrow = aw;
        yarrow = ah;
        node.push_draw(arrow, 0.0, -base.bbox.ymin - height + pad);
    }

    let base_bbox = base.bbox;
    node.push_node(base, basex, 0.0);
    node.bbox = BBox::new(
        0.0,
        basex + width + xarrow,
        base_bbox.ymin - pad,
        height - pad + yarrow,
    );
    node
}
