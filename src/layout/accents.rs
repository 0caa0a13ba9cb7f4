//! Over- and under-attachments: accents, bars, limits.
//!
//! True accent characters keep the base's script level and hug the base
//! using the glyph's top accent attachment point; anything else drops a
//! script level. Attachments stretch horizontally to the base's width
//! when the font can.

use crate::font::{BBox, MathFont};
use crate::model::{ElementKind, MathElement};
use crate::style::MathStyle;

use super::{build, ChildItem, Drawable, LayoutCtx, LayoutFlags, LayoutNode};

/// Combining and spacing marks drawn at the base's own script level.
const ACCENTS: &[char] = &[
    '\u{005E}', // circumflex
    '\u{02D9}', // dot above
    '\u{02C7}', // caron
    '\u{007E}', // tilde
    '\u{00B4}', // acute
    '\u{0060}', // grave
    '\u{00A8}', // diaeresis
    '\u{20DB}', // triple dot
    '\u{20DC}', // quadruple dot
    '\u{02D8}', // breve
    '\u{00AF}', // macron
    '\u{02DA}', // ring
];

fn is_accent(element: &MathElement) -> bool {
    let mut chars = element.text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => ACCENTS.contains(&ch),
        _ => false,
    }
}

/// Attachment x position for a base that is a single glyph with a top
/// accent attachment point.
fn top_attachment(base: &LayoutNode, font: &MathFont) -> Option<f64> {
    if base.children.len() != 1 {
        return None;
    }
    match &base.children[0].item {
        ChildItem::Draw(Drawable::Glyph(g)) => g.glyph.id().and_then(|id| font.top_accent(id)),
        ChildItem::Node(n) => top_attachment(n, font),
        _ => None,
    }
}

/// Position an attachment above the base. Returns `(x, y)` in SVG
/// coordinates relative to the construct origin.
fn place_over(
    base: &LayoutNode,
    over: &LayoutNode,
    node: &LayoutNode,
    font: &MathFont,
) -> (f64, f64) {
    let em = node.em_scale;
    let mut x = (base.bbox.width() - over.bbox.width()) / 2.0 - over.bbox.xmin;
    if let Some(attach) = top_attachment(base, font) {
        x = attach * em - over.bbox.width() / 2.0;
    }
    let y = -base.bbox.ymax - font.consts().overbar_vertical_gap * em + over.bbox.ymin;
    (x, y)
}

/// Position an attachment below the base.
fn place_under(
    base: &LayoutNode,
    under: &LayoutNode,
    node: &LayoutNode,
    font: &MathFont,
) -> (f64, f64) {
    let em = node.em_scale;
    let x = (base.bbox.width() - under.bbox.width()) / 2.0 - under.bbox.xmin;
    let y = -base.bbox.ymin + font.consts().underbar_vertical_gap * em + under.bbox.ymax;
    (x, y)
}

pub fn layout_accents(
    element: &MathElement,
    ctx: &LayoutCtx,
    style: MathStyle,
    flags: LayoutFlags,
) -> LayoutNode {
    let mut node = LayoutNode::new(element.kind, style, ctx);
    node.phantom = flags.phantom;
    let empty = MathElement::new(ElementKind::Mrow);
    let child = |i: usize| element.children.get(i).unwrap_or(&empty);

    let base = build(
        child(0),
        ctx,
        Some(&node.style),
        node.style.script_level,
        flags.inherit(),
    );
    let width = base.bbox.width().max(0.0);
    let level = node.style.script_level;
    let raised = level.saturating_add(1);

    let attachment = |idx: usize, sup: bool, sub: bool, raise_always: bool| {
        let el = child(idx);
        let accent = is_accent(el);
        let mut f = flags.inherit();
        f.stretch_width = Some(width);
        f.sup = f.sup || (sup && !accent);
        f.sub = f.sub || sub;
        let lvl = if accent && !raise_always { level } else { raised };
        build(el, ctx, Some(&node.style), lvl, f)
    };

    match element.kind {
        ElementKind::Mover => {
            let over = attachment(1, false, false, false);
            let (x, y) = place_over(&base, &over, &node, ctx.font);
            let (basex, overx) = if x < 0.0 { (-x, 0.0) } else { (0.0, x) };
            node.bbox = BBox::new(
                overx.min(base.bbox.xmin),
                (overx + over.bbox.xmax).max(base.bbox.xmax),
                base.bbox.ymin,
                -y + over.bbox.ymax,
            );
            node.push_node(base, basex, 0.0);
            node.push_node(over, overx, y);
        }
        ElementKind::Munder => {
            let under = attachment(1, false, true, true);
            let (x, y) = place_under(&base, &under, &node, ctx.font);
            let (basex, underx) = if x < 0.0 { (-x, 0.0) } else { (0.0, x) };
            node.bbox = BBox::new(
                underx.min(base.bbox.xmin),
                (underx + under.bbox.xmax).max(base.bbox.xmax),
                -y + under.bbox.ymin,
                base.bbox.ymax,
            );
            node.push_node(base, basex, 0.0);
            node.push_node(under, underx, y);
        }
        _ => {
            let under = attachment(1, false, false, true);
            let over = attachment(2, true, false, false);
            let (mut overx, overy) = place_over(&base, &over, &node, ctx.font);
            let (mut underx, undery) = place_under(&base, &under, &node, ctx.font);
            let mut basex = 0.0;
            if overx < 0.0 || underx < 0.0 {
                basex = (-overx).max(-underx);
                let shift = overx.min(underx);
                overx -= shift;
                underx -= shift;
            }
            node.bbox = BBox::new(
                underx.min(overx).min(basex + base.bbox.xmin),
                (underx + under.bbox.xmax)
                    .max(overx + over.bbox.xmax)
                    .max(basex + base.bbox.xmax),
                -undery + under.bbox.ymin,
                -overy + over.bbox.ymax,
            );
            node.push_node(base, basex, 0.0);
            node.push_node(over, overx, overy);
            node.push_node(under, underx, undery);
        }
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_with_text(text: &str) -> MathElement {
        let mut el = MathElement::new(ElementKind::Mo);
        el.text = text.to_string();
        el
    }

    #[test]
    fn test_accent_chars() {
        assert!(is_accent(&element_with_text("\u{00AF}")));
        assert!(is_accent(&element_with_text("^")));
        assert!(!is_accent(&element_with_text("x")));
        assert!(!is_accent(&element_with_text("^^")));
        assert!(!is_accent(&element_with_text("")));
    }
}
