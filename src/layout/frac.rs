//! Fraction layout.
//!
//! Numerator and denominator are centered over a rule sitting on the math
//! axis. Fractions in cramped contexts (scripts, nested fractions, inline
//! style) drop a script level unless the element pins `displaystyle`
//! itself.

use crate::font::math::MathConstants;
use crate::font::BBox;
use crate::model::{ElementKind, MathElement};
use crate::style::MathStyle;

use super::{build, spacing, Drawable, LayoutCtx, LayoutFlags, LayoutNode};

/// Resolve the `linethickness` attribute against the font's default rule
/// thickness in pixels.
fn rule_thickness(attr: Option<&str>, default_px: f64, em_scale: f64) -> f64 {
    let Some(attr) = attr else {
        return default_px;
    };
    if let Some(v) = spacing::dimension_units(attr, em_scale) {
        return v;
    }
    match attr {
        "thin" => default_px * 0.5,
        "thick" => default_px * 2.0,
        _ => default_px,
    }
}

/// Numerator shift-up and denominator shift-down, in font units. Display
/// style takes the taller DisplayStyle constants.
fn frac_shifts(consts: &MathConstants, display: bool) -> (f64, f64) {
    if display {
        (
            consts.fraction_numerator_display_style_shift_up,
            consts.fraction_denominator_display_style_shift_down,
        )
    } else {
        (
            consts.fraction_numerator_shift_up,
            consts.fraction_denominator_shift_down,
        )
    }
}

pub fn layout_frac(
    element: &MathElement,
    ctx: &LayoutCtx,
    style: MathStyle,
    flags: LayoutFlags,
) -> LayoutNode {
    let mut style = style;
    let cramped = element.attr("displaystyle") != Some("true")
        && (flags.frac || flags.sup || flags.sub || !style.display_style);
    if cramped {
        style.script_level = style.script_level.saturating_add(1);
    }
    let mut node = LayoutNode::new(ElementKind::Mfrac, style, ctx);
    node.phantom = flags.phantom;

    let empty = MathElement::new(ElementKind::Mrow);
    let mut child_flags = flags.inherit();
    child_flags.frac = true;
    let level = node.style.script_level;
    let num = build(
        element.children.first().unwrap_or(&empty),
        ctx,
        Some(&node.style),
        level,
        child_flags,
    );
    let denom = build(
        element.children.get(1).unwrap_or(&empty),
        ctx,
        Some(&node.style),
        level,
        child_flags,
    );

    let consts = ctx.font.consts();
    let em = node.em_scale;
    let (shift_up, shift_dn) = frac_shifts(consts, node.style.display_style);
    let mut ynum = -shift_up * em;
    let mut ydenom = shift_dn * em;
    if ynum + num.bbox.ymin < 0.0 {
        ynum += num.bbox.ymin + consts.fraction_numerator_gap_min * em;
    }
    if ydenom - denom.bbox.ymax < 0.0 {
        ydenom -= ydenom - denom.bbox.ymax + consts.fraction_denominator_gap_min * em;
    }

    // Lead-in space, tighter between adjacent fractions.
    let x = match flags.sibling {
        Some(ElementKind::Mfrac) => node.ems_px(2.0 / 18.0),
        Some(_) => node.ems_px(3.0 / 18.0),
        None => 0.0,
    };

    let width = num.bbox.xmax.max(denom.bbox.xmax);
    let xnum = x + (width - num.bbox.width()) / 2.0;
    let xdenom = x + (width - denom.bbox.width()) / 2.0;

    let linethick = rule_thickness(
        element.attr("linethickness"),
        consts.fraction_rule_thickness * em,
        em,
    );
    let bary = -consts.axis_height * em;

    node.bbox = BBox::new(
        0.0,
        x + width + node.ems_px(3.0 / 18.0),
        -ydenom + denom.bbox.ymin,
        -ynum + num.bbox.ymax,
    );
    node.push_node(num, xnum, ynum);
    node.push_node(denom, xdenom, ydenom);
    node.push_draw(
        Drawable::HLine {
            length: width,
            thickness: linethick,
        },
        x,
        bary,
    );
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_thickness_default() {
        assert_eq!(rule_thickness(None, 1.6, 0.024), 1.6);
    }

    #[test]
    fn test_rule_thickness_keywords() {
        assert_eq!(rule_thickness(Some("thin"), 1.6, 0.024), 0.8);
        assert_eq!(rule_thickness(Some("thick"), 1.6, 0.024), 3.2);
        assert_eq!(rule_thickness(Some("medium"), 1.6, 0.024), 1.6);
    }

    #[test]
    fn test_rule_thickness_dimension() {
        assert_eq!(rule_thickness(Some("2"), 1.6, 0.024), 2.0);
        assert_eq!(rule_thickness(Some("0"), 1.6, 0.024), 0.0);
    }

    #[test]
    fn test_display_style_uses_taller_shifts() {
        let c = MathConstants::default();
        let (up, dn) = frac_shifts(&c, false);
        assert_eq!(up, c.fraction_numerator_shift_up);
        assert_eq!(dn, c.fraction_denominator_shift_down);
        let (dup, ddn) = frac_shifts(&c, true);
        assert_eq!(dup, c.fraction_numerator_display_style_shift_up);
        assert_eq!(ddn, c.fraction_denominator_display_style_shift_down);
        assert!(dup > up);
        assert!(ddn > dn);
    }
}
