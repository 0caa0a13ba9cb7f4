//! Integration tests for the MathML front half of the pipeline.
//!
//! Everything here runs without a math font on disk: parsing, entity
//! expansion, style resolution and cascade, character restyling, the
//! operator dictionary, and size/space parsing. Layout and SVG output
//! need an OpenType font with a MATH table and are exercised by the
//! CLI against real fonts.

use mathsvg::layout::operators::{self, Form};
use mathsvg::layout::spacing;
use mathsvg::model::{self, ElementKind};
use mathsvg::style::unicode::styled_char;
use mathsvg::style::{parse_variant, Family, MathStyle, Variant};
use mathsvg::{MathError, RenderConfig};

// ─── Parsing ────────────────────────────────────────────────────

#[test]
fn test_nested_structure_preserved() {
    let root = model::parse(
        "<math><mfrac><mrow><mi>a</mi><mo>+</mo><mn>1</mn></mrow><mi>b</mi></mfrac></math>",
    )
    .unwrap();
    assert_eq!(root.kind, ElementKind::Mrow);
    let frac = &root.children[0];
    assert_eq!(frac.kind, ElementKind::Mfrac);
    assert_eq!(frac.children.len(), 2);
    assert_eq!(frac.children[0].children.len(), 3);
    assert_eq!(frac.children[1].text, "b");
}

#[test]
fn test_operator_spellings_expand() {
    let root = model::parse("<math><mo>:=</mo><mo>!=</mo></math>").unwrap();
    assert_eq!(root.children[0].text, "\u{2254}");
    assert_eq!(root.children[1].text, "\u{2260}");
}

#[test]
fn test_numeric_references_pass_through() {
    let root = model::parse("<math><mo>&#x2211;</mo><mo>&#177;</mo></math>").unwrap();
    assert_eq!(root.children[0].text, "\u{2211}");
    assert_eq!(root.children[1].text, "\u{00B1}");
}

#[test]
fn test_parse_error_carries_hint() {
    let err = model::parse("<math><msup><mi>x</mi>").unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Failed to parse MathML"));
    assert!(message.contains("Hint:"));
}

#[test]
fn test_table_markup_keeps_rows_and_cells() {
    let root = model::parse(
        "<math><mtable><mtr><mtd><mn>1</mn></mtd><mtd><mn>2</mn></mtd></mtr></mtable></math>",
    )
    .unwrap();
    let table = &root.children[0];
    assert_eq!(table.kind, ElementKind::Mtable);
    assert_eq!(table.children[0].kind, ElementKind::Mtr);
    assert_eq!(table.children[0].children.len(), 2);
    assert_eq!(table.children[0].children[0].kind, ElementKind::Mtd);
}

// ─── Style resolution ───────────────────────────────────────────

#[test]
fn test_display_attribute_sets_display_style() {
    let root = model::parse(r#"<math display="block"><mi>x</mi></math>"#).unwrap();
    let style = MathStyle::resolve(&root, None);
    assert!(style.display_style);

    let root = model::parse(r#"<math display="inline"><mi>x</mi></math>"#).unwrap();
    let style = MathStyle::resolve(&root, None);
    assert!(!style.display_style);
}

#[test]
fn test_variant_cascades_through_mstyle() {
    let root = model::parse(
        r#"<math><mstyle mathvariant="bold"><mi mathvariant="italic">x</mi></mstyle></math>"#,
    )
    .unwrap();
    let outer = MathStyle::resolve(&root, None);
    let mstyle = MathStyle::resolve(&root.children[0], Some(&outer));
    assert!(mstyle.variant.bold);
    let mi = MathStyle::resolve(&root.children[0].children[0], Some(&mstyle));
    // Flags accumulate: bold from the ancestor, italic from the element.
    assert!(mi.variant.bold);
    assert!(mi.variant.italic);
}

#[test]
fn test_color_inherits_background_does_not_reset() {
    let root = model::parse(
        r#"<math><mstyle mathcolor="teal"><mi>x</mi></mstyle></math>"#,
    )
    .unwrap();
    let outer = MathStyle::resolve(&root, None);
    let mstyle = MathStyle::resolve(&root.children[0], Some(&outer));
    let mi = MathStyle::resolve(&root.children[0].children[0], Some(&mstyle));
    assert_eq!(mi.color.as_deref(), Some("teal"));
    assert_eq!(mi.background, None);
}

#[test]
fn test_parse_variant_combines_tokens() {
    let v = parse_variant("sans-serif-bold-italic", Variant::default());
    assert_eq!(v.family, Family::Sans);
    assert!(v.bold);
    assert!(v.italic);

    let v = parse_variant("double-struck", Variant::default());
    assert_eq!(v.family, Family::Double);
}

// ─── Character restyling ────────────────────────────────────────

#[test]
fn test_styled_char_bold() {
    let bold = Variant {
        bold: true,
        ..Variant::default()
    };
    assert_eq!(styled_char('A', &bold), '\u{1D400}');
    assert_eq!(styled_char('z', &bold), '\u{1D433}');
}

#[test]
fn test_styled_char_double_struck_exceptions() {
    let double = Variant {
        family: Family::Double,
        ..Variant::default()
    };
    // R and C live in the Letterlike Symbols block, not the math block.
    assert_eq!(styled_char('R', &double), '\u{211D}');
    assert_eq!(styled_char('C', &double), '\u{2102}');
}

#[test]
fn test_styled_char_leaves_unmapped_alone() {
    let bold = Variant {
        bold: true,
        ..Variant::default()
    };
    assert_eq!(styled_char('+', &bold), '+');
}

// ─── Operator dictionary ────────────────────────────────────────

#[test]
fn test_plus_spacing_by_form() {
    let infix = operators::get_params("+", Form::Infix);
    assert!((infix.lspace - 4.0 / 18.0).abs() < 1e-9);
    assert!((infix.rspace - 4.0 / 18.0).abs() < 1e-9);
    // Unary plus hugs its operand.
    let prefix = operators::get_params("+", Form::Prefix);
    assert_eq!(prefix.lspace, 0.0);
    assert!((prefix.rspace - 1.0 / 18.0).abs() < 1e-9);
}

#[test]
fn test_fences_and_separators() {
    let open = operators::get_params("(", Form::Prefix);
    assert!(open.fence);
    assert!(open.stretchy);
    let comma = operators::get_params(",", Form::Infix);
    assert!(comma.separator);
}

#[test]
fn test_large_operators() {
    let sum = operators::get_params("\u{2211}", Form::Prefix);
    assert!(sum.largeop);
    assert!(sum.movable_limits);
    let int = operators::get_params("\u{222B}", Form::Prefix);
    assert!(int.largeop);
    assert!(!int.movable_limits);
    assert!(operators::is_integral_char('\u{222B}'));
}

#[test]
fn test_function_names_known() {
    assert!(operators::is_function_name("sin"));
    assert!(operators::is_function_name("lim"));
    assert!(!operators::is_function_name("xyz"));
    let lim = operators::get_params("lim", Form::Prefix);
    assert!(lim.movable_limits);
}

#[test]
fn test_invisible_characters() {
    assert!(operators::is_invisible_char('\u{2061}'));
    assert!(operators::is_invisible_char('\u{2062}'));
    assert!(!operators::is_invisible_char('+'));
}

#[test]
fn test_attribute_overrides_dictionary() {
    let root = model::parse(r#"<math><mo lspace="0em" rspace="thickmathspace">+</mo></math>"#)
        .unwrap();
    let mut params = operators::get_params("+", Form::Infix);
    operators::apply_attrs(&mut params, &root.children[0]);
    assert_eq!(params.lspace, 0.0);
    assert!((params.rspace - 5.0 / 18.0).abs() < 1e-9);
}

// ─── Sizes and spaces ───────────────────────────────────────────

#[test]
fn test_named_math_spaces() {
    assert!((spacing::space_ems("thinmathspace") - 3.0 / 18.0).abs() < 1e-9);
    assert!((spacing::space_ems("0.5em") - 0.5).abs() < 1e-9);
    assert_eq!(spacing::space_ems("bogus"), 0.0);
}

#[test]
fn test_size_units_scale_with_font_size() {
    assert!((spacing::size_px("12px", 24.0) - 12.0).abs() < 1e-9);
    assert!((spacing::size_px("12pt", 24.0) - 12.0 * 1.333).abs() < 1e-6);
    // Font-relative units scale linearly with the current glyph size.
    let at10 = spacing::size_px("1em", 10.0);
    let at20 = spacing::size_px("1em", 20.0);
    assert!((at20 - 2.0 * at10).abs() < 1e-9);
    assert!(at10 > 0.0);
}

#[test]
fn test_minus_sign_accepted_in_sizes() {
    assert!((spacing::size_px("\u{2212}4", 24.0) + 4.0).abs() < 1e-9);
}

// ─── Configuration and errors ───────────────────────────────────

#[test]
fn test_config_json_round_trip() {
    let json = r#"{"fontSize": 18.0, "symbolReuse": false, "color": "navy"}"#;
    let config: RenderConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.font_size, 18.0);
    assert!(!config.symbol_reuse);
    assert_eq!(config.color.as_deref(), Some("navy"));
    // Unspecified fields keep their defaults.
    assert_eq!(config.precision, 4);
}

#[test]
fn test_bad_font_data_is_font_error() {
    let err = mathsvg::render("<math><mi>x</mi></math>", b"not a font", &RenderConfig::default())
        .unwrap_err();
    assert!(matches!(err, MathError::Font(_)));
}

#[test]
fn test_parse_failure_reported_before_font() {
    // A broken document errors as Parse even when the font is also bad.
    let err = mathsvg::render("<math><mi>x</mi>", b"not a font", &RenderConfig::default())
        .unwrap_err();
    assert!(matches!(err, MathError::Parse { .. }));
}

#[cfg(feature = "latex")]
#[test]
fn test_latex_conversion_feeds_parser() {
    let mathml = mathsvg::latex::latex_to_mathml(r"\sqrt{x + 1}", true).unwrap();
    let root = model::parse(&mathml).unwrap();
    fn find(el: &mathsvg::model::MathElement, kind: ElementKind) -> bool {
        el.kind == kind || el.children.iter().any(|c| find(c, kind))
    }
    assert!(find(&root, ElementKind::Msqrt));
}
