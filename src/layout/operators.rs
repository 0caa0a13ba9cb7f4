//! Operator dictionary.
//!
//! Spacing and behavior for `<mo>` content, keyed by operator text and
//! form (prefix/infix/postfix). Spacing values are in eighteenths of an
//! em, following the MathML operator dictionary conventions. Element
//! attributes override anything found here.

use crate::model::MathElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Prefix,
    Infix,
    Postfix,
}

impl Form {
    pub fn from_attr(attr: &str) -> Option<Form> {
        match attr {
            "prefix" => Some(Form::Prefix),
            "infix" => Some(Form::Infix),
            "postfix" => Some(Form::Postfix),
            _ => None,
        }
    }
}

/// Resolved operator parameters. Spaces are in ems.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpParams {
    pub lspace: f64,
    pub rspace: f64,
    pub stretchy: bool,
    pub fence: bool,
    pub separator: bool,
    pub largeop: bool,
    pub movable_limits: bool,
}

const STRETCHY: u8 = 1;
const FENCE: u8 = 2;
const SEPARATOR: u8 = 4;
const LARGEOP: u8 = 8;
const MOVABLE: u8 = 16;

/// (text, form, lspace, rspace, flags), spaces in 1/18 em.
const TABLE: &[(&str, Form, u8, u8, u8)] = &[
    // Fences
    ("(", Form::Prefix, 0, 0, STRETCHY | FENCE),
    (")", Form::Postfix, 0, 0, STRETCHY | FENCE),
    ("[", Form::Prefix, 0, 0, STRETCHY | FENCE),
    ("]", Form::Postfix, 0, 0, STRETCHY | FENCE),
    ("{", Form::Prefix, 0, 0, STRETCHY | FENCE),
    ("}", Form::Postfix, 0, 0, STRETCHY | FENCE),
    ("\u{27E8}", Form::Prefix, 0, 0, STRETCHY | FENCE),
    ("\u{27E9}", Form::Postfix, 0, 0, STRETCHY | FENCE),
    ("\u{2308}", Form::Prefix, 0, 0, STRETCHY | FENCE),
    ("\u{2309}", Form::Postfix, 0, 0, STRETCHY | FENCE),
    ("\u{230A}", Form::Prefix, 0, 0, STRETCHY | FENCE),
    ("\u{230B}", Form::Postfix, 0, 0, STRETCHY | FENCE),
    ("|", Form::Prefix, 0, 0, STRETCHY | FENCE),
    ("|", Form::Postfix, 0, 0, STRETCHY | FENCE),
    ("\u{2016}", Form::Prefix, 0, 0, STRETCHY | FENCE),
    ("\u{2016}", Form::Postfix, 0, 0, STRETCHY | FENCE),
    // Separators
    (",", Form::Infix, 0, 3, SEPARATOR),
    (";", Form::Infix, 0, 3, SEPARATOR),
    // Additive
    ("+", Form::Infix, 4, 4, 0),
    ("+", Form::Prefix, 0, 1, 0),
    ("\u{2212}", Form::Infix, 4, 4, 0),
    ("\u{2212}", Form::Prefix, 0, 1, 0),
    ("\u{00B1}", Form::Infix, 4, 4, 0),
    ("\u{00B1}", Form::Prefix, 0, 1, 0),
    ("\u{2213}", Form::Infix, 4, 4, 0),
    ("\u{2213}", Form::Prefix, 0, 1, 0),
    // Multiplicative
    ("\u{00D7}", Form::Infix, 4, 4, 0),
    ("\u{22C5}", Form::Infix, 4, 4, 0),
    ("\u{00B7}", Form::Infix, 4, 4, 0),
    ("\u{2217}", Form::Infix, 4, 4, 0),
    ("\u{2218}", Form::Infix, 4, 4, 0),
    ("\u{00F7}", Form::Infix, 4, 4, 0),
    ("\u{2297}", Form::Infix, 4, 4, 0),
    ("\u{2295}", Form::Infix, 4, 4, 0),
    ("\u{2296}", Form::Infix, 4, 4, 0),
    ("\u{2299}", Form::Infix, 4, 4, 0),
    ("/", Form::Infix, 1, 1, 0),
    ("\u{2215}", Form::Infix, 1, 1, 0),
    // Set and logic
    ("\u{2227}", Form::Infix, 4, 4, 0),
    ("\u{2228}", Form::Infix, 4, 4, 0),
    ("\u{2229}", Form::Infix, 4, 4, 0),
    ("\u{222A}", Form::Infix, 4, 4, 0),
    ("\u{2216}", Form::Infix, 4, 4, 0),
    ("\u{00AC}", Form::Prefix, 0, 1, 0),
    // Relations
    ("=", Form::Infix, 5, 5, 0),
    ("\u{2260}", Form::Infix, 5, 5, 0),
    ("<", Form::Infix, 5, 5, 0),
    (">", Form::Infix, 5, 5, 0),
    ("\u{2264}", Form::Infix, 5, 5, 0),
    ("\u{2265}", Form::Infix, 5, 5, 0),
    ("\u{226A}", Form::Infix, 5, 5, 0),
    ("\u{226B}", Form::Infix, 5, 5, 0),
    ("\u{2248}", Form::Infix, 5, 5, 0),
    ("\u{2243}", Form::Infix, 5, 5, 0),
    ("\u{2245}", Form::Infix, 5, 5, 0),
    ("\u{2261}", Form::Infix, 5, 5, 0),
    ("\u{221D}", Form::Infix, 5, 5, 0),
    ("\u{223C}", Form::Infix, 5, 5, 0),
    ("\u{2254}", Form::Infix, 5, 5, 0),
    ("\u{2A75}", Form::Infix, 5, 5, 0),
    ("\u{2A6E}", Form::Infix, 5, 5, 0),
    ("\u{2208}", Form::Infix, 5, 5, 0),
    ("\u{2209}", Form::Infix, 5, 5, 0),
    ("\u{220B}", Form::Infix, 5, 5, 0),
    ("\u{2282}", Form::Infix, 5, 5, 0),
    ("\u{2283}", Form::Infix, 5, 5, 0),
    ("\u{2286}", Form::Infix, 5, 5, 0),
    ("\u{2287}", Form::Infix, 5, 5, 0),
    ("\u{22A5}", Form::Infix, 5, 5, 0),
    ("\u{2225}", Form::Infix, 5, 5, 0),
    ("\u{2223}", Form::Infix, 5, 5, 0),
    // Arrows (stretch horizontally when used as accents)
    ("\u{2192}", Form::Infix, 5, 5, STRETCHY),
    ("\u{2190}", Form::Infix, 5, 5, STRETCHY),
    ("\u{2194}", Form::Infix, 5, 5, STRETCHY),
    ("\u{21D2}", Form::Infix, 5, 5, STRETCHY),
    ("\u{21D0}", Form::Infix, 5, 5, STRETCHY),
    ("\u{21D4}", Form::Infix, 5, 5, STRETCHY),
    ("\u{21A6}", Form::Infix, 5, 5, STRETCHY),
    ("\u{27F6}", Form::Infix, 5, 5, STRETCHY),
    ("\u{27F5}", Form::Infix, 5, 5, STRETCHY),
    // n-ary operators
    ("\u{2211}", Form::Prefix, 1, 2, LARGEOP | MOVABLE),
    ("\u{220F}", Form::Prefix, 1, 2, LARGEOP | MOVABLE),
    ("\u{2210}", Form::Prefix, 1, 2, LARGEOP | MOVABLE),
    ("\u{22C0}", Form::Prefix, 1, 2, LARGEOP | MOVABLE),
    ("\u{22C1}", Form::Prefix, 1, 2, LARGEOP | MOVABLE),
    ("\u{22C2}", Form::Prefix, 1, 2, LARGEOP | MOVABLE),
    ("\u{22C3}", Form::Prefix, 1, 2, LARGEOP | MOVABLE),
    ("\u{2A01}", Form::Prefix, 1, 2, LARGEOP | MOVABLE),
    ("\u{2A02}", Form::Prefix, 1, 2, LARGEOP | MOVABLE),
    ("\u{2A00}", Form::Prefix, 1, 2, LARGEOP | MOVABLE),
    ("\u{2A04}", Form::Prefix, 1, 2, LARGEOP | MOVABLE),
    ("\u{2A06}", Form::Prefix, 1, 2, LARGEOP | MOVABLE),
    // Integrals keep their limits beside the glyph
    ("\u{222B}", Form::Prefix, 1, 2, LARGEOP),
    ("\u{222C}", Form::Prefix, 1, 2, LARGEOP),
    ("\u{222D}", Form::Prefix, 1, 2, LARGEOP),
    ("\u{222E}", Form::Prefix, 1, 2, LARGEOP),
    ("\u{222F}", Form::Prefix, 1, 2, LARGEOP),
    ("\u{2230}", Form::Prefix, 1, 2, LARGEOP),
    // Postfix
    ("!", Form::Postfix, 1, 0, 0),
    ("\u{2032}", Form::Postfix, 0, 0, 0),
    ("\u{2033}", Form::Postfix, 0, 0, 0),
    ("\u{2034}", Form::Postfix, 0, 0, 0),
    ("\u{00B0}", Form::Postfix, 0, 0, 0),
    // Misc prefix
    ("\u{221A}", Form::Prefix, 1, 1, STRETCHY),
    ("\u{2207}", Form::Prefix, 0, 1, 0),
    ("\u{2202}", Form::Prefix, 0, 1, 0),
    // Horizontal accent/bracket pieces
    ("\u{203E}", Form::Postfix, 0, 0, STRETCHY),
    ("\u{00AF}", Form::Postfix, 0, 0, STRETCHY),
    ("^", Form::Postfix, 0, 0, STRETCHY),
    ("\u{02C6}", Form::Postfix, 0, 0, STRETCHY),
    ("~", Form::Postfix, 0, 0, STRETCHY),
    ("\u{02DC}", Form::Postfix, 0, 0, STRETCHY),
    ("_", Form::Postfix, 0, 0, STRETCHY),
    ("\u{23DE}", Form::Postfix, 0, 0, STRETCHY),
    ("\u{23DF}", Form::Postfix, 0, 0, STRETCHY),
    ("\u{23B4}", Form::Postfix, 0, 0, STRETCHY),
    ("\u{23B5}", Form::Postfix, 0, 0, STRETCHY),
];

/// Function names that latex2mathml and hand-written MathML put in `<mi>`
/// but which space like operators (upright, thin space after).
const NAMES: &[&str] = &[
    "sin", "cos", "tan", "sec", "csc", "cot", "sinh", "cosh", "tanh", "coth", "arcsin", "arccos",
    "arctan", "exp", "log", "ln", "lg", "det", "dim", "mod", "gcd", "arg", "deg", "hom", "ker",
    "Pr", "lim", "max", "min", "sup", "inf", "liminf", "limsup",
];

/// Function names whose under/over limits move beside them inline.
const MOVABLE_NAMES: &[&str] = &["lim", "max", "min", "sup", "inf", "liminf", "limsup"];

/// Integral characters. Scripts on these hug the slanted glyph, so the
/// italic correction flips compared with other large operators.
const INTEGRALS: &[char] = &[
    '\u{222B}', '\u{222C}', '\u{222D}', '\u{222E}', '\u{222F}', '\u{2230}', '\u{2231}', '\u{2232}',
    '\u{2233}', '\u{2A0C}',
];

/// Characters that render as nothing but influence parsing (function
/// application, invisible times/separator).
const INVISIBLE: &[char] = &['\u{2061}', '\u{2062}', '\u{2063}', '\u{2064}'];

pub fn is_function_name(text: &str) -> bool {
    NAMES.contains(&text)
}

pub fn is_integral_char(ch: char) -> bool {
    INTEGRALS.contains(&ch)
}

pub fn is_invisible_char(ch: char) -> bool {
    INVISIBLE.contains(&ch)
}

fn from_entry(l: u8, r: u8, flags: u8) -> OpParams {
    OpParams {
        lspace: f64::from(l) / 18.0,
        rspace: f64::from(r) / 18.0,
        stretchy: flags & STRETCHY != 0,
        fence: flags & FENCE != 0,
        separator: flags & SEPARATOR != 0,
        largeop: flags & LARGEOP != 0,
        movable_limits: flags & MOVABLE != 0,
    }
}

/// Look up operator parameters by text and form. Falls back to any form
/// for the same text, then to per-form defaults.
pub fn get_params(text: &str, form: Form) -> OpParams {
    if let Some(&(_, _, l, r, flags)) = TABLE.iter().find(|(t, f, ..)| *t == text && *f == form) {
        return from_entry(l, r, flags);
    }
    if is_function_name(text) {
        let mut p = from_entry(0, 3, 0);
        p.movable_limits = MOVABLE_NAMES.contains(&text);
        return p;
    }
    if let Some(&(_, _, l, r, flags)) = TABLE.iter().find(|(t, ..)| *t == text) {
        return from_entry(l, r, flags);
    }
    match form {
        Form::Infix => from_entry(5, 5, 0),
        Form::Prefix | Form::Postfix => from_entry(0, 0, 0),
    }
}

/// Apply `<mo>` attribute overrides on top of dictionary parameters.
pub fn apply_attrs(params: &mut OpParams, element: &MathElement) {
    use crate::layout::spacing::space_ems;
    if let Some(v) = element.attr("lspace") {
        params.lspace = space_ems(v);
    }
    if let Some(v) = element.attr("rspace") {
        params.rspace = space_ems(v);
    }
    if let Some(v) = element.attr_bool("stretchy") {
        params.stretchy = v;
    }
    if let Some(v) = element.attr_bool("fence") {
        params.fence = v;
    }
    if let Some(v) = element.attr_bool("separator") {
        params.separator = v;
    }
    if let Some(v) = element.attr_bool("largeop") {
        params.largeop = v;
    }
    if let Some(v) = element.attr_bool("movablelimits") {
        params.movable_limits = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse;

    #[test]
    fn test_plus_forms_differ() {
        let infix = get_params("+", Form::Infix);
        let prefix = get_params("+", Form::Prefix);
        assert!((infix.lspace - 4.0 / 18.0).abs() < 1e-12);
        assert_eq!(prefix.lspace, 0.0);
        assert!(prefix.rspace < infix.rspace);
    }

    #[test]
    fn test_fences_are_stretchy() {
        let open = get_params("(", Form::Prefix);
        assert!(open.stretchy);
        assert!(open.fence);
        assert_eq!(open.lspace, 0.0);
    }

    #[test]
    fn test_sum_is_large_and_movable() {
        let sum = get_params("\u{2211}", Form::Prefix);
        assert!(sum.largeop);
        assert!(sum.movable_limits);
    }

    #[test]
    fn test_integral_large_but_not_movable() {
        let int = get_params("\u{222B}", Form::Prefix);
        assert!(int.largeop);
        assert!(!int.movable_limits);
        assert!(is_integral_char('\u{222B}'));
    }

    #[test]
    fn test_unknown_infix_gets_thick_space() {
        let p = get_params("\u{22C7}", Form::Infix);
        assert!((p.lspace - 5.0 / 18.0).abs() < 1e-12);
    }

    #[test]
    fn test_fallback_to_other_form() {
        // "=" only has an infix entry; prefix lookup still finds it.
        let p = get_params("=", Form::Prefix);
        assert!((p.lspace - 5.0 / 18.0).abs() < 1e-12);
    }

    #[test]
    fn test_function_names() {
        assert!(is_function_name("sin"));
        assert!(!is_function_name("xyz"));
        let lim = get_params("lim", Form::Prefix);
        assert!(lim.movable_limits);
        let sin = get_params("sin", Form::Prefix);
        assert!(!sin.movable_limits);
        assert!((sin.rspace - 3.0 / 18.0).abs() < 1e-12);
    }

    #[test]
    fn test_attribute_overrides() {
        let root = parse(r#"<math><mo stretchy="false" lspace="0em">(</mo></math>"#).unwrap();
        let mut p = get_params("(", Form::Prefix);
        apply_attrs(&mut p, &root.children[0]);
        assert!(!p.stretchy);
        assert_eq!(p.lspace, 0.0);
    }
}
