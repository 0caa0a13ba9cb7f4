//! # Style Resolution
//!
//! MathML style attributes (mathvariant, displaystyle, mathcolor,
//! scriptlevel, ...) cascade from parent to child. Resolution here is
//! pure: an element's attributes plus the parent's resolved style produce
//! a new [`MathStyle`] value, and nothing in the input tree is mutated.
//!
//! Variant styling (bold, italic, script, fraktur, ...) is realized by
//! remapping characters into the Unicode math alphanumeric blocks; see
//! [`unicode`].

pub mod unicode;

use crate::model::MathElement;

/// Font family branch of a math variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Family {
    #[default]
    Serif,
    Sans,
    Script,
    Double,
    Mono,
    Fraktur,
}

impl Family {
    fn from_token(token: &str) -> Option<Family> {
        Some(match token {
            "serif" => Family::Serif,
            "sans" => Family::Sans,
            "script" => Family::Script,
            "double" => Family::Double,
            "mono" => Family::Mono,
            "fraktur" => Family::Fraktur,
            _ => return None,
        })
    }
}

/// Decomposed mathvariant: family plus bold/italic/normal flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Variant {
    pub family: Family,
    pub bold: bool,
    pub italic: bool,
    /// "normal" suppresses the automatic italicizing of identifiers.
    pub normal: bool,
}

/// Parse a mathvariant attribute against the parent's variant.
///
/// Tokens like "bold-italic" or "sans-serif-bold" combine; flags only ever
/// turn on, and the family changes only when the attribute names one.
pub fn parse_variant(attr: &str, parent: Variant) -> Variant {
    let bold = attr.contains("bold") || parent.bold;
    let italic = attr.contains("italic") || parent.italic;
    let normal = attr.contains("normal") || parent.normal;
    let stripped: String = attr
        .replace("bold", "")
        .replace("italic", "")
        .replace("normal", "")
        .replace('-', " ");
    let mut family = parent.family;
    for token in stripped.split_whitespace() {
        // "sans-serif" reduces to tokens "sans" and "serif"; take the
        // first that names a family.
        if let Some(f) = Family::from_token(token) {
            family = f;
            break;
        }
    }
    Variant {
        family,
        bold,
        italic,
        normal,
    }
}

/// Resolved style for one element. Values are final: consumers never look
/// back up the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct MathStyle {
    pub variant: Variant,
    pub display_style: bool,
    pub script_level: u8,
    pub math_size: Option<String>,
    pub color: Option<String>,
    pub background: Option<String>,
}

impl Default for MathStyle {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            display_style: true,
            script_level: 0,
            math_size: None,
            color: None,
            background: None,
        }
    }
}

impl MathStyle {
    /// Resolve an element's style from its attributes and its parent's
    /// resolved style.
    pub fn resolve(element: &MathElement, parent: Option<&MathStyle>) -> MathStyle {
        let base = parent.cloned().unwrap_or_default();

        let variant = match element.attr("mathvariant") {
            Some(attr) => parse_variant(attr, base.variant),
            None => base.variant,
        };

        let display_style = if let Some(attr) = element.attr("displaystyle") {
            attr == "true"
        } else if let Some(attr) = element.attr("display") {
            attr != "inline"
        } else {
            base.display_style
        };

        let script_level = element
            .attr("scriptlevel")
            .and_then(parse_script_level)
            .unwrap_or(base.script_level);

        let mut style = MathStyle {
            variant,
            display_style,
            script_level,
            math_size: element
                .attr("mathsize")
                .map(str::to_string)
                .or(base.math_size),
            color: element.attr("mathcolor").map(str::to_string).or(base.color),
            background: element
                .attr("mathbackground")
                .map(str::to_string)
                .or(base.background),
        };

        // CSS-style attribute: only color and background are honored.
        if let Some(css) = element.attr("style") {
            for declaration in css.split(';') {
                let Some((key, value)) = declaration.split_once(':') else {
                    continue;
                };
                match key.trim().to_ascii_lowercase().as_str() {
                    "color" => style.color = Some(value.trim().to_string()),
                    "background" => style.background = Some(value.trim().to_string()),
                    _ => {}
                }
            }
        }
        style
    }
}

fn parse_script_level(attr: &str) -> Option<u8> {
    attr.trim().trim_start_matches('+').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse;

    fn styled(xml: &str) -> MathStyle {
        let root = parse(xml).unwrap();
        let parent = MathStyle::resolve(&root, None);
        MathStyle::resolve(&root.children[0], Some(&parent))
    }

    #[test]
    fn test_default_is_display_serif() {
        let s = MathStyle::default();
        assert!(s.display_style);
        assert_eq!(s.variant.family, Family::Serif);
        assert!(!s.variant.italic);
    }

    #[test]
    fn test_variant_tokens_combine() {
        let v = parse_variant("bold-italic", Variant::default());
        assert!(v.bold);
        assert!(v.italic);
        assert_eq!(v.family, Family::Serif);

        let v = parse_variant("sans-serif-bold", Variant::default());
        assert!(v.bold);
        assert_eq!(v.family, Family::Sans);
    }

    #[test]
    fn test_variant_inherits_family() {
        let parent = parse_variant("fraktur", Variant::default());
        let v = parse_variant("bold", parent);
        assert_eq!(v.family, Family::Fraktur);
        assert!(v.bold);
    }

    #[test]
    fn test_display_inline_attr() {
        let root = parse(r#"<math display="inline"><mi>x</mi></math>"#).unwrap();
        let s = MathStyle::resolve(&root, None);
        assert!(!s.display_style);
    }

    #[test]
    fn test_displaystyle_inherited_and_overridable() {
        let s = styled(r#"<math displaystyle="false"><mi>x</mi></math>"#);
        assert!(!s.display_style);
        let s = styled(r#"<math displaystyle="false"><mstyle displaystyle="true"/></math>"#);
        assert!(s.display_style);
    }

    #[test]
    fn test_css_style_attribute() {
        let s = styled(r#"<math><mi style="color: red; background: #eee">x</mi></math>"#);
        assert_eq!(s.color.as_deref(), Some("red"));
        assert_eq!(s.background.as_deref(), Some("#eee"));
    }

    #[test]
    fn test_mathcolor_inherits() {
        let s = styled(r#"<math mathcolor="blue"><mi>x</mi></math>"#);
        assert_eq!(s.color.as_deref(), Some("blue"));
    }

    #[test]
    fn test_script_level_plus_prefix() {
        assert_eq!(parse_script_level("+2"), Some(2));
        assert_eq!(parse_script_level("1"), Some(1));
        assert_eq!(parse_script_level("x"), None);
    }
}
