//! MathML document model.
//!
//! Parses MathML into a tree of [`MathElement`] values. Parsing is strict
//! about XML well-formedness (errors surface as [`MathError::Parse`] with a
//! hint) but forgiving about vocabulary: namespace prefixes are stripped,
//! a handful of legacy tags are normalized, and unknown elements degrade to
//! rows with a warning on stderr.
//!
//! Text content is normalized for math: ASCII hyphens become real minus
//! signs and common named entities the XML parser does not know are
//! expanded before parsing.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::MathError;

/// Element vocabulary after tag normalization.
///
/// `<math>` and `<none>` become rows; `<ms>` becomes text. Table rows and
/// cells keep their identity so table layout can find them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Mrow,
    Mi,
    Mn,
    Mo,
    Mtext,
    Mspace,
    Msub,
    Msup,
    Msubsup,
    Mover,
    Munder,
    Munderover,
    Mfrac,
    Msqrt,
    Mroot,
    Mfenced,
    Menclose,
    Mstyle,
    Mpadded,
    Mphantom,
    Merror,
    Mtable,
    Mtr,
    Mtd,
}

impl ElementKind {
    fn from_tag(tag: &str) -> Option<ElementKind> {
        Some(match tag {
            "math" | "mrow" | "none" | "mlabeledtr" => ElementKind::Mrow,
            "mi" => ElementKind::Mi,
            "mn" => ElementKind::Mn,
            "mo" => ElementKind::Mo,
            "mtext" | "ms" => ElementKind::Mtext,
            "mspace" => ElementKind::Mspace,
            "msub" => ElementKind::Msub,
            "msup" => ElementKind::Msup,
            "msubsup" => ElementKind::Msubsup,
            "mover" => ElementKind::Mover,
            "munder" => ElementKind::Munder,
            "munderover" => ElementKind::Munderover,
            "mfrac" => ElementKind::Mfrac,
            "msqrt" => ElementKind::Msqrt,
            "mroot" => ElementKind::Mroot,
            "mfenced" => ElementKind::Mfenced,
            "menclose" => ElementKind::Menclose,
            "mstyle" => ElementKind::Mstyle,
            "mpadded" => ElementKind::Mpadded,
            "mphantom" => ElementKind::Mphantom,
            "merror" => ElementKind::Merror,
            "mtable" => ElementKind::Mtable,
            "mtr" => ElementKind::Mtr,
            "mtd" => ElementKind::Mtd,
            _ => return None,
        })
    }
}

/// One parsed element with its attributes, direct text, and children.
#[derive(Debug, Clone)]
pub struct MathElement {
    pub kind: ElementKind,
    pub attrs: HashMap<String, String>,
    pub text: String,
    pub children: Vec<MathElement>,
}

impl MathElement {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attrs: HashMap::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Attribute parsed as a boolean ("true"/"false").
    pub fn attr_bool(&self, name: &str) -> Option<bool> {
        match self.attr(name)? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

/// Multi-character operator spellings and named entities expanded before
/// the XML parser sees the input.
const TEXT_ESCAPES: &[(&str, &str)] = &[
    (":=", "\u{2254}"),
    ("*=", "\u{2A6E}"),
    ("==", "\u{2A75}"),
    ("!=", "\u{2260}"),
    ("&InvisibleComma;", ""),
    ("&InvisibleTimes;", ""),
];

/// Named character entities MathML sources commonly use. The XML parser
/// only knows the five predefined ones; everything else must be expanded
/// up front. Numeric references pass through untouched.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("alpha", "\u{03B1}"),
    ("beta", "\u{03B2}"),
    ("gamma", "\u{03B3}"),
    ("delta", "\u{03B4}"),
    ("epsilon", "\u{03B5}"),
    ("zeta", "\u{03B6}"),
    ("eta", "\u{03B7}"),
    ("theta", "\u{03B8}"),
    ("iota", "\u{03B9}"),
    ("kappa", "\u{03BA}"),
    ("lambda", "\u{03BB}"),
    ("mu", "\u{03BC}"),
    ("nu", "\u{03BD}"),
    ("xi", "\u{03BE}"),
    ("pi", "\u{03C0}"),
    ("rho", "\u{03C1}"),
    ("sigma", "\u{03C3}"),
    ("tau", "\u{03C4}"),
    ("upsilon", "\u{03C5}"),
    ("phi", "\u{03C6}"),
    ("chi", "\u{03C7}"),
    ("psi", "\u{03C8}"),
    ("omega", "\u{03C9}"),
    ("Gamma", "\u{0393}"),
    ("Delta", "\u{0394}"),
    ("Theta", "\u{0398}"),
    ("Lambda", "\u{039B}"),
    ("Xi", "\u{039E}"),
    ("Pi", "\u{03A0}"),
    ("Sigma", "\u{03A3}"),
    ("Phi", "\u{03A6}"),
    ("Psi", "\u{03A8}"),
    ("Omega", "\u{03A9}"),
    ("PlusMinus", "\u{00B1}"),
    ("plusmn", "\u{00B1}"),
    ("times", "\u{00D7}"),
    ("divide", "\u{00F7}"),
    ("minus", "\u{2212}"),
    ("cdot", "\u{22C5}"),
    ("sdot", "\u{22C5}"),
    ("sum", "\u{2211}"),
    ("prod", "\u{220F}"),
    ("int", "\u{222B}"),
    ("infin", "\u{221E}"),
    ("infty", "\u{221E}"),
    ("part", "\u{2202}"),
    ("PartialD", "\u{2202}"),
    ("nabla", "\u{2207}"),
    ("le", "\u{2264}"),
    ("leq", "\u{2264}"),
    ("ge", "\u{2265}"),
    ("geq", "\u{2265}"),
    ("ne", "\u{2260}"),
    ("equiv", "\u{2261}"),
    ("approx", "\u{2248}"),
    ("prop", "\u{221D}"),
    ("forall", "\u{2200}"),
    ("exist", "\u{2203}"),
    ("isin", "\u{2208}"),
    ("notin", "\u{2209}"),
    ("sube", "\u{2286}"),
    ("supe", "\u{2287}"),
    ("cap", "\u{2229}"),
    ("cup", "\u{222A}"),
    ("empty", "\u{2205}"),
    ("and", "\u{2227}"),
    ("or", "\u{2228}"),
    ("not", "\u{00AC}"),
    ("radic", "\u{221A}"),
    ("perp", "\u{22A5}"),
    ("deg", "\u{00B0}"),
    ("prime", "\u{2032}"),
    ("Prime", "\u{2033}"),
    ("hellip", "\u{2026}"),
    ("ctdot", "\u{22EF}"),
    ("rarr", "\u{2192}"),
    ("larr", "\u{2190}"),
    ("harr", "\u{2194}"),
    ("rArr", "\u{21D2}"),
    ("lArr", "\u{21D0}"),
    ("hArr", "\u{21D4}"),
    ("uarr", "\u{2191}"),
    ("darr", "\u{2193}"),
    ("RightArrow", "\u{2192}"),
    ("LeftArrow", "\u{2190}"),
    ("lceil", "\u{2308}"),
    ("rceil", "\u{2309}"),
    ("lfloor", "\u{230A}"),
    ("rfloor", "\u{230B}"),
    ("lang", "\u{27E8}"),
    ("rang", "\u{27E9}"),
    ("otimes", "\u{2297}"),
    ("oplus", "\u{2295}"),
    ("ApplyFunction", "\u{2061}"),
    ("af", "\u{2061}"),
    ("it", "\u{2062}"),
    ("ic", "\u{2063}"),
    ("nbsp", "\u{00A0}"),
    ("thinsp", "\u{2009}"),
    ("ThinSpace", "\u{2009}"),
    ("emsp", "\u{2003}"),
    ("ensp", "\u{2002}"),
    ("ZeroWidthSpace", "\u{200B}"),
    ("dd", "\u{2146}"),
    ("DifferentialD", "\u{2146}"),
    ("ee", "\u{2147}"),
    ("ExponentialE", "\u{2147}"),
    ("ii", "\u{2148}"),
];

/// Expand the entities and operator spellings the XML parser cannot.
pub fn preprocess(input: &str) -> String {
    let mut s = input.to_string();
    for (from, to) in TEXT_ESCAPES {
        s = s.replace(from, to);
    }
    for (name, to) in NAMED_ENTITIES {
        let pattern = format!("&{name};");
        if s.contains(&pattern) {
            s = s.replace(&pattern, to);
        }
    }
    s
}

/// Normalize element text: trim, collapse internal whitespace runs to one
/// space, and replace ASCII hyphens with the real minus sign.
fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_space = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(if ch == '-' { '\u{2212}' } else { ch });
            last_space = false;
        }
    }
    out
}

fn local_name(qname: &[u8]) -> String {
    let name = String::from_utf8_lossy(qname);
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.into_owned(),
    }
}

fn element_from_start(
    start: &quick_xml::events::BytesStart,
) -> Result<MathElement, MathError> {
    let tag = local_name(start.name().as_ref());
    let kind = ElementKind::from_tag(&tag).unwrap_or_else(|| {
        eprintln!("warning: unknown MathML element <{tag}>, treating as mrow");
        ElementKind::Mrow
    });
    let mut element = MathElement::new(kind);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| MathError::Parse {
            message: format!("bad attribute in <{tag}>: {e}"),
            hint: "Attribute values must be quoted.".to_string(),
        })?;
        let key = local_name(attr.key.as_ref());
        let value = attr.unescape_value().map_err(MathError::from)?.into_owned();
        element.attrs.insert(key, value);
    }
    Ok(element)
}

/// Parse a MathML string into an element tree.
///
/// The returned root is always a row (the `<math>` element itself, or a
/// synthesized one when the input root is some other element).
pub fn parse(input: &str) -> Result<MathElement, MathError> {
    let prepared = preprocess(input);
    let mut reader = Reader::from_str(&prepared);

    let mut stack: Vec<MathElement> = Vec::new();
    let mut root: Option<MathElement> = None;
    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let decoded = text.unescape().map_err(MathError::from)?;
                    let normalized = normalize_text(&decoded);
                    if !normalized.is_empty() {
                        if !current.text.is_empty() {
                            current.text.push(' ');
                        }
                        current.text.push_str(&normalized);
                    }
                }
            }
            Event::End(_) => {
                let finished = stack.pop().ok_or_else(|| MathError::Parse {
                    message: "unexpected closing tag".to_string(),
                    hint: "Every close tag needs a matching open tag.".to_string(),
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(finished),
                    None => {
                        root = Some(finished);
                        break;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err(MathError::Parse {
            message: "input ended with unclosed elements".to_string(),
            hint: "Is the input truncated?".to_string(),
        });
    }
    let root = root.ok_or_else(|| MathError::Parse {
        message: "no MathML element found".to_string(),
        hint: "Expected a <math> root element.".to_string(),
    })?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_row() {
        let root = parse("<math><mi>x</mi><mo>+</mo><mn>2</mn></math>").unwrap();
        assert_eq!(root.kind, ElementKind::Mrow);
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0].kind, ElementKind::Mi);
        assert_eq!(root.children[0].text, "x");
        assert_eq!(root.children[2].text, "2");
    }

    #[test]
    fn test_namespace_prefix_stripped() {
        let root =
            parse(r#"<m:math xmlns:m="http://www.w3.org/1998/Math/MathML"><m:mi>y</m:mi></m:math>"#)
                .unwrap();
        assert_eq!(root.kind, ElementKind::Mrow);
        assert_eq!(root.children[0].kind, ElementKind::Mi);
    }

    #[test]
    fn test_hyphen_becomes_minus() {
        let root = parse("<math><mn>-4</mn></math>").unwrap();
        assert_eq!(root.children[0].text, "\u{2212}4");
    }

    #[test]
    fn test_named_entity_expansion() {
        let root = parse("<math><mi>&alpha;</mi><mo>&le;</mo></math>").unwrap();
        assert_eq!(root.children[0].text, "\u{03B1}");
        assert_eq!(root.children[1].text, "\u{2264}");
    }

    #[test]
    fn test_ms_normalizes_to_mtext() {
        let root = parse("<math><ms>lit</ms></math>").unwrap();
        assert_eq!(root.children[0].kind, ElementKind::Mtext);
    }

    #[test]
    fn test_attributes_preserved() {
        let root = parse(r#"<math><mo stretchy="false">(</mo></math>"#).unwrap();
        assert_eq!(root.children[0].attr("stretchy"), Some("false"));
        assert_eq!(root.children[0].attr_bool("stretchy"), Some(false));
    }

    #[test]
    fn test_empty_element_form() {
        let root = parse(r#"<math><mspace width="1em"/></math>"#).unwrap();
        assert_eq!(root.children[0].kind, ElementKind::Mspace);
        assert_eq!(root.children[0].attr("width"), Some("1em"));
    }

    #[test]
    fn test_unclosed_tag_is_parse_error() {
        let err = parse("<math><mi>x</mi>").unwrap_err();
        assert!(matches!(err, MathError::Parse { .. }));
    }

    #[test]
    fn test_mismatched_tag_is_parse_error() {
        let err = parse("<math><mi>x</mo></math>").unwrap_err();
        assert!(matches!(err, MathError::Parse { .. }));
    }

    #[test]
    fn test_unknown_element_degrades_to_row() {
        let root = parse("<math><mfancy><mi>x</mi></mfancy></math>").unwrap();
        assert_eq!(root.children[0].kind, ElementKind::Mrow);
        assert_eq!(root.children[0].children.len(), 1);
    }

    #[test]
    fn test_whitespace_collapsed() {
        let root = parse("<math><mtext>a \n  b</mtext></math>").unwrap();
        assert_eq!(root.children[0].text, "a b");
    }
}
