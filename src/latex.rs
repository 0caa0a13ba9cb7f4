//! LaTeX input support.
//!
//! Converts LaTeX math to MathML before the normal pipeline runs. Gated
//! behind the `latex` feature so the default build carries no LaTeX
//! grammar; without the feature the conversion returns a clear error
//! instead of failing to compile callers.

use crate::error::MathError;

/// Convert a LaTeX math expression to MathML markup.
///
/// `display` selects block (display-style) or inline rendering, which
/// the converter records on the root `<math>` element.
#[cfg(feature = "latex")]
pub fn latex_to_mathml(latex: &str, display: bool) -> Result<String, MathError> {
    let style = if display {
        latex2mathml::DisplayStyle::Block
    } else {
        latex2mathml::DisplayStyle::Inline
    };
    latex2mathml::latex_to_mathml(latex, style).map_err(|e| MathError::Latex(e.to_string()))
}

#[cfg(not(feature = "latex"))]
pub fn latex_to_mathml(_latex: &str, _display: bool) -> Result<String, MathError> {
    Err(MathError::Latex(
        "LaTeX support is not enabled; rebuild with the `latex` feature".to_string(),
    ))
}

#[cfg(all(test, feature = "latex"))]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_converts() {
        let mathml = latex_to_mathml(r"\frac{1}{2}", true).unwrap();
        assert!(mathml.contains("<mfrac>"));
        assert!(mathml.contains("display=\"block\""));
    }

    #[test]
    fn test_inline_mode() {
        let mathml = latex_to_mathml("x^2", false).unwrap();
        assert!(mathml.contains("<msup>"));
    }

    #[test]
    fn test_invalid_latex_errors() {
        assert!(latex_to_mathml(r"\frac{1}", true).is_err());
    }
}
