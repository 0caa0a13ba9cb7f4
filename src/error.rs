//! Structured error types for the rendering engine.
//!
//! Four variants cover the real error sources: MathML parsing, font loading,
//! the LaTeX converter boundary, and output generation failures.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum MathError {
    /// MathML input failed to parse as well-formed XML.
    #[error("Failed to parse MathML: {message}{}", fmt_hint(.hint))]
    Parse { message: String, hint: String },

    /// A font could not be loaded or is missing required tables.
    #[error("Font error: {0}")]
    Font(String),

    /// LaTeX input was requested but the converter is unavailable or failed.
    #[error("LaTeX error: {0}")]
    Latex(String),

    /// SVG generation or output I/O failed.
    #[error("Render error: {0}")]
    Render(String),
}

fn fmt_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<quick_xml::Error> for MathError {
    fn from(e: quick_xml::Error) -> Self {
        let hint = match &e {
            quick_xml::Error::Syntax(_) => {
                "Check for mismatched tags or unescaped '<'/'&' characters.".to_string()
            }
            quick_xml::Error::IllFormed(_) => {
                "The XML is not well-formed. Every element needs a matching close tag.".to_string()
            }
            _ => String::new(),
        };
        MathError::Parse {
            message: e.to_string(),
            hint,
        }
    }
}

impl From<std::io::Error> for MathError {
    fn from(e: std::io::Error) -> Self {
        MathError::Render(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_includes_hint() {
        let err = MathError::Parse {
            message: "unexpected end".to_string(),
            hint: "is the input truncated?".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("unexpected end"));
        assert!(msg.contains("Hint: is the input truncated?"));
    }

    #[test]
    fn test_font_error_display() {
        let err = MathError::Font("no MATH table".to_string());
        assert_eq!(err.to_string(), "Font error: no MATH table");
    }
}
