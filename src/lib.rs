//! # mathsvg
//!
//! A MathML-to-SVG math typesetting engine driven by OpenType MATH
//! table metrics.
//!
//! Most math renderers approximate: fixed script scale factors, guessed
//! fraction bar positions, bitmap fallbacks for tall delimiters. This
//! engine instead reads the font's own MATH table and lets the font
//! decide: axis height, script shifts, minimum gaps, stretchy glyph
//! variants and part assemblies, per-height corner kerning. Any font
//! with a MATH table (STIX Two, Latin Modern Math, Libertinus Math,
//! Asana, Fira Math) produces output faithful to its designer's intent.
//!
//! ## Architecture
//!
//! ```text
//! Input (MathML / LaTeX)
//!       ↓
//!   [model]    Parse MathML into an element tree
//!       ↓
//!   [style]    Resolve variants, display style, script levels
//!       ↓
//!   [layout]   Recursive MATH-metric layout into positioned nodes
//!       ↓
//!   [svg]      Serialize glyphs and rules to an SVG document
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use mathsvg::{render, RenderConfig};
//!
//! let font = std::fs::read("STIXTwoMath-Regular.otf").unwrap();
//! let svg = render(
//!     "<math><mfrac><mi>a</mi><mi>b</mi></mfrac></math>",
//!     &font,
//!     &RenderConfig::default(),
//! ).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod latex;
pub mod layout;
pub mod model;
pub mod style;
pub mod svg;

pub use config::RenderConfig;
pub use error::MathError;

use font::MathFont;
use layout::LayoutCtx;

/// Render MathML markup to an SVG document string.
///
/// This is the primary entry point. `font_data` is the raw bytes of an
/// OpenType font carrying a MATH table.
pub fn render(mathml: &str, font_data: &[u8], config: &RenderConfig) -> Result<String, MathError> {
    let tree = model::parse(mathml)?;
    let font = MathFont::new(font_data)?;
    let ctx = LayoutCtx {
        font: &font,
        base_size: config.font_size,
        min_size_fraction: config.min_size_fraction,
    };
    let root = layout::layout(&tree, &ctx);
    svg::render_svg(&root, &font, config)
}

/// Render a LaTeX math expression to an SVG document string.
///
/// Requires the `latex` feature; without it this returns
/// [`MathError::Latex`].
pub fn render_latex(
    latex: &str,
    display: bool,
    font_data: &[u8],
    config: &RenderConfig,
) -> Result<String, MathError> {
    let mathml = latex::latex_to_mathml(latex, display)?;
    render(&mathml, font_data, config)
}
