//! Space and dimension attribute parsing.
//!
//! MathML sizes come in three flavors: named math spaces (fractions of an
//! em in eighteenths), bare numbers/px, and unit-suffixed values. Unit
//! conversions go through points at 1.333 px/pt; em-relative units scale
//! with the current glyph size.

/// Named math space widths, in ems.
pub fn space_ems(space: &str) -> f64 {
    if let Some(num) = space.strip_suffix("em") {
        return num.trim().parse().unwrap_or(0.0);
    }
    match space {
        "veryverythinmathspace" => 1.0 / 18.0,
        "verythinmathspace" => 2.0 / 18.0,
        "thinmathspace" => 3.0 / 18.0,
        "mediummathspace" => 4.0 / 18.0,
        "thickmathspace" => 5.0 / 18.0,
        "verythickmathspace" => 6.0 / 18.0,
        "veryverythickmathspace" => 7.0 / 18.0,
        "negativeveryverythinmathspace" => -1.0 / 18.0,
        "negativeverythinmathspace" => -2.0 / 18.0,
        "negativethinmathspace" => -3.0 / 18.0,
        "negativemediummathspace" => -4.0 / 18.0,
        "negativethickmathspace" => -5.0 / 18.0,
        "negativeverythickmathspace" => -6.0 / 18.0,
        "negativeveryverythickmathspace" => -7.0 / 18.0,
        _ => 0.0,
    }
}

fn named_to_em(size: &str) -> Option<String> {
    let ems = match size {
        "veryverythinmathspace" => 1.0,
        "verythinmathspace" => 2.0,
        "thinmathspace" => 3.0,
        "mediummathspace" => 4.0,
        "thickmathspace" => 5.0,
        "verythickmathspace" => 6.0,
        "veryverythickmathspace" => 7.0,
        "negativeveryverythinmathspace" => -1.0,
        "negativeverythinmathspace" => -2.0,
        "negativethinmathspace" => -3.0,
        "negativemediummathspace" => -4.0,
        "negativethickmathspace" => -5.0,
        "negativeverythickmathspace" => -6.0,
        "negativeveryverythickmathspace" => -7.0,
        _ => return None,
    };
    Some(format!("{}em", ems / 18.0))
}

fn parse_float(s: &str) -> Option<f64> {
    s.trim().replace('\u{2212}', "-").parse().ok()
}

/// Parse a size attribute into pixels. `fontsize` is the current glyph
/// size, used for font-relative units (em, ex, mu).
pub fn size_px(size: &str, fontsize: f64) -> f64 {
    let size = named_to_em(size).unwrap_or_else(|| size.to_string());

    // Plain number, or a value in px.
    let bare = size.strip_suffix("px").unwrap_or(&size);
    if let Some(v) = parse_float(bare) {
        return v;
    }

    if size.len() < 2 {
        return 0.0;
    }
    let (num, units) = size.split_at(size.len() - 2);
    let Some(value) = parse_float(num) else {
        return 0.0;
    };
    let to_pt = match units {
        "pt" => 1.0,
        "mm" => 2.84526,
        "cm" => 28.45274,
        "ex" => 4.30554,
        "em" => 10.00002,
        "bp" => 1.00374,
        "dd" => 1.07,
        "pc" => 12.0,
        "in" => 72.27,
        "mu" => 0.5555,
        _ => 0.0,
    };
    // Unit table is for a 10-point font; px run 1.333 to the point.
    let mut px = value * to_pt * 1.333;
    if matches!(units, "em" | "ex" | "mu") {
        px *= fontsize / 10.0;
    }
    px
}

/// Parse a dimension attribute (bare number, em, or px) into font units
/// at the given em scale.
pub fn dimension_units(size: &str, em_scale: f64) -> Option<f64> {
    if let Some(v) = parse_float(size) {
        return Some(v);
    }
    if let Some(num) = size.strip_suffix("em") {
        return parse_float(num).map(|v| v / em_scale);
    }
    if let Some(num) = size.strip_suffix("px") {
        return parse_float(num);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_spaces() {
        assert!((space_ems("thinmathspace") - 3.0 / 18.0).abs() < 1e-12);
        assert!((space_ems("negativethickmathspace") + 5.0 / 18.0).abs() < 1e-12);
        assert_eq!(space_ems("nonsense"), 0.0);
    }

    #[test]
    fn test_em_suffix_space() {
        assert!((space_ems("0.5em") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_size_px_plain_and_px() {
        assert_eq!(size_px("12", 24.0), 12.0);
        assert_eq!(size_px("8px", 24.0), 8.0);
    }

    #[test]
    fn test_size_px_points() {
        assert!((size_px("10pt", 24.0) - 13.33).abs() < 1e-9);
    }

    #[test]
    fn test_size_px_em_scales_with_fontsize() {
        let at10 = size_px("1em", 10.0);
        let at20 = size_px("1em", 20.0);
        assert!((at20 / at10 - 2.0).abs() < 1e-9);
        assert!((at10 - 10.00002 * 1.333).abs() < 1e-6);
    }

    #[test]
    fn test_size_px_named_space() {
        let expect = size_px(&format!("{}em", 3.0 / 18.0), 24.0);
        assert!((size_px("thinmathspace", 24.0) - expect).abs() < 1e-9);
    }

    #[test]
    fn test_size_px_unknown_units() {
        assert_eq!(size_px("5zz", 24.0), 0.0);
    }

    #[test]
    fn test_dimension_units() {
        assert_eq!(dimension_units("250", 0.5), Some(250.0));
        assert_eq!(dimension_units("2em", 0.01), Some(200.0));
        assert_eq!(dimension_units("30px", 0.5), Some(30.0));
        assert_eq!(dimension_units("bogus", 0.5), None);
    }

    #[test]
    fn test_minus_sign_accepted() {
        assert_eq!(size_px("\u{2212}4", 24.0), -4.0);
    }
}
