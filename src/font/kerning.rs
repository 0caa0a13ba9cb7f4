//! Script-attachment kerning.
//!
//! Computes the horizontal cut-in between a base glyph and its attached
//! super/subscript from the MATH per-glyph corner kern tables, along with
//! the vertical shift of the script. All inputs and outputs are in font
//! units; callers apply the em scale.

use super::math::{KernRecord, MathConstants};
use super::BBox;

/// Inputs for one side of a script attachment.
pub struct KernGlyph<'a> {
    pub bbox: BBox,
    pub record: Option<&'a KernRecord>,
}

/// Kern and upward shift for a superscript attached to `base`.
///
/// An extended-shape base (a stretched variant) raises the superscript
/// relative to the glyph top instead of using the fixed shift-up constant.
pub fn kern_super(
    consts: &MathConstants,
    base: KernGlyph,
    base_extended: bool,
    script: KernGlyph,
) -> (f64, f64) {
    let shift_up = if base_extended {
        base.bbox.ymax - consts.superscript_shift_up / 2.0
    } else {
        consts.superscript_shift_up
    };
    // Correction heights: script bottom and base top, in base coordinates.
    let h1 = shift_up + script.bbox.ymin * consts.script_percent_scale_down / 100.0;
    let h2 = base.bbox.ymax - shift_up;
    let mut k1 = 0.0;
    let mut k2 = 0.0;
    if let Some(table) = base.record.and_then(|r| r.top_right.as_ref()) {
        k1 += table.value_at(h1);
        k2 += table.value_at(h2);
    }
    if let Some(table) = script.record.and_then(|r| r.bottom_left.as_ref()) {
        k1 += table.value_at(h1);
        k2 += table.value_at(h2);
    }
    (k1.min(k2), shift_up)
}

/// Kern and downward shift for a subscript attached to `base`.
pub fn kern_sub(consts: &MathConstants, base: KernGlyph, script: KernGlyph) -> (f64, f64) {
    let shift_dn = consts.subscript_shift_down - base.bbox.ymin;
    let h1 = -shift_dn + script.bbox.ymax * consts.script_percent_scale_down / 100.0;
    let h2 = base.bbox.ymin + shift_dn;
    let mut k1 = 0.0;
    let mut k2 = 0.0;
    if let Some(table) = base.record.and_then(|r| r.bottom_right.as_ref()) {
        k1 += table.value_at(h1);
        k2 += table.value_at(h2);
    }
    if let Some(table) = script.record.and_then(|r| r.top_left.as_ref()) {
        k1 += table.value_at(h1);
        k2 += table.value_at(h2);
    }
    (k1.min(k2), shift_dn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::math::KernTable;

    fn consts() -> MathConstants {
        MathConstants::default()
    }

    #[test]
    fn test_super_shift_without_kern_data() {
        let c = consts();
        let base = KernGlyph {
            bbox: BBox::new(0.0, 500.0, 0.0, 700.0),
            record: None,
        };
        let script = KernGlyph {
            bbox: BBox::new(0.0, 300.0, -20.0, 450.0),
            record: None,
        };
        let (kern, shift) = kern_super(&c, base, false, script);
        assert_eq!(kern, 0.0);
        assert_eq!(shift, c.superscript_shift_up);
    }

    #[test]
    fn test_super_extended_base_raises_script() {
        let c = consts();
        let base = KernGlyph {
            bbox: BBox::new(0.0, 500.0, -900.0, 900.0),
            record: None,
        };
        let script = KernGlyph {
            bbox: BBox::new(0.0, 300.0, 0.0, 450.0),
            record: None,
        };
        let (_, shift) = kern_super(&c, base, true, script);
        assert_eq!(shift, 900.0 - c.superscript_shift_up / 2.0);
        assert!(shift > c.superscript_shift_up);
    }

    #[test]
    fn test_super_kern_takes_minimum_of_heights() {
        let c = consts();
        let record = KernRecord {
            top_right: Some(KernTable {
                heights: vec![100.0],
                values: vec![-40.0, -80.0],
            }),
            ..Default::default()
        };
        let base = KernGlyph {
            bbox: BBox::new(0.0, 500.0, 0.0, 700.0),
            record: Some(&record),
        };
        let script = KernGlyph {
            bbox: BBox::new(0.0, 300.0, -20.0, 450.0),
            record: None,
        };
        let (kern, _) = kern_super(&c, base, false, script);
        // h1 = 360 - 14 = 346 (past 100 -> -80), h2 = 700 - 360 = 340 (-80).
        assert_eq!(kern, -80.0);
    }

    #[test]
    fn test_sub_shift_accounts_for_base_depth() {
        let c = consts();
        let base = KernGlyph {
            bbox: BBox::new(0.0, 500.0, -150.0, 700.0),
            record: None,
        };
        let script = KernGlyph {
            bbox: BBox::new(0.0, 300.0, -20.0, 450.0),
            record: None,
        };
        let (_, shift) = kern_sub(&c, base, script);
        assert_eq!(shift, c.subscript_shift_down + 150.0);
    }

    #[test]
    fn test_sub_kern_sums_both_corners() {
        let c = consts();
        let flat = |v: f64| KernTable {
            heights: vec![],
            values: vec![v],
        };
        let base_record = KernRecord {
            bottom_right: Some(flat(-30.0)),
            ..Default::default()
        };
        let script_record = KernRecord {
            top_left: Some(flat(-10.0)),
            ..Default::default()
        };
        let base = KernGlyph {
            bbox: BBox::new(0.0, 500.0, 0.0, 700.0),
            record: Some(&base_record),
        };
        let script = KernGlyph {
            bbox: BBox::new(0.0, 300.0, -20.0, 450.0),
            record: Some(&script_record),
        };
        let (kern, _) = kern_sub(&c, base, script);
        assert_eq!(kern, -40.0);
    }
}
