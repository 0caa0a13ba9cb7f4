//! Decoded OpenType MATH table data.
//!
//! The raw table hands out lazily-parsed records tied to the font's
//! lifetime. Everything the layout engine consults is decoded here into
//! plain owned values, so positioning logic (and its tests) never touches
//! font data directly. All values are in font design units.

use ttf_parser::GlyphId;

/// The MATH constants record, decoded to `f64` once at font load.
#[derive(Debug, Clone)]
pub struct MathConstants {
    pub script_percent_scale_down: f64,
    pub script_script_percent_scale_down: f64,
    pub delimited_sub_formula_min_height: f64,
    pub display_operator_min_height: f64,
    pub math_leading: f64,
    pub axis_height: f64,
    pub accent_base_height: f64,
    pub flattened_accent_base_height: f64,
    pub subscript_shift_down: f64,
    pub subscript_top_max: f64,
    pub subscript_baseline_drop_min: f64,
    pub superscript_shift_up: f64,
    pub superscript_shift_up_cramped: f64,
    pub superscript_bottom_min: f64,
    pub superscript_baseline_drop_max: f64,
    pub sub_superscript_gap_min: f64,
    pub superscript_bottom_max_with_subscript: f64,
    pub space_after_script: f64,
    pub upper_limit_gap_min: f64,
    pub upper_limit_baseline_rise_min: f64,
    pub lower_limit_gap_min: f64,
    pub lower_limit_baseline_drop_min: f64,
    pub stack_top_shift_up: f64,
    pub stack_top_display_style_shift_up: f64,
    pub stack_bottom_shift_down: f64,
    pub stack_bottom_display_style_shift_down: f64,
    pub stack_gap_min: f64,
    pub stack_display_style_gap_min: f64,
    pub stretch_stack_top_shift_up: f64,
    pub stretch_stack_bottom_shift_down: f64,
    pub stretch_stack_gap_above_min: f64,
    pub stretch_stack_gap_below_min: f64,
    pub fraction_numerator_shift_up: f64,
    pub fraction_numerator_display_style_shift_up: f64,
    pub fraction_denominator_shift_down: f64,
    pub fraction_denominator_display_style_shift_down: f64,
    pub fraction_numerator_gap_min: f64,
    pub fraction_num_display_style_gap_min: f64,
    pub fraction_rule_thickness: f64,
    pub fraction_denominator_gap_min: f64,
    pub fraction_denom_display_style_gap_min: f64,
    pub skewed_fraction_horizontal_gap: f64,
    pub skewed_fraction_vertical_gap: f64,
    pub overbar_vertical_gap: f64,
    pub overbar_rule_thickness: f64,
    pub overbar_extra_ascender: f64,
    pub underbar_vertical_gap: f64,
    pub underbar_rule_thickness: f64,
    pub underbar_extra_descender: f64,
    pub radical_vertical_gap: f64,
    pub radical_display_style_vertical_gap: f64,
    pub radical_rule_thickness: f64,
    pub radical_extra_ascender: f64,
    pub radical_kern_before_degree: f64,
    pub radical_kern_after_degree: f64,
    pub radical_degree_bottom_raise_percent: f64,
}

impl MathConstants {
    pub fn from_table(c: &ttf_parser::math::Constants) -> Self {
        Self {
            script_percent_scale_down: f64::from(c.script_percent_scale_down()),
            script_script_percent_scale_down: f64::from(c.script_script_percent_scale_down()),
            delimited_sub_formula_min_height: f64::from(c.delimited_sub_formula_min_height()),
            display_operator_min_height: f64::from(c.display_operator_min_height()),
            math_leading: f64::from(c.math_leading().value),
            axis_height: f64::from(c.axis_height().value),
            accent_base_height: f64::from(c.accent_base_height().value),
            flattened_accent_base_height: f64::from(c.flattened_accent_base_height().value),
            subscript_shift_down: f64::from(c.subscript_shift_down().value),
            subscript_top_max: f64::from(c.subscript_top_max().value),
            subscript_baseline_drop_min: f64::from(c.subscript_baseline_drop_min().value),
            superscript_shift_up: f64::from(c.superscript_shift_up().value),
            superscript_shift_up_cramped: f64::from(c.superscript_shift_up_cramped().value),
            superscript_bottom_min: f64::from(c.superscript_bottom_min().value),
            superscript_baseline_drop_max: f64::from(c.superscript_baseline_drop_max().value),
            sub_superscript_gap_min: f64::from(c.sub_superscript_gap_min().value),
            superscript_bottom_max_with_subscript: f64::from(
                c.superscript_bottom_max_with_subscript().value,
            ),
            space_after_script: f64::from(c.space_after_script().value),
            upper_limit_gap_min: f64::from(c.upper_limit_gap_min().value),
            upper_limit_baseline_rise_min: f64::from(c.upper_limit_baseline_rise_min().value),
            lower_limit_gap_min: f64::from(c.lower_limit_gap_min().value),
            lower_limit_baseline_drop_min: f64::from(c.lower_limit_baseline_drop_min().value),
            stack_top_shift_up: f64::from(c.stack_top_shift_up().value),
            stack_top_display_style_shift_up: f64::from(c.stack_top_display_style_shift_up().value),
            stack_bottom_shift_down: f64::from(c.stack_bottom_shift_down().value),
            stack_bottom_display_style_shift_down: f64::from(
                c.stack_bottom_display_style_shift_down().value,
            ),
            stack_gap_min: f64::from(c.stack_gap_min().value),
            stack_display_style_gap_min: f64::from(c.stack_display_style_gap_min().value),
            stretch_stack_top_shift_up: f64::from(c.stretch_stack_top_shift_up().value),
            stretch_stack_bottom_shift_down: f64::from(c.stretch_stack_bottom_shift_down().value),
            stretch_stack_gap_above_min: f64::from(c.stretch_stack_gap_above_min().value),
            stretch_stack_gap_below_min: f64::from(c.stretch_stack_gap_below_min().value),
            fraction_numerator_shift_up: f64::from(c.fraction_numerator_shift_up().value),
            fraction_numerator_display_style_shift_up: f64::from(
                c.fraction_numerator_display_style_shift_up().value,
            ),
            fraction_denominator_shift_down: f64::from(c.fraction_denominator_shift_down().value),
            fraction_denominator_display_style_shift_down: f64::from(
                c.fraction_denominator_display_style_shift_down().value,
            ),
            fraction_numerator_gap_min: f64::from(c.fraction_numerator_gap_min().value),
            fraction_num_display_style_gap_min: f64::from(
                c.fraction_num_display_style_gap_min().value,
            ),
            fraction_rule_thickness: f64::from(c.fraction_rule_thickness().value),
            fraction_denominator_gap_min: f64::from(c.fraction_denominator_gap_min().value),
            fraction_denom_display_style_gap_min: f64::from(
                c.fraction_denom_display_style_gap_min().value,
            ),
            skewed_fraction_horizontal_gap: f64::from(c.skewed_fraction_horizontal_gap().value),
            skewed_fraction_vertical_gap: f64::from(c.skewed_fraction_vertical_gap().value),
            overbar_vertical_gap: f64::from(c.overbar_vertical_gap().value),
            overbar_rule_thickness: f64::from(c.overbar_rule_thickness().value),
            overbar_extra_ascender: f64::from(c.overbar_extra_ascender().value),
            underbar_vertical_gap: f64::from(c.underbar_vertical_gap().value),
            underbar_rule_thickness: f64::from(c.underbar_rule_thickness().value),
            underbar_extra_descender: f64::from(c.underbar_extra_descender().value),
            radical_vertical_gap: f64::from(c.radical_vertical_gap().value),
            radical_display_style_vertical_gap: f64::from(
                c.radical_display_style_vertical_gap().value,
            ),
            radical_rule_thickness: f64::from(c.radical_rule_thickness().value),
            radical_extra_ascender: f64::from(c.radical_extra_ascender().value),
            radical_kern_before_degree: f64::from(c.radical_kern_before_degree().value),
            radical_kern_after_degree: f64::from(c.radical_kern_after_degree().value),
            radical_degree_bottom_raise_percent: f64::from(c.radical_degree_bottom_raise_percent()),
        }
    }
}

#[cfg(test)]
impl Default for MathConstants {
    /// Synthetic constants roughly shaped like a real text math font at
    /// 1000 units per em. Test-only.
    fn default() -> Self {
        Self {
            script_percent_scale_down: 70.0,
            script_script_percent_scale_down: 55.0,
            delimited_sub_formula_min_height: 1325.0,
            display_operator_min_height: 1800.0,
            math_leading: 150.0,
            axis_height: 258.0,
            accent_base_height: 480.0,
            flattened_accent_base_height: 656.0,
            subscript_shift_down: 210.0,
            subscript_top_max: 368.0,
            subscript_baseline_drop_min: 160.0,
            superscript_shift_up: 360.0,
            superscript_shift_up_cramped: 252.0,
            superscript_bottom_min: 120.0,
            superscript_baseline_drop_max: 230.0,
            sub_superscript_gap_min: 150.0,
            superscript_bottom_max_with_subscript: 380.0,
            space_after_script: 40.0,
            upper_limit_gap_min: 135.0,
            upper_limit_baseline_rise_min: 300.0,
            lower_limit_gap_min: 135.0,
            lower_limit_baseline_drop_min: 670.0,
            stack_top_shift_up: 470.0,
            stack_top_display_style_shift_up: 780.0,
            stack_bottom_shift_down: 385.0,
            stack_bottom_display_style_shift_down: 690.0,
            stack_gap_min: 198.0,
            stack_display_style_gap_min: 462.0,
            stretch_stack_top_shift_up: 800.0,
            stretch_stack_bottom_shift_down: 590.0,
            stretch_stack_gap_above_min: 68.0,
            stretch_stack_gap_below_min: 68.0,
            fraction_numerator_shift_up: 480.0,
            fraction_numerator_display_style_shift_up: 780.0,
            fraction_denominator_shift_down: 400.0,
            fraction_denominator_display_style_shift_down: 690.0,
            fraction_numerator_gap_min: 66.0,
            fraction_num_display_style_gap_min: 198.0,
            fraction_rule_thickness: 66.0,
            fraction_denominator_gap_min: 66.0,
            fraction_denom_display_style_gap_min: 198.0,
            skewed_fraction_horizontal_gap: 350.0,
            skewed_fraction_vertical_gap: 96.0,
            overbar_vertical_gap: 198.0,
            overbar_rule_thickness: 66.0,
            overbar_extra_ascender: 66.0,
            underbar_vertical_gap: 198.0,
            underbar_rule_thickness: 66.0,
            underbar_extra_descender: 66.0,
            radical_vertical_gap: 82.0,
            radical_display_style_vertical_gap: 186.0,
            radical_rule_thickness: 68.0,
            radical_extra_ascender: 76.0,
            radical_kern_before_degree: 277.0,
            radical_kern_after_degree: -385.0,
            radical_degree_bottom_raise_percent: 76.0,
        }
    }
}

/// A single corner's kern step function: `values` has exactly one more
/// entry than `heights`.
#[derive(Debug, Clone, Default)]
pub struct KernTable {
    pub heights: Vec<f64>,
    pub values: Vec<f64>,
}

impl KernTable {
    pub fn from_table(k: &ttf_parser::math::Kern) -> Self {
        let count = k.count();
        let heights = (0..count)
            .filter_map(|i| k.height(i))
            .map(|v| f64::from(v.value))
            .collect();
        let values = (0..=count)
            .filter_map(|i| k.kern(i))
            .map(|v| f64::from(v.value))
            .collect();
        Self { heights, values }
    }

    /// Kern amount at the given attachment height.
    ///
    /// Piecewise-constant: the value before the first correction height
    /// that exceeds the query, or the last value past all heights.
    pub fn value_at(&self, height: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        for (i, &h) in self.heights.iter().enumerate() {
            if h > height {
                return self.values[i];
            }
        }
        *self.values.last().unwrap()
    }
}

/// The four-corner kerning record for one glyph.
#[derive(Debug, Clone, Default)]
pub struct KernRecord {
    pub top_right: Option<KernTable>,
    pub top_left: Option<KernTable>,
    pub bottom_right: Option<KernTable>,
    pub bottom_left: Option<KernTable>,
}

impl KernRecord {
    pub fn from_table(info: &ttf_parser::math::KernInfo) -> Self {
        Self {
            top_right: info.top_right.as_ref().map(KernTable::from_table),
            top_left: info.top_left.as_ref().map(KernTable::from_table),
            bottom_right: info.bottom_right.as_ref().map(KernTable::from_table),
            bottom_left: info.bottom_left.as_ref().map(KernTable::from_table),
        }
    }
}

/// One pre-drawn size variant of a stretchable glyph.
#[derive(Debug, Clone, Copy)]
pub struct VariantRecord {
    pub glyph: GlyphId,
    /// Advance along the stretch axis.
    pub advance: f64,
}

/// One part of a glyph assembly.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyPart {
    pub glyph: GlyphId,
    pub start_connector: f64,
    pub end_connector: f64,
    pub full_advance: f64,
    pub extender: bool,
}

/// Recipe for building a glyph of arbitrary size from parts.
#[derive(Debug, Clone)]
pub struct AssemblyRecipe {
    pub italics_correction: f64,
    pub parts: Vec<AssemblyPart>,
}

/// A glyph's construction: its pre-drawn variants in increasing size,
/// plus an optional assembly for sizes beyond the largest variant.
#[derive(Debug, Clone)]
pub struct Construction {
    pub variants: Vec<VariantRecord>,
    pub assembly: Option<AssemblyRecipe>,
}

impl Construction {
    pub fn from_table(c: &ttf_parser::math::GlyphConstruction) -> Self {
        let variants = c
            .variants
            .into_iter()
            .map(|v| VariantRecord {
                glyph: v.variant_glyph,
                advance: f64::from(v.advance_measurement),
            })
            .collect();
        let assembly = c.assembly.as_ref().map(|a| AssemblyRecipe {
            italics_correction: f64::from(a.italics_correction.value),
            parts: a
                .parts
                .into_iter()
                .map(|p| AssemblyPart {
                    glyph: p.glyph_id,
                    start_connector: f64::from(p.start_connector_length),
                    end_connector: f64::from(p.end_connector_length),
                    full_advance: f64::from(p.full_advance),
                    extender: p.part_flags.extender(),
                })
                .collect(),
        });
        Self { variants, assembly }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kern_step_function() {
        let table = KernTable {
            heights: vec![100.0, 300.0],
            values: vec![-10.0, -30.0, -50.0],
        };
        // Below the first correction height.
        assert_eq!(table.value_at(50.0), -10.0);
        // Between the two heights.
        assert_eq!(table.value_at(200.0), -30.0);
        // At a height boundary the next band applies.
        assert_eq!(table.value_at(100.0), -30.0);
        // Past all heights.
        assert_eq!(table.value_at(900.0), -50.0);
    }

    #[test]
    fn test_kern_without_heights() {
        let table = KernTable {
            heights: vec![],
            values: vec![-25.0],
        };
        assert_eq!(table.value_at(0.0), -25.0);
        assert_eq!(table.value_at(1000.0), -25.0);
    }

    #[test]
    fn test_kern_empty_is_zero() {
        assert_eq!(KernTable::default().value_at(100.0), 0.0);
    }

    #[test]
    fn test_synthetic_constants_sane() {
        let c = MathConstants::default();
        assert!(c.axis_height > 0.0);
        assert!(c.script_percent_scale_down < 100.0);
        assert!(c.radical_kern_after_degree < 0.0);
    }
}
