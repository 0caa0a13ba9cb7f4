//! Unicode math alphanumeric remapping.
//!
//! Bold, italic, script, fraktur, double-struck, sans and monospace letter
//! forms live in dedicated Unicode blocks (mostly U+1D400..U+1D7FF).
//! Styling a character means offsetting it into the right block. A few
//! letterlike symbols predate those blocks and sit elsewhere in the BMP;
//! those holes are patched by the exception tables.
//!
//! Whether a given styled codepoint has a glyph is the font's problem, not
//! ours.

use super::{Family, Variant};

struct SubTable {
    start: u32,
    end: u32,
    /// (family, bold, italic) -> block base. A base of 0 leaves the
    /// character unchanged (the plain form already is the styled form).
    entries: &'static [(Family, bool, bool, u32)],
}

const LATIN_CAPS: SubTable = SubTable {
    start: 0x41,
    end: 0x5A,
    entries: &[
        (Family::Serif, false, false, 0),
        (Family::Serif, true, false, 0x1D400),
        (Family::Serif, false, true, 0x1D434),
        (Family::Serif, true, true, 0x1D468),
        (Family::Sans, false, false, 0x1D5A0),
        (Family::Sans, true, false, 0x1D5D4),
        (Family::Sans, false, true, 0x1D608),
        (Family::Sans, true, true, 0x1D63C),
        (Family::Script, false, false, 0x1D49C),
        (Family::Script, true, false, 0x1D4D0),
        (Family::Script, true, true, 0x1D4D0),
        (Family::Fraktur, false, false, 0x1D504),
        (Family::Fraktur, true, false, 0x1D56C),
        (Family::Fraktur, true, true, 0x1D56C),
        (Family::Mono, false, false, 0x1D670),
        (Family::Double, false, false, 0x1D538),
    ],
};

const LATIN_SMALL: SubTable = SubTable {
    start: 0x61,
    end: 0x7A,
    entries: &[
        (Family::Serif, false, false, 0),
        (Family::Serif, true, false, 0x1D41A),
        (Family::Serif, false, true, 0x1D44E),
        (Family::Serif, true, true, 0x1D482),
        (Family::Sans, false, false, 0x1D5BA),
        (Family::Sans, true, false, 0x1D5EE),
        (Family::Sans, false, true, 0x1D622),
        (Family::Sans, true, true, 0x1D656),
        (Family::Script, false, false, 0x1D4B6),
        (Family::Script, true, false, 0x1D4EA),
        (Family::Script, true, true, 0x1D4EA),
        (Family::Fraktur, false, false, 0x1D51E),
        (Family::Fraktur, true, false, 0x1D586),
        (Family::Fraktur, true, true, 0x1D586),
        (Family::Mono, false, false, 0x1D68A),
        (Family::Double, false, false, 0x1D552),
    ],
};

const GREEK_CAPS: SubTable = SubTable {
    start: 0x0391,
    end: 0x03AA,
    entries: &[
        (Family::Serif, false, false, 0),
        (Family::Serif, true, false, 0x1D6A8),
        (Family::Serif, false, true, 0x1D6E2),
        (Family::Serif, true, true, 0x1D71C),
        (Family::Sans, false, false, 0),
        (Family::Sans, true, false, 0x1D756),
        (Family::Sans, true, true, 0x1D790),
    ],
};

const GREEK_LOWER: SubTable = SubTable {
    start: 0x03B1,
    end: 0x03D0,
    entries: &[
        (Family::Serif, false, false, 0),
        (Family::Serif, true, false, 0x1D6C2),
        (Family::Serif, false, true, 0x1D6FC),
        (Family::Serif, true, true, 0x1D736),
        (Family::Sans, false, false, 0),
        (Family::Sans, true, false, 0x1D770),
        (Family::Sans, true, true, 0x1D7AA),
    ],
};

const DIGITS: SubTable = SubTable {
    start: 0x30,
    end: 0x39,
    entries: &[
        (Family::Serif, false, false, 0),
        (Family::Serif, true, false, 0x1D7CE),
        (Family::Mono, false, false, 0x1D7F6),
        (Family::Sans, false, false, 0x1D7E2),
        (Family::Sans, true, false, 0x1D7EC),
        (Family::Sans, true, true, 0x1D7EC),
    ],
};

const SUBTABLES: &[SubTable] = &[LATIN_CAPS, LATIN_SMALL, GREEK_CAPS, GREEK_LOWER, DIGITS];

/// Letterlike symbols that style as if they continued the Greek ranges
/// (the irregular rows of the Unicode math-alphanumerics chart).
const OFFSET_EXCEPTIONS: &[(char, u32)] = &[
    ('\u{03F4}', 0x0391 + 0x11), // capital theta symbol
    ('\u{2207}', 0x0391 + 0x19), // nabla
    ('\u{2202}', 0x03B1 + 0x19), // partial differential
    ('\u{03F5}', 0x03B1 + 0x1A), // lunate epsilon
    ('\u{03D1}', 0x03B1 + 0x1B), // theta symbol
    ('\u{03F0}', 0x03B1 + 0x1C), // kappa symbol
    ('\u{03D5}', 0x03B1 + 0x1D), // phi symbol
    ('\u{03F1}', 0x03B1 + 0x1E), // rho symbol
    ('\u{03D6}', 0x03B1 + 0x1F), // pi symbol
];

/// Codepoints the offset arithmetic would produce that Unicode instead
/// assigned to pre-existing letterlike symbols.
const EXCEPTIONS: &[(u32, char)] = &[
    (0x1D49C + 0x01, '\u{212C}'), // script capitals
    (0x1D49C + 0x04, '\u{2130}'),
    (0x1D49C + 0x05, '\u{2131}'),
    (0x1D49C + 0x07, '\u{210B}'),
    (0x1D49C + 0x08, '\u{2110}'),
    (0x1D49C + 0x0B, '\u{2112}'),
    (0x1D49C + 0x0C, '\u{2133}'),
    (0x1D49C + 0x11, '\u{211B}'),
    (0x1D504 + 0x02, '\u{212D}'), // fraktur capitals
    (0x1D504 + 0x07, '\u{210C}'),
    (0x1D504 + 0x08, '\u{2111}'),
    (0x1D504 + 0x11, '\u{211C}'),
    (0x1D504 + 0x19, '\u{2128}'),
    (0x1D538 + 0x02, '\u{2102}'), // double-struck capitals
    (0x1D538 + 0x07, '\u{210D}'),
    (0x1D538 + 0x0D, '\u{2115}'),
    (0x1D538 + 0x0F, '\u{2119}'),
    (0x1D538 + 0x10, '\u{211A}'),
    (0x1D538 + 0x11, '\u{211D}'),
    (0x1D538 + 0x19, '\u{2124}'),
    (0x1D44E + 0x07, '\u{210E}'), // italic small h (planck)
    (0x1D4B6 + 0x04, '\u{212F}'), // script small e, g, o
    (0x1D4B6 + 0x06, '\u{210A}'),
    (0x1D4B6 + 0x0E, '\u{2134}'),
];

/// Whether the character should be italicized automatically when used as
/// a single-letter identifier.
pub fn auto_italic(ch: char) -> bool {
    let cp = ch as u32;
    (GREEK_LOWER.start..=GREEK_LOWER.end).contains(&cp)
        || (LATIN_SMALL.start..=LATIN_SMALL.end).contains(&cp)
        || (LATIN_CAPS.start..=LATIN_CAPS.end).contains(&cp)
}

fn block_base(table: &SubTable, variant: &Variant) -> u32 {
    let lookup = |family: Family| {
        let mut regular = None;
        let mut any = false;
        for &(f, bold, italic, base) in table.entries {
            if f != family {
                continue;
            }
            any = true;
            if bold == variant.bold && italic == variant.italic {
                return Some(base);
            }
            if !bold && !italic {
                regular = Some(base);
            }
        }
        if any {
            Some(regular.unwrap_or(0))
        } else {
            None
        }
    };
    lookup(variant.family)
        .or_else(|| lookup(Family::Serif))
        .unwrap_or(0)
}

/// Map one character to its styled form. Characters outside the covered
/// ranges pass through unchanged.
pub fn styled_char(ch: char, variant: &Variant) -> char {
    let cp = OFFSET_EXCEPTIONS
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|&(_, cp)| cp)
        .unwrap_or(ch as u32);
    for table in SUBTABLES {
        if (table.start..=table.end).contains(&cp) {
            let base = block_base(table, variant);
            if base == 0 {
                return ch;
            }
            let mapped = base + (cp - table.start);
            if let Some(&(_, fixed)) = EXCEPTIONS.iter().find(|(c, _)| *c == mapped) {
                return fixed;
            }
            return char::from_u32(mapped).unwrap_or(ch);
        }
    }
    ch
}

/// Apply the styling remap to every character of a string.
pub fn styled_str(text: &str, variant: &Variant) -> String {
    text.chars().map(|c| styled_char(c, variant)).collect()
}
