//! Glyph widths of the built-in Helvetica faces, used to align text in cells.
//!
//! Widths are in thousandths of the font size for the printable ASCII range
//! (`' '` to `'~'`). Characters outside that range use the width of `'0'`.

const FIRST: u32 = 32;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const FALLBACK: u16 = 556;

/// Millimetres per PostScript point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

fn glyph_width(table: &[u16; 95], c: char) -> u16 {
    (c as u32)
        .checked_sub(FIRST)
        .and_then(|index| table.get(index as usize))
        .copied()
        .unwrap_or(FALLBACK)
}

/// Width of `text` in millimetres when set at `size_pt` points.
pub fn text_width_mm(text: &str, size_pt: f64, bold: bool) -> f64 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    let units: u32 = text.chars().map(|c| u32::from(glyph_width(table, c))).sum();
    f64::from(units) / 1000.0 * size_pt * MM_PER_PT
}

#[cfg(test)]
mod tests {
    use super::text_width_mm;

    #[test]
    fn digits_share_one_width() {
        let a = text_width_mm("111", 10.0, false);
        let b = text_width_mm("999", 10.0, false);
        assert!((a - b).abs() < f64::EPSILON);
    }

    #[test]
    fn bold_is_never_narrower() {
        let text = "Total Due";
        assert!(text_width_mm(text, 10.0, true) >= text_width_mm(text, 10.0, false));
    }
}
