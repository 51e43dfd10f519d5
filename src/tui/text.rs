use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Width of `s` in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `max_cells` cells on a grapheme boundary, ending in `…`
/// when anything was dropped.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for g in s.graphemes(true) {
        let w = UnicodeWidthStr::width(g);
        if used + w > max_cells - 1 {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out.push('\u{2026}');
    out
}

/// Byte offset of the grapheme boundary after `offset`, if any
pub fn next_boundary(s: &str, offset: usize) -> Option<usize> {
    let rest = s.get(offset..)?;
    rest.graphemes(true).next().map(|g| offset + g.len())
}

/// Byte offset of the grapheme boundary before `offset`, if any
pub fn prev_boundary(s: &str, offset: usize) -> Option<usize> {
    let head = s.get(..offset)?;
    head.grapheme_indices(true).next_back().map(|(i, _)| i)
}

/// Display width of `s[..offset]`, for placing the cursor
pub fn width_before(s: &str, offset: usize) -> usize {
    s.get(..offset).map_or(0, display_width)
}
