use unicode_width::UnicodeWidthChar;

use crate::grid::CellId;
use crate::selection::Bounds;

pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the character at `char_idx`, or `s.len()` past the end
pub fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

pub fn insert_char_at(s: &str, char_idx: usize, c: char) -> String {
    let mut out = s.to_string();
    out.insert(byte_index(s, char_idx), c);
    out
}

/// Remove the character at `char_idx`, returning the new string and the char
pub fn remove_char_at(s: &str, char_idx: usize) -> Option<(String, char)> {
    let at = byte_index(s, char_idx);
    let c = s[at..].chars().next()?;
    let mut out = s.to_string();
    out.remove(at);
    Some((out, c))
}

/// Column letters, spreadsheet style (0 -> A, 26 -> AA)
pub fn letters_from_col(mut col: usize) -> String {
    col += 1;
    let mut buf = Vec::new();
    while col > 0 {
        col -= 1;
        buf.push((b'A' + (col % 26) as u8) as char);
        col /= 26;
    }
    buf.into_iter().rev().collect()
}

/// `T1 B3`: table number then spreadsheet-style cell name
pub fn cell_label(id: CellId) -> String {
    format!("T{} {}{}", id.grid + 1, letters_from_col(id.col), id.row + 1)
}

pub fn range_label(bounds: Bounds) -> String {
    format!(
        "T{} {}{}:{}{}",
        bounds.grid + 1,
        letters_from_col(bounds.min_col),
        bounds.min_row + 1,
        letters_from_col(bounds.max_col),
        bounds.max_row + 1
    )
}

/// Cut `s` to at most `width` terminal columns
pub fn truncate_to_width(s: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_editing_is_char_indexed() {
        assert_eq!(insert_char_at("合同", 1, 'x'), "合x同");
        assert_eq!(insert_char_at("ab", 5, 'c'), "abc");
        assert_eq!(remove_char_at("合x同", 1), Some(("合同".to_string(), 'x')));
        assert_eq!(remove_char_at("ab", 2), None);
    }

    #[test]
    fn test_letters_from_col() {
        assert_eq!(letters_from_col(0), "A");
        assert_eq!(letters_from_col(25), "Z");
        assert_eq!(letters_from_col(26), "AA");
        assert_eq!(letters_from_col(701), "ZZ");
        assert_eq!(letters_from_col(702), "AAA");
    }

    #[test]
    fn test_labels() {
        assert_eq!(cell_label(CellId::new(0, 2, 1)), "T1 B3");
        let bounds = Bounds { grid: 1, min_row: 0, max_row: 1, min_col: 0, max_col: 2 };
        assert_eq!(range_label(bounds), "T2 A1:C2");
    }

    #[test]
    fn test_truncate_to_width_counts_wide_chars() {
        assert_eq!(truncate_to_width("合同条款", 5), "合同");
        assert_eq!(truncate_to_width("abc", 10), "abc");
    }
}
