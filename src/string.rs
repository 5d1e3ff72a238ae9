#[derive(PartialEq, Clone, Copy)]
enum CharType {
    Whitespace,
    Numeric,
    Punctuation,
    Alphabetic,
}

impl CharType {
    fn from(c: char) -> CharType {
        if c.is_whitespace() {
            CharType::Whitespace
        } else if c.is_numeric() {
            CharType::Numeric
        } else if c.is_alphabetic() {
            CharType::Alphabetic
        } else {
            CharType::Punctuation
        }
    }
}

/// Char index of the start of the word before `idx` (Ctrl+Left)
pub fn word_start(s: &str, idx: usize) -> usize {
    let chars: Vec<char> = s.chars().collect();
    let mut i = idx.min(chars.len());
    while i > 0 && CharType::from(chars[i - 1]) == CharType::Whitespace {
        i -= 1;
    }
    if i == 0 {
        return 0;
    }
    let kind = CharType::from(chars[i - 1]);
    while i > 0 && CharType::from(chars[i - 1]) == kind {
        i -= 1;
    }
    i
}

/// Char index just past the end of the word at or after `idx` (Ctrl+Right)
pub fn word_end(s: &str, idx: usize) -> usize {
    let chars: Vec<char> = s.chars().collect();
    let mut i = idx.min(chars.len());
    while i < chars.len() && CharType::from(chars[i]) == CharType::Whitespace {
        i += 1;
    }
    if i == chars.len() {
        return i;
    }
    let kind = CharType::from(chars[i]);
    while i < chars.len() && CharType::from(chars[i]) == kind {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_start() {
        let s = "base pay, 2024";
        assert_eq!(word_start(s, 14), 10);
        assert_eq!(word_start(s, 10), 8);
        assert_eq!(word_start(s, 8), 5);
        assert_eq!(word_start(s, 3), 0);
        assert_eq!(word_start("", 0), 0);
    }

    #[test]
    fn test_word_end() {
        let s = "base pay, 2024";
        assert_eq!(word_end(s, 0), 4);
        assert_eq!(word_end(s, 4), 8);
        assert_eq!(word_end(s, 8), 9);
        assert_eq!(word_end(s, 9), 14);
        assert_eq!(word_end(s, 14), 14);
    }
}
