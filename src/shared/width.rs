//! Display-width calculation for terminal text.
//!
//! Widths are measured in terminal cells: wide East Asian glyphs count 2,
//! combining marks and control characters count 0. ANSI escape sequences
//! are skipped so styled text measures the same as plain text.

use unicode_width::UnicodeWidthChar;

const ESC: char = '\x1b';

/// Number of terminal columns `text` occupies once rendered.
///
/// Accepts raw bytes so values read from disk can be measured before (or
/// without) validating them. Undecodable byte sequences, including a
/// multibyte sequence cut off at the end of the input, contribute 0 columns
/// and decoding resumes right after them.
pub fn width_of(text: impl AsRef<[u8]>) -> usize {
    let bytes = text.as_ref();
    if bytes.is_empty() {
        return 0;
    }
    bytes
        .utf8_chunks()
        .map(|chunk| visible_width(chunk.valid()))
        .sum()
}

/// Width of a single code point, 0 for anything without a printable width.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == ESC {
            skip_escape(&mut chars);
            continue;
        }
        width += char_width(ch);
    }
    width
}

// CSI sequences run until a final byte in '@'..='~'; any other escape is
// two characters long.
fn skip_escape(chars: &mut std::str::Chars<'_>) {
    match chars.next() {
        Some('[') => {
            for next in chars.by_ref() {
                if ('@'..='~').contains(&next) {
                    break;
                }
            }
        }
        Some(_) | None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(width_of(""), 0);
        assert_eq!(width_of(b""), 0);
    }

    #[test]
    fn ascii_counts_letters() {
        assert_eq!(width_of("abcdefg"), 7);
        assert_eq!(width_of("glibc>=2.38"), 11);
    }

    #[test]
    fn wide_glyphs_count_two() {
        assert_eq!(width_of("漢字"), 4);
        assert_eq!(width_of("pkg漢"), 5);
    }

    #[test]
    fn combining_marks_count_zero() {
        // 'e' followed by U+0301 COMBINING ACUTE ACCENT
        assert_eq!(width_of("e\u{301}"), 1);
        assert_eq!(width_of("a\u{200b}b"), 2);
    }

    #[test]
    fn invalid_bytes_contribute_nothing() {
        assert_eq!(width_of(b"ab\xffcd"), 4);
        assert_eq!(width_of(b"\xc3"), 0);
    }

    #[test]
    fn truncated_trailing_sequence_is_ignored() {
        // "漢" is e6 bc a2; drop the last byte
        assert_eq!(width_of(b"abc\xe6\xbc"), 3);
    }

    #[test]
    fn ansi_sequences_are_skipped() {
        assert_eq!(width_of("\x1b[1;31mred\x1b[0m"), 3);
        assert_eq!(width_of("\x1b[38;2;1;2;3mx"), 1);
    }

    #[test]
    fn stable_across_calls() {
        let text = "Ünïcödé 漢字 text";
        assert_eq!(width_of(text), width_of(text));
        assert_eq!(width_of(text), width_of(text.as_bytes()));
    }
}
