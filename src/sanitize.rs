/// Telegram's limit on message text length, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Clean user-supplied text before it is echoed or logged: strip control
/// characters (newline, carriage return and tab survive), cap the length and
/// trim surrounding whitespace.
pub fn sanitize_input(text: &str, max_chars: usize) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| *c as u32 >= 32 || matches!(c, '\n' | '\r' | '\t'))
        .take(max_chars)
        .collect();
    cleaned.trim().to_string()
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_input("", MAX_MESSAGE_CHARS), "");
    }

    #[test]
    fn test_strips_control_characters() {
        let out = sanitize_input("Al\0ice\x1b[31m\x07", MAX_MESSAGE_CHARS);
        assert_eq!(out, "Alice[31m");
    }

    #[test]
    fn test_keeps_newline_tab_and_unicode() {
        let out = sanitize_input("a\tb\r\nмагазин 🛍️", MAX_MESSAGE_CHARS);
        assert_eq!(out, "a\tb\r\nмагазин 🛍️");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(sanitize_input("  \n hi \t ", MAX_MESSAGE_CHARS), "hi");
    }

    #[test]
    fn test_long_dirty_input_is_bounded() {
        let mut input = String::from("\u{1b} ");
        while input.chars().count() < 5000 {
            input.push_str("ab\0c\u{1}d ");
        }
        let input: String = input.chars().take(5000).collect();
        assert_eq!(input.chars().count(), 5000);

        let out = sanitize_input(&input, MAX_MESSAGE_CHARS);
        assert!(out.chars().count() <= MAX_MESSAGE_CHARS);
        assert!(out
            .chars()
            .all(|c| c as u32 >= 32 || matches!(c, '\n' | '\r' | '\t')));
        assert_eq!(out, out.trim());
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("привет", 3), "при");
        assert_eq!(truncate_chars("short", 500), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
