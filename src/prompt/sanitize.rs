//! Cleaning diff text before it is embedded in a prompt.

/// Remove control characters except newlines and tabs.
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Remove ANSI escape sequences (CSI `ESC [ ... final` and OSC `ESC ] ... BEL`).
///
/// Must run before [`remove_control_chars`], which would otherwise strip the
/// escape byte and leave the sequence body behind.
pub fn remove_ansi_escapes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some('[') => {
                chars.next();
                // parameters and intermediates, then one final byte in @..~
                for next in chars.by_ref() {
                    if ('@'..='~').contains(&next) {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                while let Some(next) = chars.next() {
                    if next == '\u{7}' {
                        break;
                    }
                    if next == '\u{1b}' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            Some(_) => {
                chars.next();
            }
            None => {}
        }
    }

    result
}

/// Truncate to at most `max_chars` characters.
///
/// Returns the kept text and whether anything was dropped. Cuts at the last
/// newline inside the budget when there is one, so no half lines remain.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return (text.to_string(), false);
    };

    let kept = &text[..cut];
    let kept = match kept.rfind('\n') {
        Some(idx) if idx > 0 => &kept[..=idx],
        _ => kept,
    };
    (kept.to_string(), true)
}

/// Sanitize diff text for a prompt: escapes, then control characters.
pub fn sanitize_diff(text: &str) -> String {
    remove_control_chars(&remove_ansi_escapes(&text.replace("\r\n", "\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_ansi_color_codes() {
        assert_eq!(remove_ansi_escapes("\u{1b}[31m-old\u{1b}[0m"), "-old");
        assert_eq!(remove_ansi_escapes("\u{1b}]0;title\u{7}text"), "text");
    }

    #[test]
    fn test_remove_control_chars_keeps_newlines_and_tabs() {
        assert_eq!(remove_control_chars("a\u{0}b\tc\nd\u{8}"), "ab\tc\nd");
    }

    #[test]
    fn test_sanitize_diff_handles_both() {
        let dirty = "+\u{1b}[32mfn main() {}\u{1b}[0m\r\n\u{7}";
        assert_eq!(sanitize_diff(dirty), "+fn main() {}\n");
    }

    #[test]
    fn test_truncate_counts_characters() {
        let (text, truncated) = truncate_chars("ááá", 3);
        assert_eq!(text, "ááá");
        assert!(!truncated);

        let (text, truncated) = truncate_chars("ááá", 2);
        assert_eq!(text, "áá");
        assert!(truncated);
    }

    #[test]
    fn test_truncate_prefers_line_boundary() {
        let (text, truncated) = truncate_chars("+line one\n+line two\n", 14);
        assert_eq!(text, "+line one\n");
        assert!(truncated);
    }
}
