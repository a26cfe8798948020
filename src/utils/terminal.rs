//! Terminal output sanitization
//!
//! Titles, descriptions and object names come straight out of an index file that
//! anyone could have written. Escape sequences and control characters are dropped
//! before any of it reaches the terminal.

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Removes ANSI escape sequences and control characters
///
/// CSI sequences (`ESC [ ... final`) and OSC sequences (`ESC ] ... BEL` or
/// `ESC ] ... ESC \`) are dropped whole. Tab, newline and carriage return survive.
///
/// # Examples
///
/// ```
/// use search_index_explorer::utils::terminal::strip_ansi_codes;
///
/// assert_eq!(strip_ansi_codes("\x1b[31mpkg.run\x1b[0m"), "pkg.run");
/// assert_eq!(strip_ansi_codes("\x1b]0;owned\x07API"), "API");
/// ```
pub fn strip_ansi_codes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ESC {
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
                        if next == BEL {
                            break;
                        }
                        if next == ESC && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if ch.is_control() && !matches!(ch, '\t' | '\n' | '\r') {
            continue;
        }
        out.push(ch);
    }

    out
}

/// Sanitizes text and folds it onto one line for list and table output
pub fn single_line(text: &str) -> String {
    strip_ansi_codes(text).split_whitespace().collect::<Vec<_>>().join(" ")
}
