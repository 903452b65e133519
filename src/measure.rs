use crate::font::{FontLibrary, FontRole};
use crate::types::Px;

/// Greedy word wrap against measured pixel widths.
///
/// Tokens are whitespace-delimited; a token wider than `max_width` gets its
/// own line rather than being broken mid-word. Identical inputs always yield
/// identical line sequences. Empty input yields no lines.
pub fn wrap(fonts: &FontLibrary, role: FontRole, size: Px, text: &str, max_width: Px) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if fonts.measure(role, size, &candidate) <= max_width {
            line = candidate;
        } else {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            line = word.to_string();
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Line count `wrap` would produce, without keeping the lines.
pub fn wrapped_line_count(
    fonts: &FontLibrary,
    role: FontRole,
    size: Px,
    text: &str,
    max_width: Px,
) -> usize {
    wrap(fonts, role, size, text, max_width).len()
}
