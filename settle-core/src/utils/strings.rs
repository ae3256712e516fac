//! String helpers.

/// Uppercase the first character, leave the rest alone.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `camelCase`, `snake_case` and spaced words to `kebab-case`.
///
/// A hyphen goes between a lowercase ASCII letter and a following uppercase
/// one, and every run of whitespace or underscores becomes a single hyphen.
pub fn to_kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    let mut in_separator = false;

    for c in s.chars() {
        if c.is_whitespace() || c == '_' {
            if !in_separator {
                out.push('-');
                in_separator = true;
            }
        } else {
            if matches!(prev, Some(p) if p.is_ascii_lowercase()) && c.is_ascii_uppercase() {
                out.push('-');
            }
            out.push(c);
            in_separator = false;
        }
        prev = Some(c);
    }

    out.to_lowercase()
}

/// Cut to `max_chars` characters and append `...` if anything was cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
        None => s.to_string(),
    }
}

/// Join the non-empty class names with single spaces.
pub fn class_names<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for part in parts {
        let part = part.as_ref().trim();
        if part.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}
