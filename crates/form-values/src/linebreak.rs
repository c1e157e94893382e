//! Line breaking for multi-line fields

/// Break text into fixed-width chunks joined by `\n`
///
/// Chunks are cut every `width` characters. When a cut falls inside a word
/// a hyphen is appended to the earlier chunk, and a leading space on a
/// chunk is dropped.
///
/// # Examples
/// ```
/// use form_values::wrap_hyphenated;
/// assert_eq!(wrap_hyphenated("abcdef ghij", 4), "abcd-\nef g-\nhij");
/// ```
pub fn wrap_hyphenated(text: &str, width: usize) -> String {
    if width == 0 || text.is_empty() {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut lines: Vec<String> = chars.chunks(width).map(|c| c.iter().collect()).collect();

    for i in 1..lines.len() {
        let ends_in_word = lines[i - 1].chars().last().is_some_and(|c| c != ' ');
        let starts_in_word = lines[i].chars().next().is_some_and(|c| c != ' ');
        if ends_in_word && starts_in_word {
            lines[i - 1].push('-');
        }
    }

    for line in &mut lines {
        if let Some(rest) = line.strip_prefix(' ') {
            *line = rest.to_string();
        }
    }

    lines.join("\n")
}
