//! Whitespace-free comparison keys for changed lines.

/// Remove every whitespace character from `content`, wherever it appears.
///
/// `content` is the line without its `+`/`-` prefix. The ASCII information
/// separators U+001C..U+001F count as whitespace as well.
///
/// # Examples
///
/// ```
/// use patchsift_difflens::normalize::normalize_line;
///
/// assert_eq!(normalize_line("  if (x == 1) {\t"), "if(x==1){");
/// assert_eq!(normalize_line(" \t "), "");
/// ```
pub fn normalize_line(content: &str) -> String {
    content.chars().filter(|c| !is_space(*c)).collect()
}

fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}
