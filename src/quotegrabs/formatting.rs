//! Reply text helpers.

use crate::storage::types::QuoteGrab;

/// Longest item shown by `list` and `search`.
pub const ITEM_WIDTH: usize = 50;

/// Shortens `s` to at most `n` characters, cutting on word boundaries and
/// appending `...`. Words longer than the whole line are split.
pub fn ellipsisify(s: &str, n: usize) -> String {
    if s.chars().count() <= n {
        return s.to_string();
    }
    let width = n.saturating_sub(3).max(1);
    let mut line = String::new();
    let mut len = 0;
    for word in s.split_whitespace() {
        let wlen = word.chars().count();
        let sep = usize::from(len > 0);
        if len + sep + wlen <= width {
            if sep == 1 {
                line.push(' ');
            }
            line.push_str(word);
            len += sep + wlen;
        } else {
            if wlen > width && len + sep < width {
                if sep == 1 {
                    line.push(' ');
                }
                line.extend(word.chars().take(width - len - sep));
            }
            break;
        }
    }
    format!("{}...", line)
}

/// Joins items as `a`, `a and b`, or `a, b, and c`.
pub fn comma_andify<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [a, b] => format!("{} and {}", a.as_ref(), b.as_ref()),
        [init @ .., last] => {
            let last = format!("and {}", last.as_ref());
            let mut out: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
            out.push(&last);
            out.join(", ")
        }
    }
}

pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s)
}

/// `#id: text` entries for `list` and `search`, speaker marker removed.
pub fn grab_summary(grabs: &[QuoteGrab]) -> String {
    let items: Vec<String> = grabs
        .iter()
        .map(|g| ellipsisify(&format!("#{}: {}", g.id, g.bare_text()), ITEM_WIDTH))
        .collect();
    comma_andify(&items)
}
