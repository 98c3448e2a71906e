//! IRC nickname and channel case folding.
//!
//! IRC servers advertise a `CASEMAPPING` that decides which names are
//! considered equal. Under `rfc1459` the characters `[]\~` are the upper
//! case forms of `{}|^`, so `Foo[away]` and `foo{AWAY}` are the same nick.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Casemapping {
    /// ASCII letters plus `[]\~` -> `{}|^`.
    #[default]
    Rfc1459,
    /// ASCII letters plus `[]\` -> `{}|`.
    StrictRfc1459,
    /// ASCII letters only.
    Ascii,
}

impl Casemapping {
    pub fn lower_char(self, c: char) -> char {
        match (self, c) {
            (_, 'A'..='Z') => c.to_ascii_lowercase(),
            (Casemapping::Ascii, _) => c,
            (_, '[') => '{',
            (_, ']') => '}',
            (_, '\\') => '|',
            (Casemapping::Rfc1459, '~') => '^',
            _ => c,
        }
    }

    pub fn to_lower(self, s: &str) -> String {
        s.chars().map(|c| self.lower_char(c)).collect()
    }

    /// Compares two nicks (or channel names) under this casemapping.
    pub fn nick_eq(self, a: &str, b: &str) -> bool {
        a.chars().count() == b.chars().count()
            && a
                .chars()
                .zip(b.chars())
                .all(|(x, y)| self.lower_char(x) == self.lower_char(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc1459_folds_brackets_and_tilde() {
        let cm = Casemapping::Rfc1459;
        assert!(cm.nick_eq("Alice", "alice"));
        assert!(cm.nick_eq("Foo[away]", "foo{AWAY}"));
        assert!(cm.nick_eq("a\\b", "A|B"));
        assert!(cm.nick_eq("tilde~", "TILDE^"));
        assert!(!cm.nick_eq("alice", "alicia"));
        assert!(!cm.nick_eq("alice", "alice_"));
    }

    #[test]
    fn test_strict_rfc1459_keeps_tilde_distinct() {
        let cm = Casemapping::StrictRfc1459;
        assert!(cm.nick_eq("[x]", "{X}"));
        assert!(!cm.nick_eq("a~", "a^"));
    }

    #[test]
    fn test_ascii_only_folds_letters() {
        let cm = Casemapping::Ascii;
        assert!(cm.nick_eq("BOB", "bob"));
        assert!(!cm.nick_eq("[bob]", "{bob}"));
    }

    #[test]
    fn test_non_ascii_is_compared_exactly() {
        let cm = Casemapping::Rfc1459;
        assert!(cm.nick_eq("zoë", "ZOë"));
        assert!(!cm.nick_eq("zoë", "ZOË"));
    }

    #[test]
    fn test_to_lower() {
        assert_eq!(Casemapping::Rfc1459.to_lower("#Rust[Dev]"), "#rust{dev}");
        assert_eq!(Casemapping::Ascii.to_lower("#Rust[Dev]"), "#rust[dev]");
    }
}
