use chrono::{DateTime, Utc};
use std::fmt;

/// Timestamp layout used when a grab is rendered for users.
pub const DISPLAY_TIME_FORMAT: &str = "%I:%M %p, %B %d, %Y";

/// One grabbed utterance.
///
/// Records returned by `list` and `search` come from the same table as the
/// ones returned by `get`, so every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteGrab {
    /// Store-assigned id, increasing with insertion order and never reused.
    pub id: i64,
    /// Nick of the speaker at grab time.
    pub by: String,
    /// Speaker hostmask at grab time.
    pub hostmask: String,
    /// Account name or hostmask of whoever grabbed the quote.
    pub grabber: String,
    /// Seconds since the epoch.
    pub at: i64,
    /// Pretty-printed message, e.g. `<nick> text` or `* nick waves`.
    pub text: String,
}

impl QuoteGrab {
    pub fn grabbed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.at, 0)
    }

    /// Quote text without the leading `<nick> ` marker.
    pub fn bare_text(&self) -> &str {
        let marker = format!("<{}> ", self.by);
        self.text.strip_prefix(marker.as_str()).unwrap_or(&self.text)
    }
}

impl fmt::Display for QuoteGrab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self
            .grabbed_at()
            .map(|t| t.format(DISPLAY_TIME_FORMAT).to_string())
            .unwrap_or_else(|| self.at.to_string());
        write!(
            f,
            "{} (Said by: {}; grabbed by {} at {})",
            self.text, self.hostmask, self.grabber, at
        )
    }
}
