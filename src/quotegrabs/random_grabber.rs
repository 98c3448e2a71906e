//! Stochastic auto-grab decision.
//!
//! A message qualifies when it is long enough; it is then grabbed if the
//! speaker has never been grabbed in the channel, or with a probability
//! that rises with the time since their last grab:
//!
//! ```text
//! grab  <=>  U[0, 1) * elapsed > average / 2
//! ```
//!
//! Nothing fires while `elapsed <= average / 2`; past that point the chance
//! approaches one.

use log::debug;

use crate::configuration::types::RandomGrabberConfig;
use crate::error_handling::types::StorageError;
use crate::irc::IrcMessage;
use crate::storage::storage_trait::QuoteStorage;

/// Whether `text` has enough characters and words to be worth grabbing.
pub fn meets_minimums(text: &str, config: &RandomGrabberConfig) -> bool {
    text.chars().count() >= config.minimum_characters
        && text.split_whitespace().count() >= config.minimum_words
}

/// Draws once from `rng` and decides whether `elapsed` seconds since the
/// last grab warrant a new one.
pub fn should_grab(elapsed: i64, average_time_between_grabs: u64, rng: &mut fastrand::Rng) -> bool {
    let elapsed = elapsed.max(0) as f64;
    rng.f64() * elapsed > average_time_between_grabs as f64 / 2.0
}

/// Full decision for one channel message, looking up the speaker's last
/// grab in `storage`.
pub fn decide(
    storage: &dyn QuoteStorage,
    channel: &str,
    msg: &IrcMessage,
    config: &RandomGrabberConfig,
    now: i64,
    rng: &mut fastrand::Rng,
) -> Result<bool, StorageError> {
    if !config.enabled || !meets_minimums(msg.text(), config) {
        return Ok(false);
    }
    match storage.select(channel, msg.nick()) {
        Ok(last) => {
            let elapsed = now - last;
            let grab = should_grab(elapsed, config.average_time_between_grabs, rng);
            debug!(
                "{} in {}: {}s since last grab, grab={}",
                msg.nick(),
                channel,
                elapsed,
                grab
            );
            Ok(grab)
        }
        Err(StorageError::NotFound) => Ok(true),
        Err(e) => Err(e),
    }
}
