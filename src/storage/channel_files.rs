//! Location of the per-channel store files.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error};

use crate::error_handling::types::StorageError;
use crate::irc::Casemapping;

/// Directory name used for `channel` under the data directory.
pub fn channel_dirname(casemapping: Casemapping, channel: &str) -> String {
    casemapping
        .to_lower(channel)
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

/// Returns `<data_dir>/<lowercased channel>/<filename>`, creating the
/// channel directory if needed.
pub fn channel_filename(
    data_dir: &Path,
    filename: &str,
    casemapping: Casemapping,
    channel: &str,
) -> Result<PathBuf, StorageError> {
    let dirname = channel_dirname(casemapping, channel);
    if dirname.is_empty() || dirname == "." || dirname == ".." {
        return Err(StorageError::ConnectionFailed(format!(
            "'{}' is not a usable channel name",
            channel
        )));
    }
    let dir = data_dir.join(dirname);
    fs::create_dir_all(&dir).map_err(|e| {
        error!("Failed to create channel dir {}: {}", dir.display(), e);
        StorageError::ConnectionFailed(format!("{}: {}", dir.display(), e))
    })?;
    let path = dir.join(filename);
    debug!("Channel {} maps to {}", channel, path.display());
    Ok(path)
}
