//! Transient description of the video the focused page is playing.

use serde::{Deserialize, Serialize};

/// Snapshot of the focused page's player, captured at request time.
///
/// Never persisted. Callers that care about the playback position take a
/// fresh snapshot rather than reusing an old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContext {
    /// Platform identifier parsed from the page address.
    pub video_id: String,
    /// Display title, or a placeholder when the page exposes none.
    pub video_title: String,
    /// Playback position in whole seconds.
    pub current_time: u32,
    /// Total length in whole seconds.
    pub duration: u32,
}
