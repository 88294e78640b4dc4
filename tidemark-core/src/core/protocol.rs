//! Message types exchanged between the session, the relay, and the page.
//!
//! Every type here is JSON-serializable. The components never share memory,
//! so these shapes are the entire contract between them: requests carry an
//! `action` tag, replies are bare objects distinguished by their fields,
//! exactly as they travel between an extension's surfaces.

use serde::{Deserialize, Serialize};

use crate::core::error::TidemarkError;
use crate::core::video::VideoContext;

/// A request relayed to the focused page's agent, awaiting a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageRequest {
    /// Asks the page for a fresh snapshot of its player.
    GetVideoInfo,
    /// Seeks the player to a position (whole seconds) and resumes playback.
    JumpToTimestamp {
        /// Target playback position in whole seconds.
        timestamp: u32,
    },
}

/// A fire-and-forget event pushed toward the page. Never answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageEvent {
    /// A note was saved; the page may show a transient acknowledgement.
    NoteAdded,
}

/// Reply from the page agent to one [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageReply {
    /// Fresh player snapshot.
    VideoInfo(VideoContext),
    /// Seek outcome. `success` is false when the page had no player.
    Seek { success: bool },
    /// The page could not satisfy the request.
    Error { error: PageErrorKind },
}

/// Machine-readable environment error reported by the page agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageErrorKind {
    /// The page has no embedded video player.
    NoVideoElement,
    /// The page address does not identify a video.
    NotAVideoPage,
}

impl From<PageErrorKind> for TidemarkError {
    fn from(kind: PageErrorKind) -> Self {
        match kind {
            PageErrorKind::NoVideoElement => TidemarkError::NoVideoElement,
            PageErrorKind::NotAVideoPage => TidemarkError::NotAVideoPage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let json = serde_json::to_string(&PageRequest::GetVideoInfo).unwrap();
        assert_eq!(json, r#"{"action":"getVideoInfo"}"#);

        let json =
            serde_json::to_string(&PageRequest::JumpToTimestamp { timestamp: 125 }).unwrap();
        assert_eq!(json, r#"{"action":"jumpToTimestamp","timestamp":125}"#);
    }

    #[test]
    fn test_event_wire_shape() {
        let json = serde_json::to_string(&PageEvent::NoteAdded).unwrap();
        assert_eq!(json, r#"{"action":"noteAdded"}"#);
    }

    #[test]
    fn test_reply_wire_shapes() {
        let info = PageReply::VideoInfo(VideoContext {
            video_id: "abc123".to_string(),
            video_title: "Untitled Video".to_string(),
            current_time: 5,
            duration: 300,
        });
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(
            json,
            r#"{"videoId":"abc123","videoTitle":"Untitled Video","currentTime":5,"duration":300}"#
        );

        let json = serde_json::to_string(&PageReply::Seek { success: true }).unwrap();
        assert_eq!(json, r#"{"success":true}"#);

        let json = serde_json::to_string(&PageReply::Error {
            error: PageErrorKind::NoVideoElement,
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"noVideoElement"}"#);
    }

    #[test]
    fn test_untagged_replies_deserialize_by_shape() {
        let reply: PageReply = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(reply, PageReply::Seek { success: false });

        let reply: PageReply = serde_json::from_str(r#"{"error":"notAVideoPage"}"#).unwrap();
        assert_eq!(
            reply,
            PageReply::Error {
                error: PageErrorKind::NotAVideoPage
            }
        );
    }
}
