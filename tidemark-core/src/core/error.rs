//! Error types for the Tidemark core library.

use thiserror::Error;

/// All errors that can occur within the Tidemark core library.
#[derive(Debug, Error)]
pub enum TidemarkError {
    /// A SQLite operation failed in the backing note store.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A stored note collection could not be serialized or deserialized.
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// No page is currently focused, so there is nothing to relay to.
    #[error("No active target")]
    NoActiveTarget,

    /// The page agent did not reply before the relay timeout elapsed.
    #[error("Target unreachable")]
    TargetUnreachable,

    /// The focused page has no embedded video player.
    #[error("No video found on this page")]
    NoVideoElement,

    /// The page address does not identify a video.
    #[error("Not a video page")]
    NotAVideoPage,

    /// A note operation was attempted without an active video context.
    #[error("No active video")]
    NoActiveVideo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_video_element_message() {
        let e = TidemarkError::NoVideoElement;
        assert!(e.to_string().contains("No video found"));
    }

    #[test]
    fn test_target_unreachable_message() {
        let e = TidemarkError::TargetUnreachable;
        assert!(e.to_string().contains("unreachable"));
    }

    #[test]
    fn test_user_messages_are_nonempty() {
        let errors = [
            TidemarkError::NoActiveTarget,
            TidemarkError::TargetUnreachable,
            TidemarkError::NoVideoElement,
            TidemarkError::NotAVideoPage,
            TidemarkError::NoActiveVideo,
        ];
        for e in errors {
            assert!(!e.user_message().is_empty());
        }
    }
}

/// Convenience alias that pins the error type to [`TidemarkError`].
pub type Result<T> = std::result::Result<T, TidemarkError>;

impl TidemarkError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(e) => format!("Failed to save notes: {e}"),
            Self::Payload(e) => format!("Data format error: {e}"),
            Self::NoActiveTarget => "No active video page".to_string(),
            Self::TargetUnreachable => "The video page is not responding — please try again".to_string(),
            Self::NoVideoElement => "No video found on this page".to_string(),
            Self::NotAVideoPage => "This page does not look like a video page".to_string(),
            Self::NoActiveVideo => "Open a video to start taking notes".to_string(),
        }
    }
}
