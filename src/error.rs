use thiserror::Error;

use crate::FAILURE_MARKER;

/// Failures a user action can end in. Each one is turned into a status line
/// by the handler that produced it and never propagates further.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Please enter your Google GenAI API key.")]
    MissingCredential,

    #[error("Please enter the video URL or ID.")]
    MissingVideo,

    #[error("Invalid video. Check the URL or ID.")]
    InvalidVideo,

    #[error("Could not list subtitles: {0}")]
    SubtitleListing(String),

    #[error("No subtitles available for this video.")]
    NoSubtitles,

    #[error("Error fetching subtitle text: {0}")]
    SubtitleFetch(String),

    #[error("Error starting GenAI chat: {0}")]
    SessionCreation(String),

    #[error("Chat error: {0}")]
    ChatTurn(String),

    #[error("Thumbnail lookup failed: {0}")]
    Thumbnail(String),
}

impl Error {
    /// User-facing status line, prefixed with the failure marker
    pub fn status(&self) -> String {
        format!("{FAILURE_MARKER} {self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_has_marker() {
        assert_eq!(Error::NoSubtitles.status(), "❌ No subtitles available for this video.");
    }

    #[test]
    fn test_status_carries_cause() {
        let status = Error::ChatTurn("quota exceeded".to_string()).status();
        assert!(status.starts_with(FAILURE_MARKER));
        assert!(status.ends_with("quota exceeded"));
    }
}
