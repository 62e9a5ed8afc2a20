pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod gemini;
pub mod output;
pub mod subtitles;
pub mod thumbnail;
pub mod web;
pub mod youtube;

#[cfg(test)]
mod testing;

use std::sync::LazyLock;

use regex::Regex;

pub use error::Error;

/// Prefix for every user-facing failure message
pub const FAILURE_MARKER: &str = "❌";

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtube\.com/(?:[^/\n\s]+/\S+/|(?:v|e(?:mbed)?|shorts|live)/|.*[?&]v=)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .expect("video URL pattern is valid")
});

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video ID pattern is valid"));

/// A single captioned segment
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    /// Offset into the video, in seconds
    pub start: f64,
    pub duration: f64,
}

/// Seconds of video covered by `segments`, up to the end of the last cue
pub fn covered_seconds(segments: &[Segment]) -> f64 {
    segments.last().map_or(0.0, |s| s.start + s.duration)
}

/// An 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Accept `input` only if it already is a bare identifier
    pub fn parse(input: &str) -> Option<Self> {
        BARE_ID.is_match(input).then(|| Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the video ID from a YouTube URL, or accept a bare ID
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();

    if let Some(caps) = URL_PATTERN.captures(input) {
        return Some(VideoId(caps[1].to_string()));
    }

    VideoId::parse(input)
}
