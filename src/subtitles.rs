use log::{debug, warn};
use serde::Serialize;

use crate::youtube::{TranscriptEntry, TranscriptService};
use crate::{Error, VideoId};

/// Who authored a subtitle track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Manual,
    Automatic,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Manual => write!(f, "manual"),
            Provenance::Automatic => write!(f, "auto"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleTrack {
    pub label: String,
    pub language_code: String,
    pub provenance: Provenance,
}

impl From<&TranscriptEntry> for SubtitleTrack {
    fn from(entry: &TranscriptEntry) -> Self {
        Self {
            label: format!("{} ({})", entry.language, entry.language_code),
            language_code: entry.language_code.clone(),
            provenance: if entry.is_generated {
                Provenance::Automatic
            } else {
                Provenance::Manual
            },
        }
    }
}

/// Available tracks split by provenance, each in the order the service listed them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracks {
    pub manual: Vec<SubtitleTrack>,
    pub automatic: Vec<SubtitleTrack>,
}

impl Tracks {
    pub fn is_empty(&self) -> bool {
        self.manual.is_empty() && self.automatic.is_empty()
    }

    /// First manual track, else first automatic track
    pub fn select(&self) -> Result<&SubtitleTrack, Error> {
        self.manual
            .first()
            .or_else(|| self.automatic.first())
            .ok_or(Error::NoSubtitles)
    }
}

impl<'a> FromIterator<&'a TranscriptEntry> for Tracks {
    fn from_iter<I: IntoIterator<Item = &'a TranscriptEntry>>(iter: I) -> Self {
        let (automatic, manual): (Vec<_>, Vec<_>) = iter
            .into_iter()
            .map(SubtitleTrack::from)
            .partition(|t| t.provenance == Provenance::Automatic);
        Self { manual, automatic }
    }
}

/// List the subtitle tracks of a video
pub async fn list_tracks(service: &dyn TranscriptService, video_id: &VideoId) -> Result<Tracks, Error> {
    let list = service.list_transcripts(video_id).await.map_err(|e| {
        warn!("Listing subtitles for {video_id} failed: {e:#}");
        Error::SubtitleListing(e.to_string())
    })?;

    let tracks: Tracks = list.iter().collect();
    debug!(
        "Video {video_id}: {} manual, {} automatic tracks",
        tracks.manual.len(),
        tracks.automatic.len()
    );
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTranscripts, entry};

    fn vid() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    #[tokio::test]
    async fn test_partition_preserves_order() {
        let service = FakeTranscripts::with_entries(vec![
            entry("English", "en", true),
            entry("Portuguese", "pt", false),
            entry("Spanish", "es", true),
            entry("French", "fr", false),
        ]);
        let tracks = list_tracks(&service, &vid()).await.unwrap();

        let manual: Vec<_> = tracks.manual.iter().map(|t| t.language_code.as_str()).collect();
        let automatic: Vec<_> = tracks.automatic.iter().map(|t| t.language_code.as_str()).collect();
        assert_eq!(manual, vec!["pt", "fr"]);
        assert_eq!(automatic, vec!["en", "es"]);
        assert_eq!(tracks.manual[0].label, "Portuguese (pt)");
    }

    #[tokio::test]
    async fn test_select_only_automatic() {
        let service = FakeTranscripts::with_entries(vec![entry("English", "en", true), entry("German", "de", true)]);
        let tracks = list_tracks(&service, &vid()).await.unwrap();
        let chosen = tracks.select().unwrap();
        assert_eq!(chosen.language_code, "en");
        assert_eq!(chosen.provenance, Provenance::Automatic);
    }

    #[tokio::test]
    async fn test_select_prefers_manual_regardless_of_order() {
        let service = FakeTranscripts::with_entries(vec![
            entry("English", "en", true),
            entry("German", "de", true),
            entry("Italian", "it", false),
        ]);
        let tracks = list_tracks(&service, &vid()).await.unwrap();
        let chosen = tracks.select().unwrap();
        assert_eq!(chosen.language_code, "it");
        assert_eq!(chosen.provenance, Provenance::Manual);
    }

    #[tokio::test]
    async fn test_select_without_tracks() {
        let service = FakeTranscripts::with_entries(vec![]);
        let tracks = list_tracks(&service, &vid()).await.unwrap();
        assert!(tracks.is_empty());
        assert_eq!(tracks.select(), Err(Error::NoSubtitles));
    }

    #[tokio::test]
    async fn test_listing_failure() {
        let service = FakeTranscripts::failing("video unavailable");
        let err = list_tracks(&service, &vid()).await.unwrap_err();
        assert_eq!(err, Error::SubtitleListing("video unavailable".to_string()));
    }

    #[test]
    fn test_provenance_display() {
        assert_eq!(Provenance::Manual.to_string(), "manual");
        assert_eq!(Provenance::Automatic.to_string(), "auto");
    }
}
