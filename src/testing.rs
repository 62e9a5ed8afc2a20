//! In-memory doubles for the external collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use eyre::{Result, bail};
use parking_lot::Mutex;

use crate::context::{ChatProvider, ChatSession};
use crate::thumbnail::ThumbnailLookup;
use crate::youtube::{TranscriptEntry, TranscriptList, TranscriptService};
use crate::{Segment, VideoId};

pub fn entry(language: &str, code: &str, generated: bool) -> TranscriptEntry {
    TranscriptEntry {
        language: language.to_string(),
        language_code: code.to_string(),
        is_generated: generated,
        base_url: format!("https://example.test/{code}"),
    }
}

#[derive(Default)]
pub struct FakeTranscripts {
    entries: Vec<TranscriptEntry>,
    list_error: Option<String>,
    fetch_fails: bool,
    vanish: bool,
    list_calls: AtomicUsize,
}

impl FakeTranscripts {
    pub fn with_entries(entries: Vec<TranscriptEntry>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            list_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Only the first listing reports any tracks
    pub fn vanishing(mut self) -> Self {
        self.vanish = true;
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fetch_fails = true;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptService for FakeTranscripts {
    async fn list_transcripts(&self, _video_id: &VideoId) -> Result<TranscriptList> {
        let calls = self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref message) = self.list_error {
            bail!("{message}");
        }
        if self.vanish && calls > 0 {
            return Ok(TranscriptList::default());
        }
        Ok(TranscriptList {
            entries: self.entries.clone(),
        })
    }

    async fn fetch_segments(&self, entry: &TranscriptEntry) -> Result<Vec<Segment>> {
        if self.fetch_fails {
            bail!("timedtext returned 404");
        }
        let code = &entry.language_code;
        Ok(vec![
            Segment {
                text: format!("[{code}] hello"),
                start: 0.0,
                duration: 1.0,
            },
            Segment {
                text: format!("[{code}] world"),
                start: 1.0,
                duration: 1.0,
            },
        ])
    }
}

/// Chat provider whose sessions echo each message back.
/// Messages containing `[fail]` make the send fail.
#[derive(Default)]
pub struct FakeProvider {
    sent: Arc<Mutex<Vec<String>>>,
    created: AtomicUsize,
}

impl FakeProvider {
    pub const BAD_KEY: &'static str = "bad-key";

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for FakeProvider {
    async fn create_session(&self, api_key: &str, _model: &str) -> Result<Box<dyn ChatSession>> {
        if api_key == Self::BAD_KEY {
            bail!("API key not valid");
        }
        let id = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Box::new(FakeChat {
            id,
            sent: Arc::clone(&self.sent),
        }))
    }
}

struct FakeChat {
    id: usize,
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ChatSession for FakeChat {
    async fn send(&mut self, text: &str) -> Result<String> {
        self.sent.lock().push(text.to_string());
        if text.contains("[fail]") {
            bail!("provider exploded");
        }
        Ok(format!("session {} says: {text}", self.id))
    }
}

pub struct FakeThumbnails(pub Option<String>);

#[async_trait]
impl ThumbnailLookup for FakeThumbnails {
    async fn thumbnail_url(&self, video_id: &VideoId) -> Option<String> {
        self.0.as_ref().map(|base| format!("{base}/{video_id}.jpg"))
    }
}
