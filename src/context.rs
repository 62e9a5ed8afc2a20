use async_trait::async_trait;
use eyre::Result;
use log::{debug, info, warn};
use serde::Serialize;

use crate::output::render_text;
use crate::subtitles::{Provenance, SubtitleTrack};
use crate::youtube::TranscriptService;
use crate::{Error, VideoId, covered_seconds};

const PRIMING_INSTRUCTION: &str = "You are an assistant that answers questions strictly based ON THE FOLLOWING CONTENT \
of a YouTube video's subtitles. DO NOT USE PRIOR KNOWLEDGE that is not in this text. \
If the information is not in the text, say that you don't know. Subtitle content:\n\n";

/// A stateful conversation held by the chat provider
#[async_trait]
pub trait ChatSession: Send {
    async fn send(&mut self, text: &str) -> Result<String>;
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn create_session(&self, api_key: &str, model: &str) -> Result<Box<dyn ChatSession>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEntry {
    pub question: String,
    /// `None` while the reply is pending
    pub answer: Option<String>,
}

/// Question/answer pairs of the current session, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChatLog(Vec<ChatEntry>);

impl ChatLog {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.0
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    fn push_pending(&mut self, question: &str) -> &mut ChatEntry {
        self.0.push(ChatEntry {
            question: question.to_string(),
            answer: None,
        });
        let last = self.0.len() - 1;
        &mut self.0[last]
    }
}

/// Fetch the plain text of `track`, listing the video's tracks again to locate it
pub async fn fetch_text(
    service: &dyn TranscriptService,
    video_id: &VideoId,
    track: &SubtitleTrack,
) -> Result<String, Error> {
    let list = service
        .list_transcripts(video_id)
        .await
        .map_err(|e| Error::SubtitleFetch(e.to_string()))?;

    let codes = [track.language_code.as_str()];
    let entry = match track.provenance {
        Provenance::Manual => list.find_manual(&codes),
        Provenance::Automatic => list.find_generated(&codes),
    }
    .ok_or_else(|| Error::SubtitleFetch(format!("track {} is no longer available", track.label)))?;

    let segments = service
        .fetch_segments(entry)
        .await
        .map_err(|e| Error::SubtitleFetch(e.to_string()))?;

    let text = render_text(&segments);
    if text.trim().is_empty() {
        return Err(Error::SubtitleFetch(format!("track {} has no text", track.label)));
    }

    let covered = covered_seconds(&segments);
    debug!(
        "Fetched {} segments ({} bytes, {covered:.0}s of video) for {video_id}",
        segments.len(),
        text.len()
    );
    Ok(text)
}

/// Open a session and prime it with the subtitle text as grounding
pub async fn start_session(
    provider: &dyn ChatProvider,
    api_key: &str,
    model: &str,
    context: &str,
) -> Result<Box<dyn ChatSession>, Error> {
    let mut session = provider
        .create_session(api_key, model)
        .await
        .map_err(|e| Error::SessionCreation(e.to_string()))?;

    session
        .send(&priming_message(context))
        .await
        .map_err(|e| Error::SessionCreation(e.to_string()))?;

    info!("Chat session primed with {} bytes of subtitles", context.len());
    Ok(session)
}

fn priming_message(context: &str) -> String {
    format!("{PRIMING_INSTRUCTION}{context}")
}

/// Run one chat turn. Blank questions and a missing session leave `log`
/// untouched; a failed turn records the error as that turn's answer.
pub async fn ask(session: Option<&mut Box<dyn ChatSession>>, question: &str, log: &mut ChatLog) {
    let Some(session) = session else {
        debug!("Ignoring question: no active session");
        return;
    };
    if question.trim().is_empty() {
        return;
    }

    let entry = log.push_pending(question);
    entry.answer = Some(match session.send(question).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Chat turn failed: {e:#}");
            Error::ChatTurn(e.to_string()).status()
        }
    });
}
