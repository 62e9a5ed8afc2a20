use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{Config, clamp_font_size};
use crate::context::{self, ChatLog, ChatProvider, ChatSession};
use crate::subtitles::{SubtitleTrack, list_tracks};
use crate::thumbnail::ThumbnailLookup;
use crate::youtube::TranscriptService;
use crate::{Error, extract_video_id};

/// Per-browser state: the primed chat session and its log
#[derive(Default)]
pub struct UserSession {
    session: Option<Box<dyn ChatSession>>,
    log: ChatLog,
}

impl UserSession {
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoadRequest {
    pub api_key: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct LoadOutcome {
    pub status: String,
    pub thumbnail_url: Option<String>,
    pub chat_visible: bool,
    pub log: ChatLog,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskOutcome {
    pub log: ChatLog,
}

/// The video chat pipeline and its collaborators
pub struct App {
    config: Arc<Config>,
    transcripts: Arc<dyn TranscriptService>,
    chat: Arc<dyn ChatProvider>,
    thumbnails: Arc<dyn ThumbnailLookup>,
}

impl App {
    pub fn new(
        config: Arc<Config>,
        transcripts: Arc<dyn TranscriptService>,
        chat: Arc<dyn ChatProvider>,
        thumbnails: Arc<dyn ThumbnailLookup>,
    ) -> Self {
        Self {
            config,
            transcripts,
            chat,
            thumbnails,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve the video, pick its subtitles and prime a new chat session.
    /// Whatever the result, the previous session and log are discarded.
    pub async fn load(&self, slot: &mut UserSession, req: LoadRequest) -> LoadOutcome {
        slot.session = None;
        slot.log.clear();

        let mut thumbnail_url = None;
        match self.prepare(&req, &mut thumbnail_url).await {
            Ok((session, track)) => {
                slot.session = Some(session);
                LoadOutcome {
                    status: format!("✨ Chat ready! Subtitles used: {} ({}).", track.label, track.provenance),
                    thumbnail_url,
                    chat_visible: true,
                    log: ChatLog::default(),
                }
            }
            Err(e) => {
                warn!("Load failed for {:?}: {e}", req.url);
                LoadOutcome {
                    status: e.status(),
                    thumbnail_url,
                    chat_visible: false,
                    log: ChatLog::default(),
                }
            }
        }
    }

    async fn prepare(
        &self,
        req: &LoadRequest,
        thumbnail_url: &mut Option<String>,
    ) -> Result<(Box<dyn ChatSession>, SubtitleTrack), Error> {
        let api_key = self.config.api_key.as_deref().unwrap_or(req.api_key.as_str()).trim();
        if api_key.is_empty() {
            return Err(Error::MissingCredential);
        }
        if req.url.trim().is_empty() {
            return Err(Error::MissingVideo);
        }

        let video_id = extract_video_id(&req.url).ok_or(Error::InvalidVideo)?;
        info!("Loading video {video_id}");

        *thumbnail_url = self.thumbnails.thumbnail_url(&video_id).await;

        let tracks = list_tracks(self.transcripts.as_ref(), &video_id).await?;
        let track = tracks.select()?.clone();
        info!("Using subtitles {} ({})", track.label, track.provenance);

        let text = context::fetch_text(self.transcripts.as_ref(), &video_id, &track).await?;
        let session = context::start_session(self.chat.as_ref(), api_key, &self.config.model, &text).await?;

        Ok((session, track))
    }

    pub async fn ask(&self, slot: &mut UserSession, req: AskRequest) -> AskOutcome {
        context::ask(slot.session.as_mut(), &req.question, &mut slot.log).await;
        AskOutcome { log: slot.log.clone() }
    }
}

/// Style directive for the chat log's message text
pub fn font_css(size: u32) -> String {
    let size = clamp_font_size(size);
    let line_height = f64::from(size) * 1.3;
    format!(
        "#chatbox .message p {{\n    font-size: {size}px !important;\n    line-height: {line_height:.1}px !important;\n}}\n"
    )
}
