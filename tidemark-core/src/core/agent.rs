//! The page agent: a leaf task answering requests against the live page.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot};

use crate::core::error::{Result, TidemarkError};
use crate::core::protocol::{PageErrorKind, PageEvent, PageReply, PageRequest};
use crate::core::video::VideoContext;

/// Title reported when the page exposes none.
const FALLBACK_TITLE: &str = "Untitled Video";

/// Capacity of an agent's inbox.
const INBOX_CAPACITY: usize = 16;

/// Raw player readings, fractional seconds as the page reports them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub position_secs: f64,
    pub duration_secs: f64,
}

/// The live page as the agent sees it.
///
/// Implementations wrap whatever runtime hosts the player. Tests and
/// embedder test suites use [`SimulatedPage`].
pub trait VideoSurface: Send {
    /// Current player readings, or `None` when the page has no player.
    fn player_state(&self) -> Option<PlayerState>;

    /// Video identifier parsed from the page address, if it has one.
    fn video_id(&self) -> Option<String>;

    /// Page title, if the page exposes one.
    fn title(&self) -> Option<String>;

    /// Seeks to `secs` and resumes playback.
    fn seek(&mut self, secs: u32);

    /// Shows the transient saved-note acknowledgement.
    fn flash_note_saved(&mut self);
}

/// Envelope delivered to an agent's inbox.
#[derive(Debug)]
pub(crate) enum AgentMessage {
    /// A request that expects exactly one reply.
    Request {
        request: PageRequest,
        reply: oneshot::Sender<PageReply>,
    },
    /// A best-effort event with no reply.
    Notify(PageEvent),
}

/// Client handle to one page agent's inbox.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    tx: mpsc::Sender<AgentMessage>,
}

impl AgentHandle {
    /// Delivers an envelope to the inbox. A closed inbox means the agent's
    /// page is gone.
    pub(crate) async fn send(&self, msg: AgentMessage) -> Result<()> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| TidemarkError::TargetUnreachable)
    }

    pub(crate) fn try_notify(&self, event: PageEvent) -> bool {
        self.tx.try_send(AgentMessage::Notify(event)).is_ok()
    }
}

/// Leaf task that services one page's inbox against its [`VideoSurface`].
pub struct PageAgent {
    surface: Box<dyn VideoSurface>,
    rx: mpsc::Receiver<AgentMessage>,
}

impl PageAgent {
    /// Creates an agent for `surface` plus the handle used to reach it.
    #[must_use]
    pub fn new(surface: Box<dyn VideoSurface>) -> (Self, AgentHandle) {
        let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
        (Self { surface, rx }, AgentHandle { tx })
    }

    /// Services the inbox until every handle is dropped.
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                AgentMessage::Request { request, reply } => {
                    // A dropped receiver means the relay gave up waiting.
                    let _ = reply.send(self.handle(request));
                }
                AgentMessage::Notify(PageEvent::NoteAdded) => {
                    self.surface.flash_note_saved();
                }
            }
        }
    }

    fn handle(&mut self, request: PageRequest) -> PageReply {
        match request {
            PageRequest::GetVideoInfo => self.video_info(),
            PageRequest::JumpToTimestamp { timestamp } => {
                if self.surface.player_state().is_some() {
                    self.surface.seek(timestamp);
                    PageReply::Seek { success: true }
                } else {
                    PageReply::Seek { success: false }
                }
            }
        }
    }

    fn video_info(&self) -> PageReply {
        let player = match self.surface.player_state() {
            Some(p) => p,
            None => {
                return PageReply::Error {
                    error: PageErrorKind::NoVideoElement,
                }
            }
        };

        let video_id = match self.surface.video_id() {
            Some(id) => id,
            None => {
                return PageReply::Error {
                    error: PageErrorKind::NotAVideoPage,
                }
            }
        };

        PageReply::VideoInfo(VideoContext {
            video_id,
            video_title: self
                .surface
                .title()
                .unwrap_or_else(|| FALLBACK_TITLE.to_string()),
            current_time: player.position_secs.max(0.0) as u32,
            duration: player.duration_secs.max(0.0) as u32,
        })
    }
}

/// In-memory [`VideoSurface`] for tests.
///
/// Clones share state, so a test can keep a handle while the agent owns
/// another and observe seeks and acknowledgements.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPage {
    inner: Arc<Mutex<PageInner>>,
}

#[derive(Debug, Default)]
struct PageInner {
    video_id: Option<String>,
    title: Option<String>,
    player: Option<PlayerState>,
    playing: bool,
    flash_count: usize,
}

impl SimulatedPage {
    /// A page with no player at all.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A page showing a playable video with the given id and title.
    #[must_use]
    pub fn with_video(video_id: &str, title: &str, duration_secs: f64) -> Self {
        let page = Self::new();
        {
            let mut inner = page.locked();
            inner.video_id = Some(video_id.to_string());
            inner.title = Some(title.to_string());
            inner.player = Some(PlayerState {
                position_secs: 0.0,
                duration_secs,
            });
        }
        page
    }

    /// A page with a player but no parseable video id.
    #[must_use]
    pub fn with_unidentified_player(duration_secs: f64) -> Self {
        let page = Self::new();
        page.locked().player = Some(PlayerState {
            position_secs: 0.0,
            duration_secs,
        });
        page
    }

    /// Drops the page title so the placeholder path can be exercised.
    pub fn clear_title(&self) {
        self.locked().title = None;
    }

    /// Moves the playhead without changing the playing state.
    pub fn set_position(&self, secs: f64) {
        let mut inner = self.locked();
        if let Some(player) = inner.player.as_mut() {
            player.position_secs = secs;
        }
    }

    #[must_use]
    pub fn position_secs(&self) -> f64 {
        self.locked().player.map(|p| p.position_secs).unwrap_or(0.0)
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.locked().playing
    }

    /// How many saved-note acknowledgements the page has shown.
    #[must_use]
    pub fn flash_count(&self) -> usize {
        self.locked().flash_count
    }

    // A poisoned lock only means another holder panicked; the page state
    // is still usable.
    fn locked(&self) -> MutexGuard<'_, PageInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl VideoSurface for SimulatedPage {
    fn player_state(&self) -> Option<PlayerState> {
        self.locked().player
    }

    fn video_id(&self) -> Option<String> {
        self.locked().video_id.clone()
    }

    fn title(&self) -> Option<String> {
        self.locked().title.clone()
    }

    fn seek(&mut self, secs: u32) {
        let mut inner = self.locked();
        if let Some(player) = inner.player.as_mut() {
            player.position_secs = f64::from(secs);
            inner.playing = true;
        }
    }

    fn flash_note_saved(&mut self) {
        self.locked().flash_count += 1;
    }
}
