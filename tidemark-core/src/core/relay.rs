//! The coordinator: a single-hop relay between the session and the page.
//!
//! The relay owns the notion of "the focused page". Requests fail fast when
//! no page is focused and fail with a timeout when the focused page stops
//! answering, so a caller is never left hanging on a dead target.

use std::time::Duration;

use log::{debug, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use crate::core::agent::{AgentHandle, AgentMessage};
use crate::core::error::{Result, TidemarkError};
use crate::core::protocol::{PageEvent, PageReply, PageRequest};
use crate::core::video::VideoContext;

/// How long the relay waits for the page agent before giving up.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(3);

/// Capacity of the relay's inbox.
const INBOX_CAPACITY: usize = 16;

#[derive(Debug)]
enum RelayMessage {
    Forward {
        request: PageRequest,
        reply: oneshot::Sender<Result<PageReply>>,
    },
    Notify(PageEvent),
    SetActiveTarget(Option<AgentHandle>),
}

/// Long-lived relay task holding the focused page's agent handle.
pub struct Coordinator {
    rx: mpsc::Receiver<RelayMessage>,
    active: Option<AgentHandle>,
    reply_timeout: Duration,
}

impl Coordinator {
    /// Creates a coordinator with [`DEFAULT_REPLY_TIMEOUT`] plus the handle
    /// used to reach it.
    #[must_use]
    pub fn new() -> (Self, RelayHandle) {
        Self::with_reply_timeout(DEFAULT_REPLY_TIMEOUT)
    }

    /// Creates a coordinator that gives up on the page after `reply_timeout`.
    #[must_use]
    pub fn with_reply_timeout(reply_timeout: Duration) -> (Self, RelayHandle) {
        let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
        (
            Self {
                rx,
                active: None,
                reply_timeout,
            },
            RelayHandle { tx },
        )
    }

    /// Services relay messages until every handle is dropped.
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                RelayMessage::Forward { request, reply } => {
                    let result = self.forward(request).await;
                    let _ = reply.send(result);
                }
                RelayMessage::Notify(event) => self.notify(event),
                RelayMessage::SetActiveTarget(handle) => self.active = handle,
            }
        }
    }

    async fn forward(&self, request: PageRequest) -> Result<PageReply> {
        let agent = match &self.active {
            Some(a) => a.clone(),
            None => return Err(TidemarkError::NoActiveTarget),
        };

        let (tx, rx) = oneshot::channel();
        let exchange = async {
            agent
                .send(AgentMessage::Request { request, reply: tx })
                .await?;
            rx.await.map_err(|_| TidemarkError::TargetUnreachable)
        };

        match timeout(self.reply_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "page agent did not reply within {:?}",
                    self.reply_timeout
                );
                Err(TidemarkError::TargetUnreachable)
            }
        }
    }

    fn notify(&self, event: PageEvent) {
        match &self.active {
            Some(agent) => {
                if !agent.try_notify(event) {
                    debug!("dropped {event:?}: agent inbox full or closed");
                }
            }
            None => debug!("dropped {event:?}: no active target"),
        }
    }
}

/// Client side of the relay. Cheap to clone; every call goes through the
/// coordinator task.
#[derive(Debug, Clone)]
pub struct RelayHandle {
    tx: mpsc::Sender<RelayMessage>,
}

impl RelayHandle {
    /// Installs or clears the focused page's agent.
    ///
    /// # Errors
    ///
    /// Returns [`TidemarkError::TargetUnreachable`] if the coordinator task
    /// is gone.
    pub async fn set_active_target(&self, handle: Option<AgentHandle>) -> Result<()> {
        self.tx
            .send(RelayMessage::SetActiveTarget(handle))
            .await
            .map_err(|_| TidemarkError::TargetUnreachable)
    }

    /// Asks the focused page for a fresh video snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`TidemarkError::NoActiveTarget`] when no page is focused,
    /// [`TidemarkError::TargetUnreachable`] when the page does not reply in
    /// time, or the environment error the page itself reported.
    pub async fn video_info(&self) -> Result<VideoContext> {
        match self.forward(PageRequest::GetVideoInfo).await? {
            PageReply::VideoInfo(ctx) => Ok(ctx),
            PageReply::Error { error } => Err(error.into()),
            // The agent pairs one reply to one request, so a mismatched
            // kind means the channel is broken.
            PageReply::Seek { .. } => Err(TidemarkError::TargetUnreachable),
        }
    }

    /// Asks the focused page to seek. Resolves `true` when a player seeked,
    /// `false` when the page had no player.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RelayHandle::video_info`].
    pub async fn jump_to(&self, timestamp: u32) -> Result<bool> {
        match self
            .forward(PageRequest::JumpToTimestamp { timestamp })
            .await?
        {
            PageReply::Seek { success } => Ok(success),
            PageReply::Error { error } => Err(error.into()),
            PageReply::VideoInfo(_) => Err(TidemarkError::TargetUnreachable),
        }
    }

    /// Fire-and-forget note-added event. Never blocks and never fails; a
    /// full or closed relay simply drops the event.
    pub fn notify_note_added(&self) {
        if self
            .tx
            .try_send(RelayMessage::Notify(PageEvent::NoteAdded))
            .is_err()
        {
            debug!("dropped noteAdded: relay inbox full or closed");
        }
    }

    async fn forward(&self, request: PageRequest) -> Result<PageReply> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(RelayMessage::Forward { request, reply: tx })
            .await
            .map_err(|_| TidemarkError::TargetUnreachable)?;
        rx.await.map_err(|_| TidemarkError::TargetUnreachable)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent::{PageAgent, SimulatedPage};

    async fn wired_relay(page: &SimulatedPage) -> RelayHandle {
        let (agent, agent_handle) = PageAgent::new(Box::new(page.clone()));
        tokio::spawn(agent.run());

        let (coordinator, relay) = Coordinator::new();
        tokio::spawn(coordinator.run());
        relay.set_active_target(Some(agent_handle)).await.unwrap();
        relay
    }

    #[tokio::test]
    async fn test_forward_without_target_fails_immediately() {
        let (coordinator, relay) = Coordinator::new();
        tokio::spawn(coordinator.run());

        let result = relay.video_info().await;
        assert!(matches!(result, Err(TidemarkError::NoActiveTarget)));
    }

    #[tokio::test]
    async fn test_video_info_round_trip() {
        let page = SimulatedPage::with_video("abc123", "Rust Traits", 600.0);
        page.set_position(125.7);
        let relay = wired_relay(&page).await;

        let ctx = relay.video_info().await.unwrap();
        assert_eq!(ctx.video_id, "abc123");
        assert_eq!(ctx.video_title, "Rust Traits");
        assert_eq!(ctx.current_time, 125);
    }

    #[tokio::test]
    async fn test_page_error_passes_through() {
        let page = SimulatedPage::new();
        let relay = wired_relay(&page).await;

        let result = relay.video_info().await;
        assert!(matches!(result, Err(TidemarkError::NoVideoElement)));
    }

    #[tokio::test]
    async fn test_closed_agent_is_unreachable() {
        let (agent, agent_handle) = PageAgent::new(Box::new(SimulatedPage::new()));
        drop(agent);

        let (coordinator, relay) = Coordinator::new();
        tokio::spawn(coordinator.run());
        relay.set_active_target(Some(agent_handle)).await.unwrap();

        let result = relay.video_info().await;
        assert!(matches!(result, Err(TidemarkError::TargetUnreachable)));
    }

    #[tokio::test]
    async fn test_silent_agent_times_out() {
        // Created but never run, so requests buffer up unanswered.
        let (_agent, agent_handle) = PageAgent::new(Box::new(SimulatedPage::new()));

        let (coordinator, relay) =
            Coordinator::with_reply_timeout(Duration::from_millis(50));
        tokio::spawn(coordinator.run());
        relay.set_active_target(Some(agent_handle)).await.unwrap();

        let result = relay.video_info().await;
        assert!(matches!(result, Err(TidemarkError::TargetUnreachable)));
    }

    #[tokio::test]
    async fn test_jump_round_trip_moves_playhead() {
        let page = SimulatedPage::with_video("abc123", "Rust Traits", 600.0);
        let relay = wired_relay(&page).await;

        let seeked = relay.jump_to(90).await.unwrap();
        assert!(seeked);
        assert_eq!(page.position_secs(), 90.0);
        assert!(page.is_playing());
    }

    #[tokio::test]
    async fn test_notify_reaches_the_page() {
        let page = SimulatedPage::with_video("abc123", "Rust Traits", 600.0);
        let relay = wired_relay(&page).await;

        relay.notify_note_added();

        // A later request fences the earlier notify through both inboxes.
        relay.video_info().await.unwrap();
        assert_eq!(page.flash_count(), 1);
    }

    #[tokio::test]
    async fn test_switching_targets_switches_pages() {
        let page_a = SimulatedPage::with_video("aaa", "First", 100.0);
        let page_b = SimulatedPage::with_video("bbb", "Second", 100.0);
        let (agent_a, handle_a) = PageAgent::new(Box::new(page_a));
        let (agent_b, handle_b) = PageAgent::new(Box::new(page_b));
        tokio::spawn(agent_a.run());
        tokio::spawn(agent_b.run());

        let (coordinator, relay) = Coordinator::new();
        tokio::spawn(coordinator.run());

        relay.set_active_target(Some(handle_a)).await.unwrap();
        assert_eq!(relay.video_info().await.unwrap().video_id, "aaa");

        relay.set_active_target(Some(handle_b)).await.unwrap();
        assert_eq!(relay.video_info().await.unwrap().video_id, "bbb");

        relay.set_active_target(None).await.unwrap();
        assert!(matches!(
            relay.video_info().await,
            Err(TidemarkError::NoActiveTarget)
        ));
    }
}
