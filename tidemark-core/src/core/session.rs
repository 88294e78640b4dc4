//! The note session: owns one video's collection and every operation on it.

use chrono::Utc;
use log::debug;

use crate::core::error::{Result, TidemarkError};
use crate::core::export::{export_filename, render_markdown, NoteExport};
use crate::core::note::Note;
use crate::core::relay::RelayHandle;
use crate::core::store::{storage_key, NoteStore};
use crate::core::video::VideoContext;

/// One user-facing note-taking session.
///
/// Owns the in-memory collection for the active video, persists every
/// mutation whole through the injected [`NoteStore`], and reaches the page
/// through the relay. With no active video context the session is disabled:
/// mutating operations, export, and jumps are rejected with
/// [`TidemarkError::NoActiveVideo`].
pub struct NoteSession {
    store: Box<dyn NoteStore>,
    relay: RelayHandle,
    video: Option<VideoContext>,
    notes: Vec<Note>,
}

impl NoteSession {
    /// Creates a session over `store`, talking to the page through `relay`.
    #[must_use]
    pub fn new(store: Box<dyn NoteStore>, relay: RelayHandle) -> Self {
        Self {
            store,
            relay,
            video: None,
            notes: Vec::new(),
        }
    }

    /// Startup sequence: refresh the video context, then load its collection.
    ///
    /// # Errors
    ///
    /// Propagates the refresh or load failure. On failure the session stays
    /// disabled with an empty collection.
    pub async fn open(&mut self) -> Result<()> {
        self.refresh_video_context().await?;
        self.load_notes()
    }

    /// Fetches a fresh video context from the page and stores it.
    ///
    /// On failure the stored context is cleared and the session becomes
    /// disabled until a later refresh succeeds.
    ///
    /// # Errors
    ///
    /// Returns whatever the relay reported: [`TidemarkError::NoActiveTarget`],
    /// [`TidemarkError::TargetUnreachable`], or an environment error from the
    /// page itself.
    pub async fn refresh_video_context(&mut self) -> Result<VideoContext> {
        match self.relay.video_info().await {
            Ok(ctx) => {
                self.video = Some(ctx.clone());
                Ok(ctx)
            }
            Err(e) => {
                self.video = None;
                Err(e)
            }
        }
    }

    /// Loads the collection stored under the active video's key.
    ///
    /// A missing key yields an empty collection, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`TidemarkError::NoActiveVideo`] when disabled,
    /// [`TidemarkError::Storage`] if the backend fails, or
    /// [`TidemarkError::Payload`] if the stored value does not parse.
    pub fn load_notes(&mut self) -> Result<()> {
        let video = self.require_video()?;
        let key = storage_key(&video.video_id);

        self.notes = match self.store.read(&key)? {
            Some(payload) => serde_json::from_str(&payload)?,
            None => Vec::new(),
        };
        debug!("loaded {} notes under {key}", self.notes.len());
        Ok(())
    }

    /// Captures a note at the current playback position.
    ///
    /// The video context is refreshed first so the timestamp reflects where
    /// the player actually is, not where it was at the last poll. Content is
    /// trimmed; content that trims to nothing is a no-op returning
    /// `Ok(None)` with nothing written.
    ///
    /// # Errors
    ///
    /// Returns [`TidemarkError::NoActiveVideo`] when disabled, a relay error
    /// if the refresh fails, or a persistence error if the write fails. The
    /// in-memory collection is only extended once the write succeeded.
    pub async fn add_note(&mut self, content: &str, is_code: bool) -> Result<Option<Note>> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        self.require_video()?;

        // Fresh position, not the one captured at the last poll.
        let ctx = self.refresh_video_context().await?;

        let note = Note {
            id: self.next_note_id(),
            content: content.to_string(),
            timestamp: ctx.current_time,
            is_code,
            created_at: Utc::now(),
        };

        self.notes.push(note.clone());
        if let Err(e) = self.persist() {
            self.notes.pop();
            return Err(e);
        }

        self.relay.notify_note_added();
        Ok(Some(note))
    }

    /// Deletes the note with `id` and persists the shrunk collection.
    ///
    /// An absent id is a no-op: the collection and storage stay untouched
    /// and no write is performed.
    ///
    /// # Errors
    ///
    /// Returns [`TidemarkError::NoActiveVideo`] when disabled, or a
    /// persistence error if the write fails; the note is restored to its
    /// position in that case.
    pub fn delete_note(&mut self, id: i64) -> Result<()> {
        self.require_video()?;

        let index = match self.notes.iter().position(|n| n.id == id) {
            Some(i) => i,
            None => return Ok(()),
        };

        let removed = self.notes.remove(index);
        if let Err(e) = self.persist() {
            self.notes.insert(index, removed);
            return Err(e);
        }
        Ok(())
    }

    /// Empties the collection and persists an explicit empty array under the
    /// video's key. A no-op when the collection is already empty.
    ///
    /// Destructive and irreversible. Interactive surfaces are expected to
    /// confirm with the user before calling this.
    ///
    /// # Errors
    ///
    /// Returns [`TidemarkError::NoActiveVideo`] when disabled, or a
    /// persistence error if the write fails; the collection is restored in
    /// that case.
    pub fn clear_all(&mut self) -> Result<()> {
        self.require_video()?;
        if self.notes.is_empty() {
            return Ok(());
        }

        let drained = std::mem::take(&mut self.notes);
        if let Err(e) = self.persist() {
            self.notes = drained;
            return Err(e);
        }
        Ok(())
    }

    /// Renders the collection as a markdown document plus its suggested
    /// filename. Returns `Ok(None)` when there is nothing to export.
    ///
    /// # Errors
    ///
    /// Returns [`TidemarkError::NoActiveVideo`] when disabled.
    pub fn export(&self) -> Result<Option<NoteExport>> {
        let video = self.require_video()?;
        if self.notes.is_empty() {
            return Ok(None);
        }

        Ok(Some(NoteExport {
            filename: export_filename(&video.video_title),
            markdown: render_markdown(&video.video_title, &self.notes),
        }))
    }

    /// Asks the page to jump to `timestamp`. Resolves `true` when a player
    /// performed the seek, `false` when the page had none.
    ///
    /// # Errors
    ///
    /// Returns [`TidemarkError::NoActiveVideo`] when disabled, or the relay's
    /// transport error.
    pub async fn jump_to(&self, timestamp: u32) -> Result<bool> {
        self.require_video()?;
        self.relay.jump_to(timestamp).await
    }

    /// Notes in insertion order.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Notes in display order: ascending timestamp, ties keep insertion
    /// order.
    #[must_use]
    pub fn sorted_notes(&self) -> Vec<Note> {
        let mut sorted = self.notes.clone();
        sorted.sort_by_key(|n| n.timestamp);
        sorted
    }

    /// The active video context, if any.
    #[must_use]
    pub fn video(&self) -> Option<&VideoContext> {
        self.video.as_ref()
    }

    #[must_use]
    pub fn has_active_video(&self) -> bool {
        self.video.is_some()
    }

    fn require_video(&self) -> Result<&VideoContext> {
        self.video.as_ref().ok_or(TidemarkError::NoActiveVideo)
    }

    // Ids must stay unique and creation-ordered even when two adds land in
    // the same millisecond. Loaded collections can carry arbitrary ids,
    // including i64::MAX; the increment saturates rather than overflows.
    fn next_note_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let last = self.notes.iter().map(|n| n.id).max().unwrap_or(0);
        now.max(last.saturating_add(1))
    }

    fn persist(&mut self) -> Result<()> {
        let video = match &self.video {
            Some(v) => v,
            None => return Err(TidemarkError::NoActiveVideo),
        };
        let key = storage_key(&video.video_id);
        let payload = serde_json::to_string(&self.notes)?;
        self.store.write(&key, &payload)
    }
}
