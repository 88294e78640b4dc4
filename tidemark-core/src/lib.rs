//! Core library for Tidemark — timestamped notes for the video you are watching.
//!
//! The primary entry point is [`NoteSession`], which owns one video's note
//! collection and every operation on it: capture, delete, clear, jump, and
//! markdown export. The session reaches the live page through a
//! [`Coordinator`] relay and persists through any [`NoteStore`]
//! implementation; SQLite and in-memory stores are bundled.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    agent::{AgentHandle, PageAgent, PlayerState, SimulatedPage, VideoSurface},
    error::{Result, TidemarkError},
    export::{export_filename, format_timestamp, render_markdown, sanitize_title, NoteExport},
    note::Note,
    protocol::{PageErrorKind, PageEvent, PageReply, PageRequest},
    relay::{Coordinator, RelayHandle, DEFAULT_REPLY_TIMEOUT},
    session::NoteSession,
    store::{storage_key, MemoryStore, NoteStore, SqliteStore},
    video::VideoContext,
};
