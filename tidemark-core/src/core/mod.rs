//! Internal domain modules for the Tidemark core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod agent;
pub mod error;
pub mod export;
pub mod note;
pub mod protocol;
pub mod relay;
pub mod session;
pub mod store;
pub mod video;

#[doc(inline)]
pub use agent::{AgentHandle, PageAgent, PlayerState, SimulatedPage, VideoSurface};
#[doc(inline)]
pub use error::{Result, TidemarkError};
#[doc(inline)]
pub use export::{
    export_filename, format_timestamp, render_markdown, sanitize_title, NoteExport,
};
#[doc(inline)]
pub use note::Note;
#[doc(inline)]
pub use protocol::{PageErrorKind, PageEvent, PageReply, PageRequest};
#[doc(inline)]
pub use relay::{Coordinator, RelayHandle, DEFAULT_REPLY_TIMEOUT};
#[doc(inline)]
pub use session::NoteSession;
#[doc(inline)]
pub use store::{storage_key, MemoryStore, NoteStore, SqliteStore};
#[doc(inline)]
pub use video::VideoContext;
