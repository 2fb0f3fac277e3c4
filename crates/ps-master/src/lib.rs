//! Headless playback session for perfseq.
//!
//! Splits the sequencer into a builder side ([`PlaybackSession`], driven by
//! the edit/control thread) and a render side ([`StreamReader`], driven by
//! the audio thread). Built timelines are published as immutable snapshots,
//! so the reader never waits on a rebuild.

mod config;
mod reader;
mod session;

pub use config::{load_playback_data, playback_data_from_ron_str, ConfigError, SequencerConfig};
pub use reader::{StreamEvent, StreamReader};
pub use session::{open_session, PlaybackSession};

// Re-export common types so callers don't need ps-ir/ps-engine directly.
pub use ps_engine::{EventTimeline, ParamsMapping};
pub use ps_ir::{OutputEvent, PlaybackData, Timestamp};

/// Control messages from the builder to the render side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamNotice {
    /// The main stream was discarded; anything sounding from it is stale.
    MainStreamFlushed,
}
