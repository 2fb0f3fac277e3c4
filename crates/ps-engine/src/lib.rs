//! Translation engine for perfseq.
//!
//! Turns a symbolic performance timeline into the discrete events a native
//! sound plugin consumes: note-on/off, pedal and pitch-bend parameter
//! changes, and expression levels.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod expression;
pub mod note;
pub mod pitch_bend;
mod sequencer;
pub mod sostenuto;
mod timeline;
mod translator;

pub use expression::expression_level;
pub use note::{note_index, note_tuning, note_velocity_fraction};
pub use pitch_bend::{pitch_bend_level, pitch_curve_points};
pub use sequencer::{FlushCallback, Sequencer, NEUTRAL_GAIN};
pub use sostenuto::resolve_sostenuto;
pub use timeline::{EventSet, EventTimeline};
pub use translator::{ParamsMapping, Translator};
