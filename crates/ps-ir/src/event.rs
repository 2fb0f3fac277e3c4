//! Plugin events: the translator's output.

use core::cmp::Ordering;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Logical control index (mod wheel, sustain, ...), independent of any plugin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlIdx(pub u16);

impl ControlIdx {
    pub const MOD_WHEEL: ControlIdx = ControlIdx(1);
    pub const SUSTAIN: ControlIdx = ControlIdx(64);
    pub const SOSTENUTO: ControlIdx = ControlIdx(66);
    pub const PITCH_BEND: ControlIdx = ControlIdx(129);
}

/// Plugin-side automatable parameter id.
pub type ParamId = u32;

/// Normalized parameter value in [0, 1].
pub type PluginParamValue = f32;

/// Note payload shared by note-on and note-off.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NoteData {
    pub channel: u8,
    /// Note number, always in 12..=108.
    pub note: u8,
    /// Microtonal correction in cents.
    pub tuning: f32,
    /// Velocity in [0, 1].
    pub velocity: f32,
}

impl NoteData {
    fn cmp_fields(&self, other: &Self) -> Ordering {
        self.channel
            .cmp(&other.channel)
            .then(self.note.cmp(&other.note))
            .then(self.tuning.total_cmp(&other.tuning))
            .then(self.velocity.total_cmp(&other.velocity))
    }
}

/// An event for the plugin's event queue.
///
/// Events are totally ordered over their kind and every field, so a set
/// of events holds at most one copy of each.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum OutputEvent {
    NoteOn(NoteData),
    NoteOff(NoteData),
    ParamChange {
        param_id: ParamId,
        value: PluginParamValue,
    },
    /// Overall expression (gain) level in [0, 1].
    Expression(f32),
}

impl OutputEvent {
    fn rank(&self) -> u8 {
        match self {
            OutputEvent::NoteOff(_) => 0,
            OutputEvent::NoteOn(_) => 1,
            OutputEvent::ParamChange { .. } => 2,
            OutputEvent::Expression(_) => 3,
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, OutputEvent::Expression(_))
    }
}

impl Ord for OutputEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (OutputEvent::NoteOn(a), OutputEvent::NoteOn(b))
            | (OutputEvent::NoteOff(a), OutputEvent::NoteOff(b)) => a.cmp_fields(b),
            (
                OutputEvent::ParamChange { param_id: a, value: va },
                OutputEvent::ParamChange { param_id: b, value: vb },
            ) => a.cmp(b).then(va.total_cmp(vb)),
            (OutputEvent::Expression(a), OutputEvent::Expression(b)) => a.total_cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for OutputEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OutputEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OutputEvent {}

impl fmt::Display for OutputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputEvent::NoteOn(n) => write!(
                f,
                "note-on  ch {} note {} tuning {:+.1}c velocity {:.2}",
                n.channel, n.note, n.tuning, n.velocity
            ),
            OutputEvent::NoteOff(n) => write!(
                f,
                "note-off ch {} note {} tuning {:+.1}c velocity {:.2}",
                n.channel, n.note, n.tuning, n.velocity
            ),
            OutputEvent::ParamChange { param_id, value } => {
                write!(f, "param    {} = {:.4}", param_id, value)
            }
            OutputEvent::Expression(level) => write!(f, "expr     {:.2}", level),
        }
    }
}
