//! Symbolic performance events: the translator's input.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::articulation::ArticulationMeta;
use crate::dynamics::{DynamicLevelLayers, ExpressionCurve};
use crate::pitch::{PitchCurve, PitchLevel};
use crate::timestamp::{Duration, Timestamp};

/// Placement of a note in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrangementContext {
    pub actual_timestamp: Timestamp,
    pub actual_duration: Duration,
    /// The note begins inside this event (false for a tied continuation).
    #[serde(default = "default_true")]
    pub has_start: bool,
    /// The note ends inside this event (false when tied onward).
    #[serde(default = "default_true")]
    pub has_end: bool,
}

impl ArrangementContext {
    pub fn new(actual_timestamp: Timestamp, actual_duration: Duration) -> Self {
        Self {
            actual_timestamp,
            actual_duration,
            has_start: true,
            has_end: true,
        }
    }

    /// Timestamp at which the note stops sounding.
    pub fn end(&self) -> Timestamp {
        self.actual_timestamp + self.actual_duration
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchContext {
    pub nominal_pitch_level: PitchLevel,
    #[serde(default)]
    pub pitch_curve: PitchCurve,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionContext {
    #[serde(default)]
    pub articulations: Vec<ArticulationMeta>,
    #[serde(default)]
    pub expression_curve: ExpressionCurve,
    /// Explicit velocity in [0, 1], bypassing the expression curve.
    #[serde(default)]
    pub velocity_override: Option<f32>,
}

/// A single note with everything needed to play it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub arrangement: ArrangementContext,
    pub pitch: PitchContext,
    #[serde(default)]
    pub expression: ExpressionContext,
}

impl NoteEvent {
    /// A plain note with a flat expression curve and no articulations.
    pub fn new(
        timestamp: Timestamp,
        duration: Duration,
        nominal_pitch_level: PitchLevel,
        expression_curve: ExpressionCurve,
    ) -> Self {
        Self {
            arrangement: ArrangementContext::new(timestamp, duration),
            pitch: PitchContext {
                nominal_pitch_level,
                pitch_curve: PitchCurve::new(),
            },
            expression: ExpressionContext {
                expression_curve,
                ..ExpressionContext::default()
            },
        }
    }

    pub fn with_articulation(mut self, meta: ArticulationMeta) -> Self {
        self.expression.articulations.push(meta);
        self
    }

    pub fn with_pitch_curve(mut self, curve: PitchCurve) -> Self {
        self.pitch.pitch_curve = curve;
        self
    }

    pub fn with_velocity_override(mut self, velocity: f32) -> Self {
        self.expression.velocity_override = Some(velocity);
        self
    }
}

/// Which continuous controller a change addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerChangeKind {
    Modulation,
    SustainPedalOnOff,
    PitchBend,
    Undefined,
}

/// A standalone controller change. Its timestamp is the key of the
/// containing `PlaybackEventsMap` entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerChangeEvent {
    pub kind: ControllerChangeKind,
    pub value: f32,
}

/// Anything the score renderer can hand over for playback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    Note(NoteEvent),
    ControllerChange(ControllerChangeEvent),
}

/// Input timeline: timestamp -> events starting there.
pub type PlaybackEventsMap = BTreeMap<Timestamp, Vec<PlaybackEvent>>;

/// The origin performance description a session plays from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackData {
    #[serde(default)]
    pub origin_events: PlaybackEventsMap,
    #[serde(default)]
    pub dynamics: DynamicLevelLayers,
}
