//! Core IR types for the perfseq translator.
//!
//! This crate defines both sides of the translation: the symbolic
//! performance description produced by the score renderer, and the
//! discrete plugin events consumed by a native plugin dispatcher.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod articulation;
mod dynamics;
mod event;
mod interpolation;
mod performance;
mod pitch;
mod timestamp;

pub use articulation::{ArticulationMeta, ArticulationType};
pub use dynamics::{
    dynamic_level_from_type, DynamicLevel, DynamicLevelLayers, DynamicLevelMap, DynamicType,
    ExpressionCurve, LayerIdx, DYNAMIC_LEVEL_STEP,
};
pub use event::{ControlIdx, NoteData, OutputEvent, ParamId, PluginParamValue};
pub use interpolation::{quadratic_bezier_curve, Point};
pub use performance::{
    ArrangementContext, ControllerChangeEvent, ControllerChangeKind, ExpressionContext,
    NoteEvent, PitchContext, PlaybackData, PlaybackEvent, PlaybackEventsMap,
};
pub use pitch::{pitch_level, PitchClass, PitchCurve, PitchLevel, PITCH_LEVEL_STEP};
pub use timestamp::{
    percentage_to_factor, Duration, Percentage, Timestamp, TimestampAndDuration,
    HUNDRED_PERCENT, ONE_PERCENT,
};
