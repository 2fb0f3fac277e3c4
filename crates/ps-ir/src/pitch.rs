//! Fixed-point pitch scale used by the symbolic performance model.

use alloc::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::timestamp::Percentage;

/// Pitch in fixed-point units, `PITCH_LEVEL_STEP` units per semitone.
/// C in octave 0 is level 0.
pub type PitchLevel = i32;

/// Pitch-level units per semitone.
pub const PITCH_LEVEL_STEP: PitchLevel = 50;

/// Relative pitch over the duration of a note: percentage of duration ->
/// pitch offset. Keys are strictly increasing by construction.
pub type PitchCurve = BTreeMap<Percentage, PitchLevel>;

/// The twelve pitch classes of an octave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// Number of pitch classes in an octave.
    pub const COUNT: i32 = 12;
}

/// Pitch level of `class` in `octave`.
pub const fn pitch_level(class: PitchClass, octave: i32) -> PitchLevel {
    PITCH_LEVEL_STEP * PitchClass::COUNT * octave + PITCH_LEVEL_STEP * class as i32
}
