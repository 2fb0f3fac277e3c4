//! Pitch quantization and note velocity.

use ps_ir::{pitch_level, NoteData, NoteEvent, PitchClass, PitchLevel, PITCH_LEVEL_STEP};

use crate::expression::expression_level;

/// Lowest pitch with its own note number (C0).
pub const MIN_SUPPORTED_PITCH_LEVEL: PitchLevel = pitch_level(PitchClass::C, 0);
/// Note number of C0.
pub const MIN_SUPPORTED_NOTE: u8 = 12;
/// Highest pitch with its own note number (C8).
pub const MAX_SUPPORTED_PITCH_LEVEL: PitchLevel = pitch_level(PitchClass::C, 8);
/// Note number of C8.
pub const MAX_SUPPORTED_NOTE: u8 = 108;

const CENTS_PER_SEMITONE: f32 = 100.0;

/// Quantize a pitch level to a note number in 12..=108.
pub fn note_index(pitch: PitchLevel) -> u8 {
    if pitch <= MIN_SUPPORTED_PITCH_LEVEL {
        return MIN_SUPPORTED_NOTE;
    }

    if pitch >= MAX_SUPPORTED_PITCH_LEVEL {
        return MAX_SUPPORTED_NOTE;
    }

    let steps = (pitch - MIN_SUPPORTED_PITCH_LEVEL) as f32 / PITCH_LEVEL_STEP as f32;
    MIN_SUPPORTED_NOTE + steps as u8
}

/// Cents between `note` and the (clamped) pitch it was quantized from.
pub fn note_tuning(pitch: PitchLevel, note: u8) -> f32 {
    let pitch = pitch.clamp(MIN_SUPPORTED_PITCH_LEVEL, MAX_SUPPORTED_PITCH_LEVEL);
    let semitones = note as PitchLevel - MIN_SUPPORTED_NOTE as PitchLevel;
    let residual = pitch - MIN_SUPPORTED_PITCH_LEVEL - semitones * PITCH_LEVEL_STEP;

    residual as f32 / PITCH_LEVEL_STEP as f32 * CENTS_PER_SEMITONE
}

/// Velocity in [0, 1]: the explicit override if present, otherwise the
/// loudest point of the note's expression curve.
pub fn note_velocity_fraction(note: &NoteEvent) -> f32 {
    let expression = &note.expression;

    if let Some(velocity) = expression.velocity_override {
        return velocity.clamp(0.0, 1.0);
    }

    expression_level(expression.expression_curve.max_amplitude_level())
}

/// Note payload for both the note-on and the note-off of `note`.
pub fn note_data(note: &NoteEvent) -> NoteData {
    let pitch = note.pitch.nominal_pitch_level;
    let index = note_index(pitch);

    NoteData {
        channel: 0,
        note: index,
        tuning: note_tuning(pitch, index),
        velocity: note_velocity_fraction(note),
    }
}
