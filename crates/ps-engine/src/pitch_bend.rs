//! Pitch-curve sampling into pitch-bend parameter changes.

use alloc::vec::Vec;
use ps_ir::{
    percentage_to_factor, quadratic_bezier_curve, ArticulationMeta, NoteEvent, PitchLevel, Point,
    PluginParamValue, Timestamp, PITCH_LEVEL_STEP,
};

/// Semitones covered by each half of the bend range.
pub const SEMITONE_RANGE: f32 = 2.0;
const PITCH_BEND_SEMITONE_STEP: f32 = 0.5 / SEMITONE_RANGE;

/// Bend value meaning "no bend".
pub const PITCH_BEND_CENTER: PluginParamValue = 0.5;

/// Pitch-level change per sampled point. Larger values sample fewer points.
const POINT_WEIGHT: PitchLevel = PITCH_LEVEL_STEP / 5;

/// Widest relative pitch the bend range can express.
const MAX_BEND_PITCH: PitchLevel = SEMITONE_RANGE as PitchLevel * PITCH_LEVEL_STEP;

/// Normalized bend value for a relative pitch, centered at 0.5 and
/// clamped to [0, 1] (±2 semitones).
pub fn pitch_bend_level(pitch: PitchLevel) -> PluginParamValue {
    let steps = pitch as f32 / PITCH_LEVEL_STEP as f32;
    let offset = steps * PITCH_BEND_SEMITONE_STEP;

    (PITCH_BEND_CENTER + offset).clamp(0.0, 1.0)
}

/// Timestamp at which the bend described by `meta` must be released: the
/// end of the articulation or of the note, whichever comes first.
pub fn pitch_bend_end(note: &NoteEvent, meta: &ArticulationMeta) -> Timestamp {
    meta.end().min(note.arrangement.end())
}

/// Sample the note's pitch curve into `(timestamp, bend value)` pairs.
///
/// The first pair always re-centers the bend at [`pitch_bend_end`]. Each
/// pair of curve points is joined by a hold-then-glide quadratic Bézier;
/// samples at or after the release timestamp are dropped. Returns nothing
/// for an empty curve.
pub fn pitch_curve_points(note: &NoteEvent, meta: &ArticulationMeta) -> Vec<(Timestamp, PluginParamValue)> {
    let curve = &note.pitch.pitch_curve;
    if curve.is_empty() {
        return Vec::new();
    }

    let end = pitch_bend_end(note, meta);
    let mut points = Vec::new();
    points.push((end, PITCH_BEND_CENTER));

    let curve_time = |percentage| {
        meta.timestamp + (meta.overall_duration as f64 * percentage_to_factor(percentage)) as Timestamp
    };

    let pairs = curve.iter().zip(curve.iter().skip(1));
    for ((&curr_percentage, &curr_pitch), (&next_percentage, &next_pitch)) in pairs {
        let curr_value = pitch_bend_level(curr_pitch) as f64;
        let next_value = pitch_bend_level(next_pitch) as f64;

        let curr_time = curve_time(curr_percentage) as f64;
        let next_time = curve_time(next_percentage) as f64;

        let p0 = Point::new(curr_time, curr_value);
        let p1 = Point::new(next_time, curr_value);
        let p2 = Point::new(next_time, next_value);

        // Beyond the bend range the values saturate, so more samples add nothing.
        let interval = next_pitch.clamp(-MAX_BEND_PITCH, MAX_BEND_PITCH)
            - curr_pitch.clamp(-MAX_BEND_PITCH, MAX_BEND_PITCH);
        let point_count = (interval.unsigned_abs() / POINT_WEIGHT as u32).max(1);

        for point in quadratic_bezier_curve(p0, p1, p2, point_count as usize) {
            let time = libm::round(point.x) as Timestamp;
            if time < end {
                points.push((time, point.y as PluginParamValue));
            }
        }
    }

    points
}
