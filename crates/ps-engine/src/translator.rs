//! Performance events to plugin events.
//!
//! Walks a performance timeline and writes note, pedal, pitch-bend and
//! controller events into an [`EventTimeline`].

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use ps_ir::{
    ArticulationMeta, ArticulationType, ControlIdx, ControllerChangeEvent, ControllerChangeKind,
    DynamicLevelLayers, NoteEvent, OutputEvent, ParamId, PlaybackEvent, PlaybackEventsMap,
    PluginParamValue, Timestamp, TimestampAndDuration,
};

use crate::expression::expression_level;
use crate::note::note_data;
use crate::pitch_bend::pitch_curve_points;
use crate::sostenuto::{resolve_sostenuto, PEDAL_OFF, PEDAL_ON};
use crate::timeline::EventTimeline;

/// Logical control -> plugin parameter. Controls without an entry are
/// not automatable on the plugin and are skipped.
pub type ParamsMapping = BTreeMap<ControlIdx, ParamId>;

/// Sostenuto is pressed this fraction into the note so the pedal catches
/// a note that is already sounding.
const SOSTENUTO_OFFSET_DIVISOR: i64 = 10;

/// Stateless translation pass over one batch of performance events.
#[derive(Clone, Copy, Debug)]
pub struct Translator<'a> {
    mapping: &'a ParamsMapping,
}

impl<'a> Translator<'a> {
    pub fn new(mapping: &'a ParamsMapping) -> Self {
        Self { mapping }
    }

    /// Translate every note and controller change in `events` into
    /// `destination`. Sostenuto gestures are resolved once the whole batch
    /// has been seen.
    pub fn add_playback_events(&self, destination: &mut EventTimeline, events: &PlaybackEventsMap) {
        let mut sostenuto = Vec::new();

        for (&timestamp, batch) in events {
            for event in batch {
                match event {
                    PlaybackEvent::Note(note) => self.add_note_event(destination, note, &mut sostenuto),
                    PlaybackEvent::ControllerChange(change) => {
                        self.add_control_change_event(destination, timestamp, change)
                    }
                }
            }
        }

        self.add_sostenuto_events(destination, &sostenuto);
    }

    /// Add one expression event per dynamic change.
    ///
    /// When several layers change at the same timestamp, the highest layer's
    /// level is the only one added. Expression events already in
    /// `destination` are left alone.
    pub fn add_dynamic_events(&self, destination: &mut EventTimeline, layers: &DynamicLevelLayers) {
        let mut levels = BTreeMap::new();
        for dynamics in layers.values() {
            levels.extend(dynamics.iter().map(|(&timestamp, &level)| (timestamp, level)));
        }

        for (timestamp, level) in levels {
            destination.insert(timestamp, OutputEvent::Expression(expression_level(level)));
        }
    }

    fn add_note_event(
        &self,
        destination: &mut EventTimeline,
        note: &NoteEvent,
        sostenuto: &mut Vec<TimestampAndDuration>,
    ) {
        let arrangement = &note.arrangement;
        let data = note_data(note);

        if arrangement.has_start {
            destination.insert(arrangement.actual_timestamp, OutputEvent::NoteOn(data));
        }

        if arrangement.has_end {
            destination.insert(arrangement.end(), OutputEvent::NoteOff(data));
        }

        for meta in &note.expression.articulations {
            match meta.kind {
                ArticulationType::Multibend => self.add_pitch_curve(destination, note, meta),
                ArticulationType::Pedal | ArticulationType::LetRing => {
                    self.add_param_change(destination, meta.timestamp, ControlIdx::SUSTAIN, PEDAL_ON);
                    self.add_param_change(destination, meta.end(), ControlIdx::SUSTAIN, PEDAL_OFF);
                }
                ArticulationType::LaissezVibrer => {
                    let timestamp = arrangement.actual_timestamp
                        + arrangement.actual_duration / SOSTENUTO_OFFSET_DIVISOR;
                    sostenuto.push(TimestampAndDuration::new(timestamp, meta.overall_duration));
                }
                _ => {}
            }
        }
    }

    fn add_control_change_event(
        &self,
        destination: &mut EventTimeline,
        timestamp: Timestamp,
        change: &ControllerChangeEvent,
    ) {
        let control = match change.kind {
            ControllerChangeKind::Modulation => ControlIdx::MOD_WHEEL,
            ControllerChangeKind::SustainPedalOnOff => ControlIdx::SUSTAIN,
            ControllerChangeKind::PitchBend => ControlIdx::PITCH_BEND,
            ControllerChangeKind::Undefined => {
                log::trace!("ignoring undefined controller change at {}", timestamp);
                return;
            }
        };

        self.add_param_change(destination, timestamp, control, change.value);
    }

    /// Insert a parameter change for `control` if the plugin maps it.
    /// Returns false when the control is unmapped.
    pub fn add_param_change(
        &self,
        destination: &mut EventTimeline,
        timestamp: Timestamp,
        control: ControlIdx,
        value: PluginParamValue,
    ) -> bool {
        let Some(&param_id) = self.mapping.get(&control) else {
            log::trace!("control {} is not mapped, dropping change at {}", control.0, timestamp);
            return false;
        };

        destination.insert(
            timestamp,
            OutputEvent::ParamChange {
                param_id,
                value: value.clamp(0.0, 1.0),
            },
        );
        true
    }

    fn add_pitch_curve(&self, destination: &mut EventTimeline, note: &NoteEvent, meta: &ArticulationMeta) {
        let Some(&param_id) = self.mapping.get(&ControlIdx::PITCH_BEND) else {
            return;
        };

        for (timestamp, value) in pitch_curve_points(note, meta) {
            destination.insert(timestamp, OutputEvent::ParamChange { param_id, value });
        }
    }

    fn add_sostenuto_events(&self, destination: &mut EventTimeline, gestures: &[TimestampAndDuration]) {
        for (timestamp, value) in resolve_sostenuto(gestures) {
            self.add_param_change(destination, timestamp, ControlIdx::SOSTENUTO, value);
        }
    }
}
