//! Main/off stream management.
//!
//! The [`Sequencer`] owns two timelines. The main stream mirrors the
//! current performance description and is rebuilt wholesale whenever it
//! changes; the off stream only ever grows and carries material scheduled
//! ahead of or beside playback. Both are read through timestamp cursors.

use alloc::boxed::Box;
use ps_ir::{
    dynamic_level_from_type, DynamicLevel, DynamicLevelLayers, DynamicType, OutputEvent,
    PlaybackData, PlaybackEventsMap, Timestamp,
};

use crate::expression::expression_level;
use crate::timeline::EventTimeline;
use crate::translator::{ParamsMapping, Translator};

/// Gain reported when dynamics do not drive expression.
pub const NEUTRAL_GAIN: f32 = 0.5;

/// Called right before the main stream is cleared for a rebuild.
pub type FlushCallback = Box<dyn FnMut() + Send>;

/// Builds and serves the plugin event streams for one playback session.
pub struct Sequencer {
    mapping: ParamsMapping,
    use_dynamic_events: bool,
    inited: bool,
    playback_data: PlaybackData,
    main_stream: EventTimeline,
    off_stream: EventTimeline,
    playback_position: Timestamp,
    on_main_stream_flushed: Option<FlushCallback>,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            mapping: ParamsMapping::new(),
            use_dynamic_events: false,
            inited: false,
            playback_data: PlaybackData::default(),
            main_stream: EventTimeline::new(),
            off_stream: EventTimeline::new(),
            playback_position: 0,
            on_main_stream_flushed: None,
        }
    }

    /// Register the single subscriber notified before each main-stream flush.
    pub fn set_on_main_stream_flushed<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_main_stream_flushed = Some(Box::new(callback));
    }

    /// Store the configuration and build the main stream from the origin
    /// performance data known so far.
    pub fn init(&mut self, mapping: ParamsMapping, use_dynamic_events: bool) {
        self.mapping = mapping;
        self.use_dynamic_events = use_dynamic_events;
        self.inited = true;

        log::debug!(
            "sequencer initialised with {} mapped controls, dynamics {}",
            self.mapping.len(),
            if use_dynamic_events { "on" } else { "off" }
        );

        self.rebuild_from_origin();
    }

    /// Replace the origin performance data. Rebuilds the main stream once
    /// the sequencer is initialised.
    pub fn load(&mut self, data: PlaybackData) {
        self.playback_data = data;
        self.rebuild_from_origin();
    }

    fn rebuild_from_origin(&mut self) {
        if !self.inited {
            return;
        }

        let data = core::mem::take(&mut self.playback_data);
        self.rebuild_main_stream(&data.origin_events, &data.dynamics);
        self.playback_data = data;
    }

    /// Rebuild the main stream from scratch. Does nothing before `init`.
    ///
    /// `dynamics` also become the dynamics [`current_gain`](Self::current_gain)
    /// reads from.
    pub fn update_main_stream_events(&mut self, events: &PlaybackEventsMap, dynamics: &DynamicLevelLayers) {
        if !self.inited {
            return;
        }

        self.playback_data.dynamics = dynamics.clone();
        self.rebuild_main_stream(events, dynamics);
    }

    fn rebuild_main_stream(&mut self, events: &PlaybackEventsMap, dynamics: &DynamicLevelLayers) {
        self.main_stream.clear();

        if let Some(callback) = self.on_main_stream_flushed.as_mut() {
            callback();
        }

        let translator = Translator::new(&self.mapping);
        translator.add_playback_events(&mut self.main_stream, events);

        if self.use_dynamic_events {
            translator.add_dynamic_events(&mut self.main_stream, dynamics);
        }

        self.main_stream.seek(self.playback_position);

        log::debug!(
            "main stream rebuilt: {} events at {} timestamps",
            self.main_stream.len(),
            self.main_stream.timestamps().count()
        );
    }

    /// Append to the off stream without disturbing anything already in it.
    /// Does nothing before `init`.
    pub fn update_off_stream_events(&mut self, events: &PlaybackEventsMap, dynamics: &DynamicLevelLayers) {
        if !self.inited {
            return;
        }

        let translator = Translator::new(&self.mapping);
        translator.add_playback_events(&mut self.off_stream, events);

        if self.use_dynamic_events {
            translator.add_dynamic_events(&mut self.off_stream, dynamics);
        }

        self.off_stream.seek(self.playback_position);

        log::debug!("off stream now holds {} events", self.off_stream.len());
    }

    /// Gain at the current playback position.
    pub fn current_gain(&self) -> f32 {
        if !self.use_dynamic_events {
            return NEUTRAL_GAIN;
        }

        expression_level(self.dynamic_level(self.playback_position))
    }

    /// Dynamic level in effect at `timestamp`: the latest change at or
    /// before it, preferring the highest layer on ties. Falls back to the
    /// natural level.
    pub fn dynamic_level(&self, timestamp: Timestamp) -> DynamicLevel {
        let mut current: Option<(Timestamp, DynamicLevel)> = None;

        for dynamics in self.playback_data.dynamics.values() {
            if let Some((&at, &level)) = dynamics.range(..=timestamp).next_back() {
                if current.map_or(true, |(best, _)| at >= best) {
                    current = Some((at, level));
                }
            }
        }

        current
            .map(|(_, level)| level)
            .unwrap_or(dynamic_level_from_type(DynamicType::NATURAL))
    }

    /// Move playback to `position`; both cursors continue from there.
    pub fn set_playback_position(&mut self, position: Timestamp) {
        self.playback_position = position;
        self.main_stream.seek(position);
        self.off_stream.seek(position);
    }

    pub fn playback_position(&self) -> Timestamp {
        self.playback_position
    }

    /// Deliver every pending event of both streams up to `until`
    /// (inclusive) in timestamp order, main stream first within a
    /// timestamp, and advance playback past it. Returns the number of
    /// events delivered.
    pub fn events_to_be_played<F>(&mut self, until: Timestamp, mut f: F) -> usize
    where
        F: FnMut(Timestamp, &OutputEvent),
    {
        let mut delivered = 0;

        loop {
            let next = match (self.main_stream.next_timestamp(until), self.off_stream.next_timestamp(until)) {
                (Some(main), Some(off)) => main.min(off),
                (Some(main), None) => main,
                (None, Some(off)) => off,
                (None, None) => break,
            };

            delivered += self.main_stream.drain_until(next, &mut f);
            delivered += self.off_stream.drain_until(next, &mut f);

            // The cursors saturate at the end of time.
            if next >= until {
                break;
            }
        }

        if until >= self.playback_position {
            self.playback_position = until.saturating_add(1);
            self.main_stream.seek(self.playback_position);
            self.off_stream.seek(self.playback_position);
        }

        delivered
    }

    pub fn main_stream(&self) -> &EventTimeline {
        &self.main_stream
    }

    pub fn off_stream(&self) -> &EventTimeline {
        &self.off_stream
    }

    pub fn mapping(&self) -> &ParamsMapping {
        &self.mapping
    }

    pub fn playback_data(&self) -> &PlaybackData {
        &self.playback_data
    }

    pub fn is_inited(&self) -> bool {
        self.inited
    }

    pub fn use_dynamic_events(&self) -> bool {
        self.use_dynamic_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ps_ir::{
        ArticulationMeta, ArticulationType, ControlIdx, ControllerChangeEvent, ControllerChangeKind,
        ExpressionCurve, NoteEvent, PlaybackEvent,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::vec::Vec;

    fn mapping() -> ParamsMapping {
        let mut mapping = ParamsMapping::new();
        mapping.insert(ControlIdx::SUSTAIN, 64);
        mapping
    }

    fn note_events(spans: &[(Timestamp, i64)]) -> PlaybackEventsMap {
        let mut events = PlaybackEventsMap::new();
        for &(timestamp, duration) in spans {
            let note = NoteEvent::new(timestamp, duration, 3000, ExpressionCurve::flat(5000));
            events.entry(timestamp).or_default().push(PlaybackEvent::Note(note));
        }
        events
    }

    fn dynamics(changes: &[(Timestamp, DynamicType)]) -> DynamicLevelLayers {
        let mut layers = DynamicLevelLayers::new();
        let layer = layers.entry(0).or_default();
        for &(timestamp, dynamic) in changes {
            layer.insert(timestamp, dynamic_level_from_type(dynamic));
        }
        layers
    }

    fn flush_counter(sequencer: &mut Sequencer) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let hook = count.clone();
        sequencer.set_on_main_stream_flushed(move || {
            hook.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn updates_before_init_are_ignored() {
        let mut sequencer = Sequencer::new();
        let flushes = flush_counter(&mut sequencer);

        sequencer.update_main_stream_events(&note_events(&[(0, 100)]), &DynamicLevelLayers::new());
        sequencer.update_off_stream_events(&note_events(&[(0, 100)]), &DynamicLevelLayers::new());

        assert!(sequencer.main_stream().is_empty());
        assert!(sequencer.off_stream().is_empty());
        assert_eq!(flushes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn init_builds_from_loaded_data() {
        let mut sequencer = Sequencer::new();
        sequencer.load(PlaybackData {
            origin_events: note_events(&[(0, 100), (200, 100)]),
            dynamics: DynamicLevelLayers::new(),
        });
        assert!(sequencer.main_stream().is_empty());

        sequencer.init(mapping(), false);
        assert!(sequencer.is_inited());
        assert_eq!(sequencer.main_stream().len(), 4);
    }

    #[test]
    fn empty_rebuild_clears_main_and_flushes_once() {
        let mut sequencer = Sequencer::new();
        sequencer.init(mapping(), false);
        sequencer.update_main_stream_events(&note_events(&[(0, 100)]), &DynamicLevelLayers::new());
        assert_eq!(sequencer.main_stream().len(), 2);

        let flushes = flush_counter(&mut sequencer);
        sequencer.update_main_stream_events(&PlaybackEventsMap::new(), &DynamicLevelLayers::new());

        assert!(sequencer.main_stream().is_empty());
        assert_eq!(flushes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rebuild_replaces_rather_than_merges() {
        let mut sequencer = Sequencer::new();
        sequencer.init(mapping(), false);
        sequencer.update_main_stream_events(&note_events(&[(0, 100)]), &DynamicLevelLayers::new());
        sequencer.update_main_stream_events(&note_events(&[(500, 100)]), &DynamicLevelLayers::new());

        let stamps: Vec<_> = sequencer.main_stream().timestamps().collect();
        assert_eq!(stamps, [500, 600]);
    }

    #[test]
    fn off_stream_only_grows() {
        let mut sequencer = Sequencer::new();
        sequencer.init(mapping(), false);
        let flushes = flush_counter(&mut sequencer);

        sequencer.update_main_stream_events(&note_events(&[(0, 100)]), &DynamicLevelLayers::new());
        sequencer.update_off_stream_events(&note_events(&[(1000, 100)]), &DynamicLevelLayers::new());
        sequencer.update_off_stream_events(&note_events(&[(2000, 100)]), &DynamicLevelLayers::new());

        assert_eq!(sequencer.off_stream().len(), 4);
        assert_eq!(sequencer.main_stream().len(), 2);
        assert_eq!(flushes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dynamics_only_when_enabled() {
        let layers = dynamics(&[(0, DynamicType::Fff)]);

        let mut without = Sequencer::new();
        without.init(mapping(), false);
        without.update_main_stream_events(&PlaybackEventsMap::new(), &layers);
        assert!(without.main_stream().is_empty());

        let mut with = Sequencer::new();
        with.init(mapping(), true);
        with.update_main_stream_events(&PlaybackEventsMap::new(), &layers);
        assert_eq!(with.main_stream().events_at(0).unwrap().len(), 1);
    }

    #[test]
    fn gain_is_neutral_without_dynamics() {
        let mut sequencer = Sequencer::new();
        sequencer.load(PlaybackData {
            origin_events: PlaybackEventsMap::new(),
            dynamics: dynamics(&[(0, DynamicType::Fff)]),
        });
        sequencer.init(mapping(), false);
        assert_eq!(sequencer.current_gain(), NEUTRAL_GAIN);
    }

    #[test]
    fn gain_follows_dynamics_at_position() {
        let mut sequencer = Sequencer::new();
        sequencer.load(PlaybackData {
            origin_events: PlaybackEventsMap::new(),
            dynamics: dynamics(&[(0, DynamicType::Ppp), (1000, DynamicType::Fff)]),
        });
        sequencer.init(mapping(), true);

        sequencer.set_playback_position(500);
        assert_eq!(sequencer.current_gain(), 0.005);
        sequencer.set_playback_position(1000);
        assert_eq!(sequencer.current_gain(), 1.0);
    }

    #[test]
    fn dynamic_level_defaults_to_natural_and_prefers_higher_layer() {
        let mut sequencer = Sequencer::new();
        let mut layers = dynamics(&[(100, DynamicType::P)]);
        layers.entry(3).or_default().insert(100, dynamic_level_from_type(DynamicType::Ff));
        sequencer.load(PlaybackData {
            origin_events: PlaybackEventsMap::new(),
            dynamics: layers,
        });

        assert_eq!(sequencer.dynamic_level(50), dynamic_level_from_type(DynamicType::Mf));
        assert_eq!(sequencer.dynamic_level(100), dynamic_level_from_type(DynamicType::Ff));
    }

    #[test]
    fn events_to_be_played_merges_streams_in_order() {
        let mut sequencer = Sequencer::new();
        sequencer.init(mapping(), false);
        sequencer.update_main_stream_events(&note_events(&[(0, 300)]), &DynamicLevelLayers::new());
        sequencer.update_off_stream_events(&note_events(&[(100, 100)]), &DynamicLevelLayers::new());

        let mut seen = Vec::new();
        let delivered = sequencer.events_to_be_played(250, |ts, _| seen.push(ts));
        assert_eq!(delivered, 3);
        assert_eq!(seen, [0, 100, 200]);
        assert_eq!(sequencer.playback_position(), 251);

        seen.clear();
        sequencer.events_to_be_played(1000, |ts, _| seen.push(ts));
        assert_eq!(seen, [300]);
    }

    #[test]
    fn rebuild_mid_playback_resumes_at_position() {
        let mut sequencer = Sequencer::new();
        sequencer.init(mapping(), false);
        sequencer.update_main_stream_events(&note_events(&[(0, 100), (200, 100)]), &DynamicLevelLayers::new());
        sequencer.events_to_be_played(150, |_, _| {});

        let pedal = NoteEvent::new(0, 1000, 3000, ExpressionCurve::flat(5000))
            .with_articulation(ArticulationMeta::new(ArticulationType::Pedal, 0, 1000));
        let mut events = note_events(&[(200, 100)]);
        events.entry(0).or_default().push(PlaybackEvent::Note(pedal));
        sequencer.update_main_stream_events(&events, &DynamicLevelLayers::new());

        let mut seen = Vec::new();
        sequencer.events_to_be_played(2000, |ts, _| seen.push(ts));
        assert_eq!(seen, [200, 300, 1000, 1000]);
    }

    #[test]
    fn gain_follows_dynamics_of_latest_rebuild() {
        let mut sequencer = Sequencer::new();
        sequencer.load(PlaybackData {
            origin_events: PlaybackEventsMap::new(),
            dynamics: dynamics(&[(0, DynamicType::Fff)]),
        });
        sequencer.init(mapping(), true);
        assert_eq!(sequencer.current_gain(), 1.0);

        sequencer.update_main_stream_events(&PlaybackEventsMap::new(), &dynamics(&[(0, DynamicType::Ppp)]));

        let stream: Vec<_> = sequencer.main_stream().iter().map(|(ts, event)| (ts, *event)).collect();
        assert_eq!(stream, [(0, OutputEvent::Expression(0.005))]);
        assert_eq!(sequencer.current_gain(), 0.005);
    }

    #[test]
    fn off_stream_appends_keep_earlier_expression() {
        let mut sequencer = Sequencer::new();
        sequencer.init(mapping(), true);

        sequencer.update_off_stream_events(&PlaybackEventsMap::new(), &dynamics(&[(0, DynamicType::Fff)]));
        sequencer.update_off_stream_events(&PlaybackEventsMap::new(), &dynamics(&[(0, DynamicType::Ppp)]));

        let set = sequencer.off_stream().events_at(0).unwrap();
        assert!(set.iter().all(|event| event.is_expression()));
        assert!(set.contains(&OutputEvent::Expression(1.0)));
        assert!(set.contains(&OutputEvent::Expression(0.005)));
    }

    #[test]
    fn draining_to_the_end_of_time_terminates() {
        let mut events = PlaybackEventsMap::new();
        events.insert(
            Timestamp::MAX,
            vec![PlaybackEvent::ControllerChange(ControllerChangeEvent {
                kind: ControllerChangeKind::SustainPedalOnOff,
                value: 1.0,
            })],
        );

        let mut sequencer = Sequencer::new();
        sequencer.init(mapping(), false);
        sequencer.update_main_stream_events(&events, &DynamicLevelLayers::new());

        let mut seen = Vec::new();
        let delivered = sequencer.events_to_be_played(Timestamp::MAX, |ts, _| seen.push(ts));
        assert_eq!(delivered, 1);
        assert_eq!(seen, [Timestamp::MAX]);
    }
}
