//! Integration test: load RON fixtures, open a session, render, verify the stream.

use ps_master::{
    load_playback_data, open_session, OutputEvent, PlaybackData, SequencerConfig, StreamEvent,
    Timestamp,
};
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_config() -> SequencerConfig {
    SequencerConfig::load(&fixtures_dir().join("plugin.ron")).unwrap()
}

fn load_glide() -> PlaybackData {
    load_playback_data(&fixtures_dir().join("glide.ron")).unwrap()
}

/// Render everything and return the output events, flush notices dropped.
fn render_all(config: &SequencerConfig, data: PlaybackData) -> Vec<(Timestamp, OutputEvent)> {
    let (_session, mut reader) = open_session(config, data);
    let mut events = Vec::new();
    reader.render_until(Timestamp::MAX - 1, |event| {
        if let StreamEvent::Event(ts, event) = event {
            events.push((ts, *event));
        }
    });
    events
}

fn params(events: &[(Timestamp, OutputEvent)], param: u32) -> Vec<(Timestamp, f32)> {
    events
        .iter()
        .filter_map(|(ts, event)| match event {
            OutputEvent::ParamChange { param_id, value } if *param_id == param => Some((*ts, *value)),
            _ => None,
        })
        .collect()
}

const MOD_WHEEL: u32 = 100;
const SUSTAIN: u32 = 101;
const SOSTENUTO: u32 = 102;
const PITCH_BEND: u32 = 103;

#[test]
fn glide_stream_is_ordered_and_bounded() {
    let events = render_all(&load_config(), load_glide());
    assert!(!events.is_empty());

    for pair in events.windows(2) {
        assert!(pair[0].0 <= pair[1].0, "out of order: {:?}", pair);
    }

    for (ts, event) in &events {
        match event {
            OutputEvent::NoteOn(n) | OutputEvent::NoteOff(n) => {
                assert!((12..=108).contains(&n.note), "{} note {}", ts, n.note);
                assert!((0.0..=1.0).contains(&n.velocity), "{} velocity {}", ts, n.velocity);
            }
            OutputEvent::ParamChange { value, .. } => {
                assert!((0.0..=1.0).contains(value), "{} value {}", ts, value);
            }
            OutputEvent::Expression(level) => {
                assert!((0.0..=1.0).contains(level), "{} level {}", ts, level);
            }
        }
    }
}

#[test]
fn glide_notes_quantize_and_take_velocity() {
    let events = render_all(&load_config(), load_glide());
    let ons: Vec<(Timestamp, u8, f32)> = events
        .iter()
        .filter_map(|(ts, event)| match event {
            OutputEvent::NoteOn(n) => Some((*ts, n.note, n.velocity)),
            _ => None,
        })
        .collect();

    assert_eq!(
        ons,
        [(0, 60, 0.29), (500_000, 64, 0.71), (1_000_000, 67, 0.9), (1_500_000, 67, 0.9)]
    );
}

#[test]
fn glide_pedals() {
    let events = render_all(&load_config(), load_glide());

    assert_eq!(params(&events, SUSTAIN), [(500_000, 1.0), (1_500_000, 0.0)]);
    // The two laissez-vibrer gestures overlap, so the first is never released.
    assert_eq!(
        params(&events, SOSTENUTO),
        [(1_050_000, 1.0), (1_550_000, 1.0), (2_050_000, 0.0)]
    );
    assert_eq!(params(&events, MOD_WHEEL), [(0, 0.0), (500_000, 0.75)]);
}

#[test]
fn glide_bend_holds_rises_and_resets() {
    let events = render_all(&load_config(), load_glide());
    let bends = params(&events, PITCH_BEND);

    assert_eq!(bends.first(), Some(&(0, 0.5)));
    assert_eq!(bends.last(), Some(&(1_000_000, 0.5)));
    assert!(bends.iter().all(|&(ts, _)| ts <= 1_000_000));

    let rising: Vec<f32> = bends
        .iter()
        .filter(|&&(ts, _)| ts > 500_000 && ts < 1_000_000)
        .map(|&(_, value)| value)
        .collect();
    assert!(rising.len() >= 9);
    assert!(rising.windows(2).all(|w| w[1] >= w[0]));
    assert!(rising.iter().all(|&value| value > 0.5 && value < 1.0));
}

#[test]
fn glide_expression_follows_dynamics() {
    let events = render_all(&load_config(), load_glide());
    let levels: Vec<(Timestamp, f32)> = events
        .iter()
        .filter_map(|(ts, event)| match event {
            OutputEvent::Expression(level) => Some((*ts, *level)),
            _ => None,
        })
        .collect();
    assert_eq!(levels, [(0, 0.29), (1_000_000, 0.71)]);
}

#[test]
fn unmapped_controls_vanish() {
    let mut config = load_config();
    config.mapping.clear();
    config.use_dynamic_events = false;

    let events = render_all(&config, load_glide());
    assert!(events
        .iter()
        .all(|(_, event)| matches!(event, OutputEvent::NoteOn(_) | OutputEvent::NoteOff(_))));
    assert_eq!(events.len(), 8);
}

#[test]
fn gain_tracks_render_position() {
    let (mut session, mut reader) = open_session(&load_config(), load_glide());
    assert_eq!(session.current_gain(), 0.29);

    reader.render_until(1_200_000, |_| {});
    assert_eq!(session.current_gain(), 0.71);
}
