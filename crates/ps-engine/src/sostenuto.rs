//! Sostenuto pedal gestures.

use alloc::vec::Vec;
use ps_ir::{PluginParamValue, Timestamp, TimestampAndDuration};

pub const PEDAL_ON: PluginParamValue = 1.0;
pub const PEDAL_OFF: PluginParamValue = 0.0;

/// Turn sostenuto gestures into pedal on/off changes.
///
/// Gestures are taken in the order they were collected. A gesture that
/// runs into the start of the next one gets no release: the pedal stays
/// down into the next gesture instead of retriggering. The last gesture is
/// always released.
pub fn resolve_sostenuto(gestures: &[TimestampAndDuration]) -> Vec<(Timestamp, PluginParamValue)> {
    let mut changes = Vec::with_capacity(gestures.len() * 2);

    for (i, gesture) in gestures.iter().enumerate() {
        changes.push((gesture.timestamp, PEDAL_ON));

        let release = gesture.end();
        match gestures.get(i + 1) {
            Some(next) if release > next.timestamp => {}
            _ => changes.push((release, PEDAL_OFF)),
        }
    }

    changes
}
