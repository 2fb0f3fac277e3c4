//! Timestamp-ordered collection of plugin events.

use alloc::collections::{BTreeMap, BTreeSet};
use core::ops::Bound;
use ps_ir::{OutputEvent, Timestamp};

/// The events sharing one timestamp. Order within the set carries no meaning.
pub type EventSet = BTreeSet<OutputEvent>;

/// Plugin events keyed by timestamp.
///
/// Inserting an event that is already present at the same timestamp is a
/// no-op. During playback, events are consumed via a cursor that advances
/// forward without removing anything, so a rebuilt or appended timeline can
/// be walked again from any position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventTimeline {
    events: BTreeMap<Timestamp, EventSet>,
    /// Next timestamp to deliver (advances during playback).
    cursor: Timestamp,
}

impl EventTimeline {
    /// Create a new empty timeline.
    pub fn new() -> Self {
        Self {
            events: BTreeMap::new(),
            cursor: 0,
        }
    }

    /// Insert an event. Returns false if it was already present at `timestamp`.
    pub fn insert(&mut self, timestamp: Timestamp, event: OutputEvent) -> bool {
        self.events.entry(timestamp).or_default().insert(event)
    }

    /// Events at exactly `timestamp`.
    pub fn events_at(&self, timestamp: Timestamp) -> Option<&EventSet> {
        self.events.get(&timestamp)
    }

    /// All events in ascending timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, &OutputEvent)> + '_ {
        self.events
            .iter()
            .flat_map(|(timestamp, set)| set.iter().map(move |event| (*timestamp, event)))
    }

    /// Timestamps in `from..=until` with their events, ascending. Empty when
    /// `until < from`.
    pub fn range(&self, from: Timestamp, until: Timestamp) -> impl Iterator<Item = (Timestamp, &EventSet)> + '_ {
        let end = if until < from {
            Bound::Excluded(from)
        } else {
            Bound::Included(until)
        };
        self.events
            .range((Bound::Included(from), end))
            .map(|(timestamp, set)| (*timestamp, set))
    }

    /// Distinct timestamps in ascending order.
    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.events.keys().copied()
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.events.keys().next().copied()
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.events.keys().next_back().copied()
    }

    /// Move the cursor so the next drain starts at `timestamp`.
    pub fn seek(&mut self, timestamp: Timestamp) {
        self.cursor = timestamp;
    }

    pub fn cursor(&self) -> Timestamp {
        self.cursor
    }

    /// First timestamp at or after the cursor and at or before `until`.
    pub fn next_timestamp(&self, until: Timestamp) -> Option<Timestamp> {
        self.range(self.cursor, until).next().map(|(timestamp, _)| timestamp)
    }

    /// Hand every event between the cursor and `until` (inclusive) to `f`,
    /// then advance the cursor past `until`. Returns the number of events
    /// delivered. Does not allocate.
    pub fn drain_until<F>(&mut self, until: Timestamp, mut f: F) -> usize
    where
        F: FnMut(Timestamp, &OutputEvent),
    {
        if until < self.cursor {
            return 0;
        }

        let mut delivered = 0;
        for (timestamp, set) in self.range(self.cursor, until) {
            for event in set {
                f(timestamp, event);
                delivered += 1;
            }
        }

        self.cursor = until.saturating_add(1);
        delivered
    }

    /// Clear all events and reset the cursor.
    pub fn clear(&mut self) {
        self.events.clear();
        self.cursor = 0;
    }

    /// Returns true if the timeline holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the number of events in the timeline.
    pub fn len(&self) -> usize {
        self.events.values().map(|set| set.len()).sum()
    }
}
