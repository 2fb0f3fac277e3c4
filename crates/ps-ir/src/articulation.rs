//! Articulations attached to notes.

use serde::{Deserialize, Serialize};

use crate::timestamp::{Duration, Timestamp};

/// Expressive modifier kinds. Only a few of them have a plugin-event
/// representation; the rest are carried through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArticulationType {
    Standard,
    Staccato,
    Accent,
    Legato,
    Tenuto,
    Marcato,
    Pedal,
    LetRing,
    LaissezVibrer,
    Multibend,
    Glissando,
    Trill,
}

/// Where and for how long an articulation applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticulationMeta {
    pub kind: ArticulationType,
    pub timestamp: Timestamp,
    pub overall_duration: Duration,
}

impl ArticulationMeta {
    pub fn new(kind: ArticulationType, timestamp: Timestamp, overall_duration: Duration) -> Self {
        Self {
            kind,
            timestamp,
            overall_duration,
        }
    }

    /// Timestamp at which the articulation stops applying.
    pub fn end(&self) -> Timestamp {
        self.timestamp + self.overall_duration
    }
}
