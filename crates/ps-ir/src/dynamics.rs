//! Symbolic loudness scale and layered dynamics.

use alloc::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::timestamp::{Percentage, Timestamp, ONE_PERCENT};

/// Loudness in percent units (`ONE_PERCENT` per percent).
pub type DynamicLevel = i32;

/// Distance between adjacent symbolic dynamics.
pub const DYNAMIC_LEVEL_STEP: DynamicLevel = 5 * ONE_PERCENT;

/// Symbolic dynamics, quietest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DynamicType {
    Ppp,
    Pp,
    P,
    Mp,
    Mf,
    F,
    Ff,
    Fff,
}

impl DynamicType {
    /// The level used when nothing else is known.
    pub const NATURAL: DynamicType = DynamicType::Mf;
}

/// Level of a symbolic dynamic. `mf` sits at 50%.
pub const fn dynamic_level_from_type(dynamic: DynamicType) -> DynamicLevel {
    let mf_offset = dynamic as i32 - DynamicType::Mf as i32;
    50 * ONE_PERCENT + mf_offset * DYNAMIC_LEVEL_STEP
}

/// Identifies one layer of dynamics (e.g. one staff or voice).
pub type LayerIdx = u32;

/// Dynamic changes of a single layer, keyed by timestamp.
pub type DynamicLevelMap = BTreeMap<Timestamp, DynamicLevel>;

/// All dynamics layers. Iteration is in ascending layer index.
pub type DynamicLevelLayers = BTreeMap<LayerIdx, DynamicLevelMap>;

/// Loudness over the duration of a note: percentage of duration -> level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpressionCurve(pub BTreeMap<Percentage, DynamicLevel>);

impl ExpressionCurve {
    /// A curve holding `level` for the whole note.
    pub fn flat(level: DynamicLevel) -> Self {
        let mut points = BTreeMap::new();
        points.insert(0, level);
        Self(points)
    }

    /// Loudest point of the curve, or the natural level for an empty curve.
    pub fn max_amplitude_level(&self) -> DynamicLevel {
        self.0
            .values()
            .copied()
            .max()
            .unwrap_or(dynamic_level_from_type(DynamicType::NATURAL))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
