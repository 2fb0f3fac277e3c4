//! Dynamic level to normalized expression mapping.

use ps_ir::{
    dynamic_level_from_type, DynamicLevel, DynamicType, HUNDRED_PERCENT, ONE_PERCENT,
};

/// Quietest supported dynamic.
pub const MIN_SUPPORTED_DYNAMIC_LEVEL: DynamicLevel = dynamic_level_from_type(DynamicType::Ppp);
/// Loudest supported dynamic.
pub const MAX_SUPPORTED_DYNAMIC_LEVEL: DynamicLevel = dynamic_level_from_type(DynamicType::Fff);
const AVAILABLE_RANGE: DynamicLevel = MAX_SUPPORTED_DYNAMIC_LEVEL - MIN_SUPPORTED_DYNAMIC_LEVEL;

/// Level returned at or below ppp: half a percent, so the quietest
/// dynamic still sounds.
pub const MIN_EXPRESSION_LEVEL: f32 = (0.5 * ONE_PERCENT as f32) / HUNDRED_PERCENT as f32;

/// Map a dynamic level to an expression value in [0, 1].
///
/// Values between ppp and fff scale linearly and are rounded to two
/// decimals, never dropping below the ppp level; anything outside is
/// clamped.
pub fn expression_level(level: DynamicLevel) -> f32 {
    if level <= MIN_SUPPORTED_DYNAMIC_LEVEL {
        return MIN_EXPRESSION_LEVEL;
    }

    if level >= MAX_SUPPORTED_DYNAMIC_LEVEL {
        return 1.0;
    }

    let fraction = (level - MIN_SUPPORTED_DYNAMIC_LEVEL) as f32 / AVAILABLE_RANGE as f32;
    round_to(fraction, 2).max(MIN_EXPRESSION_LEVEL)
}

fn round_to(value: f32, decimals: i32) -> f32 {
    let scale = libm::powf(10.0, decimals as f32);
    libm::roundf(value * scale) / scale
}
