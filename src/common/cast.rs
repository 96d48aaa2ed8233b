use num_traits::ToPrimitive;

/// Rounds to the nearest pixel count. `None` for NaN, negative or out of range values.
pub fn round_px(num: f64) -> Option<u32> {
    num.round().to_u32()
}

/// Floors to a pixel count. `None` for NaN, negative or out of range values.
pub fn floor_px(num: f64) -> Option<u32> {
    num.floor().to_u32()
}
