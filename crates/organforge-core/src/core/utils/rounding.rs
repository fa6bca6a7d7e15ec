/// Rounds `value` half away from zero to `decimals` places after the decimal point.
#[inline]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Largest absolute error introduced by a single [`round_to`] call.
#[inline]
pub fn half_unit(decimals: u32) -> f64 {
    0.5 * 10f64.powi(-(decimals as i32))
}
