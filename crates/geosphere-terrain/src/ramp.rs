//! Height colour ramp.

/// Map a normalized height in `[-1, 1]` (0 is sea level) to an RGBA colour.
///
/// Bands: deep water, shallow water, shore, lowland, highland, snow.
pub fn height_to_color(normalized: f64) -> [u8; 4] {
    let h = normalized.clamp(-1.0, 1.0);
    let (r, g, b) = if h < -0.5 {
        (0.0, 0.0, 128.0)
    } else if h < 0.0 {
        (30.0, 80.0, 200.0)
    } else if h < 0.04 {
        (220.0, 200.0, 130.0)
    } else if h < 0.35 {
        let t = (h - 0.04) / 0.31;
        (30.0 + t * 80.0, 160.0 - t * 40.0, 30.0 + t * 20.0)
    } else if h < 0.6 {
        let t = (h - 0.35) / 0.25;
        (110.0 + t * 40.0, 120.0 - t * 50.0, 50.0 + t * 20.0)
    } else {
        let base = 150.0 + ((h - 0.6) / 0.4).min(1.0) * 105.0;
        (base, base, base)
    };
    [r as u8, g as u8, b as u8, 255]
}
