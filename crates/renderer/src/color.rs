//! RGB color value and linear interpolation.

/// Opaque color written into map buffers. Alpha is always 255 on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Gray level color.
    pub const fn gray(level: u8) -> Self {
        Self::new(level, level, level)
    }

    /// RGBA bytes as stored in a dense buffer.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// Scale brightness by `factor` (clamped to 0-1).
    pub fn shade(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self::new(
            (self.r as f32 * f) as u8,
            (self.g as f32 * f) as u8,
            (self.b as f32 * f) as u8,
        )
    }
}

/// Linear color interpolation, `t` clamped to 0-1.
pub fn interpolate_color(color1: Rgb, color2: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Rgb::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)) as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)) as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)) as u8,
    )
}

/// Piecewise linear ramp over `(value, color)` stops sorted by value.
///
/// Values below the first stop or above the last take the end colors.
pub fn ramp(stops: &[(f32, Rgb)], value: f32) -> Rgb {
    let Some(&(first_value, first_color)) = stops.first() else {
        return Rgb::BLACK;
    };
    if value <= first_value {
        return first_color;
    }
    for pair in stops.windows(2) {
        let (v0, c0) = pair[0];
        let (v1, c1) = pair[1];
        if value < v1 {
            let span = v1 - v0;
            let t = if span.abs() < f32::EPSILON { 1.0 } else { (value - v0) / span };
            return interpolate_color(c0, c1, t);
        }
    }
    stops[stops.len() - 1].1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_endpoints() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(200, 100, 50);
        assert_eq!(interpolate_color(a, b, 0.0), a);
        assert_eq!(interpolate_color(a, b, 1.0), b);
        assert_eq!(interpolate_color(a, b, 0.5), Rgb::new(100, 50, 25));
        assert_eq!(interpolate_color(a, b, 7.0), b);
    }

    #[test]
    fn test_ramp_clamps_and_interpolates() {
        let stops = [(0.0, Rgb::BLACK), (10.0, Rgb::gray(100)), (20.0, Rgb::WHITE)];
        assert_eq!(ramp(&stops, -5.0), Rgb::BLACK);
        assert_eq!(ramp(&stops, 5.0), Rgb::gray(50));
        assert_eq!(ramp(&stops, 10.0), Rgb::gray(100));
        assert_eq!(ramp(&stops, 25.0), Rgb::WHITE);
        assert_eq!(ramp(&[], 1.0), Rgb::BLACK);
    }

    #[test]
    fn test_rgba_is_opaque() {
        assert_eq!(Rgb::new(1, 2, 3).to_rgba(), [1, 2, 3, 255]);
    }

    #[test]
    fn test_shade() {
        assert_eq!(Rgb::new(200, 100, 50).shade(0.5), Rgb::new(100, 50, 25));
        assert_eq!(Rgb::WHITE.shade(2.0), Rgb::WHITE);
    }
}
