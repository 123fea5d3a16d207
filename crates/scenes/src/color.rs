use std::ops::{Add, AddAssign, Div, Mul};

use progressive::Rgb8;

/// Linear RGB radiance with unbounded channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0);
    pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: f32) -> Self {
        Self::new(value, value, value)
    }

    /// Scales the colour down so its brightest channel is at most one.
    pub fn max_to_one(self) -> Self {
        let max = self.r.max(self.g).max(self.b);
        if max > 1.0 {
            self / max
        } else {
            self
        }
    }

    pub fn to_rgb8(self) -> Rgb8 {
        let mapped = self.max_to_one();
        Rgb8::new(
            channel_to_u8(mapped.r),
            channel_to_u8(mapped.g),
            channel_to_u8(mapped.b),
        )
    }
}

fn channel_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        *self = *self + rhs;
    }
}

impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, rhs: f32) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Div<f32> for Color {
    type Output = Color;

    fn div(self, rhs: f32) -> Color {
        Color::new(self.r / rhs, self.g / rhs, self.b / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overexposed_colours_keep_their_hue() {
        let rgb = Color::new(2.0, 1.0, 0.0).to_rgb8();
        assert_eq!(rgb, Rgb8::new(255, 128, 0));
    }

    #[test]
    fn negative_channels_clamp_to_black() {
        assert_eq!(Color::new(-0.5, 0.0, 0.0).to_rgb8(), Rgb8::BLACK);
    }
}
