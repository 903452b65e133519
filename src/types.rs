use fixed::types::I32F32;

/// Pixel scalar backed by a fixed-point value. Layout arithmetic stays
/// deterministic across platforms; `f32` only appears at the raster boundary.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Px(I32F32);

impl Px {
    pub const ZERO: Px = Px(I32F32::from_bits(0));

    pub fn from_f32(value: f32) -> Px {
        if !value.is_finite() {
            return Px::ZERO;
        }
        let milli = (value as f64 * 1000.0).round();
        let milli = milli.clamp(i64::MIN as f64, i64::MAX as f64) as i64;
        Px::from_milli(milli)
    }

    pub fn from_u32(value: u32) -> Px {
        Px::from_milli(value as i64 * 1000)
    }

    pub fn from_i32(value: i32) -> Px {
        Px::from_milli(value as i64 * 1000)
    }

    pub fn to_f32(self) -> f32 {
        self.0.to_num()
    }

    pub fn to_milli(self) -> i64 {
        let bits = self.0.to_bits() as i128;
        let denom = 1i128 << 32;
        let scaled = bits * 1000;
        let adj = if scaled >= 0 { denom / 2 } else { -denom / 2 };
        let milli = (scaled + adj) / denom;
        milli.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// Rounds to the nearest whole pixel.
    pub fn round_i32(self) -> i32 {
        let milli = self.to_milli();
        let adj = if milli >= 0 { 500 } else { -500 };
        ((milli + adj) / 1000).clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    pub fn max(self, other: Px) -> Px {
        if self >= other { self } else { other }
    }

    pub fn min(self, other: Px) -> Px {
        if self <= other { self } else { other }
    }

    /// Multiplies by num/denom with round-half-away-from-zero on millipixels.
    pub fn mul_ratio(self, num: i32, denom: i32) -> Px {
        if denom == 0 {
            return Px::ZERO;
        }
        let milli = self.to_milli() as i128;
        let value = div_round_i128(milli.saturating_mul(num as i128), denom as i128);
        Px::from_milli_i128(value)
    }

    /// Scales by an f32 factor (font-scale application). The factor is taken
    /// to millipixel precision first so repeated scaling stays reproducible.
    pub fn scaled(self, factor: f32) -> Px {
        if !factor.is_finite() {
            return Px::ZERO;
        }
        let factor_milli = (factor as f64 * 1000.0).round() as i128;
        let milli = self.to_milli() as i128;
        Px::from_milli_i128(div_round_i128(milli.saturating_mul(factor_milli), 1000))
    }

    pub fn from_milli(milli: i64) -> Px {
        Px::from_milli_i128(milli as i128)
    }

    fn from_milli_i128(milli: i128) -> Px {
        let denom = 1i128 << 32;
        let adj = if milli >= 0 { 500 } else { -500 };
        let bits = (milli * denom + adj) / 1000;
        let bits = bits.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
        Px(I32F32::from_bits(bits))
    }
}

impl std::ops::Add for Px {
    type Output = Px;
    fn add(self, rhs: Px) -> Px {
        Px::from_milli_i128(self.to_milli() as i128 + rhs.to_milli() as i128)
    }
}

impl std::ops::AddAssign for Px {
    fn add_assign(&mut self, rhs: Px) {
        *self = *self + rhs;
    }
}

impl std::ops::Sub for Px {
    type Output = Px;
    fn sub(self, rhs: Px) -> Px {
        Px::from_milli_i128(self.to_milli() as i128 - rhs.to_milli() as i128)
    }
}

impl std::ops::SubAssign for Px {
    fn sub_assign(&mut self, rhs: Px) {
        *self = *self - rhs;
    }
}

impl std::ops::Mul<i32> for Px {
    type Output = Px;
    fn mul(self, rhs: i32) -> Px {
        let milli = self.to_milli() as i128;
        Px::from_milli_i128(milli.saturating_mul(rhs as i128))
    }
}

impl std::ops::Div<i32> for Px {
    type Output = Px;
    fn div(self, rhs: i32) -> Px {
        if rhs == 0 {
            Px::ZERO
        } else {
            let milli = self.to_milli() as i128;
            Px::from_milli_i128(div_round_i128(milli, rhs as i128))
        }
    }
}

impl std::ops::Neg for Px {
    type Output = Px;
    fn neg(self) -> Px {
        Px::from_milli_i128(-(self.to_milli() as i128))
    }
}

impl std::iter::Sum for Px {
    fn sum<I: Iterator<Item = Px>>(iter: I) -> Px {
        iter.fold(Px::ZERO, |acc, v| acc + v)
    }
}

impl<'a> std::iter::Sum<&'a Px> for Px {
    fn sum<I: Iterator<Item = &'a Px>>(iter: I) -> Px {
        iter.fold(Px::ZERO, |acc, v| acc + *v)
    }
}

fn div_round_i128(num: i128, den: i128) -> i128 {
    if den == 0 {
        return 0;
    }
    let den_abs = den.abs();
    if num >= 0 {
        (num + (den_abs / 2)) / den
    } else {
        -(((-num) + (den_abs / 2)) / den)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: Px,
    pub y: Px,
    pub width: Px,
    pub height: Px,
}

/// Straight-alpha RGBA color, channels in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 255)
    }

    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milli_round_trips_through_fixed_bits() {
        for milli in [-1500, -1, 0, 1, 999, 1000, 1_344_000] {
            assert_eq!(Px::from_milli(milli).to_milli(), milli);
        }
    }

    #[test]
    fn round_i32_rounds_half_away_from_zero() {
        assert_eq!(Px::from_milli(1500).round_i32(), 2);
        assert_eq!(Px::from_milli(-1500).round_i32(), -2);
        assert_eq!(Px::from_milli(1499).round_i32(), 1);
    }

    #[test]
    fn scaled_matches_ratio_for_exact_factors() {
        let v = Px::from_i32(60);
        assert_eq!(v.scaled(0.88).to_milli(), v.mul_ratio(88, 100).to_milli());
        assert_eq!(v.scaled(1.0).to_milli(), 60_000);
    }

    #[test]
    fn sum_and_ops_are_consistent() {
        let parts = [Px::from_i32(10), Px::from_i32(20), Px::from_i32(12)];
        let total: Px = parts.iter().sum();
        assert_eq!(total.to_milli(), 42_000);
        assert_eq!((total / 2).to_milli(), 21_000);
        assert_eq!((total - Px::from_i32(42)).to_milli(), 0);
    }
}
