//! Tank level model: filtered distance → fill percentage.
//!
//! Linear interpolation between the empty (`bottom`) and full (`top`)
//! sensor distances.  Readings outside that span are clamped, so a
//! splash above the full mark still reads 100 % and a lost surface
//! below the outlet reads 0 %.
//!
//! The tank radius feeds a volume estimate for a vertical cylinder; the
//! percentage itself stays height-based.

use core::f32::consts::PI;

use crate::config::TankGeometry;
use crate::error::ConfigError;

/// Fill level in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FillPercentage(f32);

impl FillPercentage {
    pub const EMPTY: Self = Self(0.0);
    pub const FULL: Self = Self(100.0);

    /// Clamp `pct` into `[0, 100]`.  NaN reads as empty.
    pub fn new(pct: f32) -> Self {
        if pct.is_nan() {
            return Self::EMPTY;
        }
        Self(pct.clamp(0.0, 100.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Whole percent, rounded half-up.  Threshold decisions use this.
    pub fn whole(self) -> u8 {
        (self.0 + 0.5).floor() as u8
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LevelModel {
    geometry: TankGeometry,
}

impl LevelModel {
    /// Geometry is checked once here, never per reading.
    pub fn new(geometry: TankGeometry) -> Result<Self, ConfigError> {
        geometry.validate()?;
        Ok(Self { geometry })
    }

    pub fn geometry(&self) -> &TankGeometry {
        &self.geometry
    }

    fn clamp_distance(&self, distance_cm: f32) -> f32 {
        distance_cm.clamp(self.geometry.top_distance_cm, self.geometry.bottom_distance_cm)
    }

    pub fn to_percentage(&self, distance_cm: f32) -> FillPercentage {
        let TankGeometry { bottom_distance_cm: bottom, top_distance_cm: top, .. } = self.geometry;
        let d = self.clamp_distance(distance_cm);
        FillPercentage::new(100.0 * (bottom - d) / (bottom - top))
    }

    /// Water volume in litres, treating the tank as a vertical cylinder.
    pub fn water_volume_litres(&self, distance_cm: f32) -> f32 {
        let r = self.geometry.radius_cm;
        let height_cm = self.geometry.bottom_distance_cm - self.clamp_distance(distance_cm);
        PI * r * r * height_cm / 1000.0
    }
}
