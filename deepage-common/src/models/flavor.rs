//! Sensory flavor profile (six 0-100 axes)

use serde::{Deserialize, Serialize};

use crate::math::clamp_score;

/// The six sensory axes scored for every record and prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlavorAxis {
    /// Fresh fruit character; fades with oxidation
    Fruity,
    /// Floral / blossom aromatics; fades with oxidation
    Floral,
    /// Mousse and palate creaminess; builds with textural maturation
    Creamy,
    /// Saline / chalky tension; builds with textural maturation
    Mineral,
    /// Brioche, toast, autolytic notes; builds with time on lees
    Toasty,
    /// Nut, honey, sherry-like notes; builds with oxidation
    Nutty,
}

/// How an axis responds to undersea aging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisClass {
    /// Shrinks with oxidative exposure (FRI)
    Decay,
    /// Grows with textural maturation (1 / TCI)
    Maturation,
    /// Grows linearly with months of aging
    LongAging,
    /// Grows with oxidative exposure (FRI)
    Oxidative,
}

impl FlavorAxis {
    /// All axes in canonical order
    pub const ALL: [FlavorAxis; 6] = [
        FlavorAxis::Fruity,
        FlavorAxis::Floral,
        FlavorAxis::Creamy,
        FlavorAxis::Mineral,
        FlavorAxis::Toasty,
        FlavorAxis::Nutty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlavorAxis::Fruity => "fruity",
            FlavorAxis::Floral => "floral",
            FlavorAxis::Creamy => "creamy",
            FlavorAxis::Mineral => "mineral",
            FlavorAxis::Toasty => "toasty",
            FlavorAxis::Nutty => "nutty",
        }
    }

    pub fn class(&self) -> AxisClass {
        match self {
            FlavorAxis::Fruity | FlavorAxis::Floral => AxisClass::Decay,
            FlavorAxis::Creamy | FlavorAxis::Mineral => AxisClass::Maturation,
            FlavorAxis::Toasty => AxisClass::LongAging,
            FlavorAxis::Nutty => AxisClass::Oxidative,
        }
    }
}

/// Six-axis flavor profile, each value 0-100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlavorProfile {
    pub fruity: f64,
    pub floral: f64,
    pub creamy: f64,
    pub mineral: f64,
    pub toasty: f64,
    pub nutty: f64,
}

impl Default for FlavorProfile {
    fn default() -> Self {
        Self::neutral()
    }
}

impl FlavorProfile {
    /// Neutral profile used when no historical cluster matches
    pub fn neutral() -> Self {
        Self::uniform(50.0)
    }

    pub fn uniform(value: f64) -> Self {
        Self {
            fruity: value,
            floral: value,
            creamy: value,
            mineral: value,
            toasty: value,
            nutty: value,
        }
    }

    pub fn get(&self, axis: FlavorAxis) -> f64 {
        match axis {
            FlavorAxis::Fruity => self.fruity,
            FlavorAxis::Floral => self.floral,
            FlavorAxis::Creamy => self.creamy,
            FlavorAxis::Mineral => self.mineral,
            FlavorAxis::Toasty => self.toasty,
            FlavorAxis::Nutty => self.nutty,
        }
    }

    pub fn set(&mut self, axis: FlavorAxis, value: f64) {
        match axis {
            FlavorAxis::Fruity => self.fruity = value,
            FlavorAxis::Floral => self.floral = value,
            FlavorAxis::Creamy => self.creamy = value,
            FlavorAxis::Mineral => self.mineral = value,
            FlavorAxis::Toasty => self.toasty = value,
            FlavorAxis::Nutty => self.nutty = value,
        }
    }

    /// Build a profile by evaluating `f` for every axis
    pub fn from_fn(mut f: impl FnMut(FlavorAxis) -> f64) -> Self {
        let mut profile = Self::uniform(0.0);
        for axis in FlavorAxis::ALL {
            profile.set(axis, f(axis));
        }
        profile
    }

    /// Apply `f(axis, value)` to every axis
    pub fn map(&self, mut f: impl FnMut(FlavorAxis, f64) -> f64) -> Self {
        Self::from_fn(|axis| f(axis, self.get(axis)))
    }

    /// Iterate `(axis, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (FlavorAxis, f64)> + '_ {
        FlavorAxis::ALL.into_iter().map(move |axis| (axis, self.get(axis)))
    }

    pub fn max_value(&self) -> f64 {
        self.iter().map(|(_, v)| v).fold(f64::NEG_INFINITY, f64::max)
    }

    /// Clamp every axis into [0, 100]
    pub fn clamped(&self) -> Self {
        self.map(|_, v| clamp_score(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip_all_axes() {
        let mut profile = FlavorProfile::uniform(0.0);
        for (i, axis) in FlavorAxis::ALL.iter().enumerate() {
            profile.set(*axis, i as f64 * 10.0);
        }
        for (i, axis) in FlavorAxis::ALL.iter().enumerate() {
            assert_eq!(profile.get(*axis), i as f64 * 10.0);
        }
        assert_eq!(profile.max_value(), 50.0);
    }

    #[test]
    fn test_clamped_bounds_every_axis() {
        let profile = FlavorProfile {
            fruity: -10.0,
            floral: 120.0,
            creamy: 50.0,
            mineral: f64::NAN,
            toasty: 100.0,
            nutty: 0.0,
        }
        .clamped();
        assert_eq!(profile.fruity, 0.0);
        assert_eq!(profile.floral, 100.0);
        assert_eq!(profile.mineral, 0.0);
        assert!(profile.iter().all(|(_, v)| (0.0..=100.0).contains(&v)));
    }

    #[test]
    fn test_axis_classes() {
        assert_eq!(FlavorAxis::Fruity.class(), AxisClass::Decay);
        assert_eq!(FlavorAxis::Mineral.class(), AxisClass::Maturation);
        assert_eq!(FlavorAxis::Toasty.class(), AxisClass::LongAging);
        assert_eq!(FlavorAxis::Nutty.class(), AxisClass::Oxidative);
    }
}
