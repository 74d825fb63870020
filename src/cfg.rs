#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::{
    interpolation::InterpolationMode,
    prelude::Duration,
};

fn default_comparison_step() -> Duration {
    Duration::from_seconds(300.0)
}

fn default_dense_step() -> Duration {
    Duration::from_seconds(30.0)
}

fn default_max_toe_age() -> Duration {
    Duration::from_seconds(7200.0)
}

fn default_kepler_tolerance() -> f64 {
    1.0E-12
}

fn default_kepler_max_iter() -> usize {
    30
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Sampling of the precise versus broadcast comparison.
    #[cfg_attr(feature = "serde", serde(default = "default_comparison_step"))]
    pub comparison_step: Duration,
    /// Sampling of the dense (interpolated) precise trajectory,
    /// that is typically used for plotting.
    #[cfg_attr(feature = "serde", serde(default = "default_dense_step"))]
    pub dense_step: Duration,
    /// [InterpolationMode] used to resample the precise orbit
    /// on the comparison grid.
    #[cfg_attr(feature = "serde", serde(default))]
    pub interpolation: InterpolationMode,
    /// Broadcast frames older than this remain usable,
    /// but the resulting states are flagged with lower confidence.
    #[cfg_attr(feature = "serde", serde(default = "default_max_toe_age"))]
    pub max_toe_age: Duration,
    /// Kepler equation convergence criteria (in radians)
    #[cfg_attr(feature = "serde", serde(default = "default_kepler_tolerance"))]
    pub kepler_tolerance_rad: f64,
    /// Kepler equation iteration cap. Last iterate is used when reached.
    #[cfg_attr(feature = "serde", serde(default = "default_kepler_max_iter"))]
    pub kepler_max_iter: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            comparison_step: default_comparison_step(),
            dense_step: default_dense_step(),
            interpolation: InterpolationMode::default(),
            max_toe_age: default_max_toe_age(),
            kepler_tolerance_rad: default_kepler_tolerance(),
            kepler_max_iter: default_kepler_max_iter(),
        }
    }
}

impl Config {
    /// Returns [Config] that resamples the precise orbit linearly,
    /// at `step`. You can then customize [Self] as you will.
    pub fn linear_preset(step: Duration) -> Self {
        let mut s = Self::default();
        s.comparison_step = step;
        s.interpolation = InterpolationMode::Linear;
        s
    }

    /// Returns [Config] with desired comparison `step`.
    pub fn with_comparison_step(&self, step: Duration) -> Self {
        let mut s = self.clone();
        s.comparison_step = step;
        s
    }

    /// Returns [Config] with desired validity window.
    pub fn with_max_toe_age(&self, max_toe_age: Duration) -> Self {
        let mut s = self.clone();
        s.max_toe_age = max_toe_age;
        s
    }
}
