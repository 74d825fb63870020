//! Precise orbit interpolation
#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::{
    error::Error,
    orbit::OrbitSample,
    prelude::{Epoch, Vector3},
};

mod linear;
mod spline;

pub use spline::CubicSpline;

/// Boundary condition of the [CubicSpline]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub enum SplineBoundary {
    /// Third derivative is continuous at the second and last but one knots.
    #[default]
    NotAKnot,
    /// Second derivative vanishes at both ends.
    Natural,
}

impl std::fmt::Display for SplineBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NotAKnot => write!(f, "not-a-knot"),
            Self::Natural => write!(f, "natural"),
        }
    }
}

/// Interpolation method
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub enum InterpolationMode {
    /// Piecewise linear interpolation, between the two bracketing samples.
    /// Typically used for coarse comparisons.
    Linear,
    /// Per axis, C² continuous, piecewise cubic interpolation over the whole series.
    Spline(SplineBoundary),
}

impl Default for InterpolationMode {
    fn default() -> Self {
        Self::Spline(SplineBoundary::default())
    }
}

impl std::fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Spline(boundary) => write!(f, "{} spline", boundary),
        }
    }
}

impl InterpolationMode {
    /// Minimal number of samples this method requires.
    pub fn min_samples(&self) -> usize {
        match self {
            Self::Linear => 2,
            Self::Spline(_) => 4,
        }
    }

    /// Verifies that `samples` are suitable for this method,
    /// prior any fitting.
    pub(crate) fn validate(&self, samples: &[OrbitSample]) -> Result<(), Error> {
        OrbitSample::check_monotonic(samples)?;

        let required = self.min_samples();
        if samples.len() < required {
            return Err(Error::NotEnoughSamples {
                mode: *self,
                required,
                found: samples.len(),
            });
        }
        Ok(())
    }
}

/// Interpolates the precise `samples` at each of the `targets`.
/// `samples` must be strictly increasing in time, and all `targets` must
/// lie within their span: this never extrapolates.
pub fn interpolate(
    samples: &[OrbitSample],
    targets: &[Epoch],
    mode: InterpolationMode,
) -> Result<Vec<Vector3<f64>>, Error> {
    mode.validate(samples)?;

    match mode {
        InterpolationMode::Linear => targets
            .iter()
            .map(|t| linear::interpolate_at(samples, *t))
            .collect(),
        InterpolationMode::Spline(boundary) => {
            let spline = CubicSpline::fit(samples, boundary)?;
            targets.iter().map(|t| spline.evaluate(*t)).collect()
        },
    }
}

/// Locates the interval `[i, i+1]` that brackets `x` in the sorted `knots`.
/// `x` must lie within the knots span.
pub(crate) fn bracket(knots: &[f64], x: f64) -> usize {
    let upper = knots.partition_point(|k| *k <= x);
    upper.saturating_sub(1).min(knots.len().saturating_sub(2))
}

#[cfg(test)]
mod test {
    use super::{bracket, interpolate, InterpolationMode, SplineBoundary};
    use crate::{
        prelude::Error,
        tests::{circular_orbit_samples, init_logger},
    };
    use hifitime::Unit;
    use rstest::*;

    #[test]
    fn interval_lookup() {
        let knots = [0.0, 10.0, 20.0, 30.0];
        assert_eq!(bracket(&knots, 0.0), 0);
        assert_eq!(bracket(&knots, 5.0), 0);
        assert_eq!(bracket(&knots, 10.0), 1);
        assert_eq!(bracket(&knots, 29.0), 2);
        assert_eq!(bracket(&knots, 30.0), 2);
    }

    #[rstest]
    #[case(InterpolationMode::Linear)]
    #[case(InterpolationMode::Spline(SplineBoundary::NotAKnot))]
    #[case(InterpolationMode::Spline(SplineBoundary::Natural))]
    fn no_extrapolation(#[case] mode: InterpolationMode) {
        init_logger();
        let samples = circular_orbit_samples(25, 300.0);
        let first = samples[0].epoch;
        let last = samples[24].epoch;

        for t in [first - 1.0 * Unit::Second, last + 1.0 * Unit::Second] {
            match interpolate(&samples, &[t], mode) {
                Err(Error::OutsideInterpolationSpan(e)) => assert_eq!(e, t),
                other => panic!("{}: unexpected result {:?}", mode, other),
            }
        }

        // bounds are included
        let positions = interpolate(&samples, &[first, last], mode).unwrap();
        assert_eq!(positions.len(), 2);
    }

    #[rstest]
    #[case(InterpolationMode::Linear)]
    #[case(InterpolationMode::Spline(SplineBoundary::NotAKnot))]
    #[case(InterpolationMode::Spline(SplineBoundary::Natural))]
    fn reproduces_samples(#[case] mode: InterpolationMode) {
        let samples = circular_orbit_samples(25, 300.0);
        let targets = samples.iter().map(|s| s.epoch).collect::<Vec<_>>();

        let positions = interpolate(&samples, &targets, mode).unwrap();

        for (sample, position) in samples.iter().zip(positions.iter()) {
            let err = (sample.position_m - position).norm();
            assert!(err < 1.0E-6, "{}: {} m error at {}", mode, err, sample.epoch);
        }
    }

    #[rstest]
    #[case(InterpolationMode::Linear, 1)]
    #[case(InterpolationMode::Spline(SplineBoundary::NotAKnot), 3)]
    fn not_enough_samples(#[case] mode: InterpolationMode, #[case] size: usize) {
        let samples = circular_orbit_samples(size, 300.0);
        let targets = [samples[0].epoch];
        match interpolate(&samples, &targets, mode) {
            Err(Error::NotEnoughSamples {
                required, found, ..
            }) => {
                assert_eq!(required, mode.min_samples());
                assert_eq!(found, size);
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[rstest]
    #[case(InterpolationMode::Linear)]
    #[case(InterpolationMode::Spline(SplineBoundary::NotAKnot))]
    fn unsorted_samples(#[case] mode: InterpolationMode) {
        let mut samples = circular_orbit_samples(10, 300.0);
        samples.swap(3, 4);
        let targets = [samples[0].epoch];
        assert!(matches!(
            interpolate(&samples, &targets, mode),
            Err(Error::NonMonotonicEpochs(_))
        ));

        let mut samples = circular_orbit_samples(10, 300.0);
        samples[5].epoch = samples[4].epoch;
        assert!(matches!(
            interpolate(&samples, &targets, mode),
            Err(Error::NonMonotonicEpochs(_))
        ));
    }

    /// 25 samples at 5' resampled at 30"
    #[test]
    fn dense_resampling() {
        let samples = circular_orbit_samples(25, 300.0);
        let t0 = samples[0].epoch;

        let targets = (0..241)
            .map(|i| t0 + (i * 30) as f64 * Unit::Second)
            .collect::<Vec<_>>();

        assert_eq!(targets[240], samples[24].epoch);

        for mode in [
            InterpolationMode::Linear,
            InterpolationMode::Spline(SplineBoundary::NotAKnot),
        ] {
            let positions = interpolate(&samples, &targets, mode).unwrap();
            assert_eq!(positions.len(), 241);
        }
    }

    #[test]
    fn display() {
        assert_eq!(InterpolationMode::Linear.to_string(), "linear");
        assert_eq!(
            InterpolationMode::default().to_string(),
            "not-a-knot spline"
        );
    }
}
