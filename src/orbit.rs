use itertools::Itertools;

use crate::{
    error::Error,
    prelude::{Epoch, Vector3},
};

/// One precise position of a satellite.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitSample {
    /// [Epoch] of this state, expressed in UTC
    pub epoch: Epoch,
    /// ECEF position (in meters)
    pub position_m: Vector3<f64>,
}

impl OrbitSample {
    /// Builds a new [OrbitSample] from ECEF coordinates in meters.
    pub fn new(epoch: Epoch, x_m: f64, y_m: f64, z_m: f64) -> Self {
        Self {
            epoch,
            position_m: Vector3::new(x_m, y_m, z_m),
        }
    }

    /// Builds a new [OrbitSample] from ECEF coordinates in kilometers,
    /// which is how precise products express them.
    pub fn from_km(epoch: Epoch, x_km: f64, y_km: f64, z_km: f64) -> Self {
        Self::new(epoch, x_km * 1.0E3, y_km * 1.0E3, z_km * 1.0E3)
    }

    /// Returns (first, last) [Epoch] covered by this series,
    /// None when the series is empty.
    pub fn time_span(samples: &[Self]) -> Option<(Epoch, Epoch)> {
        let first = samples.first()?;
        let last = samples.last()?;
        Some((first.epoch, last.epoch))
    }

    /// Verifies the series is strictly increasing in time
    /// (which also rules out duplicated epochs).
    pub(crate) fn check_monotonic(samples: &[Self]) -> Result<(), Error> {
        match samples
            .iter()
            .tuple_windows()
            .find(|(prev, next)| next.epoch <= prev.epoch)
        {
            Some((_, next)) => Err(Error::NonMonotonicEpochs(next.epoch)),
            None => Ok(()),
        }
    }
}
