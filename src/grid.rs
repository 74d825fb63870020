use hifitime::TimeSeries;

use crate::{
    error::Error,
    orbit::OrbitSample,
    prelude::{Duration, Epoch},
};

/// Regular sampling of a time span: `start, start + step, ...`, never past `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    step: Duration,
    epochs: Vec<Epoch>,
}

impl TimeGrid {
    /// Builds a new [TimeGrid] over `[start, end]`, at `step`.
    /// The last epoch is `end` only when the span is a multiple of `step`.
    pub fn new(start: Epoch, end: Epoch, step: Duration) -> Result<Self, Error> {
        if step <= Duration::ZERO {
            return Err(Error::InvalidStep);
        }
        if start > end {
            return Err(Error::InvalidTimeSpan(start, end));
        }

        let epochs = TimeSeries::inclusive(start, end, step).collect::<Vec<_>>();

        Ok(Self { step, epochs })
    }

    /// Builds a [TimeGrid] that spans the precise `samples`, at `step`.
    /// This grid never exceeds the precise coverage.
    pub fn from_samples(samples: &[OrbitSample], step: Duration) -> Result<Self, Error> {
        let (start, end) = OrbitSample::time_span(samples).ok_or(Error::EmptySeries)?;
        Self::new(start, end, step)
    }

    /// Sampling period
    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn epochs(&self) -> &[Epoch] {
        &self.epochs
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn first(&self) -> Option<Epoch> {
        self.epochs.first().copied()
    }

    pub fn last(&self) -> Option<Epoch> {
        self.epochs.last().copied()
    }
}

/// Regular epochs `start, start + step, ...`, never past `end`.
/// See [TimeGrid::new].
pub fn build_grid(start: Epoch, end: Epoch, step: Duration) -> Result<Vec<Epoch>, Error> {
    let grid = TimeGrid::new(start, end, step)?;
    Ok(grid.epochs)
}
