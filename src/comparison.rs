use log::{debug, warn};

use crate::{
    averager::Averager,
    error::Error,
    prelude::{Epoch, Vector3},
};

/// Precise versus broadcast positions, at one [Epoch]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ComparisonRecord {
    pub epoch: Epoch,
    /// Interpolated precise ECEF position (in meters)
    pub precise_m: Vector3<f64>,
    /// Propagated broadcast ECEF position (in meters)
    pub broadcast_m: Vector3<f64>,
    /// Component difference: precise - broadcast (in meters)
    pub delta_m: Vector3<f64>,
    /// 3D error: norm of the component difference (in meters)
    pub error_3d_m: f64,
}

impl ComparisonRecord {
    pub fn new(epoch: Epoch, precise_m: Vector3<f64>, broadcast_m: Vector3<f64>) -> Self {
        let delta_m = precise_m - broadcast_m;
        Self {
            epoch,
            precise_m,
            broadcast_m,
            delta_m,
            error_3d_m: delta_m.norm(),
        }
    }
}

/// 3D error statistics over a [ComparisonRecord] set
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ComparisonSummary {
    pub max_3d_m: f64,
    pub rms_3d_m: f64,
    pub mean_3d_m: f64,
    /// Number of records that contributed
    pub count: usize,
}

impl std::fmt::Display for ComparisonSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "max={:.3}m rms={:.3}m mean={:.3}m ({} epochs)",
            self.max_3d_m, self.rms_3d_m, self.mean_3d_m, self.count
        )
    }
}

impl ComparisonSummary {
    fn from_records(records: &[ComparisonRecord]) -> Result<Self, Error> {
        let mut averager = Averager::new();

        for record in records.iter() {
            if record.error_3d_m.is_finite() {
                averager.add(record.error_3d_m);
            } else {
                warn!("{} - non finite 3D error: excluded from statistics", record.epoch);
            }
        }

        if averager.count == 0 {
            return Err(Error::EmptyComparison);
        }

        Ok(Self {
            max_3d_m: averager.max,
            rms_3d_m: averager.rms(),
            mean_3d_m: averager.mean(),
            count: averager.count as usize,
        })
    }
}

/// Compares `precise` and `broadcast` positions (in meters), aligned on `epochs`.
/// Produces one [ComparisonRecord] per epoch, in the same order, and
/// the [ComparisonSummary] of the full set.
pub fn compare(
    precise: &[Vector3<f64>],
    broadcast: &[Vector3<f64>],
    epochs: &[Epoch],
) -> Result<(Vec<ComparisonRecord>, ComparisonSummary), Error> {
    if precise.len() != epochs.len() || broadcast.len() != epochs.len() {
        return Err(Error::MisalignedSeries);
    }

    if epochs.is_empty() {
        return Err(Error::EmptyComparison);
    }

    let records = epochs
        .iter()
        .zip(precise.iter().zip(broadcast.iter()))
        .map(|(t, (p, b))| ComparisonRecord::new(*t, *p, *b))
        .collect::<Vec<_>>();

    let summary = ComparisonSummary::from_records(&records)?;
    debug!("comparison: {}", summary);

    Ok((records, summary))
}
