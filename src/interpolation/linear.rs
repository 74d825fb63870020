use crate::{
    error::Error,
    orbit::OrbitSample,
    prelude::{Epoch, Vector3},
};

/// Linear interpolation between the two `samples` that bracket `epoch`.
/// `samples` are expected sorted and validated.
pub(crate) fn interpolate_at(samples: &[OrbitSample], epoch: Epoch) -> Result<Vector3<f64>, Error> {
    let (first, last) = OrbitSample::time_span(samples).ok_or(Error::EmptySeries)?;

    if epoch < first || epoch > last {
        return Err(Error::OutsideInterpolationSpan(epoch));
    }

    let upper = samples.partition_point(|s| s.epoch <= epoch);
    let i = upper.saturating_sub(1).min(samples.len().saturating_sub(2));

    let (before, after) = match (samples.get(i), samples.get(i + 1)) {
        (Some(before), Some(after)) => (before, after),
        (Some(only), None) => return Ok(only.position_m),
        _ => return Err(Error::OutsideInterpolationSpan(epoch)),
    };

    let dt = (after.epoch - before.epoch).to_seconds();
    let alpha = (epoch - before.epoch).to_seconds() / dt;

    Ok(before.position_m + (after.position_m - before.position_m) * alpha)
}
