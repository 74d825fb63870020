use log::debug;

use crate::{
    cfg::Config,
    error::Error,
    prelude::{Duration, Epoch, TimeScale, Vector3, SV},
};

mod kepler;
mod parsing;

pub use parsing::parse_ephemerides;

/// Broadcast navigation message of one satellite (legacy Keplerian frame).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BroadcastEphemeris {
    /// [SV]
    pub sv: SV,

    /// Time of Clock, expressed in the [SV] timescale
    pub toc: Epoch,

    /// Time of Ephemeris, reference [Epoch] of the orbital elements,
    /// expressed in the [SV] timescale
    pub toe: Epoch,

    /// Issue of Data (ephemeris)
    pub iode: u16,

    /// Clock bias (s), drift (s.s⁻¹) and drift rate (s.s⁻²)
    pub clock: (f64, f64, f64),

    /// Curve fit interval (in hours), when published
    pub fit_interval_h: Option<f64>,

    /// Square root of the semi-major axis (in m^1/2)
    pub sqrt_a: f64,

    /// Eccentricity
    pub eccentricity: f64,

    /// m0 (in radians)
    pub m0_rad: f64,

    /// (in radians)
    pub i0_rad: f64,

    /// (in radians/s)
    pub idot_rad_s: f64,

    /// Mean motion correction (in radians/s)
    pub dn_rad: f64,

    /// Longitude of ascending node (in radians)
    pub omega0_rad: f64,

    /// Argument of perigee (in radians)
    pub omega_rad: f64,

    /// (in radians/s)
    pub omega_dot_rad_s: f64,

    /// Sine / Cosine (in radians)
    pub cus_cuc_rad: (f64, f64),

    /// Sine / Cosine (in radians)
    pub cis_cic_rad: (f64, f64),

    /// Sine / Cosine (in meters)
    pub crs_crc_m: (f64, f64),
}

impl BroadcastEphemeris {
    /// Semi-major axis (in meters)
    pub fn semi_major_axis_m(&self) -> f64 {
        self.sqrt_a.powi(2)
    }

    /// Returns True if this [BroadcastEphemeris] may describe an elliptical orbit.
    pub fn is_physical(&self) -> bool {
        self.sqrt_a.is_finite()
            && self.sqrt_a > 0.0
            && self.eccentricity.is_finite()
            && (0.0..1.0).contains(&self.eccentricity)
    }

    /// [TimeScale] in which this frame is expressed.
    pub fn timescale(&self) -> TimeScale {
        self.sv.constellation.timescale().unwrap_or(TimeScale::GPST)
    }

    /// Age of this frame at `now`.
    pub fn age(&self, now: Epoch) -> Duration {
        (now - self.toe).abs()
    }

    /// Returns True if this frame is still within `max_dtoe` of `now`.
    pub fn is_valid(&self, now: Epoch, max_dtoe: Duration) -> bool {
        self.age(now) <= max_dtoe
    }

    /// Returns ToE in seconds of week
    pub fn weekly_toe_seconds(&self) -> f64 {
        (self.toe.to_time_of_week().1 as f64) / 1.0E9
    }
}

/// Broadcast position of a satellite at a given [Epoch].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BroadcastState {
    /// [Epoch] of this state
    pub epoch: Epoch,
    /// ToE of the [BroadcastEphemeris] this state was resolved from
    pub toe: Epoch,
    /// ECEF position (in meters)
    pub position_m: Vector3<f64>,
    /// Distance to the reference epoch of the selected frame
    pub age: Duration,
    /// False when the selected frame was older than the validity window:
    /// this state is still usable for comparison, with lower confidence.
    pub within_validity: bool,
    /// False when the Kepler iteration reached its cap
    pub converged: bool,
}

/// Selects the [BroadcastEphemeris] whose reference epoch is the closest to `epoch`.
/// Ties are resolved to the earlier reference epoch.
/// `ephemerides` must be sorted by ToE, as returned by [parse_ephemerides].
pub fn select(ephemerides: &[BroadcastEphemeris], epoch: Epoch) -> Option<&BroadcastEphemeris> {
    // min_by_key returns the first minimum
    ephemerides.iter().min_by_key(|eph| eph.age(epoch))
}

/// Propagates the broadcast orbit to `epoch`, using the closest frame in `ephemerides`.
///
/// Frames older than [Config::max_toe_age] are still used (best effort),
/// the returned [BroadcastState] is then flagged as outside validity.
pub fn propagate(
    ephemerides: &[BroadcastEphemeris],
    epoch: Epoch,
    cfg: &Config,
) -> Result<BroadcastState, Error> {
    let eph = select(ephemerides, epoch).ok_or(Error::NoEphemerisAvailable)?;

    let age = eph.age(epoch);
    let within_validity = eph.is_valid(epoch, cfg.max_toe_age);

    if !within_validity {
        debug!(
            "{}({}) - toe={} is {} old: past validity window",
            epoch, eph.sv, eph.toe, age
        );
    }

    let solution = eph.position_ecef(epoch, cfg.kepler_tolerance_rad, cfg.kepler_max_iter);

    Ok(BroadcastState {
        epoch,
        toe: eph.toe,
        position_m: solution.position_m,
        age,
        within_validity,
        converged: solution.converged,
    })
}
