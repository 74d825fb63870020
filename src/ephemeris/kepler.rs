use log::{debug, warn};
use nalgebra::{Rotation3, Vector3};

use crate::{
    constants::{
        EARTH_ANGULAR_VEL_RAD, EARTH_GRAVITATION_MU_M3_S2, HALF_WEEK_SECONDS, SECONDS_PER_WEEK,
    },
    ephemeris::BroadcastEphemeris,
    prelude::Epoch,
};

/// Broadcast orbit resolved at a given [Epoch]
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct KeplerSolution {
    /// ECEF position (in meters)
    pub position_m: Vector3<f64>,
    /// Elapsed time since ToE (in seconds)
    pub t_k: f64,
    /// False when the iteration reached its cap
    pub converged: bool,
}

/// Folds an elapsed time into +/- half a week (week crossover).
pub(crate) fn week_crossover(t_k: f64) -> f64 {
    if t_k > HALF_WEEK_SECONDS {
        t_k - SECONDS_PER_WEEK
    } else if t_k < -HALF_WEEK_SECONDS {
        t_k + SECONDS_PER_WEEK
    } else {
        t_k
    }
}

/// Solves Kepler's equation M = E - e sin(E) for the eccentric anomaly E,
/// with Newton iterations. Returns the last iterate and whether
/// `tolerance` was reached within `max_iter` iterations.
pub(crate) fn solve_kepler(m: f64, e: f64, tolerance: f64, max_iter: usize) -> (f64, bool) {
    let mut e_k = m;

    for _ in 0..max_iter {
        let (sin_e_k, cos_e_k) = e_k.sin_cos();
        let delta = (e_k - e * sin_e_k - m) / (1.0 - e * cos_e_k);
        e_k -= delta;
        if delta.abs() < tolerance {
            return (e_k, true);
        }
    }

    (e_k, false)
}

impl BroadcastEphemeris {
    /// Elapsed time (in seconds) between ToE and `epoch`, within the GNSS week.
    pub(crate) fn t_k(&self, epoch: Epoch) -> f64 {
        let epoch = epoch.to_time_scale(self.timescale());
        let t_sow = (epoch.to_time_of_week().1 as f64) / 1.0E9;
        week_crossover(t_sow - self.weekly_toe_seconds())
    }

    /// Resolves the broadcast position at `epoch`, in ECEF meters.
    /// The Kepler equation is solved to `tolerance` (radians), within `max_iter` iterations.
    /// The last iterate is used when the cap is reached.
    pub(crate) fn position_ecef(&self, epoch: Epoch, tolerance: f64, max_iter: usize) -> KeplerSolution {
        let e = self.eccentricity;
        let a = self.semi_major_axis_m();

        let (cus, cuc) = self.cus_cuc_rad;
        let (cis, cic) = self.cis_cic_rad;
        let (crs, crc) = self.crs_crc_m;
        let (i0, idot) = (self.i0_rad, self.idot_rad_s);
        let (omega0, omega, omega_dot) = (self.omega0_rad, self.omega_rad, self.omega_dot_rad_s);

        let t_k = self.t_k(epoch);

        let n0 = (EARTH_GRAVITATION_MU_M3_S2 / a.powi(3)).sqrt();
        let n = n0 + self.dn_rad;
        let m_k = self.m0_rad + n * t_k;

        let (e_k, converged) = solve_kepler(m_k, e, tolerance, max_iter);
        if !converged {
            warn!(
                "{}({}) - kepler solver reached {} iterations without convergence",
                epoch, self.sv, max_iter
            );
        }

        let (sin_e_k, cos_e_k) = e_k.sin_cos();
        let v_k = ((1.0 - e.powi(2)).sqrt() * sin_e_k).atan2(cos_e_k - e);

        let phi = v_k + omega;
        let (sin_2phi, cos_2phi) = (2.0 * phi).sin_cos();

        let u_k = phi + cuc * cos_2phi + cus * sin_2phi;
        let r_k = a * (1.0 - e * cos_e_k) + crc * cos_2phi + crs * sin_2phi;
        let i_k = i0 + idot * t_k + cic * cos_2phi + cis * sin_2phi;
        let omega_k = omega0 + (omega_dot - EARTH_ANGULAR_VEL_RAD) * t_k
            - EARTH_ANGULAR_VEL_RAD * self.weekly_toe_seconds();

        let orbital = Vector3::new(r_k * u_k.cos(), r_k * u_k.sin(), 0.0);

        // orbital plane to ECEF rotation
        let rot_x3 = Rotation3::from_axis_angle(&Vector3::x_axis(), i_k);
        let rot_z3 = Rotation3::from_axis_angle(&Vector3::z_axis(), omega_k);
        let position_m = rot_z3 * rot_x3 * orbital;

        debug!(
            "{}({}) - kepler solving x={:.3} y={:.3} z={:.3} t_k={}",
            epoch, self.sv, position_m[0], position_m[1], position_m[2], t_k
        );

        KeplerSolution {
            position_m,
            t_k,
            converged,
        }
    }
}
