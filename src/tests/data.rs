use std::str::FromStr;

use hifitime::Unit;

use crate::prelude::{
    propagate, BroadcastEphemeris, Config, Constellation, Epoch, OrbitSample, SV,
};

pub const NAV_V3: &str = "     3.04           N: GNSS NAV DATA    M: MIXED            RINEX VERSION / TYPE
gnss-sim            test                20240101 000000 UTC PGM / RUN BY / DATE
                                                            END OF HEADER
G05 2024 01 01 04 00 00-1.234567890123D-04-4.547473508865D-12 0.000000000000D+00
     4.600000000000D+01 2.000000000000D+01 4.500000000000D-09 1.050000000000D+00
     1.000000000000D-06 1.000000000000D-02 5.000000000000D-06 5.153600000000D+03
     1.008000000000D+05 1.000000000000D-07-1.200000000000D+00-5.000000000000D-08
     9.600000000000D-01 2.500000000000D+02 8.000000000000D-01-8.000000000000D-09
     1.000000000000D-10 1.000000000000D+00 2.295000000000D+03 0.000000000000D+00
     2.000000000000D+00 0.000000000000D+00-4.190951585770D-09 4.600000000000D+01
     8.640000000000D+04 4.000000000000D+00
G07 2024 01 01 02 00 00-1.234567890123D-04-4.547473508865D-12 0.000000000000D+00
     4.500000000000D+01 2.000000000000D+01 4.500000000000D-09 2.500000000000D+00
     1.000000000000D-06 1.000000000000D-02 5.000000000000D-06 5.153600000000D+03
     9.360000000000D+04 1.000000000000D-07-1.200000000000D+00-5.000000000000D-08
     9.600000000000D-01 2.500000000000D+02 8.000000000000D-01-8.000000000000D-09
     1.000000000000D-10 1.000000000000D+00 2.295000000000D+03 0.000000000000D+00
     2.000000000000D+00 0.000000000000D+00-4.190951585770D-09 4.500000000000D+01
     8.640000000000D+04 4.000000000000D+00
G05 2024 01 01 02 00 00-1.234567890123D-04-4.547473508865D-12 0.000000000000D+00
     4.500000000000D+01 2.000000000000D+01 4.500000000000D-09 5.000000000000D-01
     1.000000000000D-06 1.000000000000D-02 5.000000000000D-06 5.153600000000D+03
     9.360000000000D+04 1.000000000000D-07-1.200000000000D+00-5.000000000000D-08
     9.600000000000D-01 2.500000000000D+02 8.000000000000D-01-8.000000000000D-09
     1.000000000000D-10 1.000000000000D+00 2.295000000000D+03 0.000000000000D+00
     2.000000000000D+00 0.000000000000D+00-4.190951585770D-09 4.500000000000D+01
     8.640000000000D+04 4.000000000000D+00
G05 2024 01 01 02 00 00-1.234567890123D-04-4.547473508865D-12 0.000000000000D+00
     4.500000000000D+01 2.000000000000D+01 4.500000000000D-09 5.000000000000D-01
     1.000000000000D-06 1.000000000000D-02 5.000000000000D-06 5.153600000000D+03
     9.360000000000D+04 1.000000000000D-07-1.200000000000D+00-5.000000000000D-08
     9.600000000000D-01 2.500000000000D+02 8.000000000000D-01-8.000000000000D-09
     1.000000000000D-10 1.000000000000D+00 2.295000000000D+03 0.000000000000D+00
     2.000000000000D+00 0.000000000000D+00-4.190951585770D-09 4.500000000000D+01
     8.640000000000D+04 4.000000000000D+00
G05 2024 01 01 06 00 00-1.234567890123D-04-4.547473508865D-12 0.000000000000D+00
     4.700000000000D+01 2.000000000000D+01 4.500000000000D-09 1.600000000000D+00
     1.000000000000D-06 1.000000000000D-02 5.000000000000D-06 5.153600000000D+03
";

pub const NAV_V2: &str = "     2.11           N: GPS NAV DATA                         RINEX VERSION / TYPE
gnss-sim            test                20240101 000000 UTC PGM / RUN BY / DATE
                                                            END OF HEADER
 5 24  1  1  2  0  0.0-1.234567890123D-04-4.547473508865D-12 0.000000000000D+00
    4.500000000000D+01 2.000000000000D+01 4.500000000000D-09 5.000000000000D-01
    1.000000000000D-06 1.000000000000D-02 5.000000000000D-06 5.153600000000D+03
    9.360000000000D+04 1.000000000000D-07-1.200000000000D+00-5.000000000000D-08
    9.600000000000D-01 2.500000000000D+02 8.000000000000D-01-8.000000000000D-09
    1.000000000000D-10 1.000000000000D+00 2.295000000000D+03 0.000000000000D+00
    2.000000000000D+00 0.000000000000D+00-4.190951585770D-09 4.500000000000D+01
    8.640000000000D+04 4.000000000000D+00
";

pub fn g05() -> SV {
    SV::new(Constellation::GPS, 5)
}

/// G05 frame published at 2024-01-01 02:00:00 GPST
pub fn g05_ephemeris() -> BroadcastEphemeris {
    let toe = Epoch::from_str("2024-01-01T02:00:00 GPST").unwrap();
    BroadcastEphemeris {
        sv: g05(),
        toc: toe,
        toe,
        iode: 45,
        clock: (-1.234567890123E-4, -4.547473508865E-12, 0.0),
        fit_interval_h: Some(4.0),
        sqrt_a: 5153.6,
        eccentricity: 0.01,
        m0_rad: 0.5,
        i0_rad: 0.96,
        idot_rad_s: 1.0E-10,
        dn_rad: 4.5E-9,
        omega0_rad: -1.2,
        omega_rad: 0.8,
        omega_dot_rad_s: -8.0E-9,
        cus_cuc_rad: (5.0E-6, 1.0E-6),
        cis_cic_rad: (-5.0E-8, 1.0E-7),
        crs_crc_m: (20.0, 250.0),
    }
}

/// `size` samples of a circular, inclined, GPS like orbit, every `step_s` seconds
/// starting 2024-01-01 00:00:00 UTC.
pub fn circular_orbit_samples(size: usize, step_s: f64) -> Vec<OrbitSample> {
    let t0 = Epoch::from_str("2024-01-01T00:00:00 UTC").unwrap();
    let radius_m = 26_560.0E3;
    let rate_rad_s = 2.0 * std::f64::consts::PI / 43_082.0;
    let (sin_i, cos_i) = 55.0_f64.to_radians().sin_cos();

    (0..size)
        .map(|i| {
            let dt = i as f64 * step_s;
            let (sin_u, cos_u) = (rate_rad_s * dt).sin_cos();
            OrbitSample::new(
                t0 + dt * Unit::Second,
                radius_m * cos_u,
                radius_m * sin_u * cos_i,
                radius_m * sin_u * sin_i,
            )
        })
        .collect()
}

/// Writes an SP3 (revision d, GPST) precise orbit of G05 from `ephemerides`:
/// `size` epochs every `step_s` seconds from 2024-01-01 00:00:00 GPST (within that day),
/// rounded to the millimeter like precise products are.
/// Also writes one G07 position at each epoch.
pub fn sp3_from_ephemerides(ephemerides: &[BroadcastEphemeris], size: usize, step_s: f64) -> String {
    let cfg = Config::default();
    let t0 = sp3_start();

    let mut content = sp3_header(size, step_s, "GPS");
    content.push_str("/* generated broadcast orbit\n");

    for i in 0..size {
        let elapsed_s = i as f64 * step_s;
        let t = t0 + elapsed_s * Unit::Second;

        let hours = (elapsed_s / 3600.0).floor();
        let minutes = ((elapsed_s - hours * 3600.0) / 60.0).floor();
        let seconds = elapsed_s - hours * 3600.0 - minutes * 60.0;

        content.push_str(&format!(
            "*  2024  1  1 {:2} {:2} {:11.8}\n",
            hours as u8, minutes as u8, seconds
        ));

        let state = propagate(ephemerides, t, &cfg).unwrap();
        let km = state.position_m / 1.0E3;

        content.push_str(&format!(
            "PG05{:14.6}{:14.6}{:14.6}{:14.6}\n",
            km[0], km[1], km[2], -123.456789
        ));
        content.push_str(&format!(
            "PG07{:14.6}{:14.6}{:14.6}{:14.6}\n",
            -km[1], km[0], km[2], 12.345678
        ));
    }

    content.push_str("EOF\n");
    content
}

/// SP3 (revision d) header of [sp3_from_ephemerides],
/// `system` being the 3 letter time system code.
pub fn sp3_header(size: usize, step_s: f64, system: &str) -> String {
    let mut header = format!(
        "#dP2024  1  1  0  0  0.00000000 {:7} ORBIT IGS20 HLM  TEST\n",
        size
    );
    header.push_str(&format!(
        "## 2295  86400.00000000 {:14.8} 60310 0.0000000000000\n",
        step_s
    ));
    header.push_str(&format!("+    2   G05G07{}\n", "  0".repeat(15)));
    for _ in 0..4 {
        header.push_str(&format!("+        {}\n", "  0".repeat(17)));
    }
    header.push_str(&format!("++         2  2{}\n", "  0".repeat(15)));
    for _ in 0..4 {
        header.push_str(&format!("++       {}\n", "  0".repeat(17)));
    }
    header.push_str(&format!(
        "%c M  cc {} ccc cccc cccc cccc cccc ccccc ccccc ccccc ccccc\n",
        system
    ));
    header.push_str("%c cc cc ccc ccc cccc cccc cccc cccc ccccc ccccc ccccc ccccc\n");
    header.push_str("%f  1.2500000  1.025000000  0.00000000000  0.000000000000000\n");
    header.push_str("%f  0.0000000  0.000000000  0.00000000000  0.000000000000000\n");
    header.push_str("%i    0    0    0    0      0      0      0      0         0\n");
    header.push_str("%i    0    0    0    0      0      0      0      0         0\n");
    header
}

/// First epoch of [sp3_from_ephemerides]
pub fn sp3_start() -> Epoch {
    Epoch::from_str("2024-01-01T00:00:00 GPST").unwrap()
}
