/// Earth angular velocity, in WGS84 frame rad/s
pub const EARTH_ANGULAR_VEL_RAD: f64 = 7.2921151467E-5;

/// Earth gravitational constant, as used by the legacy GPS navigation model (m^3 s-2)
pub const EARTH_GRAVITATION_MU_M3_S2: f64 = 3.986005E14;

/// Duration of one week, in seconds
pub const SECONDS_PER_WEEK: f64 = 604_800.0;

/// Half a week: elapsed times are folded into +/- this range
pub const HALF_WEEK_SECONDS: f64 = SECONDS_PER_WEEK / 2.0;

/// SP3 coordinates of this magnitude (km) or above are "bad value" markers
pub const SP3_BAD_POSITION_KM: f64 = 999_999.0;

/// SP3 clock "bad value" marker (us)
pub const SP3_BAD_CLOCK_US: f64 = 999_999.999_999;
