//! Precise orbit (SP3) parsing
use std::io::{BufRead, BufReader};

use itertools::Itertools;
use log::{debug, warn};
use sp3::prelude::SP3;

use crate::{
    constants::{SP3_BAD_CLOCK_US, SP3_BAD_POSITION_KM},
    error::{Error, LineError},
    orbit::OrbitSample,
    prelude::{Constellation, Duration, Epoch, TimeScale, SV},
    sv::parse_legacy_sv,
};

/// Time system declared in the SP3 header,
/// with the fixed offset that separates it from its [TimeScale].
#[derive(Debug, Copy, Clone, PartialEq)]
struct TimeSystem {
    timescale: TimeScale,
    offset: Duration,
}

impl Default for TimeSystem {
    fn default() -> Self {
        Self {
            timescale: TimeScale::GPST,
            offset: Duration::ZERO,
        }
    }
}

impl TimeSystem {
    /// Interprets the "%c" header time system code.
    fn from_code(code: &str) -> Option<Self> {
        let (timescale, offset) = match code.trim() {
            "GPS" => (TimeScale::GPST, Duration::ZERO),
            "GAL" => (TimeScale::GST, Duration::ZERO),
            "BDT" => (TimeScale::BDT, Duration::ZERO),
            "QZS" => (TimeScale::QZSST, Duration::ZERO),
            "TAI" => (TimeScale::TAI, Duration::ZERO),
            "UTC" => (TimeScale::UTC, Duration::ZERO),
            // GLONASS time runs 3 hours ahead of UTC
            "GLO" => (TimeScale::UTC, Duration::from_seconds(3.0 * 3600.0)),
            _ => return None,
        };
        Some(Self { timescale, offset })
    }

    /// "%c" code under which the SP3 parser dates epochs in [Self::timescale].
    fn code(&self) -> &'static str {
        match self.timescale {
            TimeScale::GST => "GAL",
            TimeScale::BDT => "BDT",
            TimeScale::QZSST => "QZS",
            TimeScale::TAI => "TAI",
            TimeScale::UTC => "UTC",
            _ => "GPS",
        }
    }

    /// Converts an epoch dated in [Self::timescale] to UTC.
    fn to_utc(&self, t: Epoch) -> Epoch {
        (t - self.offset).to_time_scale(TimeScale::UTC)
    }
}

/// Calendar content of an epoch marker
#[derive(Debug, Copy, Clone, PartialEq)]
struct EpochMarker {
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    seconds: f64,
}

impl EpochMarker {
    /// Parses "*  2024  1  1  0  5  0.00000000", which must be a valid
    /// date once expressed in `timescale`.
    fn parse(line: &str, timescale: TimeScale) -> Result<Self, LineError> {
        let content = line.get(1..).ok_or(LineError::TooShort)?;

        let items = content.split_whitespace().collect::<Vec<_>>();
        if items.len() < 6 {
            return Err(LineError::TooShort);
        }

        let marker = Self {
            year: items[0].parse::<i32>()?,
            month: items[1].parse::<u8>()?,
            day: items[2].parse::<u8>()?,
            hour: items[3].parse::<u8>()?,
            minute: items[4].parse::<u8>()?,
            seconds: items[5].parse::<f64>()?,
        };

        marker.epoch(timescale)?;
        Ok(marker)
    }

    fn epoch(&self, timescale: TimeScale) -> Result<Epoch, LineError> {
        let whole = self.seconds.trunc();
        let nanos = ((self.seconds - whole) * 1.0E9).round().min(999_999_999.0) as u32;

        Ok(Epoch::maybe_from_gregorian(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            whole as u8,
            nanos,
            timescale,
        )?)
    }
}

impl std::fmt::Display for EpochMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "*  {:4} {:2} {:2} {:2} {:2} {:11.8}",
            self.year, self.month, self.day, self.hour, self.minute, self.seconds
        )
    }
}

/// Parses a position record: "PG05 -12345.678901  23456.789012 ..."
/// Returns the [SV] and its coordinates in kilometers.
fn parse_position(line: &str) -> Result<(SV, (f64, f64, f64)), LineError> {
    let svnn = line.get(1..4).ok_or(LineError::TooShort)?;

    let sv = parse_legacy_sv(svnn, Constellation::GPS)
        .ok_or_else(|| LineError::Satellite(svnn.to_string()))?;

    let x_km = line.get(4..18).ok_or(LineError::TooShort)?.trim().parse::<f64>()?;
    let y_km = line.get(18..32).ok_or(LineError::TooShort)?.trim().parse::<f64>()?;
    let z_km = line.get(32..46).ok_or(LineError::TooShort)?.trim().parse::<f64>()?;

    Ok((sv, (x_km, y_km, z_km)))
}

/// Returns true when these coordinates are the "no data" marker.
fn is_bad_position(x_km: f64, y_km: f64, z_km: f64) -> bool {
    let missing = x_km == 0.0 && y_km == 0.0 && z_km == 0.0;
    let bad_value = [x_km, y_km, z_km]
        .iter()
        .any(|v| !v.is_finite() || v.abs() >= SP3_BAD_POSITION_KM);
    missing || bad_value
}

/// SP3 content reduced to what the SP3 parser accepts: header,
/// valid epoch markers and well formed position records, in canonical layout.
#[derive(Debug, Default)]
struct Screened {
    content: String,
    system: TimeSystem,
    has_marker: bool,
    positions: usize,
}

impl Screened {
    fn push(&mut self, line: &str) {
        self.content.push_str(line);
        self.content.push('\n');
    }

    /// Screens SP3 content line by line. Malformed lines are dropped with a warning,
    /// position records that can't be dated are dropped too.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut screened = Self::default();
        let mut declared = false;
        let mut dated = false;

        for (nth, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = nth + 1;

            if line.trim().is_empty() {
                continue;
            }

            if line.starts_with('*') {
                screened.has_marker = true;
                match EpochMarker::parse(&line, screened.system.timescale) {
                    Ok(marker) => {
                        dated = true;
                        screened.push(&marker.to_string());
                    },
                    Err(e) => {
                        warn!("sp3 (line {}): invalid epoch marker: {}", line_num, e);
                        // following records can't be dated
                        dated = false;
                    },
                }
                continue;
            }

            if !screened.has_marker {
                if line.starts_with("%c") && !declared {
                    // only the first %c line carries the time system
                    declared = true;
                    let code = line.get(9..12).unwrap_or_default();
                    screened.system = TimeSystem::from_code(code).unwrap_or_else(|| {
                        warn!("sp3 (line {}): unknown time system \"{}\", assuming GPST", line_num, code);
                        TimeSystem::default()
                    });

                    let (head, tail) = (line.get(..9), line.get(12..));
                    match (head, tail) {
                        (Some(head), Some(tail)) => {
                            let normalized = format!("{}{}{}", head, screened.system.code(), tail);
                            screened.push(&normalized);
                        },
                        _ => screened.push(&line),
                    }
                } else {
                    screened.push(&line);
                }
                continue;
            }

            if !line.starts_with('P') {
                // velocity, correlation, comments, repeated headers..
                continue;
            }

            match parse_position(&line) {
                Ok((sv, (x_km, y_km, z_km))) => {
                    if !dated {
                        warn!("sp3 (line {}): {}", line_num, LineError::OrphanPosition);
                        continue;
                    }

                    let clock_us = line
                        .get(46..60)
                        .and_then(|clock| clock.trim().parse::<f64>().ok())
                        .unwrap_or(SP3_BAD_CLOCK_US);

                    screened.push(&format!(
                        "P{}{:14.6}{:14.6}{:14.6}{:14.6}",
                        sv, x_km, y_km, z_km, clock_us
                    ));
                    screened.positions += 1;
                },
                Err(e) => {
                    warn!("sp3 (line {}): skipped: {}", line_num, e);
                },
            }
        }

        screened.push("EOF");
        Ok(screened)
    }

    fn parse(&self) -> Result<SP3, Error> {
        let mut reader = BufReader::new(self.content.as_bytes());
        SP3::from_reader(&mut reader).map_err(|e| Error::Sp3Format(e.to_string()))
    }
}

/// Parses the precise orbit of `sv` from SP3 content.
///
/// Epoch markers are converted from the file time system to UTC, positions
/// from kilometers to meters. Records of other satellites, velocity and
/// correlation records are disregarded. Malformed lines are skipped
/// with a warning: this only fails when the file has no epoch marker,
/// when the remaining content is not valid SP3,
/// or when not a single valid position was found for `sv`.
///
/// The returned series is strictly increasing in time.
pub fn parse_precise<R: BufRead>(reader: R, sv: SV) -> Result<Vec<OrbitSample>, Error> {
    let screened = Screened::from_reader(reader)?;

    if !screened.has_marker {
        return Err(Error::Sp3NoEpochMarker);
    }

    let sp3 = screened.parse()?;
    let system = screened.system;

    let mut samples = sp3
        .data
        .iter()
        .filter(|(key, _)| key.sv == sv)
        .filter_map(|(key, entry)| {
            let (x_km, y_km, z_km) = entry.position_km;
            let t = system.to_utc(key.epoch);
            if is_bad_position(x_km, y_km, z_km) {
                debug!("{}({}) - sp3 missing position", t, sv);
                None
            } else {
                Some(OrbitSample::from_km(t, x_km, y_km, z_km))
            }
        })
        .collect::<Vec<_>>();

    samples.sort_by_key(|s| s.epoch);

    let total = samples.len();
    let samples = samples
        .into_iter()
        .dedup_by(|a, b| a.epoch == b.epoch)
        .collect::<Vec<_>>();

    if samples.len() < total {
        warn!("sp3: {} duplicated epochs dropped for {}", total - samples.len(), sv);
    }

    if samples.is_empty() {
        return Err(Error::NoPreciseSamples(sv));
    }

    debug!(
        "sp3: {} precise positions for {} ({} position records)",
        samples.len(),
        sv,
        screened.positions
    );

    Ok(samples)
}

/// Lists all satellites that have at least one position record in this SP3 content,
/// sorted.
pub fn satellites<R: BufRead>(reader: R) -> Result<Vec<SV>, Error> {
    let screened = Screened::from_reader(reader)?;

    if !screened.has_marker {
        return Ok(Vec::new());
    }

    let sp3 = screened.parse()?;
    Ok(sp3.data.keys().map(|key| key.sv).unique().sorted().collect())
}

#[cfg(test)]
mod test {
    use super::{is_bad_position, parse_position, EpochMarker, Screened, TimeSystem};
    use crate::prelude::{Constellation, Epoch, TimeScale, SV};
    use std::str::FromStr;

    #[test]
    fn epoch_markers() {
        let marker = EpochMarker::parse("*  2024  1  1  0  5  0.00000000", TimeScale::GPST).unwrap();
        assert_eq!(marker.minute, 5);

        let t = marker.epoch(TimeScale::GPST).unwrap();
        assert_eq!(t, Epoch::from_str("2024-01-01T00:05:00 GPST").unwrap());
        assert_eq!(marker.to_string(), "*  2024  1  1  0  5  0.00000000");

        // loosely spaced markers are normalized
        let marker = EpochMarker::parse("* 2024 1 1 0 0 30.5", TimeScale::UTC).unwrap();
        assert_eq!(marker.to_string(), "*  2024  1  1  0  0 30.50000000");
        assert_eq!(
            marker.epoch(TimeScale::UTC).unwrap(),
            Epoch::from_str("2024-01-01T00:00:30.5 UTC").unwrap()
        );
    }

    #[test]
    fn invalid_epoch_markers() {
        let gpst = TimeScale::GPST;
        assert!(EpochMarker::parse("*  2024  1  1", gpst).is_err());
        assert!(EpochMarker::parse("*  2024 13  1  0  0  0.00000000", gpst).is_err());
        assert!(EpochMarker::parse("*  2024  x  1  0  0  0.00000000", gpst).is_err());
    }

    #[test]
    fn time_systems() {
        let gpst = TimeSystem::from_code("GPS").unwrap();
        let t = gpst.to_utc(Epoch::from_str("2024-01-01T00:05:00 GPST").unwrap());
        assert_eq!(t.time_scale, TimeScale::UTC);
        assert_eq!(t, Epoch::from_str("2024-01-01T00:04:42 UTC").unwrap());
        assert_eq!(gpst.code(), "GPS");

        let glo = TimeSystem::from_code("GLO").unwrap();
        let t = glo.to_utc(Epoch::from_str("2024-01-01T03:00:00 UTC").unwrap());
        assert_eq!(t, Epoch::from_str("2024-01-01T00:00:00 UTC").unwrap());
        assert_eq!(glo.code(), "UTC");

        assert!(TimeSystem::from_code("XYZ").is_none());
        assert_eq!(TimeSystem::default(), gpst);
    }

    #[test]
    fn position_records() {
        let (sv, (x, y, z)) =
            parse_position("PG05  -4987.316418  15988.114624  20963.513542    -56.123456").unwrap();
        assert_eq!(sv, SV::new(Constellation::GPS, 5));
        assert_eq!((x, y, z), (-4987.316418, 15988.114624, 20963.513542));

        let (sv, _) =
            parse_position("P  7  -4987.316418  15988.114624  20963.513542    -56.123456").unwrap();
        assert_eq!(sv, SV::new(Constellation::GPS, 7));

        assert!(parse_position("PG05  -4987.316418").is_err());
        assert!(parse_position("PG05  -4987.316418  abcdefghijkl  20963.513542").is_err());
        assert!(parse_position("P     15000.000000  15000.000000  15000.000000").is_err());
    }

    #[test]
    fn bad_positions() {
        assert!(is_bad_position(0.0, 0.0, 0.0));
        assert!(is_bad_position(999999.999999, 1.0, 1.0));
        assert!(!is_bad_position(0.0, 15988.1, 20963.5));
        assert!(!is_bad_position(-4987.3, 15988.1, 20963.5));
    }

    #[test]
    fn screening() {
        let content = "#dP2024  1  1  0  0  0.00000000       2 ORBIT IGS20 HLM  TEST
%c M  cc GLO ccc cccc cccc cccc cccc ccccc ccccc ccccc ccccc
%c cc cc ccc ccc cccc cccc cccc cccc ccccc ccccc ccccc ccccc
* 2024 1 1 3 0 0.0
P  7  -4987.316418  15988.114624  20963.513542
P     15000.000000  15000.000000  15000.000000
VG07  1000.000000  1000.000000  1000.000000
*  2024  1  1  3  5  0.00000000
PG07  -4987.316418  15988.114624  20963.513542  abc
EOF
";
        let screened = Screened::from_reader(content.as_bytes()).unwrap();

        assert!(screened.has_marker);
        assert_eq!(screened.positions, 2);
        assert_eq!(screened.system, TimeSystem::from_code("GLO").unwrap());

        let lines = screened.content.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "#dP2024  1  1  0  0  0.00000000       2 ORBIT IGS20 HLM  TEST",
                "%c M  cc UTC ccc cccc cccc cccc cccc ccccc ccccc ccccc ccccc",
                "%c cc cc ccc ccc cccc cccc cccc cccc ccccc ccccc ccccc ccccc",
                "*  2024  1  1  3  0  0.00000000",
                "PG07  -4987.316418  15988.114624  20963.513542 999999.999999",
                "*  2024  1  1  3  5  0.00000000",
                "PG07  -4987.316418  15988.114624  20963.513542 999999.999999",
                "EOF",
            ]
        );
    }
}
