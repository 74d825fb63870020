//! Broadcast navigation (RINEX NAV) parsing
use std::io::{BufRead, BufReader};

use itertools::Itertools;
use log::{debug, warn};
use rinex::prelude::Rinex;

use crate::{
    constants::{HALF_WEEK_SECONDS, SECONDS_PER_WEEK},
    ephemeris::BroadcastEphemeris,
    error::{Error, LineError},
    prelude::{Constellation, Epoch, SV},
    sv::parse_legacy_sv,
};

/// Number of broadcast orbit lines following the epoch line,
/// for Keplerian (GPS like) frames.
const KEPLER_ORBIT_LINES: usize = 7;

/// Number of broadcast orbit lines following the epoch line,
/// for state vector (Glonass) frames.
const STATE_ORBIT_LINES: usize = 3;

/// Layout that depends on the file revision
#[derive(Debug, Copy, Clone, PartialEq)]
struct Layout {
    major: u8,
    /// Default constellation, when omitted from the record
    constellation: Constellation,
}

impl Layout {
    /// Leading characters before the first data word
    fn indent(&self) -> usize {
        if self.major < 3 {
            3
        } else {
            4
        }
    }

    /// Parses "RINEX VERSION / TYPE"
    fn from_header(line: &str) -> Option<Self> {
        let version = line.get(0..9)?.trim().parse::<f64>().ok()?;
        let major = version.trunc() as u8;

        // V2 files are mono constellation: type 'N' is GPS, 'G' is Glonass
        let constellation = match line.get(20..21) {
            Some("G") if major < 3 => Constellation::Glonass,
            Some("E") => Constellation::Galileo,
            _ => Constellation::GPS,
        };

        Some(Self {
            major,
            constellation,
        })
    }

    /// Returns true if this line starts a new record
    fn is_record_start(&self, line: &str) -> bool {
        match line.get(..self.indent()) {
            Some(lead) => !lead.trim().is_empty(),
            None => !line.trim().is_empty(),
        }
    }

    /// Parses the record [SV]
    fn sv(&self, line: &str) -> Result<SV, LineError> {
        let desc = line.get(..self.indent() - 1).ok_or(LineError::TooShort)?;
        parse_legacy_sv(desc, self.constellation).ok_or_else(|| LineError::Satellite(desc.to_string()))
    }

    /// Number of lines of a complete record of `sv`, epoch line included.
    fn record_lines(&self, sv: SV) -> usize {
        match sv.constellation {
            Constellation::Glonass => 1 + STATE_ORBIT_LINES,
            _ => 1 + KEPLER_ORBIT_LINES,
        }
    }
}

/// Builds ToE from its seconds of week, within the week that surrounds ToC.
fn toe_from_toc(toc: Epoch, toe_sow: f64) -> Epoch {
    let (week, toc_nanos) = toc.to_time_of_week();
    let toc_sow = toc_nanos as f64 / 1.0E9;

    let week = if toe_sow - toc_sow > HALF_WEEK_SECONDS {
        week.saturating_sub(1)
    } else if toc_sow - toe_sow > HALF_WEEK_SECONDS {
        week + 1
    } else {
        week
    };

    let nanos = (toe_sow.clamp(0.0, SECONDS_PER_WEEK) * 1.0E9).round() as u64;
    Epoch::from_time_of_week(week, nanos, toc.time_scale)
}

impl BroadcastEphemeris {
    /// Builds a [BroadcastEphemeris] from a decoded navigation frame:
    /// `toc` is the frame epoch, `field` resolves its orbit fields by name.
    fn from_orbit_fields<F>(
        sv: SV,
        toc: Epoch,
        clock: (f64, f64, f64),
        field: F,
    ) -> Result<Self, LineError>
    where
        F: Fn(&'static str) -> Option<f64>,
    {
        let required = |name: &'static str| field(name).ok_or(LineError::MissingField(name));

        let eph = Self {
            sv,
            toc,
            toe: toe_from_toc(toc, required("toe")?),
            iode: required("iode")? as u16,
            clock,
            fit_interval_h: field("fitInt").filter(|hours| *hours > 0.0),
            sqrt_a: required("sqrta")?,
            eccentricity: required("e")?,
            m0_rad: required("m0")?,
            i0_rad: required("i0")?,
            idot_rad_s: required("idot")?,
            dn_rad: required("deltaN")?,
            omega0_rad: required("omega0")?,
            omega_rad: required("omega")?,
            omega_dot_rad_s: required("omegaDot")?,
            cus_cuc_rad: (required("cus")?, required("cuc")?),
            cis_cic_rad: (required("cis")?, required("cic")?),
            crs_crc_m: (required("crs")?, required("crc")?),
        };

        if eph.is_physical() {
            Ok(eph)
        } else {
            Err(LineError::NonPhysical)
        }
    }
}

/// Navigation content reduced to the header and the complete records of one [SV].
#[derive(Debug)]
struct Screened {
    content: String,
    layout: Layout,
    records: usize,
}

impl Screened {
    /// Screens RINEX navigation content: records of other satellites are dropped,
    /// malformed or truncated records are dropped with a warning.
    fn from_reader<R: BufRead>(reader: R, sv: SV) -> Result<Self, Error> {
        let mut lines = reader.lines();
        let mut layout = None::<Layout>;
        let mut content = String::with_capacity(4096);

        for line in lines.by_ref() {
            let line = line?;
            content.push_str(&line);
            content.push('\n');

            if line.contains("RINEX VERSION / TYPE") {
                layout = Layout::from_header(&line);
            }
            if line.contains("END OF HEADER") {
                break;
            }
        }

        let layout = layout.ok_or(Error::RinexHeader)?;
        debug!("rinex: revision {} navigation", layout.major);

        // gather records: epoch line + continuation lines
        let mut records = Vec::<(usize, Vec<String>)>::new();

        for (nth, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if layout.is_record_start(&line) {
                records.push((nth, vec![line]));
            } else if let Some((_, record)) = records.last_mut() {
                record.push(line);
            }
        }

        let mut screened = Self {
            content,
            layout,
            records: 0,
        };

        for (nth, record) in records.iter() {
            let record_sv = match layout.sv(&record[0]) {
                Ok(sv) => sv,
                Err(e) => {
                    warn!("rinex (body line {}): skipped: {}", nth + 1, e);
                    continue;
                },
            };

            if record_sv != sv {
                continue;
            }

            let size = layout.record_lines(sv);

            if record.len() < size {
                warn!(
                    "rinex (body line {}, {}): skipped: {}",
                    nth + 1,
                    sv,
                    LineError::TruncatedRecord
                );
                continue;
            }

            if record.len() > size {
                warn!(
                    "rinex (body line {}, {}): {} trailing lines dropped",
                    nth + 1,
                    sv,
                    record.len() - size
                );
            }

            for line in record.iter().take(size) {
                screened.content.push_str(line);
                screened.content.push('\n');
            }

            screened.records += 1;
        }

        Ok(screened)
    }

    fn parse(&self) -> Result<Rinex, Error> {
        let mut reader = BufReader::new(self.content.as_bytes());
        let rinex = Rinex::parse(&mut reader).map_err(|e| Error::RinexFormat(e.to_string()))?;

        if !rinex.is_navigation_rinex() {
            return Err(Error::RinexHeader);
        }

        Ok(rinex)
    }
}

/// Parses all [BroadcastEphemeris] of `sv` from RINEX navigation content
/// (revision 2 or 3), sorted by ToE. Records of other satellites are skipped,
/// malformed records are dropped with a warning. Frames that repeat a ToE
/// already parsed are dropped. This only fails when the content is not
/// RINEX navigation or when not a single frame was found for `sv`.
pub fn parse_ephemerides<R: BufRead>(reader: R, sv: SV) -> Result<Vec<BroadcastEphemeris>, Error> {
    let screened = Screened::from_reader(reader, sv)?;

    if screened.records == 0 {
        return Err(Error::NoEphemeris(sv));
    }

    let rinex = screened.parse()?;

    let mut ephemerides = Vec::<BroadcastEphemeris>::with_capacity(screened.records);

    for (key, frame) in rinex.nav_ephemeris_frames_iter() {
        if key.sv != sv {
            continue;
        }

        let clock = (frame.clock_bias, frame.clock_drift, frame.clock_drift_rate);

        match BroadcastEphemeris::from_orbit_fields(sv, key.epoch, clock, |name| {
            frame.get_orbit_f64(name)
        }) {
            Ok(eph) => ephemerides.push(eph),
            Err(e) => warn!("rinex ({} toc={}): skipped: {}", sv, key.epoch, e),
        }
    }

    ephemerides.sort_by_key(|eph| eph.toe);

    let total = ephemerides.len();
    let ephemerides = ephemerides
        .into_iter()
        .dedup_by(|a, b| a.toe == b.toe)
        .collect::<Vec<_>>();

    if ephemerides.len() < total {
        debug!("rinex: {} repeated frames dropped for {}", total - ephemerides.len(), sv);
    }

    if ephemerides.is_empty() {
        return Err(Error::NoEphemeris(sv));
    }

    debug!(
        "rinex: {} frames for {} (revision {})",
        ephemerides.len(),
        sv,
        screened.layout.major
    );

    Ok(ephemerides)
}
