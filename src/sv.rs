use std::str::FromStr;

use crate::{
    error::Error,
    prelude::{Constellation, SV},
};

/// Parses a user provided satellite identifier.
/// Bare numbers ("5", "05") are GPS vehicles,
/// anything else must be a complete descriptor like "G05" or "E11".
pub fn parse_sv(desc: &str) -> Result<SV, Error> {
    let trimmed = desc.trim();

    if let Ok(prn) = trimmed.parse::<u8>() {
        return Ok(SV::new(Constellation::GPS, prn));
    }

    if !is_descriptor(trimmed) {
        return Err(Error::InvalidSatellite(desc.to_string()));
    }

    SV::from_str(&trimmed.to_uppercase()).map_err(|_| Error::InvalidSatellite(desc.to_string()))
}

/// Constellation letter followed by at least one character,
/// which is what [SV::from_str] expects.
fn is_descriptor(desc: &str) -> bool {
    desc.len() > 1
        && desc
            .as_bytes()
            .first()
            .is_some_and(|byte| byte.is_ascii_alphabetic())
}

/// Satellite identifier as found in legacy columns, where the
/// constellation may be omitted ("  5", " 5") and then defaults to `default`.
pub(crate) fn parse_legacy_sv(desc: &str, default: Constellation) -> Option<SV> {
    let trimmed = desc.trim();

    if let Ok(prn) = trimmed.parse::<u8>() {
        return Some(SV::new(default, prn));
    }

    // "G 5" is legal in old SP3 revisions
    let compact = trimmed.replace(' ', "0");
    if !is_descriptor(&compact) {
        return None;
    }

    SV::from_str(&compact).ok()
}
