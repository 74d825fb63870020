use thiserror::Error;

use std::num::{ParseFloatError, ParseIntError};

use hifitime::HifitimeError;

use crate::prelude::{Epoch, InterpolationMode, SV};

/// Processing [Stage] of one satellite comparison run,
/// reported along any failure so the user knows where it stopped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Precise (SP3) orbit parsing
    PreciseParsing,
    /// Broadcast (RINEX NAV) ephemeris parsing
    EphemerisParsing,
    /// Time grid construction
    Grid,
    /// Precise orbit interpolation
    Interpolation,
    /// Broadcast orbit propagation
    Propagation,
    /// Precise versus broadcast comparison
    Comparison,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::PreciseParsing => write!(f, "precise orbit parsing"),
            Self::EphemerisParsing => write!(f, "ephemeris parsing"),
            Self::Grid => write!(f, "time grid"),
            Self::Interpolation => write!(f, "interpolation"),
            Self::Propagation => write!(f, "propagation"),
            Self::Comparison => write!(f, "comparison"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Reading from the provided source failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// SP3 source does not contain a single epoch marker:
    /// this is not a precise orbit product.
    #[error("sp3: no epoch marker found")]
    Sp3NoEpochMarker,

    /// SP3 content rejected by the SP3 parser.
    #[error("sp3: {0}")]
    Sp3Format(String),

    /// Not a single valid precise position for this [SV].
    /// Every downstream step requires a non empty series.
    #[error("sp3: no valid position for {0}")]
    NoPreciseSamples(SV),

    /// Navigation source is not a RINEX navigation file.
    #[error("rinex: missing or invalid RINEX VERSION / TYPE header")]
    RinexHeader,

    /// Navigation content rejected by the RINEX parser.
    #[error("rinex: {0}")]
    RinexFormat(String),

    /// Not a single ephemeris frame for this [SV].
    #[error("rinex: no ephemeris for {0}")]
    NoEphemeris(SV),

    /// Propagation requested from an empty ephemeris set.
    #[error("no ephemeris to propagate from")]
    NoEphemerisAvailable,

    #[error("invalid satellite \"{0}\"")]
    InvalidSatellite(String),

    /// Input series must be strictly increasing in time,
    /// which also forbids duplicates.
    #[error("epochs must be strictly increasing (violated at {0})")]
    NonMonotonicEpochs(Epoch),

    #[error("{mode} interpolation requires at least {required} samples ({found} provided)")]
    NotEnoughSamples {
        mode: InterpolationMode,
        required: usize,
        found: usize,
    },

    /// Interpolation never extrapolates.
    #[error("{0} is outside of the interpolated span")]
    OutsideInterpolationSpan(Epoch),

    #[error("failed to solve the spline system")]
    SingularSpline,

    #[error("empty time series")]
    EmptySeries,

    #[error("grid step must be strictly positive")]
    InvalidStep,

    #[error("invalid time span: {0} is past {1}")]
    InvalidTimeSpan(Epoch, Epoch),

    #[error("precise and broadcast series are not aligned")]
    MisalignedSeries,

    #[error("empty comparison: statistics are undefined")]
    EmptyComparison,

    /// Any of the above, tagged with the [Stage] that failed.
    #[error("{stage} failure: {source}")]
    Stage { stage: Stage, source: Box<Error> },
}

impl Error {
    /// Tags [Self] with the processing [Stage] it originates from.
    pub(crate) fn at_stage(self, stage: Stage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Returns the underlying [Error], stripped of its [Stage] tag.
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Per line parsing issue. Those are recovered locally:
/// the line (or record) is dropped and a warning is emitted.
#[derive(Debug, Error)]
pub(crate) enum LineError {
    #[error("line is too short")]
    TooShort,
    #[error("truncated record")]
    TruncatedRecord,
    #[error("invalid float: {0}")]
    Float(#[from] ParseFloatError),
    #[error("invalid integer: {0}")]
    Integer(#[from] ParseIntError),
    #[error("invalid epoch: {0}")]
    Epoch(#[from] HifitimeError),
    #[error("invalid satellite \"{0}\"")]
    Satellite(String),
    #[error("position record prior any epoch marker")]
    OrphanPosition,
    #[error("missing \"{0}\" orbit field")]
    MissingField(&'static str),
    #[error("non physical orbital elements")]
    NonPhysical,
}
