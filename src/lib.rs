#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod averager;
mod cfg;
mod comparison;
mod constants;
mod ephemeris;
mod error;
mod grid;
mod interpolation;
mod orbit;
mod pipeline;
mod precise;
mod sv;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::cfg::Config;
    pub use crate::comparison::{compare, ComparisonRecord, ComparisonSummary};
    pub use crate::ephemeris::{parse_ephemerides, propagate, BroadcastEphemeris, BroadcastState};
    pub use crate::error::{Error, Stage};
    pub use crate::grid::{build_grid, TimeGrid};
    pub use crate::interpolation::{interpolate, CubicSpline, InterpolationMode, SplineBoundary};
    pub use crate::orbit::OrbitSample;
    pub use crate::pipeline::{ComparisonReport, OrbitComparison};
    pub use crate::precise::{parse_precise, satellites};
    pub use crate::sv::parse_sv;
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}

// pub export
pub use error::Error;
