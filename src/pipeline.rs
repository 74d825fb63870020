use std::io::BufRead;

use log::{debug, info};

use crate::{
    cfg::Config,
    comparison::{compare, ComparisonRecord, ComparisonSummary},
    ephemeris::{parse_ephemerides, propagate, BroadcastEphemeris, BroadcastState},
    error::{Error, Stage},
    grid::TimeGrid,
    interpolation::{interpolate, InterpolationMode, SplineBoundary},
    orbit::OrbitSample,
    prelude::SV,
    precise::parse_precise,
};

/// Outcome of one satellite comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub sv: SV,
    /// One [ComparisonRecord] per comparison epoch, in chronological order
    pub records: Vec<ComparisonRecord>,
    pub summary: ComparisonSummary,
    /// Number of epochs that were propagated past the validity window
    pub stale_epochs: usize,
    /// Number of epochs where the Kepler iteration reached its cap
    pub unconverged_epochs: usize,
}

/// [OrbitComparison] of one satellite: precise (SP3) orbit
/// versus broadcast (RINEX NAV) orbit.
#[derive(Debug, Clone)]
pub struct OrbitComparison {
    sv: SV,
    cfg: Config,
    /// Precise orbit, strictly increasing in time
    precise: Vec<OrbitSample>,
    /// Broadcast frames, sorted by ToE
    ephemerides: Vec<BroadcastEphemeris>,
}

impl OrbitComparison {
    /// Parses both sources for `sv` and prepares a new [OrbitComparison].
    /// ```
    /// use orbit_compare::prelude::*;
    ///
    /// let sp3 = "#dP2024  1  1  0  0  0.00000000\n";
    /// let nav = "     3.04           N: GNSS NAV DATA    M: MIXED            RINEX VERSION / TYPE\n";
    ///
    /// let g05 = parse_sv("G05").unwrap();
    ///
    /// // no epoch in this precise product
    /// let err = OrbitComparison::new(sp3.as_bytes(), nav.as_bytes(), g05, Config::default())
    ///     .unwrap_err();
    ///
    /// assert!(matches!(err, Error::Stage { stage: Stage::PreciseParsing, .. }));
    /// ```
    pub fn new<P: BufRead, N: BufRead>(
        sp3: P,
        nav: N,
        sv: SV,
        cfg: Config,
    ) -> Result<Self, Error> {
        let precise = parse_precise(sp3, sv).map_err(|e| e.at_stage(Stage::PreciseParsing))?;
        let ephemerides =
            parse_ephemerides(nav, sv).map_err(|e| e.at_stage(Stage::EphemerisParsing))?;

        info!(
            "{} - {} precise positions, {} broadcast frames",
            sv,
            precise.len(),
            ephemerides.len()
        );

        Ok(Self::from_parts(sv, precise, ephemerides, cfg))
    }

    /// Builds an [OrbitComparison] from already parsed series.
    pub fn from_parts(
        sv: SV,
        precise: Vec<OrbitSample>,
        ephemerides: Vec<BroadcastEphemeris>,
        cfg: Config,
    ) -> Self {
        Self {
            sv,
            cfg,
            precise,
            ephemerides,
        }
    }

    pub fn sv(&self) -> SV {
        self.sv
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    pub fn precise_samples(&self) -> &[OrbitSample] {
        &self.precise
    }

    pub fn ephemerides(&self) -> &[BroadcastEphemeris] {
        &self.ephemerides
    }

    /// Comparison [TimeGrid], that spans the precise coverage at [Config::comparison_step].
    pub fn comparison_grid(&self) -> Result<TimeGrid, Error> {
        TimeGrid::from_samples(&self.precise, self.cfg.comparison_step)
            .map_err(|e| e.at_stage(Stage::Grid))
    }

    /// Interpolates the precise orbit on a fine grid, at [Config::dense_step].
    /// This always uses a spline, with the configured boundary condition if any.
    pub fn dense_trajectory(&self) -> Result<Vec<OrbitSample>, Error> {
        let grid = TimeGrid::from_samples(&self.precise, self.cfg.dense_step)
            .map_err(|e| e.at_stage(Stage::Grid))?;

        let boundary = match self.cfg.interpolation {
            InterpolationMode::Spline(boundary) => boundary,
            InterpolationMode::Linear => SplineBoundary::default(),
        };

        let positions = interpolate(
            &self.precise,
            grid.epochs(),
            InterpolationMode::Spline(boundary),
        )
        .map_err(|e| e.at_stage(Stage::Interpolation))?;

        Ok(grid
            .epochs()
            .iter()
            .zip(positions.iter())
            .map(|(t, p)| OrbitSample {
                epoch: *t,
                position_m: *p,
            })
            .collect())
    }

    /// Propagates the broadcast orbit at every epoch of `grid`.
    pub fn broadcast_trajectory(&self, grid: &TimeGrid) -> Result<Vec<BroadcastState>, Error> {
        grid.epochs()
            .iter()
            .map(|t| propagate(&self.ephemerides, *t, &self.cfg))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.at_stage(Stage::Propagation))
    }

    /// Runs the complete comparison: comparison grid over the precise coverage,
    /// precise interpolation, broadcast propagation, then comparison.
    /// Any failure aborts this satellite and reports the [Stage] that failed.
    pub fn run(&self) -> Result<ComparisonReport, Error> {
        let grid = self.comparison_grid()?;
        debug!(
            "{} - comparison grid: {} epochs every {}",
            self.sv,
            grid.len(),
            grid.step()
        );

        let precise = interpolate(&self.precise, grid.epochs(), self.cfg.interpolation)
            .map_err(|e| e.at_stage(Stage::Interpolation))?;

        let states = self.broadcast_trajectory(&grid)?;

        let stale_epochs = states.iter().filter(|s| !s.within_validity).count();
        let unconverged_epochs = states.iter().filter(|s| !s.converged).count();

        let broadcast = states.iter().map(|s| s.position_m).collect::<Vec<_>>();

        let (records, summary) =
            compare(&precise, &broadcast, grid.epochs()).map_err(|e| e.at_stage(Stage::Comparison))?;

        info!("{} - {} interpolation - {}", self.sv, self.cfg.interpolation, summary);

        if stale_epochs > 0 {
            info!(
                "{} - {} epochs resolved past validity window ({})",
                self.sv, stale_epochs, self.cfg.max_toe_age
            );
        }

        Ok(ComparisonReport {
            sv: self.sv,
            records,
            summary,
            stale_epochs,
            unconverged_epochs,
        })
    }
}
