use log::debug;

use crate::{
    error::Error,
    interpolation::{bracket, SplineBoundary},
    orbit::OrbitSample,
    prelude::{Epoch, Vector3},
};

/// Tridiagonal system with a 3 column right hand side (one per ECEF axis).
/// Row `k` reads `lower[k] x[k-1] + diag[k] x[k] + upper[k] x[k+1] = rhs[k]`.
#[derive(Debug)]
struct Tridiagonal {
    lower: Vec<f64>,
    diag: Vec<f64>,
    upper: Vec<f64>,
    rhs: Vec<Vector3<f64>>,
}

impl Tridiagonal {
    fn with_capacity(size: usize) -> Self {
        Self {
            lower: Vec::with_capacity(size),
            diag: Vec::with_capacity(size),
            upper: Vec::with_capacity(size),
            rhs: Vec::with_capacity(size),
        }
    }

    fn push(&mut self, lower: f64, diag: f64, upper: f64, rhs: Vector3<f64>) {
        self.lower.push(lower);
        self.diag.push(diag);
        self.upper.push(upper);
        self.rhs.push(rhs);
    }

    /// Thomas algorithm: forward elimination then back substitution.
    fn solve(mut self) -> Result<Vec<Vector3<f64>>, Error> {
        let size = self.diag.len();
        if size == 0 {
            return Ok(Vec::new());
        }

        for k in 1..size {
            let pivot = self.diag[k - 1];
            if pivot == 0.0 {
                return Err(Error::SingularSpline);
            }
            let w = self.lower[k] / pivot;
            self.diag[k] -= w * self.upper[k - 1];
            let previous = self.rhs[k - 1];
            self.rhs[k] -= previous * w;
        }

        if self.diag[size - 1] == 0.0 {
            return Err(Error::SingularSpline);
        }

        let mut x = vec![Vector3::<f64>::zeros(); size];
        x[size - 1] = self.rhs[size - 1] / self.diag[size - 1];

        for k in (0..size - 1).rev() {
            x[k] = (self.rhs[k] - x[k + 1] * self.upper[k]) / self.diag[k];
        }

        Ok(x)
    }
}

/// Cubic spline fitted on each ECEF axis of a precise orbit.
/// The three axes share the same knots, therefore the same tridiagonal system,
/// which is solved once for a 3 column right hand side.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    /// Reference (first knot) [Epoch]
    t0: Epoch,
    /// Last knot [Epoch]
    t_end: Epoch,
    /// Knots, as elapsed seconds since t0
    knots: Vec<f64>,
    /// Knot values (m)
    values: Vec<Vector3<f64>>,
    /// Second derivatives at each knot (m/s²)
    curvatures: Vec<Vector3<f64>>,
    boundary: SplineBoundary,
}

impl CubicSpline {
    /// Fits a [CubicSpline] through `samples`, that must be strictly increasing in time.
    /// [SplineBoundary::NotAKnot] requires 4 samples, [SplineBoundary::Natural] 3.
    pub fn fit(samples: &[OrbitSample], boundary: SplineBoundary) -> Result<Self, Error> {
        OrbitSample::check_monotonic(samples)?;

        let n = samples.len();
        let (t0, t_end) = OrbitSample::time_span(samples).ok_or(Error::EmptySeries)?;

        let required = match boundary {
            SplineBoundary::NotAKnot => 4,
            SplineBoundary::Natural => 3,
        };

        if n < required {
            return Err(Error::NotEnoughSamples {
                mode: super::InterpolationMode::Spline(boundary),
                required,
                found: n,
            });
        }

        let knots = samples
            .iter()
            .map(|s| (s.epoch - t0).to_seconds())
            .collect::<Vec<_>>();

        let values = samples.iter().map(|s| s.position_m).collect::<Vec<_>>();

        let h = knots.windows(2).map(|w| w[1] - w[0]).collect::<Vec<_>>();

        // interior rows, unknowns M[1]..M[n-2]
        let mut system = Tridiagonal::with_capacity(n - 2);

        for i in 1..n - 1 {
            let right = (values[i + 1] - values[i]) / h[i];
            let left = (values[i] - values[i - 1]) / h[i - 1];
            system.push(h[i - 1], 2.0 * (h[i - 1] + h[i]), h[i], (right - left) * 6.0);
        }

        if boundary == SplineBoundary::NotAKnot {
            // third derivative continuity across the 2nd and (n-1)th knots:
            // M[0] and M[n-1] are eliminated from the first and last interior rows
            let (h0, h1) = (h[0], h[1]);
            system.diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
            system.upper[0] = (h1 * h1 - h0 * h0) / h1;

            let last = n - 3;
            let (hl, hr) = (h[n - 3], h[n - 2]);
            system.lower[last] = (hl * hl - hr * hr) / hl;
            system.diag[last] = (hl + hr) * (2.0 * hl + hr) / hl;
        }

        let interior = system.solve()?;

        let (first, last) = match boundary {
            SplineBoundary::Natural => (Vector3::zeros(), Vector3::zeros()),
            SplineBoundary::NotAKnot => {
                let (h0, h1) = (h[0], h[1]);
                let (hl, hr) = (h[n - 3], h[n - 2]);
                let (m1, m2) = (interior[0], interior[1]);
                let (m_l, m_r) = (interior[n - 4], interior[n - 3]);
                (
                    (m1 * (h0 + h1) - m2 * h0) / h1,
                    (m_r * (hl + hr) - m_l * hr) / hl,
                )
            },
        };

        let mut curvatures = Vec::with_capacity(n);
        curvatures.push(first);
        curvatures.extend(interior);
        curvatures.push(last);

        if curvatures.iter().flat_map(|m| m.iter()).any(|m| !m.is_finite()) {
            return Err(Error::SingularSpline);
        }

        debug!("{} spline fitted over {} knots ({} - {})", boundary, n, t0, t_end);

        Ok(Self {
            t0,
            t_end,
            knots,
            values,
            curvatures,
            boundary,
        })
    }

    /// Returns the interpolated position (m) at `epoch`,
    /// which must lie within [Self::span].
    pub fn evaluate(&self, epoch: Epoch) -> Result<Vector3<f64>, Error> {
        if epoch < self.t0 || epoch > self.t_end {
            return Err(Error::OutsideInterpolationSpan(epoch));
        }

        let x = (epoch - self.t0).to_seconds();
        let i = bracket(&self.knots, x);

        let h = self.knots[i + 1] - self.knots[i];
        let dl = x - self.knots[i];
        let dr = self.knots[i + 1] - x;

        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.curvatures[i], self.curvatures[i + 1]);

        Ok(m0 * (dr.powi(3) / (6.0 * h))
            + m1 * (dl.powi(3) / (6.0 * h))
            + (y0 / h - m0 * (h / 6.0)) * dr
            + (y1 / h - m1 * (h / 6.0)) * dl)
    }

    /// Interpolated time span, bounds included.
    pub fn span(&self) -> (Epoch, Epoch) {
        (self.t0, self.t_end)
    }

    pub fn boundary(&self) -> SplineBoundary {
        self.boundary
    }
}
