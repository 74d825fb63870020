/// Running statistics of a non negative scalar series
#[derive(Debug, Clone, Default)]
pub struct Averager {
    sum: f64,
    /// Sum of squared values
    sum_sq: f64,
    pub max: f64,
    pub count: u64,
}

impl Averager {
    /// Builds new Averager
    pub fn new() -> Self {
        Self::default()
    }

    /// Push new value into [Averager]
    pub fn add(&mut self, x: f64) {
        self.count += 1;
        self.sum += x;
        self.sum_sq += x * x;

        if self.count == 1 || x > self.max {
            self.max = x;
        }
    }

    /// Mean of the series so far, never above [Self::max]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.sum / self.count as f64).min(self.max)
    }

    /// Root mean square of the series so far, within [Self::mean] and [Self::max]
    pub fn rms(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_sq / self.count as f64).sqrt().max(mean).min(self.max)
    }
}
