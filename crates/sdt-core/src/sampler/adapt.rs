//! Warmup adaptation: step size, diagonal metric, and the window schedule.

use alloc::vec;
use alloc::vec::Vec;

use crate::math;

/// Dual-averaging step-size adaptation (Nesterov 2009; Hoffman & Gelman 2014, §3.2).
#[derive(Debug, Clone)]
pub struct DualAveraging {
    mu: f64,
    log_step: f64,
    log_step_bar: f64,
    h_bar: f64,
    counter: f64,
    target: f64,
}

impl DualAveraging {
    const GAMMA: f64 = 0.05;
    const T0: f64 = 10.0;
    const KAPPA: f64 = 0.75;

    /// Start adapting from `step_size` toward mean acceptance `target`.
    pub fn new(step_size: f64, target: f64) -> Self {
        Self {
            mu: math::ln(10.0 * step_size),
            log_step: math::ln(step_size),
            log_step_bar: 0.0,
            h_bar: 0.0,
            counter: 0.0,
            target,
        }
    }

    /// Restart around a new step size (after a metric update).
    pub fn restart(&mut self, step_size: f64) {
        *self = Self::new(step_size, self.target);
    }

    /// Feed the acceptance statistic of the latest transition.
    pub fn update(&mut self, accept_stat: f64) {
        let accept = if accept_stat.is_nan() { 0.0 } else { accept_stat.min(1.0) };
        self.counter += 1.0;
        let eta = 1.0 / (self.counter + Self::T0);
        self.h_bar = (1.0 - eta) * self.h_bar + eta * (self.target - accept);
        self.log_step = self.mu - math::sqrt(self.counter) / Self::GAMMA * self.h_bar;
        let weight = math::pow(self.counter, -Self::KAPPA);
        self.log_step_bar = weight * self.log_step + (1.0 - weight) * self.log_step_bar;
    }

    /// Step size to use for the next warmup transition.
    pub fn current_step_size(&self) -> f64 {
        math::exp(self.log_step)
    }

    /// Averaged step size to freeze after warmup.
    pub fn final_step_size(&self) -> f64 {
        if self.counter == 0.0 {
            return self.current_step_size();
        }
        math::exp(self.log_step_bar)
    }
}

/// Streaming per-coordinate mean and variance using Welford's algorithm.
#[derive(Debug, Clone)]
pub struct VarianceAccumulator {
    count: usize,
    mean: Vec<f64>,
    m2: Vec<f64>,
}

impl VarianceAccumulator {
    /// Accumulator for `dim` coordinates.
    pub fn new(dim: usize) -> Self {
        Self {
            count: 0,
            mean: vec![0.0; dim],
            m2: vec![0.0; dim],
        }
    }

    /// Add one position.
    pub fn update(&mut self, x: &[f64]) {
        self.count += 1;
        let n = self.count as f64;
        for ((mean, m2), &xi) in self.mean.iter_mut().zip(self.m2.iter_mut()).zip(x) {
            let delta = xi - *mean;
            *mean += delta / n;
            *m2 += delta * (xi - *mean);
        }
    }

    /// Number of positions seen.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sample variance per coordinate.
    pub fn variance(&self) -> Vec<f64> {
        if self.count < 2 {
            return vec![1.0; self.mean.len()];
        }
        let denom = (self.count - 1) as f64;
        self.m2.iter().map(|m| m / denom).collect()
    }

    /// Variance shrunk toward `1e-3` (the regularization Stan applies to a
    /// windowed metric estimate).
    pub fn regularized_variance(&self) -> Vec<f64> {
        let n = self.count as f64;
        self.variance()
            .into_iter()
            .map(|v| (n / (n + 5.0)) * v + 1e-3 * (5.0 / (n + 5.0)))
            .collect()
    }

    /// Forget all positions.
    pub fn reset(&mut self) {
        self.count = 0;
        self.mean.iter_mut().for_each(|m| *m = 0.0);
        self.m2.iter_mut().for_each(|m| *m = 0.0);
    }
}

/// Warmup schedule: a fast initial buffer, doubling slow windows where the
/// metric is estimated, and a fast terminal buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSchedule {
    windows: Vec<(usize, usize)>,
}

impl WindowSchedule {
    const INIT_BUFFER: usize = 75;
    const TERM_BUFFER: usize = 50;
    const BASE_WINDOW: usize = 25;

    /// Schedule for `tune` warmup iterations.
    pub fn new(tune: usize) -> Self {
        if tune < 20 {
            return Self { windows: Vec::new() };
        }

        let (init, term, base) =
            if Self::INIT_BUFFER + Self::TERM_BUFFER + Self::BASE_WINDOW > tune {
                let init = tune * 15 / 100;
                let term = tune / 10;
                (init, term, tune - init - term)
            } else {
                (Self::INIT_BUFFER, Self::TERM_BUFFER, Self::BASE_WINDOW)
            };

        let last = tune - term;
        let mut windows = Vec::new();
        let mut start = init;
        let mut size = base;
        while start < last {
            let mut end = (start + size).min(last);
            // Stretch the final window rather than leave a short remainder.
            if end + 2 * size > last {
                end = last;
            }
            windows.push((start, end));
            start = end;
            size *= 2;
        }
        Self { windows }
    }

    /// Metric-estimation windows as half-open `[start, end)` iteration ranges.
    pub fn windows(&self) -> &[(usize, usize)] {
        &self.windows
    }

    /// True if `iter` lies inside a metric-estimation window.
    pub fn in_window(&self, iter: usize) -> bool {
        self.windows.iter().any(|&(s, e)| iter >= s && iter < e)
    }

    /// True if `iter` is the last iteration of a window.
    pub fn is_window_end(&self, iter: usize) -> bool {
        self.windows.iter().any(|&(_, e)| iter + 1 == e)
    }
}
