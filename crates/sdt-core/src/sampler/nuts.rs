//! No-U-Turn sampler with adaptive step size and diagonal metric.

use alloc::vec::Vec;

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::adapt::{DualAveraging, VarianceAccumulator, WindowSchedule};
use super::{Chain, LogDensity, NutsConfig, SampleStats, SamplerError};
use crate::constants::MAX_ENERGY_ERROR;
use crate::math;
use crate::types::Vector;

/// Upper bound on step-size doublings / halvings in the initial search.
const STEP_SEARCH_LIMIT: usize = 100;

/// A point in phase space with its cached log density and gradient.
#[derive(Clone, Debug)]
struct State {
    position: Vector,
    momentum: Vector,
    gradient: Vector,
    log_density: f64,
}

/// A (sub)trajectory built by one doubling.
struct Tree {
    minus: State,
    plus: State,
    proposal: State,
    /// Points inside the slice.
    n_valid: usize,
    /// False once a U-turn or divergence stops the doubling.
    keep_going: bool,
    alpha_sum: f64,
    n_alpha: usize,
    divergent: bool,
}

/// NUTS sampler for one chain.
pub struct NutsSampler {
    config: NutsConfig,
    rng: Xoshiro256PlusPlus,
    step_size: f64,
    inv_metric: Vector,
}

impl NutsSampler {
    /// Create a sampler; the RNG is seeded from `config.seed`.
    pub fn new(config: NutsConfig) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(config.seed),
            config,
            step_size: 1.0,
            inv_metric: Vector::zeros(0),
        }
    }

    /// Run warmup then collect `config.draws` positions starting from `init`.
    pub fn sample<M: LogDensity>(&mut self, model: &M, init: &[f64]) -> Result<Chain, SamplerError> {
        let dim = model.dim();
        if init.len() != dim {
            return Err(SamplerError::DimensionMismatch {
                expected: dim,
                got: init.len(),
            });
        }
        self.inv_metric = Vector::from_element(dim, 1.0);

        let mut current = Self::evaluate(model, Vector::from_column_slice(init));
        if !current.log_density.is_finite() {
            return Err(SamplerError::NonFiniteInitialDensity);
        }

        self.step_size = self.find_reasonable_step_size(model, &current);
        let mut adapter = DualAveraging::new(self.step_size, self.config.target_accept);
        let schedule = WindowSchedule::new(self.config.tune);
        let mut variance = VarianceAccumulator::new(dim);

        for iter in 0..self.config.tune {
            let (next, stats) = self.transition(model, &current);
            current = next;
            adapter.update(stats.accept_stat);
            self.step_size = adapter.current_step_size();

            if schedule.in_window(iter) {
                variance.update(current.position.as_slice());
            }
            if schedule.is_window_end(iter) {
                self.inv_metric = Vector::from_vec(variance.regularized_variance());
                variance.reset();
                self.step_size = self.find_reasonable_step_size(model, &current);
                adapter.restart(self.step_size);
                tracing::debug!(iter, step_size = self.step_size, "updated diagonal metric");
            }
        }
        if self.config.tune > 0 {
            self.step_size = adapter.final_step_size();
        }

        let mut draws = Vec::with_capacity(self.config.draws);
        let mut stats = Vec::with_capacity(self.config.draws);
        for _ in 0..self.config.draws {
            let (next, transition_stats) = self.transition(model, &current);
            current = next;
            draws.push(current.position.as_slice().to_vec());
            stats.push(transition_stats);
        }

        Ok(Chain {
            draws,
            stats,
            step_size: self.step_size,
            inv_metric: self.inv_metric.as_slice().to_vec(),
        })
    }

    fn evaluate<M: LogDensity>(model: &M, position: Vector) -> State {
        let mut gradient = Vector::zeros(position.len());
        let log_density = model.log_density_gradient(position.as_slice(), gradient.as_mut_slice());
        State {
            momentum: Vector::zeros(position.len()),
            position,
            gradient,
            log_density: if log_density.is_nan() { f64::NEG_INFINITY } else { log_density },
        }
    }

    fn sample_momentum(&mut self) -> Vector {
        let dim = self.inv_metric.len();
        Vector::from_fn(dim, |i, _| {
            let z: f64 = StandardNormal.sample(&mut self.rng);
            z / math::sqrt(self.inv_metric[i])
        })
    }

    /// Joint log probability `log p(θ) − ½ rᵀ M⁻¹ r`.
    fn joint(&self, state: &State) -> f64 {
        let kinetic = 0.5 * state.momentum.dot(&self.inv_metric.component_mul(&state.momentum));
        let joint = state.log_density - kinetic;
        if joint.is_nan() {
            f64::NEG_INFINITY
        } else {
            joint
        }
    }

    fn leapfrog<M: LogDensity>(&self, model: &M, state: &State, eps: f64) -> State {
        let half_momentum = &state.momentum + &state.gradient * (0.5 * eps);
        let position = &state.position + self.inv_metric.component_mul(&half_momentum) * eps;
        let mut next = Self::evaluate(model, position);
        next.momentum = half_momentum + &next.gradient * (0.5 * eps);
        next
    }

    fn no_u_turn(&self, minus: &State, plus: &State) -> bool {
        let span = &plus.position - &minus.position;
        span.dot(&self.inv_metric.component_mul(&minus.momentum)) >= 0.0
            && span.dot(&self.inv_metric.component_mul(&plus.momentum)) >= 0.0
    }

    /// Double the step size until the one-step acceptance crosses 1/2.
    fn find_reasonable_step_size<M: LogDensity>(&mut self, model: &M, current: &State) -> f64 {
        let mut eps = self.step_size.clamp(1e-8, 1e3);
        let mut start = current.clone();
        start.momentum = self.sample_momentum();
        let joint0 = self.joint(&start);

        let log_half = -core::f64::consts::LN_2;
        let mut delta = self.joint(&self.leapfrog(model, &start, eps)) - joint0;
        let direction = if delta > log_half { 1.0 } else { -1.0 };

        for _ in 0..STEP_SEARCH_LIMIT {
            let crossed = if direction > 0.0 { delta <= log_half } else { delta > log_half };
            if crossed || !(1e-10..=1e7).contains(&eps) {
                break;
            }
            eps = if direction > 0.0 { eps * 2.0 } else { eps * 0.5 };
            delta = self.joint(&self.leapfrog(model, &start, eps)) - joint0;
        }
        eps.clamp(1e-10, 1e7)
    }

    fn transition<M: LogDensity>(&mut self, model: &M, current: &State) -> (State, SampleStats) {
        let mut start = current.clone();
        start.momentum = self.sample_momentum();
        let joint0 = self.joint(&start);
        let u: f64 = self.rng.random();
        let log_u = joint0 + math::ln(u.max(f64::MIN_POSITIVE));

        let mut minus = start.clone();
        let mut plus = start;
        let mut proposal = current.clone();
        let mut n_valid = 1usize;
        let mut keep_going = true;
        let mut depth = 0;
        let mut alpha_sum = 0.0;
        let mut n_alpha = 0usize;
        let mut divergent = false;

        while keep_going && depth < self.config.max_tree_depth {
            let direction = if self.rng.random::<bool>() { 1.0 } else { -1.0 };
            let tree = if direction < 0.0 {
                self.build_tree(model, &minus, log_u, direction, depth, joint0)
            } else {
                self.build_tree(model, &plus, log_u, direction, depth, joint0)
            };

            if tree.keep_going && tree.n_valid > 0 {
                let p = tree.n_valid as f64 / n_valid as f64;
                if self.rng.random::<f64>() < p {
                    proposal = tree.proposal;
                }
            }
            if direction < 0.0 {
                minus = tree.minus;
            } else {
                plus = tree.plus;
            }

            n_valid += tree.n_valid;
            alpha_sum += tree.alpha_sum;
            n_alpha += tree.n_alpha;
            divergent |= tree.divergent;
            keep_going = tree.keep_going && self.no_u_turn(&minus, &plus);
            depth += 1;
        }

        let stats = SampleStats {
            accept_stat: if n_alpha > 0 { alpha_sum / n_alpha as f64 } else { 0.0 },
            step_size: self.step_size,
            tree_depth: depth,
            n_leapfrog: n_alpha,
            divergent,
            log_density: proposal.log_density,
        };
        (proposal, stats)
    }

    fn build_tree<M: LogDensity>(
        &mut self,
        model: &M,
        state: &State,
        log_u: f64,
        direction: f64,
        depth: usize,
        joint0: f64,
    ) -> Tree {
        if depth == 0 {
            let next = self.leapfrog(model, state, direction * self.step_size);
            let joint = self.joint(&next);
            let divergent = !(log_u < joint + MAX_ENERGY_ERROR);
            let alpha = if joint.is_finite() {
                math::exp(joint - joint0).min(1.0)
            } else {
                0.0
            };
            return Tree {
                minus: next.clone(),
                plus: next.clone(),
                proposal: next,
                n_valid: usize::from(log_u <= joint),
                keep_going: !divergent,
                alpha_sum: alpha,
                n_alpha: 1,
                divergent,
            };
        }

        let mut tree = self.build_tree(model, state, log_u, direction, depth - 1, joint0);
        if !tree.keep_going {
            return tree;
        }

        let other = if direction < 0.0 {
            self.build_tree(model, &tree.minus, log_u, direction, depth - 1, joint0)
        } else {
            self.build_tree(model, &tree.plus, log_u, direction, depth - 1, joint0)
        };

        let total = tree.n_valid + other.n_valid;
        if total > 0 && self.rng.random::<f64>() < other.n_valid as f64 / total as f64 {
            tree.proposal = other.proposal;
        }
        if direction < 0.0 {
            tree.minus = other.minus;
        } else {
            tree.plus = other.plus;
        }

        tree.n_valid = total;
        tree.alpha_sum += other.alpha_sum;
        tree.n_alpha += other.n_alpha;
        tree.divergent |= other.divergent;
        tree.keep_going = other.keep_going && self.no_u_turn(&tree.minus, &tree.plus);
        tree
    }
}
