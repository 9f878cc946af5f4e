use crate::error::FitError;
use crate::fit::{FitResult, prior_scales};
use crate::likelihood::Posterior;

use nuts_rs::{Chain, CpuLogpFunc, CpuMath, DiagGradNutsSettings, LogpError, Settings};
use nuts_storable::HasDims;
use rand::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// NUTS (No-U-Turn Sampler) point estimator
///
/// A Hamiltonian Monte Carlo sampler driven by the gradient of the log-posterior. It samples
/// `num_tune + num_draws` iterations from the initial point of the parameter table and returns
/// the draw with the largest posterior. As for [McmcFit](crate::McmcFit), the chain moves in a
/// space scaled by the prior widths and the result is never worse than the initial point.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename = "Nuts")]
pub struct NutsFit {
    #[serde(default = "NutsFit::default_num_tune")]
    pub num_tune: u32,
    #[serde(default = "NutsFit::default_num_draws")]
    pub num_draws: u32,
    /// Seed of the chain
    #[serde(default = "NutsFit::default_seed")]
    pub seed: u64,
}

impl NutsFit {
    pub fn new(num_tune: u32, num_draws: u32, seed: u64) -> Self {
        assert!(num_draws > 0, "num_draws must be positive");
        Self {
            num_tune,
            num_draws,
            seed,
        }
    }

    #[inline]
    pub fn default_num_tune() -> u32 {
        200
    }

    #[inline]
    pub fn default_num_draws() -> u32 {
        200
    }

    #[inline]
    pub fn default_seed() -> u64 {
        0
    }

    pub fn fit(&self, posterior: &Posterior) -> Result<FitResult, FitError> {
        let ndim = posterior.ndim();
        if ndim == 0 {
            return Err(FitError::NothingToFit);
        }
        let x0 = posterior.initial_point();
        let start_ln_posterior = posterior.ln_posterior(&x0);
        if !start_ln_posterior.is_finite() {
            return Err(FitError::NonFiniteStart);
        }
        let scale = prior_scales(posterior, &x0);

        let logp_func = LogpFunc {
            posterior: posterior.clone(),
            x0: x0.clone(),
            scale: scale.clone(),
            x: x0.clone(),
        };
        let math = CpuMath::new(logp_func);

        let mut settings = DiagGradNutsSettings::default();
        settings.num_tune = self.num_tune as u64;
        settings.num_draws = self.num_draws as u64;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut sampler = settings.new_chain(0, math, &mut rng);
        sampler
            .set_position(&vec![0.0; ndim])
            .map_err(|e| FitError::Sampler(format!("{e:?}")))?;

        let mut best_z = vec![0.0; ndim];
        let mut best_lnprob = f64::NEG_INFINITY;
        let mut ndraws = 0;
        for _ in 0..(self.num_tune + self.num_draws) {
            match sampler.expanded_draw() {
                Ok((draw, _expanded, stats, _progress)) => {
                    ndraws += 1;
                    if stats.logp > best_lnprob {
                        best_z = Vec::from(draw);
                        best_lnprob = stats.logp;
                    }
                }
                Err(e) => {
                    log::warn!("NUTS chain stopped after {ndraws} draws: {e:?}");
                    break;
                }
            }
        }

        let best_x = to_internal(&x0, &scale, &best_z);
        let best_ln_posterior = posterior.ln_posterior(&best_x);
        let (x, ln_posterior) = if best_ln_posterior >= start_ln_posterior {
            (best_x, best_ln_posterior)
        } else {
            (x0, start_ln_posterior)
        };
        log::debug!(
            "NUTS finished after {} draws, ln posterior {} -> {}",
            ndraws,
            start_ln_posterior,
            ln_posterior,
        );

        Ok(FitResult::new(posterior, x, ln_posterior))
    }
}

impl Default for NutsFit {
    fn default() -> Self {
        Self::new(
            Self::default_num_tune(),
            Self::default_num_draws(),
            Self::default_seed(),
        )
    }
}

fn to_internal(x0: &[f64], scale: &[f64], z: &[f64]) -> Vec<f64> {
    x0.iter()
        .zip(scale.iter())
        .zip(z.iter())
        .map(|((&x0, &scale), &z)| x0 + z * scale)
        .collect()
}

#[derive(Debug)]
enum NutsLogpError {
    NonFinite,
}

impl std::fmt::Display for NutsLogpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NutsLogpError::NonFinite => write!(f, "log-posterior or its gradient is not finite"),
        }
    }
}

impl std::error::Error for NutsLogpError {}

impl LogpError for NutsLogpError {
    fn is_recoverable(&self) -> bool {
        true
    }
}

/// Log-posterior over `z` with `x = x0 + z * scale`
struct LogpFunc {
    posterior: Posterior,
    x0: Vec<f64>,
    scale: Vec<f64>,
    /// Buffer for the internal coordinates
    x: Vec<f64>,
}

impl HasDims for LogpFunc {
    fn dim_sizes(&self) -> HashMap<String, u64> {
        let ndim = self.x0.len() as u64;
        HashMap::from([
            ("unconstrained_parameter".to_string(), ndim),
            ("dim".to_string(), ndim),
        ])
    }
}

impl CpuLogpFunc for LogpFunc {
    type LogpError = NutsLogpError;
    type FlowParameters = ();
    type ExpandedVector = Vec<f64>;

    fn dim(&self) -> usize {
        self.x0.len()
    }

    fn logp(&mut self, params: &[f64], grad: &mut [f64]) -> Result<f64, Self::LogpError> {
        for (((x, &x0), &scale), &z) in self
            .x
            .iter_mut()
            .zip(self.x0.iter())
            .zip(self.scale.iter())
            .zip(params.iter())
        {
            *x = x0 + z * scale;
        }
        let value = self.posterior.ln_posterior_with_grad(&self.x, grad);
        // Zero gradient with negative infinity marks the outside of the prior support
        if value == f64::NEG_INFINITY {
            return Ok(value);
        }
        if !value.is_finite() || grad.iter().any(|g| !g.is_finite()) {
            return Err(NutsLogpError::NonFinite);
        }
        for (g, &scale) in grad.iter_mut().zip(self.scale.iter()) {
            *g *= scale;
        }
        Ok(value)
    }

    fn expand_vector<R: rand::Rng + ?Sized>(
        &mut self,
        _rng: &mut R,
        array: &[f64],
    ) -> Result<Self::ExpandedVector, nuts_rs::CpuMathError> {
        Ok(array.to_vec())
    }
}
