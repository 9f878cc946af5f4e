use crate::error::FitError;
use crate::fit::{FitResult, prior_scales};
use crate::likelihood::Posterior;

use emcee::{EnsembleSampler, Guess, Prob};
use rand::prelude::*;
use rand_distr::StandardNormal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ensemble MCMC point estimator
///
/// Runs the affine-invariant ensemble sampler by Goodman & Weare (2010) and returns the sample
/// with the largest posterior. Walkers move in a space scaled by the prior widths, so every
/// coordinate is of order unity. Walkers start from a normal ball of `init_spread` prior widths
/// around the initial point of the parameter table, the first walker starts exactly at it, so
/// the result is never worse than the initial point.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename = "Mcmc")]
pub struct McmcFit {
    #[serde(default = "McmcFit::default_niterations")]
    pub niterations: u32,
    #[serde(default = "McmcFit::default_init_spread")]
    pub init_spread: f64,
    /// Seed of the initial walker positions
    #[serde(default = "McmcFit::default_seed")]
    pub seed: u64,
}

impl McmcFit {
    pub fn new(niterations: u32, init_spread: f64, seed: u64) -> Self {
        assert!(niterations > 0, "niterations must be positive");
        assert!(
            init_spread.is_finite() && init_spread > 0.0,
            "init_spread must be positive and finite"
        );
        Self {
            niterations,
            init_spread,
            seed,
        }
    }

    #[inline]
    pub fn default_niterations() -> u32 {
        256
    }

    #[inline]
    pub fn default_init_spread() -> f64 {
        0.1
    }

    #[inline]
    pub fn default_seed() -> u64 {
        0
    }

    /// Number of walkers for `ndim` coordinates, the sampler needs an even number larger than
    /// twice the dimensionality
    pub fn nwalkers(ndim: usize) -> usize {
        2 * ndim + 2
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
        let scaled = ScaledPosterior {
            posterior,
            x0: &x0,
            scale: &scale,
        };

        let nwalkers = Self::nwalkers(ndim);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let initial_guesses: Vec<Guess> = (0..nwalkers)
            .map(|i| {
                let values = (0..ndim)
                    .map(|_| {
                        if i == 0 {
                            0.0
                        } else {
                            (self.init_spread * rng.sample::<f64, _>(StandardNormal)) as f32
                        }
                    })
                    .collect();
                Guess { values }
            })
            .collect();

        let mut sampler = EnsembleSampler::new(nwalkers, ndim, &scaled)
            .map_err(|e| FitError::Sampler(e.to_string()))?;
        let mut best_z = vec![0.0_f32; ndim];
        let mut best_lnprob = f32::NEG_INFINITY;
        sampler
            .sample(&initial_guesses, self.niterations as usize, |step| {
                for (position, &lnprob) in step.pos.iter().zip(step.lnprob.iter()) {
                    if lnprob > best_lnprob {
                        best_z.clone_from(&position.values);
                        best_lnprob = lnprob;
                    }
                }
            })
            .map_err(|e| FitError::Sampler(e.to_string()))?;

        // Sampler works in single precision, so the winner is re-evaluated
        let best_x = scaled.to_internal(&best_z);
        let best_ln_posterior = posterior.ln_posterior(&best_x);
        let (x, ln_posterior) = if best_ln_posterior >= start_ln_posterior {
            (best_x, best_ln_posterior)
        } else {
            (x0, start_ln_posterior)
        };
        log::debug!(
            "ensemble sampler finished after {} iterations of {} walkers, ln posterior {} -> {}",
            self.niterations,
            nwalkers,
            start_ln_posterior,
            ln_posterior,
        );

        Ok(FitResult::new(posterior, x, ln_posterior))
    }
}

impl Default for McmcFit {
    fn default() -> Self {
        Self::new(
            Self::default_niterations(),
            Self::default_init_spread(),
            Self::default_seed(),
        )
    }
}

/// Posterior over `z` with `x = x0 + z * scale`
struct ScaledPosterior<'a> {
    posterior: &'a Posterior,
    x0: &'a [f64],
    scale: &'a [f64],
}

impl ScaledPosterior<'_> {
    fn to_internal(&self, z: &[f32]) -> Vec<f64> {
        self.x0
            .iter()
            .zip(self.scale.iter())
            .zip(z.iter())
            .map(|((&x0, &scale), &z)| x0 + z as f64 * scale)
            .collect()
    }
}

impl Prob for ScaledPosterior<'_> {
    fn lnlike(&self, params: &Guess) -> f32 {
        self.posterior
            .ln_likelihood(&self.to_internal(&params.values)) as f32
    }

    fn lnprior(&self, params: &Guess) -> f32 {
        self.posterior.ln_prior(&self.to_internal(&params.values)) as f32
    }
}
