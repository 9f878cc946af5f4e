//! Point estimation of the model parameters

mod mcmc;
pub use mcmc::McmcFit;

#[cfg(feature = "nuts")]
mod nuts;
#[cfg(feature = "nuts")]
pub use nuts::NutsFit;

use crate::likelihood::Posterior;
use crate::model::FitPoint;

use ndarray::Array1;
use std::collections::BTreeMap;

/// Best point found by a fitter
#[derive(Clone, Debug)]
pub struct FitResult {
    /// Physical values of the fitted parameters
    pub fit_point: FitPoint,
    /// Internal coordinates of the point
    pub x: Vec<f64>,
    pub ln_posterior: f64,
    pub reduced_chi2: f64,
    /// Quantities derived from the fitted parameters, like quadratic limb-darkening
    /// coefficients
    pub derived: BTreeMap<String, f64>,
    /// Standard deviation of every observation at the point
    pub noise_scale: Array1<f64>,
}

impl FitResult {
    pub fn new(posterior: &Posterior, x: Vec<f64>, ln_posterior: f64) -> Self {
        let concrete = posterior.model().to_concrete(&x);
        Self {
            fit_point: concrete.fit_point().clone(),
            reduced_chi2: posterior.reduced_chi2(&x),
            derived: concrete.derived(),
            noise_scale: posterior.noise_scale(&x),
            ln_posterior,
            x,
        }
    }
}

/// Typical width of every internal coordinate around `x0`
///
/// Prior widths are used where they are finite, otherwise the magnitude of the coordinate
/// itself or unity. Fitters move in a space rescaled by these widths, so all coordinates are of
/// order unity there.
pub(crate) fn prior_scales(posterior: &Posterior, x0: &[f64]) -> Vec<f64> {
    posterior
        .model()
        .registry()
        .variables()
        .iter()
        .zip(x0.iter())
        .map(|(variable, &x)| {
            variable
                .prior
                .scale()
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or_else(|| if x != 0.0 { x.abs() } else { 1.0 })
        })
        .collect()
}
