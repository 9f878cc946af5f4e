use crate::data::LightCurve;
use crate::error::LightCurveError;
use crate::float_trait::{Dual, LikeFloat, seeded_dual};
use crate::model::{DifferentiableModel, FitPoint};
use crate::prior::LnPriorEvaluator;

use ndarray::{Array1, Zip};

/// Standard deviation of the observations
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoiseModel<U> {
    /// External uncertainties as they are
    External,
    /// External uncertainties scaled by a factor
    Multiplier(U),
    /// Single scale for every observation, external uncertainties are ignored
    Constant(U),
}

impl<U: LikeFloat> NoiseModel<U> {
    #[inline]
    pub fn sigma(&self, err: f64) -> U {
        match *self {
            Self::External => U::constant(err),
            Self::Multiplier(factor) => factor * U::constant(err),
            Self::Constant(sigma) => sigma,
        }
    }
}

/// Logarithm of the normal density of `obs` with mean `model` and standard deviation `sigma`
#[inline]
fn ln_normal<U: LikeFloat>(obs: f64, model: U, sigma: U) -> U {
    let ln_sqrt_tau = U::constant(0.5 * f64::ln(std::f64::consts::TAU));
    let r = (U::constant(obs) - model) / sigma;
    -U::half() * r * r - sigma.ln() - ln_sqrt_tau
}

/// Posterior of the model parameters given a light curve
///
/// Every function accepts a point in the internal coordinates of the model, see
/// [Registry](crate::Registry). Evaluation is stateless, so a single posterior may be shared
/// between threads.
#[derive(Clone, Debug)]
pub struct Posterior {
    model: DifferentiableModel,
    light_curve: LightCurve,
    t: Vec<f64>,
}

impl Posterior {
    pub fn new(
        model: DifferentiableModel,
        light_curve: LightCurve,
    ) -> Result<Self, LightCurveError> {
        if model.nchan() != light_curve.nchan() {
            return Err(LightCurveError::ChannelMismatch {
                data: light_curve.nchan(),
                model: model.nchan(),
            });
        }
        let t = light_curve.t.to_vec();
        Ok(Self {
            model,
            light_curve,
            t,
        })
    }

    pub fn model(&self) -> &DifferentiableModel {
        &self.model
    }

    pub fn light_curve(&self) -> &LightCurve {
        &self.light_curve
    }

    /// Number of internal coordinates
    #[inline]
    pub fn ndim(&self) -> usize {
        self.model.ndim()
    }

    pub fn initial_point(&self) -> Vec<f64> {
        self.model.initial_point()
    }

    pub fn fit_point(&self, x: &[f64]) -> FitPoint {
        self.model.fit_point(x)
    }

    fn ln_likelihood_generic<U: LikeFloat>(&self, x: &[U]) -> U {
        let assembled = self.model.assemble(x);
        let noise = assembled.noise;
        assembled
            .flux(&self.t)
            .into_iter()
            .zip(self.light_curve.flux.iter())
            .zip(self.light_curve.err.iter())
            .fold(U::zero(), |acc, ((model, &obs), &err)| {
                acc + ln_normal(obs, model, noise.sigma(err))
            })
    }

    /// Gaussian log-likelihood of all observations
    pub fn ln_likelihood(&self, x: &[f64]) -> f64 {
        self.ln_likelihood_generic(x)
    }

    pub fn ln_prior(&self, x: &[f64]) -> f64 {
        self.model.registry().ln_prior().ln_prior(x, None)
    }

    pub fn ln_posterior(&self, x: &[f64]) -> f64 {
        let ln_prior = self.ln_prior(x);
        if !ln_prior.is_finite() {
            return f64::NEG_INFINITY;
        }
        ln_prior + self.ln_likelihood(x)
    }

    /// Log-posterior and its gradient with respect to the internal coordinates
    ///
    /// The likelihood gradient is obtained with forward-mode dual numbers, one model
    /// evaluation per coordinate. Outside of the prior support the gradient is zero.
    pub fn ln_posterior_with_grad(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        assert_eq!(
            grad.len(),
            x.len(),
            "gradient should have one element per coordinate"
        );
        let ln_prior = self
            .model
            .registry()
            .ln_prior()
            .ln_prior(x, Some(&mut *grad));
        if !ln_prior.is_finite() {
            grad.fill(0.0);
            return f64::NEG_INFINITY;
        }
        if x.is_empty() {
            return ln_prior + self.ln_likelihood(x);
        }

        let mut x_dual: Vec<Dual> = x.iter().map(|&x| Dual::constant(x)).collect();
        let mut ln_likelihood = 0.0;
        for (i, g) in grad.iter_mut().enumerate() {
            x_dual[i] = seeded_dual(x[i]);
            let value = self.ln_likelihood_generic(&x_dual);
            x_dual[i] = Dual::constant(x[i]);
            ln_likelihood = value.re();
            *g += value[1];
        }
        ln_prior + ln_likelihood
    }

    /// Model flux of all channels
    pub fn flux(&self, x: &[f64]) -> Array1<f64> {
        self.model.flux(x, &self.t).into()
    }

    /// Standard deviation of every observation
    pub fn noise_scale(&self, x: &[f64]) -> Array1<f64> {
        let noise = self.model.assemble(x).noise;
        self.light_curve.err.mapv(|err| noise.sigma(err))
    }

    /// Observed minus model flux
    pub fn residuals(&self, x: &[f64]) -> Array1<f64> {
        &self.light_curve.flux - &self.flux(x)
    }

    /// Sum of squared normalized residuals per degree of freedom
    pub fn reduced_chi2(&self, x: &[f64]) -> f64 {
        let residuals = self.residuals(x);
        let sigma = self.noise_scale(x);
        let chi2 = Zip::from(&residuals)
            .and(&sigma)
            .fold(0.0, |acc, &r, &s| acc + (r / s).powi(2));
        let dof = self.light_curve.len_total().saturating_sub(self.ndim()).max(1);
        chi2 / dof as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn table(nchan: usize) -> ParameterTable {
        ParameterTable::new(nchan)
            .with(Parameter::fixed("Ms", 1.0))
            .with(Parameter::fixed("Mp", 1.0))
            .with(Parameter::fixed("Rs", 1.0))
            .with(Parameter::shared("rp", 0.1, PriorSpec::normal(0.1, 0.01)))
            .with(Parameter::fixed("per", 3.0))
            .with(Parameter::shared("inc", 88.0, PriorSpec::uniform(80.0, 90.0)))
            .with(Parameter::shared("u1", 0.4, PriorSpec::uniform(0.0, 1.0)))
            .with(Parameter::fixed("u2", 0.2))
            .with(Parameter::shared("c0", 1.0, PriorSpec::normal(1.0, 0.01)))
            .with_limb_dark("quadratic")
    }

    fn posterior(table: &ParameterTable, err: f64) -> Posterior {
        let model = ModelBuilder::new(table).unwrap().build_differentiable();
        let lc = synthetic_light_curve(&model, linspace(-0.15, 0.15, 61), err, 0);
        Posterior::new(model, lc).unwrap()
    }

    #[test]
    fn likelihood_is_sum_of_normal_log_densities() {
        let posterior = posterior(&table(1), 1e-3);
        let x = posterior.initial_point();
        let flux = posterior.flux(&x);
        let lc = posterior.light_curve();
        let expected: f64 = Zip::from(&lc.flux)
            .and(&flux)
            .and(&lc.err)
            .fold(0.0, |acc, &obs, &model, &err| {
                acc - 0.5 * ((obs - model) / err).powi(2)
                    - err.ln()
                    - 0.5 * std::f64::consts::TAU.ln()
            });
        assert_relative_eq!(posterior.ln_likelihood(&x), expected, max_relative = 1e-12);
        assert_relative_eq!(
            posterior.ln_posterior(&x),
            expected + posterior.ln_prior(&x),
            max_relative = 1e-12
        );
    }

    #[test]
    fn scatter_multiplier_doubles_noise() {
        let table = table(1).with(Parameter::shared(
            "scatter_mult",
            2.0,
            PriorSpec::uniform(0.1, 10.0),
        ));
        let posterior = posterior(&table, 1e-3);
        let x = posterior.initial_point();
        let sigma = posterior.noise_scale(&x);
        for (&s, &err) in sigma.iter().zip(posterior.light_curve().err.iter()) {
            assert_relative_eq!(s, 2.0 * err);
        }
    }

    #[test]
    fn scatter_ppm_replaces_uncertainties() {
        let table = table(1).with(Parameter::fixed("scatter_ppm", 5e-4));
        let posterior = posterior(&table, 1e-3);
        let sigma = posterior.noise_scale(&posterior.initial_point());
        assert!(sigma.iter().all(|&s| s == 5e-4));
    }

    #[test]
    fn external_uncertainties_without_scatter() {
        let posterior = posterior(&table(2), 2e-3);
        let sigma = posterior.noise_scale(&posterior.initial_point());
        assert_eq!(sigma.len(), 2 * 61);
        assert!(sigma.iter().all(|&s| s == 2e-3));
    }

    #[test]
    fn gradient_matches_finite_difference() {
        let table = table(2).with(Parameter::shared(
            "scatter_ppm",
            1e-3,
            PriorSpec::log_uniform(-12.0, 0.0),
        ));
        let posterior = posterior(&table, 1e-3);
        let mut x = posterior.initial_point();
        x[0] = 0.105;
        x[1] = 87.0;
        let mut grad = vec![0.0; x.len()];
        let value = posterior.ln_posterior_with_grad(&x, &mut grad);
        assert_relative_eq!(value, posterior.ln_posterior(&x), max_relative = 1e-12);
        for i in 0..x.len() {
            let h = 1e-6 * x[i].abs().max(1e-2);
            let mut x_plus = x.clone();
            x_plus[i] += h;
            let mut x_minus = x.clone();
            x_minus[i] -= h;
            let numeric =
                (posterior.ln_posterior(&x_plus) - posterior.ln_posterior(&x_minus)) / (2.0 * h);
            assert_relative_eq!(grad[i], numeric, epsilon = 1e-3, max_relative = 1e-4);
        }
    }

    #[test]
    fn gradient_is_finite_on_dense_transit_grid() {
        // Nearly central transit, so the separation drops below the planet radius
        let table = ParameterTable::new(1)
            .with(Parameter::fixed("Ms", 0.9))
            .with(Parameter::fixed("Mp", 0.7))
            .with(Parameter::shared("Rs", 0.85, PriorSpec::normal(0.85, 0.05)))
            .with(Parameter::shared("rp", 0.12, PriorSpec::normal(0.12, 0.01)))
            .with(Parameter::fixed("per", 2.2))
            .with(Parameter::shared("t0", 0.01, PriorSpec::normal(0.0, 0.02)))
            .with(Parameter::shared("inc", 89.95, PriorSpec::uniform(80.0, 90.0)))
            .with(Parameter::shared("u1", 0.36, PriorSpec::uniform(0.0, 1.0)))
            .with(Parameter::shared("u2", 0.3, PriorSpec::uniform(0.0, 1.0)))
            .with_limb_dark("quadratic");
        let model = ModelBuilder::new(&table).unwrap().build_differentiable();
        let lc = synthetic_light_curve(&model, linspace(-0.1, 0.12, 401), 5e-4, 3);
        let posterior = Posterior::new(model, lc).unwrap();
        let x = posterior.initial_point();
        let mut grad = vec![0.0; x.len()];
        let value = posterior.ln_posterior_with_grad(&x, &mut grad);
        assert_relative_eq!(value, posterior.ln_posterior(&x), max_relative = 1e-12);
        for i in 0..x.len() {
            assert!(grad[i].is_finite(), "coordinate {i}: {grad:?}");
            let h = 1e-7 * x[i].abs().max(1e-2);
            let mut x_plus = x.clone();
            x_plus[i] += h;
            let mut x_minus = x.clone();
            x_minus[i] -= h;
            let numeric =
                (posterior.ln_posterior(&x_plus) - posterior.ln_posterior(&x_minus)) / (2.0 * h);
            assert_relative_eq!(grad[i], numeric, epsilon = 1e-2, max_relative = 1e-4);
        }
    }

    #[test]
    fn outside_prior_support() {
        let posterior = posterior(&table(1), 1e-3);
        let mut x = posterior.initial_point();
        x[1] = 91.0;
        assert_eq!(posterior.ln_posterior(&x), f64::NEG_INFINITY);
        let mut grad = vec![1.0; x.len()];
        assert_eq!(
            posterior.ln_posterior_with_grad(&x, &mut grad),
            f64::NEG_INFINITY
        );
        assert!(grad.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn reduced_chi2_is_about_unity_for_true_model() {
        let posterior = posterior(&table(1), 1e-3);
        let x = posterior.initial_point();
        let chi2 = posterior.reduced_chi2(&x);
        assert!(chi2 > 0.5 && chi2 < 1.6, "reduced chi2 is {chi2}");
        assert_eq!(posterior.residuals(&x).len(), 61);
    }

    #[test]
    fn channel_number_must_match() {
        let model = ModelBuilder::new(&table(2)).unwrap().build_differentiable();
        let lc =
            LightCurve::single_channel(vec![0.0, 1.0], vec![1.0, 1.0], vec![1e-3, 1e-3]).unwrap();
        assert_eq!(
            Posterior::new(model, lc).unwrap_err(),
            LightCurveError::ChannelMismatch { data: 1, model: 2 }
        );
    }
}
