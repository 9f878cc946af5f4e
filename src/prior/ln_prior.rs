use crate::prior::ln_prior_1d::{LnPrior1D, LnPrior1DTrait};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Core trait for evaluating the natural logarithm of a joint prior
pub trait LnPriorEvaluator: Clone {
    /// Evaluate the natural logarithm of the prior at params
    ///
    /// If `jac` is `Some`, the gradient d(ln_prior)/d(params) is also computed and stored in it.
    fn ln_prior(&self, params: &[f64], jac: Option<&mut [f64]>) -> f64;
}

/// Natural logarithm of the joint prior of all internal model coordinates
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum LnPrior {
    None(NoneLnPrior),
    IndComponents(IndComponentsLnPrior),
}

impl LnPriorEvaluator for LnPrior {
    fn ln_prior(&self, params: &[f64], jac: Option<&mut [f64]>) -> f64 {
        match self {
            LnPrior::None(p) => p.ln_prior(params, jac),
            LnPrior::IndComponents(p) => p.ln_prior(params, jac),
        }
    }
}

impl LnPrior {
    pub fn none() -> Self {
        Self::None(NoneLnPrior {})
    }

    pub fn ind_components(components: Vec<LnPrior1D>) -> Self {
        Self::IndComponents(IndComponentsLnPrior { components })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct NoneLnPrior {}

impl LnPriorEvaluator for NoneLnPrior {
    fn ln_prior(&self, _params: &[f64], jac: Option<&mut [f64]>) -> f64 {
        if let Some(j) = jac {
            j.fill(0.0);
        }
        0.0
    }
}

/// Product of independent one-dimensional priors, one per coordinate
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct IndComponentsLnPrior {
    pub components: Vec<LnPrior1D>,
}

impl LnPriorEvaluator for IndComponentsLnPrior {
    fn ln_prior(&self, params: &[f64], jac: Option<&mut [f64]>) -> f64 {
        assert_eq!(
            params.len(),
            self.components.len(),
            "params and prior components should have the same size"
        );
        match jac {
            Some(j) => params
                .iter()
                .zip(self.components.iter())
                .zip(j.iter_mut())
                .map(|((&x, ln_prior), g)| ln_prior.ln_prior_1d(x, Some(g)))
                .sum(),
            None => params
                .iter()
                .zip(self.components.iter())
                .map(|(&x, ln_prior)| ln_prior.ln_prior_1d(x, None))
                .sum(),
        }
    }
}
