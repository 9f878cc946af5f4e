//! Log-priors of the internal model coordinates

pub mod ln_prior;
pub use ln_prior::{IndComponentsLnPrior, LnPrior, LnPriorEvaluator, NoneLnPrior};

pub mod ln_prior_1d;
pub use ln_prior_1d::{
    LnPrior1D, LnPrior1DTrait, NoneLnPrior1D, NormalLnPrior1D, TruncatedNormalLnPrior1D,
    UniformLnPrior1D,
};
