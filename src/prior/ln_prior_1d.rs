use enum_dispatch::enum_dispatch;
use ordered_float::NotNan;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

#[enum_dispatch]
pub trait LnPrior1DTrait:
    Clone + Debug + Serialize + DeserializeOwned + PartialEq + Eq + Hash
{
    /// Evaluate the natural logarithm of the prior at x
    ///
    /// If `grad` is `Some`, the gradient d(ln_prior)/dx is also computed and stored in it.
    fn ln_prior_1d(&self, x: f64, grad: Option<&mut f64>) -> f64;
}

/// Natural logarithm of prior for a single internal coordinate of the model
#[enum_dispatch(LnPrior1DTrait)]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum LnPrior1D {
    None(NoneLnPrior1D),
    Normal(NormalLnPrior1D),
    TruncatedNormal(TruncatedNormalLnPrior1D),
    Uniform(UniformLnPrior1D),
}

impl LnPrior1D {
    pub fn none() -> Self {
        NoneLnPrior1D {}.into()
    }

    pub fn normal(mu: f64, std: f64) -> Result<Self, &'static str> {
        Ok(NormalLnPrior1D::new(mu, std)?.into())
    }

    /// Normal distribution truncated to `(lower, +inf)`
    pub fn normal_above(mu: f64, std: f64, lower: f64) -> Result<Self, &'static str> {
        Ok(TruncatedNormalLnPrior1D::new(mu, std, Some(lower), None)?.into())
    }

    /// Normal distribution truncated to `(-inf, upper]`
    pub fn normal_below(mu: f64, std: f64, upper: f64) -> Result<Self, &'static str> {
        Ok(TruncatedNormalLnPrior1D::new(mu, std, None, Some(upper))?.into())
    }

    pub fn uniform(left: f64, right: f64) -> Result<Self, &'static str> {
        Ok(UniformLnPrior1D::new(left, right)?.into())
    }

    /// Typical width of the distribution, used to scale the sampler space
    pub fn scale(&self) -> Option<f64> {
        match self {
            Self::None(_) => None,
            Self::Normal(p) => Some(p.std()),
            Self::TruncatedNormal(p) => Some(p.normal.std()),
            Self::Uniform(p) => Some(p.right() - p.left()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct NoneLnPrior1D {}

impl LnPrior1DTrait for NoneLnPrior1D {
    fn ln_prior_1d(&self, _x: f64, grad: Option<&mut f64>) -> f64 {
        if let Some(g) = grad {
            *g = 0.0;
        }
        0.0
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(
    into = "NormalLnPrior1DParameters",
    try_from = "NormalLnPrior1DParameters"
)]
pub struct NormalLnPrior1D {
    mu: NotNan<f64>,
    inv_std2: NotNan<f64>,
    ln_prob_coeff: NotNan<f64>,
}

impl NormalLnPrior1D {
    pub fn new(mu: f64, std: f64) -> Result<Self, &'static str> {
        if !(std.is_finite() && std > 0.0) {
            return Err("std must be positive and finite");
        }
        Ok(Self {
            mu: NotNan::new(mu).map_err(|_| "mu must be not NaN")?,
            inv_std2: NotNan::new(std.powi(-2)).map_err(|_| "std must be positive and finite")?,
            ln_prob_coeff: NotNan::new(-f64::ln(std) - 0.5 * f64::ln(std::f64::consts::TAU))
                .map_err(|_| "std must be positive and finite")?,
        })
    }

    fn mu(&self) -> f64 {
        self.mu.into_inner()
    }

    fn inv_std2(&self) -> f64 {
        self.inv_std2.into_inner()
    }

    fn std(&self) -> f64 {
        self.inv_std2().recip().sqrt()
    }

    fn ln_prob_coeff(&self) -> f64 {
        self.ln_prob_coeff.into_inner()
    }
}

impl LnPrior1DTrait for NormalLnPrior1D {
    fn ln_prior_1d(&self, x: f64, grad: Option<&mut f64>) -> f64 {
        let diff = self.mu() - x;
        let ln_prior = self.ln_prob_coeff() - 0.5 * diff.powi(2) * self.inv_std2();

        if let Some(g) = grad {
            *g = diff * self.inv_std2();
        }

        ln_prior
    }
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename = "NormalLnPrior1D")]
struct NormalLnPrior1DParameters {
    mu: f64,
    std: f64,
}

impl From<NormalLnPrior1D> for NormalLnPrior1DParameters {
    fn from(f: NormalLnPrior1D) -> Self {
        Self {
            mu: f.mu(),
            std: f.std(),
        }
    }
}

impl TryFrom<NormalLnPrior1DParameters> for NormalLnPrior1D {
    type Error = &'static str;

    fn try_from(f: NormalLnPrior1DParameters) -> Result<Self, Self::Error> {
        Self::new(f.mu, f.std)
    }
}

/// Normal distribution restricted to `(lower, upper]`
///
/// The density is not renormalized, so inside the bounds it equals the untruncated normal
/// density and outside it is zero.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(
    into = "TruncatedNormalLnPrior1DParameters",
    try_from = "TruncatedNormalLnPrior1DParameters"
)]
pub struct TruncatedNormalLnPrior1D {
    normal: NormalLnPrior1D,
    lower: Option<NotNan<f64>>,
    upper: Option<NotNan<f64>>,
}

impl TruncatedNormalLnPrior1D {
    pub fn new(
        mu: f64,
        std: f64,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<Self, &'static str> {
        let lower = lower
            .map(|x| NotNan::new(x).map_err(|_| "lower bound must be not NaN"))
            .transpose()?;
        let upper = upper
            .map(|x| NotNan::new(x).map_err(|_| "upper bound must be not NaN"))
            .transpose()?;
        if let (Some(lower), Some(upper)) = (lower, upper) {
            if lower >= upper {
                return Err("upper bound must be larger than lower bound");
            }
        }
        Ok(Self {
            normal: NormalLnPrior1D::new(mu, std)?,
            lower,
            upper,
        })
    }

    fn contains(&self, x: f64) -> bool {
        self.lower.is_none_or(|lower| x > lower.into_inner())
            && self.upper.is_none_or(|upper| x <= upper.into_inner())
    }
}

impl LnPrior1DTrait for TruncatedNormalLnPrior1D {
    fn ln_prior_1d(&self, x: f64, grad: Option<&mut f64>) -> f64 {
        if self.contains(x) {
            self.normal.ln_prior_1d(x, grad)
        } else {
            if let Some(g) = grad {
                *g = 0.0;
            }
            f64::NEG_INFINITY
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename = "TruncatedNormalLnPrior1D")]
struct TruncatedNormalLnPrior1DParameters {
    mu: f64,
    std: f64,
    lower: Option<f64>,
    upper: Option<f64>,
}

impl From<TruncatedNormalLnPrior1D> for TruncatedNormalLnPrior1DParameters {
    fn from(f: TruncatedNormalLnPrior1D) -> Self {
        Self {
            mu: f.normal.mu(),
            std: f.normal.std(),
            lower: f.lower.map(NotNan::into_inner),
            upper: f.upper.map(NotNan::into_inner),
        }
    }
}

impl TryFrom<TruncatedNormalLnPrior1DParameters> for TruncatedNormalLnPrior1D {
    type Error = &'static str;

    fn try_from(f: TruncatedNormalLnPrior1DParameters) -> Result<Self, Self::Error> {
        Self::new(f.mu, f.std, f.lower, f.upper)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(
    into = "UniformLnPrior1DParameters",
    try_from = "UniformLnPrior1DParameters"
)]
pub struct UniformLnPrior1D {
    range: std::ops::RangeInclusive<NotNan<f64>>,
    ln_prob: NotNan<f64>,
}

impl UniformLnPrior1D {
    pub fn new(left: f64, right: f64) -> Result<Self, &'static str> {
        if !(left.is_finite() && right.is_finite()) {
            return Err("bounds must be finite");
        }
        if left >= right {
            return Err("right must be larger than left");
        }
        let left = NotNan::new(left).map_err(|_| "left must be finite")?;
        let right = NotNan::new(right).map_err(|_| "right must be finite")?;
        Ok(Self {
            range: left..=right,
            ln_prob: NotNan::new(-f64::ln(right.into_inner() - left.into_inner()))
                .map_err(|_| "right must be larger than left")?,
        })
    }

    fn left(&self) -> f64 {
        self.range.start().into_inner()
    }

    fn right(&self) -> f64 {
        self.range.end().into_inner()
    }

    fn ln_prob(&self) -> f64 {
        self.ln_prob.into_inner()
    }
}

impl LnPrior1DTrait for UniformLnPrior1D {
    fn ln_prior_1d(&self, x: f64, grad: Option<&mut f64>) -> f64 {
        // Constant inside the range, so the gradient is zero everywhere
        if let Some(g) = grad {
            *g = 0.0;
        }
        let x = match NotNan::new(x) {
            Ok(x) => x,
            Err(_) => return f64::NEG_INFINITY,
        };
        if self.range.contains(&x) {
            self.ln_prob()
        } else {
            f64::NEG_INFINITY
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename = "UniformLnPrior")]
struct UniformLnPrior1DParameters {
    range: std::ops::RangeInclusive<f64>,
}

impl From<UniformLnPrior1D> for UniformLnPrior1DParameters {
    fn from(f: UniformLnPrior1D) -> Self {
        Self {
            range: f.left()..=f.right(),
        }
    }
}

impl TryFrom<UniformLnPrior1DParameters> for UniformLnPrior1D {
    type Error = &'static str;

    fn try_from(f: UniformLnPrior1DParameters) -> Result<Self, Self::Error> {
        Self::new(*f.range.start(), *f.range.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_trait::{LikeFloat, seeded_dual};
    use approx::assert_relative_eq;

    fn ln_prior_normal<T: LikeFloat>(x: T, mu: f64, std: f64) -> T {
        let diff = T::constant(mu) - x;
        let inv_std2 = T::constant(std.powi(-2));
        let ln_prob_coeff =
            T::constant(-f64::ln(std) - 0.5 * f64::ln(std::f64::consts::TAU));
        ln_prob_coeff - T::half() * diff * diff * inv_std2
    }

    // Compare analytic gradient with the one propagated through dual numbers
    fn test_prior_gradient<F, P>(f: F, test_values: &[f64], prior: P)
    where
        F: Fn(crate::Dual) -> crate::Dual,
        P: LnPrior1DTrait,
    {
        for &x in test_values {
            let mut actual_grad = 0.0;
            let actual_ln_p = prior.ln_prior_1d(x, Some(&mut actual_grad));

            if !actual_ln_p.is_finite() {
                continue;
            }

            let ln_p_dual = f(seeded_dual(x));
            assert_relative_eq!(actual_ln_p, ln_p_dual.re(), epsilon = 1e-12);
            assert_relative_eq!(actual_grad, ln_p_dual[1], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_none_gradient() {
        let prior = NoneLnPrior1D {};
        test_prior_gradient(|_| crate::Dual::constant(0.0), &[0.0, 1.0, 5.0], prior);
    }

    #[test]
    fn test_normal_gradient() {
        let prior = NormalLnPrior1D::new(5.0, 2.0).unwrap();
        test_prior_gradient(
            |x| ln_prior_normal(x, 5.0, 2.0),
            &[0.0, 3.0, 5.0, 7.0, 10.0],
            prior,
        );
    }

    #[test]
    fn test_truncated_normal_gradient_inside_bounds() {
        let prior = TruncatedNormalLnPrior1D::new(0.1, 0.05, Some(0.0), None).unwrap();
        test_prior_gradient(
            |x| ln_prior_normal(x, 0.1, 0.05),
            &[0.01, 0.1, 0.3],
            prior,
        );
    }

    #[test]
    fn test_uniform_gradient() {
        let prior = UniformLnPrior1D::new(0.0, 10.0).unwrap();
        test_prior_gradient(
            |_| crate::Dual::constant(-f64::ln(10.0)),
            &[1.0, 5.0, 9.0],
            prior,
        );
    }

    #[test]
    fn truncated_normal_low_bound_is_exclusive() {
        let prior = LnPrior1D::normal_above(1.0, 1.0, 0.0).unwrap();
        assert_eq!(prior.ln_prior_1d(0.0, None), f64::NEG_INFINITY);
        assert_eq!(prior.ln_prior_1d(-1.0, None), f64::NEG_INFINITY);
        assert!(prior.ln_prior_1d(1e-10, None).is_finite());
    }

    #[test]
    fn truncated_normal_high_bound_is_inclusive() {
        let prior = LnPrior1D::normal_below(89.0, 1.0, 90.0).unwrap();
        let normal = LnPrior1D::normal(89.0, 1.0).unwrap();
        assert_eq!(prior.ln_prior_1d(90.0, None), normal.ln_prior_1d(90.0, None));
        assert_eq!(prior.ln_prior_1d(90.5, None), f64::NEG_INFINITY);
    }

    #[test]
    fn uniform_outside_is_impossible() {
        let prior = LnPrior1D::uniform(-1.0, 1.0).unwrap();
        assert_eq!(prior.ln_prior_1d(1.5, None), f64::NEG_INFINITY);
        assert_eq!(prior.ln_prior_1d(f64::NAN, None), f64::NEG_INFINITY);
        assert_relative_eq!(prior.ln_prior_1d(0.0, None), -f64::ln(2.0));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(LnPrior1D::normal(0.0, 0.0).is_err());
        assert!(LnPrior1D::normal(0.0, -1.0).is_err());
        assert!(LnPrior1D::normal(f64::NAN, 1.0).is_err());
        assert!(LnPrior1D::uniform(1.0, 1.0).is_err());
        assert!(LnPrior1D::uniform(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn serialization_round_trip() {
        let priors = [
            LnPrior1D::none(),
            LnPrior1D::normal(1.0, 0.5).unwrap(),
            LnPrior1D::normal_below(88.0, 2.0, 90.0).unwrap(),
            LnPrior1D::uniform(-3.0, 4.0).unwrap(),
        ];
        for prior in priors {
            let serialized = serde_json::to_string(&prior).unwrap();
            let deserialized: LnPrior1D = serde_json::from_str(&serialized).unwrap();
            assert_eq!(prior, deserialized);
        }
    }

    #[test]
    fn scale_reflects_width() {
        assert_eq!(LnPrior1D::none().scale(), None);
        assert_relative_eq!(LnPrior1D::normal(0.0, 0.25).unwrap().scale().unwrap(), 0.25);
        assert_relative_eq!(LnPrior1D::uniform(2.0, 5.0).unwrap().scale().unwrap(), 3.0);
    }
}
