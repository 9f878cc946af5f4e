use crate::error::ConfigError;
use crate::float_trait::LikeFloat;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stellar limb-darkening law
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LimbDarkeningLaw {
    Uniform,
    Linear,
    Quadratic,
    /// Quadratic law sampled in the `q1, q2` parametrization of Kipping (2013)
    Kipping2013,
}

impl LimbDarkeningLaw {
    /// Parse the law selector of a parameter table, absent selector is an error
    pub fn from_selector(selector: Option<&str>) -> Result<Self, ConfigError> {
        selector.ok_or(ConfigError::MissingLimbDarkening)?.parse()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
            Self::Kipping2013 => "kipping2013",
        }
    }

    /// Names of the table parameters the law is built from
    pub fn parameter_names(self) -> &'static [&'static str] {
        match self {
            Self::Uniform => &[],
            Self::Linear => &["u1"],
            Self::Quadratic | Self::Kipping2013 => &["u1", "u2"],
        }
    }

    /// Quadratic coefficients from the law parameters
    ///
    /// Parameters the law doesn't use are ignored.
    pub fn coefficients<U: LikeFloat>(self, u1: U, u2: U) -> LimbDarkening<U> {
        match self {
            Self::Uniform => LimbDarkening::uniform(),
            Self::Linear => LimbDarkening::quadratic(u1, U::zero()),
            Self::Quadratic => LimbDarkening::quadratic(u1, u2),
            Self::Kipping2013 => {
                let (u1, u2) = kipping2013(u1, u2);
                LimbDarkening::quadratic(u1, u2)
            }
        }
    }
}

impl FromStr for LimbDarkeningLaw {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "linear" => Ok(Self::Linear),
            "quadratic" => Ok(Self::Quadratic),
            "kipping2013" => Ok(Self::Kipping2013),
            _ => Err(ConfigError::UnknownLimbDarkeningLaw(s.to_owned())),
        }
    }
}

impl fmt::Display for LimbDarkeningLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quadratic limb-darkening coefficients from Kipping (2013) `q1, q2`
pub fn kipping2013<U: LikeFloat>(q1: U, q2: U) -> (U, U) {
    let sqrt_q1 = q1.sqrt();
    (
        U::two() * sqrt_q1 * q2,
        sqrt_q1 * (U::one() - U::two() * q2),
    )
}

/// Quadratic limb-darkening profile `I(mu) = 1 - u1 (1 - mu) - u2 (1 - mu)^2`
#[derive(Clone, Copy, Debug)]
pub struct LimbDarkening<U> {
    pub u1: U,
    pub u2: U,
    uniform: bool,
}

impl<U: LikeFloat> LimbDarkening<U> {
    pub fn uniform() -> Self {
        Self {
            u1: U::zero(),
            u2: U::zero(),
            uniform: true,
        }
    }

    pub fn quadratic(u1: U, u2: U) -> Self {
        Self {
            u1,
            u2,
            uniform: false,
        }
    }

    /// Uniform disk, known from the law rather than from coefficient values
    #[inline]
    pub fn is_uniform(&self) -> bool {
        self.uniform
    }

    /// Intensity at the projected radius `r` in stellar radii, unity at the disk center
    pub fn intensity(&self, r: U) -> U {
        let mu = (U::one() - r * r).max(U::zero()).sqrt();
        let one_minus_mu = U::one() - mu;
        U::one() - self.u1 * one_minus_mu - self.u2 * one_minus_mu * one_minus_mu
    }

    /// Disk-integrated intensity
    pub fn total_flux(&self) -> U {
        U::pi() * (U::one() - self.u1 / U::constant(3.0) - self.u2 / U::constant(6.0))
    }
}
