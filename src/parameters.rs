use crate::error::ConfigError;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// How a parameter takes part in the model
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// Excluded from the model entirely
    Independent,
    /// Held at its table value
    Fixed,
    /// Inferred, per channel in multi-channel fits
    Free,
    /// Inferred once and reused by every channel
    Shared,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Independent => "independent",
            Self::Fixed => "fixed",
            Self::Free => "free",
            Self::Shared => "shared",
        }
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "independent" => Ok(Self::Independent),
            "fixed" => Ok(Self::Fixed),
            "free" => Ok(Self::Free),
            "shared" => Ok(Self::Shared),
            _ => Err(ConfigError::UnknownRole(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family of the prior distribution of a fitted parameter
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum PriorKind {
    /// Uniform on `[par1, par2]`
    Uniform,
    /// Normal with mean `par1` and standard deviation `par2`
    Normal,
    /// Normal truncated to `(0, +inf)`
    BoundedNormalLow,
    /// Normal truncated to `(-inf, 90]`
    BoundedNormalHigh,
    /// Exponent of a variable uniform on `[par1, par2]`
    LogUniform,
}

impl PriorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uniform => "U",
            Self::Normal => "N",
            Self::BoundedNormalLow => "BN0",
            Self::BoundedNormalHigh => "BN90",
            Self::LogUniform => "LU",
        }
    }
}

impl FromStr for PriorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "u" | "uniform" => Ok(Self::Uniform),
            "n" | "normal" => Ok(Self::Normal),
            "bn0" | "bounded-normal-low" => Ok(Self::BoundedNormalLow),
            "bn90" | "bounded-normal-high" => Ok(Self::BoundedNormalHigh),
            "lu" | "log-uniform" => Ok(Self::LogUniform),
            _ => Err(ConfigError::UnknownPriorKind(s.to_owned())),
        }
    }
}

impl TryFrom<String> for PriorKind {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PriorKind> for String {
    fn from(kind: PriorKind) -> Self {
        kind.as_str().to_owned()
    }
}

/// Prior of a fitted parameter as written in the parameter table
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PriorSpec {
    #[schemars(with = "String")]
    pub kind: PriorKind,
    pub par1: f64,
    pub par2: f64,
}

impl PriorSpec {
    pub fn uniform(lower: f64, upper: f64) -> Self {
        Self {
            kind: PriorKind::Uniform,
            par1: lower,
            par2: upper,
        }
    }

    pub fn normal(mu: f64, sigma: f64) -> Self {
        Self {
            kind: PriorKind::Normal,
            par1: mu,
            par2: sigma,
        }
    }

    /// Log-space uniform prior, `lower` and `upper` are natural logarithms of the bounds
    pub fn log_uniform(lower: f64, upper: f64) -> Self {
        Self {
            kind: PriorKind::LogUniform,
            par1: lower,
            par2: upper,
        }
    }
}

/// A single row of the parameter table
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
    #[schemars(with = "String")]
    pub role: Role,
    #[serde(default)]
    pub prior: Option<PriorSpec>,
}

impl Parameter {
    pub fn fixed(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            role: Role::Fixed,
            prior: None,
        }
    }

    pub fn free(name: impl Into<String>, value: f64, prior: PriorSpec) -> Self {
        Self {
            name: name.into(),
            value,
            role: Role::Free,
            prior: Some(prior),
        }
    }

    pub fn shared(name: impl Into<String>, value: f64, prior: PriorSpec) -> Self {
        Self {
            name: name.into(),
            value,
            role: Role::Shared,
            prior: Some(prior),
        }
    }

    pub fn independent(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            role: Role::Independent,
            prior: None,
        }
    }
}

/// Parameter table supplied by the pipeline stage
///
/// Rows are kept in the user order. `limb_dark` is kept as a raw string, so an unknown law is
/// reported as a [ConfigError] when the model is built.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ParameterTable {
    pub parameters: Vec<Parameter>,
    #[serde(default = "ParameterTable::default_nchan")]
    pub nchan: usize,
    #[serde(default)]
    pub limb_dark: Option<String>,
}

impl ParameterTable {
    pub fn new(nchan: usize) -> Self {
        Self {
            parameters: vec![],
            nchan,
            limb_dark: None,
        }
    }

    #[inline]
    pub fn default_nchan() -> usize {
        1
    }

    pub fn with(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_limb_dark(mut self, law: impl Into<String>) -> Self {
        self.limb_dark = Some(law.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    /// Check table-level invariants: positive channel number and unique names
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nchan == 0 {
            return Err(ConfigError::ZeroChannels);
        }
        let mut seen = HashSet::new();
        for name in self.names() {
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateParameter(name.to_owned()));
            }
        }
        Ok(())
    }
}
