use crate::error::ConfigError;
use crate::float_trait::LikeFloat;
use crate::model::FitPoint;
use crate::parameters::{Parameter, ParameterTable, PriorKind, PriorSpec, Role};
use crate::prior::{LnPrior, LnPrior1D};

use itertools::Itertools;

/// Parameters every model needs, checked before anything else
pub const REQUIRED_PARAMETERS: [&str; 3] = ["Ms", "Mp", "Rs"];

/// Parameters the astrophysical model needs in addition to [REQUIRED_PARAMETERS]
pub const REQUIRED_ORBIT_PARAMETERS: [&str; 2] = ["rp", "per"];

/// Names whose normal prior is truncated to positive values
const POSITIVE_NORMAL_NAMES: [&str; 6] = ["rp", "per", "ecc", "scatter_mult", "scatter_ppm", "c0"];

/// Names whose normal prior is truncated from above at 90 degrees
const HIGH_BOUNDED_NORMAL_NAMES: [&str; 1] = ["inc"];

const HIGH_BOUND: f64 = 90.0;

/// Map from an internal coordinate to the physical value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transform {
    Identity,
    /// Internal coordinate is the natural logarithm of the physical value
    Exp,
}

impl Transform {
    #[inline]
    pub fn apply<U: LikeFloat>(self, x: U) -> U {
        match self {
            Self::Identity => x,
            Self::Exp => x.exp(),
        }
    }

    #[inline]
    pub fn inverse(self, value: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::Exp => value.ln(),
        }
    }
}

/// Resolved model input: a constant or an internal coordinate
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Slot {
    Fixed(f64),
    Variable { index: usize, transform: Transform },
}

impl Slot {
    /// Whether the slot can change the model, that is it isn't a zero constant
    pub fn is_populated(&self) -> bool {
        match self {
            Self::Fixed(value) => *value != 0.0,
            Self::Variable { .. } => true,
        }
    }
}

/// Fitted parameter owning one internal coordinate
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub name: String,
    pub prior: LnPrior1D,
    pub transform: Transform,
    /// Initial value in the internal space
    pub init: f64,
}

#[derive(Clone, Debug)]
struct Entry {
    name: String,
    role: Role,
    slot: Slot,
}

/// Named model inputs with their roles and priors
///
/// Independent parameters are dropped, every fixed parameter becomes a constant slot and every
/// free or shared parameter owns a single internal coordinate.
#[derive(Clone, Debug)]
pub struct Registry {
    nchan: usize,
    limb_dark: Option<String>,
    entries: Vec<Entry>,
    variables: Vec<Variable>,
    ln_prior: LnPrior,
    multichannel_free: Vec<String>,
}

impl Registry {
    pub fn new(table: &ParameterTable) -> Result<Self, ConfigError> {
        table.validate()?;
        check_required(table)?;

        let mut entries = vec![];
        let mut variables = vec![];
        let mut multichannel_free = vec![];
        for parameter in table.parameters.iter() {
            let slot = match parameter.role {
                Role::Independent => continue,
                Role::Fixed => Slot::Fixed(parameter.value),
                Role::Free | Role::Shared => {
                    if parameter.role == Role::Free && table.nchan > 1 {
                        log::warn!(
                            "parameter {} is free in a {}-channel fit, independent per-channel \
                             fitting is not supported and a single value is shared by all channels",
                            parameter.name,
                            table.nchan
                        );
                        multichannel_free.push(parameter.name.clone());
                    }
                    let variable = make_variable(parameter)?;
                    let slot = Slot::Variable {
                        index: variables.len(),
                        transform: variable.transform,
                    };
                    variables.push(variable);
                    slot
                }
            };
            entries.push(Entry {
                name: parameter.name.clone(),
                role: parameter.role,
                slot,
            });
        }

        let ln_prior = if variables.is_empty() {
            LnPrior::none()
        } else {
            LnPrior::ind_components(variables.iter().map(|v| v.prior.clone()).collect())
        };

        Ok(Self {
            nchan: table.nchan,
            limb_dark: table.limb_dark.clone(),
            entries,
            variables,
            ln_prior,
            multichannel_free,
        })
    }

    #[inline]
    pub fn nchan(&self) -> usize {
        self.nchan
    }

    pub fn limb_dark(&self) -> Option<&str> {
        self.limb_dark.as_deref()
    }

    /// Slot of a parameter, `None` for absent and independent parameters
    pub fn slot(&self, name: &str) -> Option<Slot> {
        self.entry(name).map(|e| e.slot)
    }

    pub fn role(&self, name: &str) -> Option<Role> {
        self.entry(name).map(|e| e.role)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Names and roles of all model parameters in the table order
    pub fn roles(&self) -> impl Iterator<Item = (&str, Role)> {
        self.entries.iter().map(|e| (e.name.as_str(), e.role))
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Number of internal coordinates
    #[inline]
    pub fn ndim(&self) -> usize {
        self.variables.len()
    }

    /// Free parameters of a multi-channel table which were collapsed into a single variable
    pub fn multichannel_free(&self) -> &[String] {
        &self.multichannel_free
    }

    pub fn ln_prior(&self) -> &LnPrior {
        &self.ln_prior
    }

    /// Table values of the fitted parameters mapped into the internal space
    pub fn initial_point(&self) -> Vec<f64> {
        self.variables.iter().map(|v| v.init).collect()
    }

    /// Physical values of the fitted parameters at the internal point `x`
    pub fn fit_point(&self, x: &[f64]) -> FitPoint {
        assert_eq!(
            x.len(),
            self.ndim(),
            "internal point should have one coordinate per fitted parameter"
        );
        self.variables
            .iter()
            .zip(x.iter())
            .map(|(v, &x)| (v.name.clone(), v.transform.apply(x)))
            .collect()
    }

    /// Physical value of every fitted parameter taken from a fit point
    pub fn physical_values(&self, point: &FitPoint) -> Result<Vec<f64>, ConfigError> {
        self.variables
            .iter()
            .map(|v| {
                point
                    .get(&v.name)
                    .ok_or_else(|| ConfigError::MissingFitValue(v.name.clone()))
            })
            .collect()
    }
}

fn check_required(table: &ParameterTable) -> Result<(), ConfigError> {
    let present = |name: &str| {
        table
            .get(name)
            .is_some_and(|p| p.role != Role::Independent)
    };
    for required in [&REQUIRED_PARAMETERS[..], &REQUIRED_ORBIT_PARAMETERS[..]] {
        let missing = required
            .iter()
            .filter(|&&name| !present(name))
            .map(|&name| name.to_owned())
            .collect_vec();
        if !missing.is_empty() {
            return Err(ConfigError::MissingParameters(missing));
        }
    }
    Ok(())
}

fn make_variable(parameter: &Parameter) -> Result<Variable, ConfigError> {
    let spec = parameter
        .prior
        .ok_or_else(|| ConfigError::MissingPrior(parameter.name.clone()))?;
    let invalid = |reason| ConfigError::InvalidPrior {
        name: parameter.name.clone(),
        reason,
    };
    let (prior, transform) = make_prior(&parameter.name, spec).map_err(invalid)?;
    let init = transform.inverse(parameter.value);
    if !init.is_finite() {
        return Err(invalid("initial value is outside of the parameter domain"));
    }
    Ok(Variable {
        name: parameter.name.clone(),
        prior,
        transform,
        init,
    })
}

fn make_prior(name: &str, spec: PriorSpec) -> Result<(LnPrior1D, Transform), &'static str> {
    let PriorSpec { kind, par1, par2 } = spec;
    let prior = match kind {
        PriorKind::Uniform => LnPrior1D::uniform(par1, par2)?,
        PriorKind::Normal if POSITIVE_NORMAL_NAMES.contains(&name) => {
            LnPrior1D::normal_above(par1, par2, 0.0)?
        }
        PriorKind::Normal if HIGH_BOUNDED_NORMAL_NAMES.contains(&name) => {
            LnPrior1D::normal_below(par1, par2, HIGH_BOUND)?
        }
        PriorKind::Normal => LnPrior1D::normal(par1, par2)?,
        PriorKind::BoundedNormalLow => LnPrior1D::normal_above(par1, par2, 0.0)?,
        PriorKind::BoundedNormalHigh => LnPrior1D::normal_below(par1, par2, HIGH_BOUND)?,
        PriorKind::LogUniform => return Ok((LnPrior1D::uniform(par1, par2)?, Transform::Exp)),
    };
    Ok((prior, Transform::Identity))
}
