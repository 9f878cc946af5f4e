use crate::astro::LimbDarkeningLaw;
use crate::error::ConfigError;
use crate::model::assembly::{AssembledModel, assemble};
use crate::model::backend::Concrete;
use crate::model::fit_point::FitPoint;
use crate::model::template::ModelTemplate;

use std::collections::BTreeMap;

/// Flux components evaluated on a time grid, channels concatenated in ascending order
#[derive(Clone, Debug, PartialEq)]
pub struct ModelComponents {
    /// Star and planet flux, a single channel-independent curve
    pub astrophysical: Vec<f64>,
    pub systematics: Vec<f64>,
    pub total: Vec<f64>,
}

/// Model rebuilt with plain numbers at a single point
///
/// Used for diagnostics and plotting: components are available separately and no
/// differentiation machinery is involved.
#[derive(Clone, Debug)]
pub struct ConcreteModel {
    fit_point: FitPoint,
    law: LimbDarkeningLaw,
    assembled: AssembledModel<f64>,
}

impl ConcreteModel {
    /// Model at a fit point, which must have a value for every fitted parameter
    pub fn new(template: &ModelTemplate, fit_point: FitPoint) -> Result<Self, ConfigError> {
        let values = template.registry().physical_values(&fit_point)?;
        Ok(Self::from_point(template, fit_point, values))
    }

    /// `values` are the physical values of the fitted parameters in the registry order
    pub(crate) fn from_point(
        template: &ModelTemplate,
        fit_point: FitPoint,
        values: Vec<f64>,
    ) -> Self {
        let assembled = assemble(template, &Concrete::new(&values));
        Self {
            fit_point,
            law: template.limb_darkening_law(),
            assembled,
        }
    }

    pub fn fit_point(&self) -> &FitPoint {
        &self.fit_point
    }

    pub fn assembled(&self) -> &AssembledModel<f64> {
        &self.assembled
    }

    #[inline]
    pub fn nchan(&self) -> usize {
        self.assembled.nchan()
    }

    /// Total flux of all channels
    pub fn evaluate(&self, t: &[f64]) -> Vec<f64> {
        self.assembled.flux(t)
    }

    pub fn astrophysical_flux(&self, t: &[f64]) -> Vec<f64> {
        self.assembled.astrophysical_flux(t)
    }

    pub fn systematics_flux(&self, t: &[f64]) -> Vec<f64> {
        self.assembled.systematics_flux(t)
    }

    pub fn components(&self, t: &[f64]) -> ModelComponents {
        ModelComponents {
            astrophysical: self.astrophysical_flux(t),
            systematics: self.systematics_flux(t),
            total: self.evaluate(t),
        }
    }

    /// Part of a channel-concatenated array which belongs to `channel`
    pub fn channel_slice<'a>(&self, values: &'a [f64], channel: usize) -> &'a [f64] {
        let n = values.len() / self.nchan();
        &values[channel * n..(channel + 1) * n]
    }

    /// Noise scale for the external uncertainties `err`
    pub fn noise_scale(&self, err: &[f64]) -> Vec<f64> {
        err.iter().map(|&err| self.assembled.noise.sigma(err)).collect()
    }

    /// Highest polynomial degree of a channel with exactly zero leading terms dropped
    pub fn polynomial_degree(&self, channel: usize) -> Option<usize> {
        self.assembled
            .systematics
            .channel(channel)
            .effective_poly_degree()
    }

    /// Quantities derived from the fitted parameters
    ///
    /// Quadratic limb-darkening coefficients are reported for every non-uniform law.
    pub fn derived(&self) -> BTreeMap<String, f64> {
        let mut derived = BTreeMap::new();
        if self.law != LimbDarkeningLaw::Uniform {
            let ld = &self.assembled.system.limb_darkening;
            derived.insert("u1_quadratic".to_owned(), ld.u1);
            derived.insert("u2_quadratic".to_owned(), ld.u2);
        }
        derived
    }
}
