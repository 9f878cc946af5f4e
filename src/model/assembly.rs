use crate::astro::{KeplerOrbit, PlanetMap, StarPlanetSystem};
use crate::float_trait::LikeFloat;
use crate::likelihood::NoiseModel;
use crate::model::backend::Backend;
use crate::model::template::{ModelTemplate, NoiseSlot};
use crate::systematics::Systematics;

/// Composite model with every input resolved to a scalar
#[derive(Clone, Debug)]
pub struct AssembledModel<U> {
    pub system: StarPlanetSystem<U>,
    pub systematics: Systematics<U>,
    pub noise: NoiseModel<U>,
}

/// Build the composite model from a template with values supplied by a backend
///
/// This is the only place where the model is put together, so every backend evaluates exactly
/// the same formulas.
pub fn assemble<B: Backend>(template: &ModelTemplate, backend: &B) -> AssembledModel<B::Scalar> {
    let p = template.physical();
    let value = |slot| backend.resolve(slot);

    let orbit = KeplerOrbit::from_physical(
        value(p.ms),
        value(p.mp),
        value(p.rs),
        value(p.per),
        value(p.t0),
        value(p.ecc),
        value(p.inc),
        value(p.w),
    );
    let system = StarPlanetSystem {
        limb_darkening: template
            .limb_darkening_law()
            .coefficients(value(p.u1), value(p.u2)),
        orbit,
        radius_ratio: value(p.rp),
        map: PlanetMap::new(value(p.fp), p.map.map(value), p.map_degree),
        occultation_steps: template.settings().occultation_steps,
    };

    let coefficients = template.coefficients().filter_map(|&slot| Some(value(slot)));
    let systematics = Systematics::from_table(&coefficients, template.poly_len());

    let noise = match template.noise() {
        NoiseSlot::External => NoiseModel::External,
        NoiseSlot::Multiplier(slot) => NoiseModel::Multiplier(value(slot)),
        NoiseSlot::Constant(slot) => NoiseModel::Constant(value(slot)),
    };

    AssembledModel {
        system,
        systematics,
        noise,
    }
}

impl<U: LikeFloat> AssembledModel<U> {
    #[inline]
    pub fn nchan(&self) -> usize {
        self.systematics.nchan()
    }

    /// Star and planet flux at times `t`, the same for every channel
    pub fn astrophysical_flux(&self, t: &[f64]) -> Vec<U> {
        self.system.flux(t)
    }

    /// Instrumental trends of all channels concatenated in ascending channel order
    pub fn systematics_flux(&self, t: &[f64]) -> Vec<U> {
        self.systematics.flux(t)
    }

    /// Product of the astrophysical flux and the per-channel trends, channels concatenated
    pub fn flux(&self, t: &[f64]) -> Vec<U> {
        let astrophysical = self.astrophysical_flux(t);
        self.systematics_flux(t)
            .into_iter()
            .zip(astrophysical.iter().cycle())
            .map(|(trend, &flux)| flux * trend)
            .collect()
    }
}
