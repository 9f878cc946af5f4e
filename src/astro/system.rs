use crate::astro::constants::PLANET_THETA0_DEG;
use crate::astro::limb_darkening::LimbDarkening;
use crate::astro::occultation::{occulted_star_flux, planet_visible_fraction};
use crate::astro::orbit::KeplerOrbit;
use crate::astro::planet_map::PlanetMap;
use crate::float_trait::LikeFloat;

use std::f64::consts::TAU;

/// Default number of annuli of the limb-darkened occultation integral
pub const DEFAULT_OCCULTATION_STEPS: usize = 300;

/// Star and a single planet on a Keplerian orbit
///
/// The star has unit out-of-transit flux, the planet radius is given in stellar radii.
#[derive(Clone, Debug)]
pub struct StarPlanetSystem<U> {
    pub limb_darkening: LimbDarkening<U>,
    pub orbit: KeplerOrbit<U>,
    pub radius_ratio: U,
    pub map: PlanetMap<U>,
    pub occultation_steps: usize,
}

/// Flux components of the system at a single time
#[derive(Clone, Copy, Debug)]
pub struct SystemFlux<U> {
    pub star: U,
    pub planet: U,
}

impl<U: LikeFloat> SystemFlux<U> {
    #[inline]
    pub fn total(&self) -> U {
        self.star + self.planet
    }
}

impl<U: LikeFloat> StarPlanetSystem<U> {
    /// Rotation angle of the tidally locked planet, radians
    pub fn rotation_angle(&self, t: f64) -> U {
        U::constant(PLANET_THETA0_DEG).deg_to_rad()
            + U::constant(TAU) * (U::constant(t) - self.orbit.t0) / self.orbit.period
    }

    pub fn components_at(&self, t: f64) -> SystemFlux<U> {
        let position = self.orbit.position(t);
        let z = position.separation();
        let p = self.radius_ratio;
        let mut planet = self.map.flux(self.rotation_angle(t));
        let star = if position.in_front() {
            occulted_star_flux(&self.limb_darkening, p, z, self.occultation_steps)
        } else {
            planet = planet * planet_visible_fraction(p, z);
            U::one()
        };
        SystemFlux { star, planet }
    }

    /// Total flux at time `t`, days
    pub fn flux_at(&self, t: f64) -> U {
        self.components_at(t).total()
    }

    pub fn flux(&self, t: &[f64]) -> Vec<U> {
        t.iter().map(|&t| self.flux_at(t)).collect()
    }
}
