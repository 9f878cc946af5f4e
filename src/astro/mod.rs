//! Two-body radiative model of a star and a transiting planet

pub mod constants;

mod limb_darkening;
pub use limb_darkening::{LimbDarkening, LimbDarkeningLaw, kipping2013};

mod occultation;
pub use occultation::{occulted_star_flux, overlap_area, planet_visible_fraction};

mod orbit;
pub use orbit::{KeplerOrbit, SkyPosition, semi_major_axis, solve_kepler};

mod planet_map;
pub use planet_map::PlanetMap;

mod system;
pub use system::{DEFAULT_OCCULTATION_STEPS, StarPlanetSystem, SystemFlux};
