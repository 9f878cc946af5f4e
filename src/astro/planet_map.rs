use crate::float_trait::LikeFloat;

/// Spherical-harmonic surface map of the planet up to degree two
///
/// Coefficients multiply the 4-pi-normalized real harmonics `Y(1,0)`, `Y(1,1)`, `Y(2,0)` and
/// `Y(2,1)` in a frame where the rotation axis is perpendicular to the line of sight.
#[derive(Clone, Copy, Debug)]
pub struct PlanetMap<U> {
    /// Planet-to-star flux ratio of the uniform component
    pub amplitude: U,
    pub cos1: U,
    pub sin1: U,
    pub cos2: U,
    pub sin2: U,
    degree: usize,
}

impl<U: LikeFloat> PlanetMap<U> {
    /// `degree` is the highest harmonic degree the map was configured with
    pub fn new(amplitude: U, [cos1, sin1, cos2, sin2]: [U; 4], degree: usize) -> Self {
        Self {
            amplitude,
            cos1,
            sin1,
            cos2,
            sin2,
            degree: degree.min(2),
        }
    }

    pub fn dark() -> Self {
        Self::new(U::zero(), [U::zero(); 4], 0)
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Disk-integrated flux at the rotation angle `theta`, radians
    pub fn flux(&self, theta: U) -> U {
        let mut shape = U::one();
        if self.degree >= 1 {
            let c = U::constant(2.0 / f64::sqrt(3.0));
            shape = shape + c * (self.cos1 * theta.cos() - self.sin1 * theta.sin());
        }
        if self.degree >= 2 {
            let two_theta = U::two() * theta;
            let c20 = U::constant(f64::sqrt(5.0) / 16.0);
            let c21 = U::constant(f64::sqrt(15.0) / 8.0);
            shape = shape + c20 * self.cos2 * (U::constant(3.0) * two_theta.cos() + U::one())
                - c21 * self.sin2 * two_theta.sin();
        }
        self.amplitude * shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn uniform_map_is_constant() {
        let map = PlanetMap::new(1e-3, [0.0; 4], 0);
        for i in 0..8 {
            assert_relative_eq!(map.flux(0.8 * i as f64), 1e-3);
        }
    }

    #[test]
    fn dipole_peaks_at_dayside() {
        let map = PlanetMap::new(1e-3, [-0.5, 0.0, 0.0, 0.0], 1);
        // Rotation angle pi faces the day side for a negative Y(1,0) coefficient
        let day = map.flux(PI);
        let night = map.flux(0.0);
        assert!(day > night);
        assert_relative_eq!(day - night, 2e-3 * 2.0 / 3.0_f64.sqrt() * 0.5, epsilon = 1e-15);
    }

    #[test]
    fn degree_limits_harmonics() {
        let coefficients = [0.1, 0.2, 0.3, 0.4];
        let map1 = PlanetMap::new(1.0, coefficients, 1);
        let map2 = PlanetMap::new(1.0, coefficients, 2);
        let theta = 0.3_f64;
        let quadrupole = f64::sqrt(5.0) / 16.0 * 0.3 * (3.0 * (2.0 * theta).cos() + 1.0)
            - f64::sqrt(15.0) / 8.0 * 0.4 * (2.0 * theta).sin();
        assert_relative_eq!(map2.flux(theta) - map1.flux(theta), quadrupole, epsilon = 1e-14);
        assert_eq!(PlanetMap::<f64>::dark().flux(1.0), 0.0);
    }
}
