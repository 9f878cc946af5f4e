use crate::astro::constants::{G, M_JUP_TO_M_SUN, M_SUN, R_SUN, SECONDS_PER_DAY};
use crate::float_trait::LikeFloat;

use std::f64::consts::TAU;

const KEPLER_MAX_ITERATIONS: usize = 64;
const KEPLER_TOLERANCE: f64 = 1e-13;

/// Planet position relative to the star, in stellar radii
///
/// `x` and `y` lie in the sky plane, `los` is along the line of sight and is positive when the
/// planet is closer to the observer than the star.
#[derive(Clone, Copy, Debug)]
pub struct SkyPosition<U> {
    pub x: U,
    pub y: U,
    pub los: U,
}

impl<U: LikeFloat> SkyPosition<U> {
    /// Projected star-planet separation
    ///
    /// The separation has a minimum at the origin, so its derivative there is taken as zero.
    pub fn separation(&self) -> U {
        if self.x.re() == 0.0 && self.y.re() == 0.0 {
            return U::zero();
        }
        U::hypot(self.x, self.y)
    }

    pub fn in_front(&self) -> bool {
        self.los.re() > 0.0
    }
}

/// Keplerian orbit of the planet around the star
#[derive(Clone, Debug)]
pub struct KeplerOrbit<U> {
    /// Semi-major axis in stellar radii
    pub a: U,
    /// Orbital period in days
    pub period: U,
    /// Time of mid-transit in days
    pub t0: U,
    pub ecc: U,
    /// Argument of periapsis in radians
    pub omega: U,
    /// Inclination in radians
    pub inc: U,
    mean_anomaly_at_transit: U,
}

impl<U: LikeFloat> KeplerOrbit<U> {
    /// Orbit from physical parameters
    ///
    /// Masses are given in solar (`ms`) and Jupiter (`mp`) units, `rs` in solar radii, `period` in
    /// days, `inc` and `w` in degrees. The semi-major axis follows from Kepler's third law.
    #[allow(clippy::too_many_arguments)]
    pub fn from_physical(ms: U, mp: U, rs: U, period: U, t0: U, ecc: U, inc: U, w: U) -> Self {
        let a = semi_major_axis(ms, mp, rs, period);
        Self::new(a, period, t0, ecc, inc.deg_to_rad(), w.deg_to_rad())
    }

    /// Orbit from the semi-major axis in stellar radii, angles in radians
    pub fn new(a: U, period: U, t0: U, ecc: U, inc: U, omega: U) -> Self {
        // True anomaly at mid-transit puts the planet in front of the star
        let f_transit = U::constant(std::f64::consts::FRAC_PI_2) - omega;
        let e_transit = eccentric_from_true_anomaly(f_transit, ecc);
        let mean_anomaly_at_transit = e_transit - ecc * e_transit.sin();
        Self {
            a,
            period,
            t0,
            ecc,
            omega,
            inc,
            mean_anomaly_at_transit,
        }
    }

    pub fn mean_anomaly(&self, t: f64) -> U {
        U::constant(TAU) * (U::constant(t) - self.t0) / self.period + self.mean_anomaly_at_transit
    }

    pub fn position(&self, t: f64) -> SkyPosition<U> {
        let ecc_anomaly = solve_kepler(self.mean_anomaly(t), self.ecc);
        let true_anomaly = true_from_eccentric_anomaly(ecc_anomaly, self.ecc);
        let r = self.a * (U::one() - self.ecc * ecc_anomaly.cos());
        let phase = self.omega + true_anomaly;
        SkyPosition {
            x: -r * phase.cos(),
            y: -r * phase.sin() * self.inc.cos(),
            los: r * phase.sin() * self.inc.sin(),
        }
    }
}

/// Semi-major axis in stellar radii from Kepler's third law
pub fn semi_major_axis<U: LikeFloat>(ms: U, mp: U, rs: U, period: U) -> U {
    let total_mass = (ms + mp * U::constant(M_JUP_TO_M_SUN)) * U::constant(M_SUN);
    let period_s = period * U::constant(SECONDS_PER_DAY);
    let a_m = (U::constant(G) * total_mass * period_s * period_s / U::constant(TAU * TAU)).cbrt();
    a_m / (rs * U::constant(R_SUN))
}

/// Solve Kepler's equation `M = E - e sin(E)` for the eccentric anomaly
///
/// Newton iterations are performed on the scalar type itself, so dual-number derivatives are
/// carried through the solution.
pub fn solve_kepler<U: LikeFloat>(mean_anomaly: U, ecc: U) -> U {
    // Reduce to [-pi, pi], the shift is a constant and doesn't affect derivatives
    let turns = (mean_anomaly.re() / TAU).round();
    let m = mean_anomaly - U::constant(turns * TAU);

    let mut e = if ecc.re() < 0.8 {
        m
    } else {
        m + ecc * U::constant(0.85 * m.re().sin().signum())
    };
    let newton_step = |e: U| (e - ecc * e.sin() - m) / (U::one() - ecc * e.cos());
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let step = newton_step(e);
        e = e - step;
        if step.re().abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    // Derivative part converges one step behind the value
    e = e - newton_step(e);
    e + U::constant(turns * TAU)
}

pub fn true_from_eccentric_anomaly<U: LikeFloat>(ecc_anomaly: U, ecc: U) -> U {
    let half = ecc_anomaly * U::half();
    U::two()
        * U::atan2(
            (U::one() + ecc).sqrt() * half.sin(),
            (U::one() - ecc).sqrt() * half.cos(),
        )
}

pub fn eccentric_from_true_anomaly<U: LikeFloat>(true_anomaly: U, ecc: U) -> U {
    let half = true_anomaly * U::half();
    U::two()
        * U::atan2(
            (U::one() - ecc).sqrt() * half.sin(),
            (U::one() + ecc).sqrt() * half.cos(),
        )
}
