use crate::astro::limb_darkening::LimbDarkening;
use crate::float_trait::LikeFloat;

/// Relative tolerance that snaps nearly tangent disks onto the closed-form branches
const CONTACT_TOLERANCE: f64 = 1e-12;

/// Overlap area of two disks of radii `r` and `p` with centers separated by `z`
///
/// The area and its partial derivatives are computed in double precision and the result is
/// lifted back to the scalar type to first order. The partials `2 r theta_r`, `2 p theta_p` and
/// minus the chord length stay finite at contact, where differentiating the area formula
/// itself would divide zero by zero.
pub fn overlap_area<U: LikeFloat>(r: U, p: U, z: U) -> U {
    let (area, [d_r, d_p, d_z]) = overlap_area_with_partials(r.re(), p.re(), z.re());
    let lift = |x: U, d: f64| (x - U::constant(x.re())) * U::constant(d);
    U::constant(area) + lift(r, d_r) + lift(p, d_p) + lift(z, d_z)
}

/// Overlap area and its partials with respect to `r`, `p` and `z`
fn overlap_area_with_partials(r: f64, p: f64, z: f64) -> (f64, [f64; 3]) {
    use std::f64::consts::PI;

    let eps = CONTACT_TOLERANCE * (r + p);
    if z >= r + p - eps {
        return (0.0, [0.0; 3]);
    }
    if z <= (r - p).abs() + eps {
        return if r <= p {
            (PI * r * r, [2.0 * PI * r, 0.0, 0.0])
        } else {
            (PI * p * p, [0.0, 2.0 * PI * p, 0.0])
        };
    }
    let (r2, p2, z2) = (r * r, p * p, z * z);
    // Distances from each center to the common chord, along the line of centers
    let x_r = (r2 + z2 - p2) / (2.0 * z);
    let x_p = (p2 + z2 - r2) / (2.0 * z);
    let half_chord = (r2 - x_r * x_r).max(0.0).sqrt();
    let theta_r = f64::atan2(half_chord, x_r);
    let theta_p = f64::atan2(half_chord, x_p);
    let area = r2 * theta_r + p2 * theta_p - z * half_chord;
    (
        area,
        [2.0 * r * theta_r, 2.0 * p * theta_p, -2.0 * half_chord],
    )
}

/// Stellar flux left visible by a planet of radius `p` at separation `z`, out-of-transit
/// flux is unity
///
/// The uniform disk has a closed form. Limb-darkened disks are integrated over `steps`
/// concentric annuli covering the radii the planet disk touches, each annulus weighted by the
/// intensity at its middle radius.
pub fn occulted_star_flux<U: LikeFloat>(
    limb_darkening: &LimbDarkening<U>,
    p: U,
    z: U,
    steps: usize,
) -> U {
    if p <= U::zero() || z >= U::one() + p {
        return U::one();
    }
    if limb_darkening.is_uniform() || steps == 0 {
        return U::one() - overlap_area(U::one(), p, z) / U::pi();
    }

    let r_low = (z - p).max(U::zero());
    let r_high = (z + p).min(U::one());
    let dr = (r_high - r_low) / U::constant(steps as f64);
    let mut area_inside = overlap_area(r_low, p, z);
    let mut blocked = U::zero();
    for i in 0..steps {
        let r_outer = r_low + dr * U::constant((i + 1) as f64);
        let r_mid = r_low + dr * U::constant(i as f64 + 0.5);
        let area_outer = overlap_area(r_outer, p, z);
        blocked = blocked + limb_darkening.intensity(r_mid) * (area_outer - area_inside);
        area_inside = area_outer;
    }
    U::one() - blocked / limb_darkening.total_flux()
}

/// Fraction of the planet disk visible while it is behind the star
pub fn planet_visible_fraction<U: LikeFloat>(p: U, z: U) -> U {
    if p <= U::zero() {
        return U::one();
    }
    U::one() - overlap_area(U::one(), p, z) / (U::pi() * p * p)
}
