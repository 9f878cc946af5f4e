//! Physical constants and unit conversions of the two-body model

/// Gravitational constant, m^3 kg^-1 s^-2 (CODATA 2018)
pub const G: f64 = 6.674_30e-11;

/// Nominal solar mass, kg (IAU 2015)
pub const M_SUN: f64 = 1.988_409_870_698_051e30;

/// Nominal solar radius, m (IAU 2015)
pub const R_SUN: f64 = 6.957e8;

/// Jupiter-to-Sun mass ratio
pub const M_JUP_TO_M_SUN: f64 = 1.0 / 1047.57;

/// Number of seconds in a day, the time unit of the model
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Reference rotation phase of the planet map at zero shifted time, degrees
///
/// The sub-observer point at mid-transit is the night side, any east-west map asymmetry is
/// described by the sine amplitudes rather than by a separate offset.
pub const PLANET_THETA0_DEG: f64 = 180.0;
