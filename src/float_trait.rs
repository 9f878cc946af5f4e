use hyperdual::Hyperdual;
use std::fmt::Debug;

/// Dual number carrying a value and one directional derivative
///
/// Index `0` is the value and index `1` is the derivative along the seeded direction.
pub type Dual = Hyperdual<f64, 2>;

/// Scalar the model is evaluated with
///
/// The same model code runs with plain `f64` for the concrete build and with [Dual] for the
/// differentiable build, so every formula in the crate is written against this trait.
pub trait LikeFloat: num_traits::Float + Debug + 'static {
    /// Lift an `f64` constant into the scalar type
    fn constant(x: f64) -> Self;

    /// Real part of the scalar
    fn re(self) -> f64;

    #[inline]
    fn half() -> Self {
        Self::constant(0.5)
    }

    #[inline]
    fn two() -> Self {
        Self::constant(2.0)
    }

    #[inline]
    fn pi() -> Self {
        Self::constant(std::f64::consts::PI)
    }

    #[inline]
    fn deg_to_rad(self) -> Self {
        self * Self::constant(std::f64::consts::PI / 180.0)
    }
}

impl LikeFloat for f64 {
    #[inline]
    fn constant(x: f64) -> Self {
        x
    }

    #[inline]
    fn re(self) -> f64 {
        self
    }
}

impl LikeFloat for Dual {
    #[inline]
    fn constant(x: f64) -> Self {
        Dual::from_real(x)
    }

    #[inline]
    fn re(self) -> f64 {
        self[0]
    }
}

/// Dual number with its derivative part seeded to unity
pub fn seeded_dual(x: f64) -> Dual {
    let mut d = Dual::from_real(x);
    d[1] = 1.0;
    d
}
