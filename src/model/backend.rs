use crate::float_trait::LikeFloat;
use crate::registry::Slot;

/// Source of parameter values for the model assembly
///
/// Fixed slots always resolve to their constant. Variable slots are resolved by the backend.
pub trait Backend {
    type Scalar: LikeFloat;

    fn resolve(&self, slot: Slot) -> Self::Scalar;
}

/// Internal coordinates, possibly dual numbers, mapped to physical values on the fly
#[derive(Clone, Copy, Debug)]
pub struct Lazy<'a, U> {
    x: &'a [U],
}

impl<'a, U: LikeFloat> Lazy<'a, U> {
    pub fn new(x: &'a [U]) -> Self {
        Self { x }
    }
}

impl<U: LikeFloat> Backend for Lazy<'_, U> {
    type Scalar = U;

    #[inline]
    fn resolve(&self, slot: Slot) -> U {
        match slot {
            Slot::Fixed(value) => U::constant(value),
            Slot::Variable { index, transform } => transform.apply(self.x[index]),
        }
    }
}

/// Physical values of the fitted parameters, one per internal coordinate
#[derive(Clone, Copy, Debug)]
pub struct Concrete<'a> {
    values: &'a [f64],
}

impl<'a> Concrete<'a> {
    pub fn new(values: &'a [f64]) -> Self {
        Self { values }
    }
}

impl Backend for Concrete<'_> {
    type Scalar = f64;

    #[inline]
    fn resolve(&self, slot: Slot) -> f64 {
        match slot {
            Slot::Fixed(value) => value,
            Slot::Variable { index, .. } => self.values[index],
        }
    }
}
