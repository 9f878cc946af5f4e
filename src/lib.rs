#![doc = include_str!("../README.md")]

#[cfg(test)]
#[macro_use]
mod tests;

pub mod astro;

mod coefficients;
pub use coefficients::{
    CoefficientKind, CoefficientTable, CoefficientTarget, DecodeReport, POLY_DEGREES, RAMP_TERMS,
    decode, is_coefficient_like, parse_coefficient_name,
};

mod data;
pub use data::{LightCurve, interpolated_time};

mod error;
pub use error::{ConfigError, FitError, LightCurveError};

mod fit;
#[cfg(feature = "nuts")]
pub use fit::NutsFit;
pub use fit::{FitResult, McmcFit};

mod float_trait;
pub use float_trait::{Dual, LikeFloat, seeded_dual};

mod likelihood;
pub use likelihood::{NoiseModel, Posterior};

mod model;
pub use model::{
    AssembledModel, Backend, Concrete, ConcreteModel, DifferentiableModel, FitPoint, Lazy, Model,
    ModelBuilder, ModelComponents, ModelSettings, ModelTemplate, NoiseSlot, PhysicalSlots,
    assemble,
};

mod parameters;
pub use parameters::{Parameter, ParameterTable, PriorKind, PriorSpec, Role};

pub mod prior;
pub use prior::{LnPrior, LnPrior1D};

mod registry;
pub use registry::{
    REQUIRED_ORBIT_PARAMETERS, REQUIRED_PARAMETERS, Registry, Slot, Transform, Variable,
};

mod systematics;
pub use systematics::{ChannelSystematics, Systematics, time_bases};

pub use ndarray;
