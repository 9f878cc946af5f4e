use itertools::Itertools;

/// Error returned when a parameter table cannot be turned into a model
///
/// All variants are fatal and raised while building, no partially built model is ever returned.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required parameters: {}", .0.iter().join(", "))]
    MissingParameters(Vec<String>),

    #[error("limb darkening law is not specified")]
    MissingLimbDarkening,

    #[error(
        "limb darkening law {0:?} is not supported, must be one of uniform, linear, quadratic, or kipping2013"
    )]
    UnknownLimbDarkeningLaw(String),

    #[error("prior kind {0:?} is not recognized")]
    UnknownPriorKind(String),

    #[error("parameter role {0:?} is not recognized")]
    UnknownRole(String),

    #[error("parameter {0} is fitted but has no prior")]
    MissingPrior(String),

    #[error("parameter {name} has invalid prior parameters: {reason}")]
    InvalidPrior { name: String, reason: &'static str },

    #[error("parameter {0} is specified more than once")]
    DuplicateParameter(String),

    #[error("number of channels must be positive")]
    ZeroChannels,

    #[error("fit point has no value for fitted parameter {0}")]
    MissingFitValue(String),
}

/// Error returned from [crate::LightCurve] constructors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LightCurveError {
    #[error("time series is empty")]
    Empty,

    #[error("number of channels must be positive")]
    ZeroChannels,

    #[error("{array} has length {actual}, but {expected} is expected for {nchan} channel(s)")]
    LengthMismatch {
        array: &'static str,
        actual: usize,
        expected: usize,
        nchan: usize,
    },

    #[error("light curve has {data} channel(s), but the model has {model}")]
    ChannelMismatch { data: usize, model: usize },
}

/// Error returned from the point-estimate fitter
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FitError {
    #[error("model has no fitted parameters")]
    NothingToFit,

    #[error("initial point has a non-finite log-posterior")]
    NonFiniteStart,

    #[error("sampler failed: {0}")]
    Sampler(String),
}
