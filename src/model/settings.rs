use crate::astro::DEFAULT_OCCULTATION_STEPS;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Numerical settings of the model evaluation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct ModelSettings {
    /// Number of annuli of the limb-darkened occultation integral
    #[serde(default = "ModelSettings::default_occultation_steps")]
    pub occultation_steps: usize,
}

impl ModelSettings {
    #[inline]
    pub fn default_occultation_steps() -> usize {
        DEFAULT_OCCULTATION_STEPS
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            occultation_steps: Self::default_occultation_steps(),
        }
    }
}
