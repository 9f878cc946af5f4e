use crate::astro::LimbDarkeningLaw;
use crate::coefficients::{CoefficientTable, DecodeReport, decode};
use crate::error::ConfigError;
use crate::model::settings::ModelSettings;
use crate::parameters::ParameterTable;
use crate::registry::{Registry, Slot};

use itertools::Itertools;

/// Optional orbital and planet parameters with the values used when they are absent
const DEFAULTS: [(&str, f64); 5] = [
    ("t0", 0.0),
    ("inc", 90.0),
    ("ecc", 0.0),
    ("w", 90.0),
    ("fp", 0.0),
];

/// Planet map coefficients with their harmonic degree
const MAP_COEFFICIENTS: [(&str, usize); 4] =
    [("AmpCos1", 1), ("AmpSin1", 1), ("AmpCos2", 2), ("AmpSin2", 2)];

pub(crate) const SCATTER_MULT: &str = "scatter_mult";
pub(crate) const SCATTER_PPM: &str = "scatter_ppm";

/// Slots of the astrophysical model inputs
#[derive(Clone, Debug)]
pub struct PhysicalSlots {
    pub ms: Slot,
    pub mp: Slot,
    pub rs: Slot,
    pub rp: Slot,
    pub per: Slot,
    pub t0: Slot,
    pub inc: Slot,
    pub ecc: Slot,
    pub w: Slot,
    pub fp: Slot,
    pub map: [Slot; 4],
    pub map_degree: usize,
    pub u1: Slot,
    pub u2: Slot,
}

/// Source of the per-point noise scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoiseSlot {
    /// Externally supplied uncertainties
    External,
    /// Uncertainties multiplied by a factor
    Multiplier(Slot),
    /// Single scale replacing the uncertainties
    Constant(Slot),
}

/// Everything the model assembly needs, resolved once from a parameter table
///
/// The template is free of parameter values of fitted parameters: they are provided later by
/// a [Backend](crate::model::Backend).
#[derive(Clone, Debug)]
pub struct ModelTemplate {
    registry: Registry,
    law: LimbDarkeningLaw,
    physical: PhysicalSlots,
    coefficients: CoefficientTable<Slot>,
    poly_len: usize,
    decode_report: DecodeReport,
    noise: NoiseSlot,
    settings: ModelSettings,
}

impl ModelTemplate {
    pub fn new(table: &ParameterTable, settings: ModelSettings) -> Result<Self, ConfigError> {
        let registry = Registry::new(table)?;
        let law = LimbDarkeningLaw::from_selector(registry.limb_dark())?;
        let physical = physical_slots(&registry, law)?;

        let (names, decode_report) = decode(registry.roles(), registry.nchan());
        let coefficients = names.filter_map(|name| registry.slot(name));
        let poly_len = coefficients.poly_len(Slot::is_populated);

        let noise = match (registry.slot(SCATTER_MULT), registry.slot(SCATTER_PPM)) {
            (Some(slot), _) => NoiseSlot::Multiplier(slot),
            (None, Some(slot)) => NoiseSlot::Constant(slot),
            (None, None) => NoiseSlot::External,
        };

        log::debug!(
            "model template: {} channel(s), {} fitted parameter(s), {} limb darkening, \
             polynomial of {} column(s), ramp {}, {} ignored coefficient name(s)",
            registry.nchan(),
            registry.ndim(),
            law,
            poly_len,
            if coefficients.has_ramp() { "on" } else { "off" },
            decode_report.n_ignored(),
        );

        Ok(Self {
            registry,
            law,
            physical,
            coefficients,
            poly_len,
            decode_report,
            noise,
            settings,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    pub fn nchan(&self) -> usize {
        self.registry.nchan()
    }

    pub fn limb_darkening_law(&self) -> LimbDarkeningLaw {
        self.law
    }

    pub fn physical(&self) -> &PhysicalSlots {
        &self.physical
    }

    pub fn coefficients(&self) -> &CoefficientTable<Slot> {
        &self.coefficients
    }

    /// Number of polynomial columns, zero when the polynomial is a unit factor
    #[inline]
    pub fn poly_len(&self) -> usize {
        self.poly_len
    }

    pub fn decode_report(&self) -> &DecodeReport {
        &self.decode_report
    }

    pub fn noise(&self) -> NoiseSlot {
        self.noise
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }
}

fn physical_slots(
    registry: &Registry,
    law: LimbDarkeningLaw,
) -> Result<PhysicalSlots, ConfigError> {
    let missing = law
        .parameter_names()
        .iter()
        .filter(|&&name| !registry.contains(name))
        .map(|&name| name.to_owned())
        .collect_vec();
    if !missing.is_empty() {
        return Err(ConfigError::MissingParameters(missing));
    }

    let required = |name: &str| {
        registry
            .slot(name)
            .ok_or_else(|| ConfigError::MissingParameters(vec![name.to_owned()]))
    };
    let optional = |name: &str, default: f64| registry.slot(name).unwrap_or(Slot::Fixed(default));
    let [t0, inc, ecc, w, fp] = DEFAULTS.map(|(name, default)| optional(name, default));
    let map = MAP_COEFFICIENTS.map(|(name, _)| optional(name, 0.0));
    let map_degree = MAP_COEFFICIENTS
        .iter()
        .filter(|(name, _)| registry.contains(name))
        .map(|&(_, degree)| degree)
        .max()
        .unwrap_or(0);

    Ok(PhysicalSlots {
        ms: required("Ms")?,
        mp: required("Mp")?,
        rs: required("Rs")?,
        rp: required("rp")?,
        per: required("per")?,
        t0,
        inc,
        ecc,
        w,
        fp,
        map,
        map_degree,
        u1: optional("u1", 0.0),
        u2: optional("u2", 0.0),
    })
}
