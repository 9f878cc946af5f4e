use light_curve_transit::{Parameter, ParameterTable, PriorSpec};

/// Two-channel hot Jupiter with a phase curve, quadratic limb darkening and linear trends
pub fn table() -> ParameterTable {
    ParameterTable::new(2)
        .with(Parameter::fixed("Ms", 1.1))
        .with(Parameter::fixed("Mp", 1.2))
        .with(Parameter::shared("Rs", 1.2, PriorSpec::normal(1.2, 0.05)))
        .with(Parameter::shared("rp", 0.11, PriorSpec::normal(0.11, 0.01)))
        .with(Parameter::fixed("per", 3.5))
        .with(Parameter::shared("t0", 0.0, PriorSpec::normal(0.0, 0.01)))
        .with(Parameter::shared("inc", 86.0, PriorSpec::uniform(80.0, 90.0)))
        .with(Parameter::shared("u1", 0.4, PriorSpec::uniform(0.0, 1.0)))
        .with(Parameter::shared("u2", 0.25, PriorSpec::uniform(0.0, 1.0)))
        .with(Parameter::shared("fp", 5e-4, PriorSpec::log_uniform(-12.0, -3.0)))
        .with(Parameter::shared("AmpCos1", -0.3, PriorSpec::uniform(-1.0, 1.0)))
        .with(Parameter::shared("c0", 1.0, PriorSpec::normal(1.0, 0.01)))
        .with(Parameter::shared("c1_0", 0.0, PriorSpec::normal(0.0, 0.01)))
        .with(Parameter::shared("c1_1", 0.0, PriorSpec::normal(0.0, 0.01)))
        .with_limb_dark("quadratic")
}
