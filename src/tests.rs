pub use crate::data::LightCurve;
pub use crate::model::{DifferentiableModel, ModelBuilder};
pub use crate::parameters::{Parameter, ParameterTable, PriorSpec};

pub use approx::assert_relative_eq;
pub use light_curve_common::{all_close, linspace};
pub use rand::prelude::*;
pub use rand_distr::StandardNormal;

/// Generate a test checking that both model builds evaluate the same flux
///
/// Internal coordinates are taken at the initial point of the table shifted by `$shift` prior
/// widths, so transformed coordinates are exercised away from the table values too.
#[macro_export]
macro_rules! model_agreement_test {
    ($name: ident, $table: expr_2021 $(,)?) => {
        model_agreement_test!($name, $table, 0.0);
    };
    ($name: ident, $table: expr_2021, $shift: expr_2021 $(,)?) => {
        #[test]
        fn $name() {
            let table = $table;
            let builder = ModelBuilder::new(&table).unwrap();
            let model = builder.build_differentiable();
            let x: Vec<f64> = model
                .registry()
                .variables()
                .iter()
                .map(|v| v.init + $shift * v.prior.scale().unwrap_or(0.0))
                .collect();
            let t = linspace(-0.3, 3.3, 500);
            let concrete = builder.build_concrete(&model.fit_point(&x)).unwrap();
            let lazy = model.flux(&x, &t);
            let numeric = concrete.evaluate(&t);
            assert_eq!(lazy.len(), table.nchan * t.len());
            for (a, b) in lazy.iter().zip(numeric.iter()) {
                assert_relative_eq!(*a, *b, max_relative = 1e-8);
            }
        }
    };
}

/// Hot Jupiter on a 2.2 day orbit around a K dwarf, fitted radius, timing and limb darkening
pub fn transit_table(nchan: usize, law: &str) -> ParameterTable {
    ParameterTable::new(nchan)
        .with(Parameter::fixed("Ms", 0.9))
        .with(Parameter::fixed("Mp", 0.7))
        .with(Parameter::shared("Rs", 0.85, PriorSpec::normal(0.85, 0.05)))
        .with(Parameter::shared("rp", 0.12, PriorSpec::normal(0.12, 0.01)))
        .with(Parameter::fixed("per", 2.2))
        .with(Parameter::shared("t0", 0.01, PriorSpec::normal(0.0, 0.02)))
        .with(Parameter::shared("inc", 87.5, PriorSpec::normal(88.0, 1.0)))
        .with(Parameter::shared("u1", 0.36, PriorSpec::uniform(0.0, 1.0)))
        .with(Parameter::shared("u2", 0.3, PriorSpec::uniform(0.0, 1.0)))
        .with_limb_dark(law)
}

/// Observations of the model at its initial point with Gaussian noise of scale `err`
pub fn synthetic_light_curve(
    model: &DifferentiableModel,
    t: Vec<f64>,
    err: f64,
    seed: u64,
) -> LightCurve {
    let mut rng = StdRng::seed_from_u64(seed);
    let flux: Vec<f64> = model
        .evaluate(&t)
        .into_iter()
        .map(|f| f + err * rng.sample::<f64, _>(StandardNormal))
        .collect();
    let nchan = model.nchan();
    let n = t.len();
    LightCurve::new(t, flux, vec![err; nchan * n], nchan).unwrap()
}
