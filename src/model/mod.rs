//! Composite astrophysical and instrumental model
//!
//! A [ModelTemplate] is resolved once from a parameter table. It is then assembled either
//! lazily from internal coordinates, which may be dual numbers, or concretely from a
//! [FitPoint]. Both go through the same [assemble] function.

mod assembly;
pub use assembly::{AssembledModel, assemble};

mod backend;
pub use backend::{Backend, Concrete, Lazy};

mod concrete;
pub use concrete::{ConcreteModel, ModelComponents};

mod differentiable;
pub use differentiable::DifferentiableModel;

mod fit_point;
pub use fit_point::FitPoint;

mod settings;
pub use settings::ModelSettings;

mod template;
pub use template::{ModelTemplate, NoiseSlot, PhysicalSlots};

use crate::coefficients::DecodeReport;
use crate::error::ConfigError;
use crate::parameters::ParameterTable;
use crate::registry::Registry;

/// Entry point turning a parameter table into models
///
/// All configuration errors are raised by [ModelBuilder::new], building afterwards only
/// fails for fit points missing a fitted parameter.
#[derive(Clone, Debug)]
pub struct ModelBuilder {
    template: ModelTemplate,
}

impl ModelBuilder {
    pub fn new(table: &ParameterTable) -> Result<Self, ConfigError> {
        Self::with_settings(table, ModelSettings::default())
    }

    pub fn with_settings(
        table: &ParameterTable,
        settings: ModelSettings,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            template: ModelTemplate::new(table, settings)?,
        })
    }

    pub fn template(&self) -> &ModelTemplate {
        &self.template
    }

    pub fn registry(&self) -> &Registry {
        self.template.registry()
    }

    pub fn decode_report(&self) -> &DecodeReport {
        self.template.decode_report()
    }

    /// Build either variant, the concrete one at the initial point of the table
    pub fn build(&self, differentiable: bool) -> Model {
        let model = self.build_differentiable();
        if differentiable {
            Model::Differentiable(model)
        } else {
            Model::Concrete(model.to_concrete(&model.initial_point()))
        }
    }

    pub fn build_differentiable(&self) -> DifferentiableModel {
        DifferentiableModel::new(self.template.clone())
    }

    pub fn build_concrete(&self, point: &FitPoint) -> Result<ConcreteModel, ConfigError> {
        ConcreteModel::new(&self.template, point.clone())
    }
}

/// Either model variant
#[derive(Clone, Debug)]
pub enum Model {
    Differentiable(DifferentiableModel),
    Concrete(ConcreteModel),
}

impl Model {
    /// Total flux of all channels, the differentiable variant is evaluated at its initial point
    pub fn evaluate(&self, t: &[f64]) -> Vec<f64> {
        match self {
            Self::Differentiable(model) => model.evaluate(t),
            Self::Concrete(model) => model.evaluate(t),
        }
    }

    pub fn is_differentiable(&self) -> bool {
        matches!(self, Self::Differentiable(_))
    }

    #[inline]
    pub fn nchan(&self) -> usize {
        match self {
            Self::Differentiable(model) => model.nchan(),
            Self::Concrete(model) => model.nchan(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::{LimbDarkening, occulted_star_flux};
    use crate::float_trait::{Dual, LikeFloat, seeded_dual};
    use crate::tests::*;

    fn full_table() -> ParameterTable {
        transit_table(2, "kipping2013")
            .with(Parameter::shared("ecc", 0.05, PriorSpec::normal(0.05, 0.02)))
            .with(Parameter::fixed("w", 80.0))
            .with(Parameter::shared("fp", 1e-3, PriorSpec::log_uniform(-12.0, -2.0)))
            .with(Parameter::shared("AmpCos1", -0.4, PriorSpec::uniform(-1.0, 1.0)))
            .with(Parameter::shared("AmpSin1", 0.05, PriorSpec::uniform(-1.0, 1.0)))
            .with(Parameter::fixed("AmpCos2", 0.02))
            .with(Parameter::shared("c0", 1.0, PriorSpec::normal(1.0, 0.01)))
            .with(Parameter::shared("c1_0", 0.003, PriorSpec::normal(0.0, 0.01)))
            .with(Parameter::fixed("c1_1", -0.002))
            .with(Parameter::shared("r0_1", 0.002, PriorSpec::normal(0.0, 0.01)))
            .with(Parameter::fixed("r1_1", 20.0))
            .with(Parameter::fixed("r2_1", 0.0))
    }

    fn phase_grid() -> Vec<f64> {
        linspace(-0.2, 2.3, 400)
    }

    model_agreement_test!(agreement_uniform, transit_table(1, "uniform"));
    model_agreement_test!(agreement_linear, transit_table(1, "linear"), 0.5);
    model_agreement_test!(agreement_quadratic, transit_table(3, "quadratic"), -0.5);
    model_agreement_test!(agreement_kipping, transit_table(1, "kipping2013"), 0.3);
    model_agreement_test!(agreement_full, full_table(), 1.0);

    #[test]
    fn differentiable_and_concrete_agree() {
        let builder = ModelBuilder::new(&full_table()).unwrap();
        let model = builder.build_differentiable();
        let t = phase_grid();
        let x = model.initial_point();
        let lazy = model.flux(&x, &t);
        let concrete = builder.build_concrete(&model.fit_point(&x)).unwrap();
        let numeric = concrete.evaluate(&t);
        assert_eq!(lazy.len(), 2 * t.len());
        for (a, b) in lazy.iter().zip(numeric.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-8);
        }
        // Dual evaluation has the same real part
        let x_dual: Vec<Dual> = x.iter().map(|&x| Dual::constant(x)).collect();
        let dual = model.flux(&x_dual, &t);
        for (a, b) in dual.iter().zip(numeric.iter()) {
            assert_relative_eq!(a.re(), *b, max_relative = 1e-8);
        }
    }

    #[test]
    fn agreement_holds_away_from_initial_point() {
        let builder = ModelBuilder::new(&full_table()).unwrap();
        let model = builder.build_differentiable();
        let t = phase_grid();
        let mut x = model.initial_point();
        for (i, x) in x.iter_mut().enumerate() {
            *x *= 1.0 + 0.01 * (i as f64 - 3.0);
        }
        let concrete = model.to_concrete(&x);
        let rebuilt = builder.build_concrete(concrete.fit_point()).unwrap();
        all_close(&model.flux(&x, &t), &rebuilt.evaluate(&t), 1e-8);
        all_close(&concrete.evaluate(&t), &rebuilt.evaluate(&t), 1e-12);
    }

    #[test]
    fn single_channel_without_systematics_is_pure_transit() {
        let table = transit_table(1, "quadratic");
        let builder = ModelBuilder::new(&table).unwrap();
        let Model::Concrete(model) = builder.build(false) else {
            panic!("concrete model is expected");
        };
        let t = linspace(-0.1, 0.1, 101);
        let flux = model.evaluate(&t);
        let system = &model.assembled().system;
        let ld = LimbDarkening::quadratic(0.36, 0.3);
        for (&t, &flux) in t.iter().zip(flux.iter()) {
            let z = system.orbit.position(t).separation();
            let expected = occulted_star_flux(&ld, 0.12, z, 300);
            assert_relative_eq!(flux, expected, max_relative = 1e-12);
        }
        assert_eq!(model.systematics_flux(&t), vec![1.0; t.len()]);
        // Transit is there
        assert!(flux[50] < 0.99);
    }

    #[test]
    fn two_channel_layout() {
        let table = transit_table(2, "uniform")
            .with(Parameter::shared("c0", 1.0, PriorSpec::normal(1.0, 0.01)))
            .with(Parameter::fixed("c1_0", 0.5))
            .with(Parameter::fixed("c1_1", -0.5));
        let builder = ModelBuilder::new(&table).unwrap();
        assert_eq!(builder.decode_report().n_ignored(), 0);
        let Model::Concrete(model) = builder.build(false) else {
            panic!("concrete model is expected");
        };
        let t = [0.4, 0.5, 0.6];
        let components = model.components(&t);
        assert_eq!(components.astrophysical.len(), 3);
        assert_eq!(components.total.len(), 6);
        let ch0 = model.channel_slice(&components.systematics, 0);
        let ch1 = model.channel_slice(&components.systematics, 1);
        all_close(ch0, &[0.95, 1.0, 1.05], 1e-12);
        all_close(ch1, &[1.05, 1.0, 0.95], 1e-12);
        for channel in 0..2 {
            let total = model.channel_slice(&components.total, channel);
            let trend = model.channel_slice(&components.systematics, channel);
            for i in 0..3 {
                assert_relative_eq!(total[i], components.astrophysical[i] * trend[i]);
            }
        }
    }

    #[test]
    fn concrete_model_diagnostics() {
        let table = full_table().with(Parameter::fixed("scatter_mult", 1.5));
        let model = ModelBuilder::new(&table).unwrap().build_differentiable();
        let concrete = model
            .concrete_at(&model.fit_point(&model.initial_point()))
            .unwrap();
        // Channel 0 has c0 and c1_0, channel 1 has c0 and c1_1 times a ramp
        assert_eq!(concrete.polynomial_degree(0), Some(1));
        assert_eq!(concrete.polynomial_degree(1), Some(1));
        assert!(concrete.assembled().systematics.channel(1).ramp_coefficients().is_some());
        all_close(&concrete.noise_scale(&[1e-3, 2e-3]), &[1.5e-3, 3e-3], 1e-15);
    }

    #[test]
    fn kipping_coefficients_are_derived() {
        let builder = ModelBuilder::new(&transit_table(1, "kipping2013")).unwrap();
        let Model::Concrete(model) = builder.build(false) else {
            panic!("concrete model is expected");
        };
        let derived = model.derived();
        assert_relative_eq!(derived["u1_quadratic"], 2.0 * f64::sqrt(0.36) * 0.3);
        assert_relative_eq!(derived["u2_quadratic"], f64::sqrt(0.36) * (1.0 - 0.6));
    }

    #[test]
    fn concrete_build_needs_every_fitted_value() {
        let builder = ModelBuilder::new(&transit_table(1, "uniform")).unwrap();
        let point = FitPoint::new().with("Rs", 0.85).with("rp", 0.1);
        assert_eq!(
            builder.build_concrete(&point).unwrap_err(),
            ConfigError::MissingFitValue("t0".into())
        );
    }

    #[test]
    fn builder_reports_missing_stellar_mass() {
        let mut table = transit_table(1, "uniform");
        table.parameters.retain(|p| p.name != "Ms");
        assert_eq!(
            ModelBuilder::new(&table).unwrap_err(),
            ConfigError::MissingParameters(vec!["Ms".into()])
        );
    }

    #[test]
    fn build_variants_evaluate_the_same() {
        let builder = ModelBuilder::new(&full_table()).unwrap();
        let t = phase_grid();
        let lazy = builder.build(true);
        let concrete = builder.build(false);
        assert!(lazy.is_differentiable());
        assert!(!concrete.is_differentiable());
        assert_eq!(lazy.nchan(), 2);
        all_close(&lazy.evaluate(&t), &concrete.evaluate(&t), 1e-8);
    }

    #[test]
    fn dual_derivative_matches_finite_difference() {
        let model = ModelBuilder::new(&full_table()).unwrap().build_differentiable();
        let t = linspace(-0.05, 0.05, 7);
        let x = model.initial_point();
        for i in 0..model.ndim() {
            let mut x_dual: Vec<Dual> = x.iter().map(|&x| Dual::constant(x)).collect();
            x_dual[i] = seeded_dual(x[i]);
            let derivative = model.flux(&x_dual, &t);

            let h = 1e-6 * x[i].abs().max(1e-3);
            let mut x_plus = x.clone();
            x_plus[i] += h;
            let mut x_minus = x.clone();
            x_minus[i] -= h;
            let plus = model.flux(&x_plus, &t);
            let minus = model.flux(&x_minus, &t);
            for ((d, p), m) in derivative.iter().zip(plus).zip(minus) {
                let numeric = (p - m) / (2.0 * h);
                assert_relative_eq!(d[1], numeric, epsilon = 1e-5, max_relative = 1e-4);
            }
        }
    }
}
