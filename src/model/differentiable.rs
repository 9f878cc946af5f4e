use crate::error::ConfigError;
use crate::float_trait::LikeFloat;
use crate::model::assembly::{AssembledModel, assemble};
use crate::model::backend::Lazy;
use crate::model::concrete::ConcreteModel;
use crate::model::fit_point::FitPoint;
use crate::model::template::ModelTemplate;
use crate::registry::Registry;

/// Model evaluated at internal coordinates with any [LikeFloat] scalar
///
/// With [Dual](crate::Dual) coordinates the output carries derivatives with respect to the
/// seeded coordinate.
#[derive(Clone, Debug)]
pub struct DifferentiableModel {
    template: ModelTemplate,
}

impl DifferentiableModel {
    pub fn new(template: ModelTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &ModelTemplate {
        &self.template
    }

    pub fn registry(&self) -> &Registry {
        self.template.registry()
    }

    #[inline]
    pub fn nchan(&self) -> usize {
        self.template.nchan()
    }

    /// Number of internal coordinates
    #[inline]
    pub fn ndim(&self) -> usize {
        self.registry().ndim()
    }

    pub fn initial_point(&self) -> Vec<f64> {
        self.registry().initial_point()
    }

    pub fn assemble<U: LikeFloat>(&self, x: &[U]) -> AssembledModel<U> {
        assert_eq!(
            x.len(),
            self.ndim(),
            "internal point should have one coordinate per fitted parameter"
        );
        assemble(&self.template, &Lazy::new(x))
    }

    /// Total flux of all channels at internal point `x`
    pub fn flux<U: LikeFloat>(&self, x: &[U], t: &[f64]) -> Vec<U> {
        self.assemble(x).flux(t)
    }

    /// Total flux at the initial point of the parameter table
    pub fn evaluate(&self, t: &[f64]) -> Vec<f64> {
        self.flux(&self.initial_point(), t)
    }

    pub fn fit_point(&self, x: &[f64]) -> FitPoint {
        self.registry().fit_point(x)
    }

    /// Numeric model at the physical values of internal point `x`
    pub fn to_concrete(&self, x: &[f64]) -> ConcreteModel {
        let values = self
            .registry()
            .variables()
            .iter()
            .zip(x)
            .map(|(variable, &x)| variable.transform.apply(x))
            .collect();
        ConcreteModel::from_point(&self.template, self.fit_point(x), values)
    }

    /// Numeric model at a fit point
    pub fn concrete_at(&self, point: &FitPoint) -> Result<ConcreteModel, ConfigError> {
        ConcreteModel::new(&self.template, point.clone())
    }
}
