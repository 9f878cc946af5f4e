use criterion::Criterion;
use light_curve_common::linspace;
use light_curve_transit::{LightCurve, ModelBuilder, Posterior};
use rand::prelude::*;
use rand_distr::StandardNormal;
use std::hint::black_box;

pub fn bench_posterior(c: &mut Criterion) {
    const N: usize = 1000;
    const ERR: f64 = 5e-4;

    let model = ModelBuilder::new(&crate::common::table())
        .unwrap()
        .build_differentiable();
    let nchan = model.nchan();
    let t = linspace(-0.2, 0.2, N);
    let mut rng = StdRng::seed_from_u64(0);
    let flux: Vec<_> = model
        .evaluate(&t)
        .into_iter()
        .map(|f| f + ERR * rng.sample::<f64, _>(StandardNormal))
        .collect();
    let lc = LightCurve::new(t, flux, vec![ERR; nchan * N], nchan).unwrap();
    let posterior = Posterior::new(model, lc).unwrap();
    let x = posterior.initial_point();
    let mut grad = vec![0.0; x.len()];

    c.bench_function("Log-posterior", |b| {
        b.iter(|| posterior.ln_posterior(black_box(&x)));
    });
    c.bench_function("Log-posterior with gradient", |b| {
        b.iter(|| posterior.ln_posterior_with_grad(black_box(&x), &mut grad));
    });
}
