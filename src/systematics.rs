use crate::coefficients::{CoefficientTable, RAMP_TERMS};
use crate::float_trait::LikeFloat;

use itertools::Itertools;

/// Instrumental trend of a single channel
///
/// `poly` holds polynomial coefficients in ascending degree, an empty polynomial is a unit
/// factor. The ramp is `r0 exp(-r1 dt + r2) + r3 exp(-r4 dt + r5) + 1`.
#[derive(Clone, Debug)]
pub struct ChannelSystematics<U> {
    poly: Vec<U>,
    ramp: Option<[U; RAMP_TERMS]>,
}

impl<U: LikeFloat> ChannelSystematics<U> {
    pub fn new(poly: Vec<U>, ramp: Option<[U; RAMP_TERMS]>) -> Self {
        Self { poly, ramp }
    }

    /// Polynomial coefficients in ascending degree
    pub fn poly_coefficients(&self) -> &[U] {
        &self.poly
    }

    pub fn ramp_coefficients(&self) -> Option<&[U; RAMP_TERMS]> {
        self.ramp.as_ref()
    }

    /// Horner evaluation of the polynomial at `dt = t - mean(t)`
    pub fn polynomial(&self, dt: f64) -> U {
        let dt = U::constant(dt);
        match self.poly.split_last() {
            None => U::one(),
            Some((&highest, rest)) => rest.iter().rev().fold(highest, |acc, &c| acc * dt + c),
        }
    }

    /// Double-exponential ramp at `dt = t - t[0]`
    pub fn ramp(&self, dt: f64) -> U {
        match self.ramp {
            None => U::one(),
            Some([a1, d1, o1, a2, d2, o2]) => {
                let dt = U::constant(dt);
                a1 * (o1 - d1 * dt).exp() + a2 * (o2 - d2 * dt).exp() + U::one()
            }
        }
    }

    /// Trend at times `t`, which define both time bases
    pub fn flux(&self, t: &[f64]) -> Vec<U> {
        let (t_mean, t_first) = time_bases(t);
        t.iter()
            .map(|&t| self.polynomial(t - t_mean) * self.ramp(t - t_first))
            .collect()
    }
}

impl ChannelSystematics<f64> {
    /// Degree of the polynomial with exactly zero leading coefficients dropped, `None` for a
    /// unit factor
    pub fn effective_poly_degree(&self) -> Option<usize> {
        self.poly.iter().rposition(|&c| c != 0.0)
    }
}

/// Per-channel instrumental trends
#[derive(Clone, Debug)]
pub struct Systematics<U> {
    channels: Vec<ChannelSystematics<U>>,
}

impl<U: LikeFloat> Systematics<U> {
    /// Trends from a table of resolved coefficients
    ///
    /// Every channel gets the first `poly_len` polynomial columns, empty cells below the
    /// highest column are zeros. The ramp is present when any channel has a ramp coefficient.
    pub fn from_table(table: &CoefficientTable<U>, poly_len: usize) -> Self {
        let has_ramp = table.has_ramp();
        let channels = (0..table.nchan())
            .map(|channel| {
                let poly = table.poly(channel)[..poly_len]
                    .iter()
                    .map(|c| c.unwrap_or_else(U::zero))
                    .collect();
                let ramp = has_ramp.then(|| {
                    let ramp = table.ramp(channel);
                    std::array::from_fn(|i| ramp[i].unwrap_or_else(U::zero))
                });
                ChannelSystematics::new(poly, ramp)
            })
            .collect();
        Self { channels }
    }

    #[inline]
    pub fn nchan(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, channel: usize) -> &ChannelSystematics<U> {
        &self.channels[channel]
    }

    /// Trends of all channels concatenated in ascending channel order
    pub fn flux(&self, t: &[f64]) -> Vec<U> {
        self.channels.iter().flat_map(|c| c.flux(t)).collect_vec()
    }
}

/// Mean and first time, the references of the polynomial and the ramp
pub fn time_bases(t: &[f64]) -> (f64, f64) {
    if t.is_empty() {
        return (0.0, 0.0);
    }
    let mean = t.iter().sum::<f64>() / t.len() as f64;
    (mean, t[0])
}
