use crate::error::LightCurveError;

use ndarray::{Array1, ArrayView1};

/// Multi-channel light curve sharing a single time grid
///
/// `t` holds the `N` sample times of one channel, `flux` and `err` hold the observations of all
/// channels concatenated in ascending channel order, so their length is `nchan * N`.
#[derive(Clone, Debug)]
pub struct LightCurve {
    pub t: Array1<f64>,
    pub flux: Array1<f64>,
    pub err: Array1<f64>,
    nchan: usize,
}

impl LightCurve {
    /// Construct `LightCurve` from array-like objects
    ///
    /// `t` must be non-empty, `flux` and `err` must have `nchan` times as many elements as `t`.
    pub fn new(
        t: impl Into<Array1<f64>>,
        flux: impl Into<Array1<f64>>,
        err: impl Into<Array1<f64>>,
        nchan: usize,
    ) -> Result<Self, LightCurveError> {
        let t = t.into();
        let flux = flux.into();
        let err = err.into();

        if nchan == 0 {
            return Err(LightCurveError::ZeroChannels);
        }
        if t.is_empty() {
            return Err(LightCurveError::Empty);
        }
        let expected = nchan * t.len();
        for (array, actual) in [("flux", flux.len()), ("err", err.len())] {
            if actual != expected {
                return Err(LightCurveError::LengthMismatch {
                    array,
                    actual,
                    expected,
                    nchan,
                });
            }
        }

        Ok(Self {
            t,
            flux,
            err,
            nchan,
        })
    }

    /// Construct single-channel `LightCurve`
    pub fn single_channel(
        t: impl Into<Array1<f64>>,
        flux: impl Into<Array1<f64>>,
        err: impl Into<Array1<f64>>,
    ) -> Result<Self, LightCurveError> {
        Self::new(t, flux, err, 1)
    }

    #[inline]
    pub fn nchan(&self) -> usize {
        self.nchan
    }

    /// Number of samples per channel
    #[inline]
    pub fn lenu(&self) -> usize {
        self.t.len()
    }

    /// Total number of observations over all channels
    #[inline]
    pub fn len_total(&self) -> usize {
        self.flux.len()
    }

}

/// Uniform time grid from the first to the last sample with the first sampling step
///
/// Used to draw a smooth model curve over sparsely sampled data. Grids with fewer than two
/// samples or a non-positive first step are returned unchanged.
pub fn interpolated_time(t: ArrayView1<f64>) -> Array1<f64> {
    if t.len() < 2 {
        return t.to_owned();
    }
    let first = t[0];
    let last = t[t.len() - 1];
    let dt = t[1] - first;
    if !(dt > 0.0 && last > first) {
        return t.to_owned();
    }
    let steps = ((last - first) / dt + 1.0).round() as usize;
    Array1::linspace(first, last, steps)
}
