mod light_curve;
pub use light_curve::{LightCurve, interpolated_time};
