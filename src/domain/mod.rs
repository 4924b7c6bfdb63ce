// Domain layer: value objects and ports. The estimator itself lives in core.

pub mod model;
pub mod ports;
