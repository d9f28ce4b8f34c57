// Domain layer: core models and ports (interfaces). No I/O here beyond the trait seams.

pub mod model;
pub mod ports;
