// Domain layer: expression graph, task models and ports. No I/O.

pub mod expression;
pub mod model;
pub mod ports;
