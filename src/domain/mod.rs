// Domain layer: models, row/event mapping and ports. Adapters depend on this, never the reverse.

pub mod mapping;
pub mod model;
pub mod ports;
