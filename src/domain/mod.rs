// Domain layer: summary model and the collaborator ports the core drives.

pub mod model;
pub mod ports;
