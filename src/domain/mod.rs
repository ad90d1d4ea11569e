// Domain layer: manifest model and the control plane port. No process or file IO here.

pub mod model;
pub mod ports;
