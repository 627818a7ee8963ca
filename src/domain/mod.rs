// Domain layer: typed directory records and the ports the page talks through.

pub mod model;
pub mod ports;
