pub mod logm;
pub mod model;
pub mod plant;
pub mod simulator;
