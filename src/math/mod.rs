//! Numerical utilities: the nonlinear solver interface and parameter covariance.

pub mod covariance;
pub mod lm;

pub use covariance::*;
pub use lm::*;
