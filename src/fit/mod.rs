//! Curve fitting.
//!
//! Responsibilities:
//!
//! - select the points that enter the fit (`selection`)
//! - derive per-point asymmetric effective errors (`weights`)
//! - run the weighted minimization and package the result (`fitter`)

pub mod fitter;
pub mod selection;
pub mod weights;

pub use fitter::*;
pub use selection::*;
pub use weights::*;
