//! Curve model definitions.
//!
//! Models are small, pure values behind the `CurveModel` trait so the fit engine
//! and solver stay generic.

pub mod model;

pub use model::*;
