//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - parsed rows and measurement points (`RawRow`, `Point`)
//! - fit outputs (`FitResult`, `ParamEstimate`, `PointResidual`)
//! - run and presentation configuration (`FitConfig`, `ChartStyle`)

pub mod types;

pub use types::*;
