//! Fit result rendering.
//!
//! - SVG chart with error bars, fitted curve and statistics box (`chart`)
//! - fixed-size terminal preview (`ascii`)

pub mod ascii;
pub mod chart;

pub use ascii::*;
pub use chart::*;
