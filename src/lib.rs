//! `asym-fit` library crate.
//!
//! The binary (`asymfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - parsing, fitting and rendering stay reusable on their own

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
