//! Input/output helpers.
//!
//! - delimited table parsing (`table`)
//! - wide-row to point expansion (`expand`)
//! - residual exports (`export`)
//! - fit JSON read/write (`fit_file`)

pub mod expand;
pub mod export;
pub mod fit_file;
pub mod table;

pub use expand::*;
pub use export::*;
pub use fit_file::*;
pub use table::*;
