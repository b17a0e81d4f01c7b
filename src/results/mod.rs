//! Fit results.
//!
//! A [`FitResultTable`] holds one [`FitResultRow`] per successful fit with a
//! fixed set of [`Column`]s, and answers queries through
//! [`FitResultTable::slice`].

pub mod column;
pub mod table;

pub use column::{CellValue, Column};
pub use table::{FitResultRow, FitResultTable};
