//! Levenberg-Marquardt algorithm implementation.
//!
//! The solver behind the built-in `"lmfit"` fitter. It minimizes the sum of
//! squared residuals of a [`Problem`](crate::problem::Problem) by solving the
//! damped normal equations at every step.

pub mod algorithm;
pub mod config;

// Re-export key types
pub use algorithm::{LevenbergMarquardt, LmResult};
pub use config::LmConfig;
