//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! Each iteration solves the damped normal equations
//! `(JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr` with nalgebra, accepts the step when it
//! lowers the cost, and adapts the damping parameter λ otherwise.

use log::trace;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use std::fmt;
use std::time::{Duration, Instant};

use crate::error::{LcFitError, Result};
use crate::problem::Problem;

use super::config::LmConfig;

/// Smallest diagonal entry used for Marquardt scaling
const MIN_DIAGONAL: f64 = 1e-12;

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of iterations performed
    pub iterations: usize,

    /// Number of function evaluations
    pub func_evals: usize,

    /// Whether the optimization succeeded
    pub success: bool,

    /// A message describing the result
    pub message: String,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// Status of the iteration.
enum IterationStatus {
    /// Continue iteration
    Continue,

    /// Converged successfully
    Converged(String),
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    /// Configuration options
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the tolerance for change in cost.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for change in parameter values.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for the gradient.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Set the wall-clock limit of one minimization.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to solve
    /// * `initial_params` - Initial guess for the parameter values
    ///
    /// # Returns
    ///
    /// * `Result<LmResult>` - The result of the optimization. Running out of
    ///   iterations is reported through `success == false`; running out of
    ///   time is an [`LcFitError::OptimizationFailure`].
    pub fn minimize<P: Problem>(&self, problem: &P, initial_params: Array1<f64>) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(LcFitError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let started = Instant::now();
        let mut params = initial_params;
        let mut lambda = self.config.initial_lambda;

        let mut residuals = problem.eval(&params)?;
        let mut func_evals = 1;
        let mut cost = sum_of_squares(&residuals);

        if !cost.is_finite() {
            return Err(LcFitError::OptimizationFailure(format!(
                "Initial cost is not finite ({})",
                cost
            )));
        }

        if n_params == 0 {
            return Ok(LmResult {
                params,
                residuals,
                cost,
                iterations: 0,
                func_evals,
                success: true,
                message: "No free parameters, evaluated once".to_string(),
            });
        }

        let mut iterations = 0;

        loop {
            self.check_timeout(started, iterations)?;

            if iterations >= self.config.max_iterations {
                return Ok(LmResult {
                    params,
                    residuals,
                    cost,
                    iterations,
                    func_evals,
                    success: false,
                    message: format!(
                        "Maximum iterations ({}) reached",
                        self.config.max_iterations
                    ),
                });
            }

            let jacobian = problem.jacobian(&params)?;
            // One evaluation per parameter for finite differences
            func_evals += n_params;

            let j = to_dmatrix(&jacobian);
            let r = DVector::from_iterator(residuals.len(), residuals.iter().copied());
            let jt = j.transpose();
            let jtj = &jt * &j;
            let gradient = &jt * &r;

            let gradient_norm = gradient.amax();
            if gradient_norm < self.config.gtol {
                return Ok(LmResult {
                    params,
                    residuals,
                    cost,
                    iterations,
                    func_evals,
                    success: true,
                    message: format!(
                        "Gradient convergence: |g| = {:.2e} < {:.2e}",
                        gradient_norm, self.config.gtol
                    ),
                });
            }

            // Inner loop: raise lambda until a step lowers the cost
            let status = loop {
                self.check_timeout(started, iterations)?;

                let step = match solve_damped(&jtj, &gradient, lambda) {
                    Some(step) => step,
                    None => {
                        lambda = (lambda * self.config.lambda_up_factor).min(self.config.max_lambda);
                        if lambda >= self.config.max_lambda {
                            return Err(LcFitError::SingularMatrix);
                        }
                        continue;
                    }
                };

                let new_params = &params + &Array1::from_iter(step.iter().copied());
                let new_residuals = problem.eval(&new_params)?;
                func_evals += 1;
                let new_cost = sum_of_squares(&new_residuals);

                trace!(
                    "lm iteration {}: lambda = {:.3e}, cost = {:.6e}, trial cost = {:.6e}",
                    iterations,
                    lambda,
                    cost,
                    new_cost
                );

                if new_cost < cost {
                    let param_change = (&new_params - &params)
                        .iter()
                        .zip(params.iter())
                        .map(|(dx, x)| dx.abs() / (x.abs() + self.config.xtol))
                        .fold(0.0, f64::max);
                    let cost_change = (cost - new_cost) / cost.max(f64::MIN_POSITIVE);

                    let status = if param_change < self.config.xtol {
                        IterationStatus::Converged(format!(
                            "Parameter convergence: |dx|/|x| = {:.2e} < {:.2e}",
                            param_change, self.config.xtol
                        ))
                    } else if cost_change < self.config.ftol {
                        IterationStatus::Converged(format!(
                            "Cost convergence: |df|/|f| = {:.2e} < {:.2e}",
                            cost_change, self.config.ftol
                        ))
                    } else {
                        IterationStatus::Continue
                    };

                    params = new_params;
                    residuals = new_residuals;
                    cost = new_cost;
                    lambda = (lambda * self.config.lambda_down_factor).max(self.config.min_lambda);
                    iterations += 1;
                    break status;
                }

                // Step rejected - increase lambda and try again
                lambda = (lambda * self.config.lambda_up_factor).min(self.config.max_lambda);
                if lambda >= self.config.max_lambda {
                    break IterationStatus::Converged(
                        "No further reduction in cost, damping reached maximum".to_string(),
                    );
                }
            };

            if let IterationStatus::Converged(message) = status {
                return Ok(LmResult {
                    params,
                    residuals,
                    cost,
                    iterations,
                    func_evals,
                    success: true,
                    message,
                });
            }
        }
    }

    fn check_timeout(&self, started: Instant, iterations: usize) -> Result<()> {
        match self.config.timeout {
            Some(timeout) if started.elapsed() >= timeout => {
                Err(LcFitError::OptimizationFailure(format!(
                    "Timed out after {:.3}s ({} iterations)",
                    started.elapsed().as_secs_f64(),
                    iterations
                )))
            }
            _ => Ok(()),
        }
    }
}

fn sum_of_squares(residuals: &Array1<f64>) -> f64 {
    residuals.iter().map(|r| r.powi(2)).sum()
}

fn to_dmatrix(array: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(array.nrows(), array.ncols(), |i, j| array[[i, j]])
}

/// Solve `(JᵀJ + λ·diag(JᵀJ)) δ = -g`, Cholesky first with LU as fallback.
fn solve_damped(jtj: &DMatrix<f64>, gradient: &DVector<f64>, lambda: f64) -> Option<DVector<f64>> {
    let mut a = jtj.clone();
    for i in 0..a.nrows() {
        a[(i, i)] += lambda * jtj[(i, i)].max(MIN_DIAGONAL);
    }
    let rhs = -gradient;

    let step = match a.clone().cholesky() {
        Some(cholesky) => cholesky.solve(&rhs),
        None => a.lu().solve(&rhs)?,
    };

    step.iter().all(|x| x.is_finite()).then_some(step)
}
