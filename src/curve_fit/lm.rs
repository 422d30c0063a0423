use crate::curve_fit::WeightedResiduals;
use crate::model::FitModel;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_UP: f64 = 10.0;
const LAMBDA_DOWN: f64 = 0.1;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e10;

/// Termination and damping controls for the Levenberg-Marquardt loop
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename = "Lm", default)]
pub struct LmOptions {
    /// Iteration cap; exceeding it is reported as [FitStatus::MaxIterations]
    pub max_iterations: usize,
    /// Stop once the squared weighted residual norm falls below this
    pub residual_tolerance: f64,
    /// Stop once an accepted step shrinks the squared residual norm by less
    /// than this fraction of its value
    pub relative_reduction_tolerance: f64,
    /// Stop once the gradient norm `|J^T r|` falls below this
    pub gradient_tolerance: f64,
    /// Stop once an accepted step is this small relative to the parameter norm
    pub step_tolerance: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            residual_tolerance: 1e-12,
            relative_reduction_tolerance: 1e-10,
            gradient_tolerance: 1e-10,
            step_tolerance: 1e-12,
        }
    }
}

/// Reason the minimization loop stopped
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum FitStatus {
    /// Squared residual norm under tolerance
    ResidualTolerance,
    /// Accepted step no longer reduces the squared residual norm appreciably
    RelativeReduction,
    /// Gradient norm under tolerance
    GradientTolerance,
    /// Accepted step under tolerance
    StepTolerance,
    /// Iteration cap reached, best-so-far parameters returned
    MaxIterations,
    /// Damped normal equations unsolvable even at maximum damping
    SingularJacobian,
}

impl FitStatus {
    pub fn was_successful(self) -> bool {
        matches!(
            self,
            Self::ResidualTolerance
                | Self::RelativeReduction
                | Self::GradientTolerance
                | Self::StepTolerance
        )
    }
}

pub(crate) struct Minimization {
    pub x: DVector<f64>,
    pub status: FitStatus,
    pub n_residual_evals: usize,
    pub n_jacobian_evals: usize,
    pub squared_residual_norm: f64,
}

/// Damped Gauss-Newton iteration over a residual functor
///
/// Each iteration solves `(J^T J + lambda * diag(J^T J)) dx = -J^T r` by
/// Cholesky factorization, shrinking the damping on accepted steps and
/// growing it on rejected ones. The Jacobian comes from forward differences
/// of the functor; a Jacobian evaluation is counted once regardless of the
/// residual calls it makes internally, matching the usual nfev/njev split.
pub(crate) fn minimize<M>(
    problem: &WeightedResiduals<'_, M>,
    x0: DVector<f64>,
    options: &LmOptions,
) -> Minimization
where
    M: FitModel,
{
    assert_eq!(
        x0.len(),
        problem.inputs(),
        "initial guess length differs from the model parameter count"
    );

    let mut x = x0;
    let mut r = problem.residuals(&x);
    let mut cost = r.norm_squared();
    let mut n_residual_evals = 1;
    let mut n_jacobian_evals = 0;
    let mut lambda = LAMBDA_INIT;
    let mut status = FitStatus::MaxIterations;

    for _ in 0..options.max_iterations {
        if cost < options.residual_tolerance {
            status = FitStatus::ResidualTolerance;
            break;
        }

        let jac = problem.jacobian(&x, &r);
        n_jacobian_evals += 1;
        let jac_t = jac.transpose();
        let jtj = &jac_t * &jac;
        let grad = &jac_t * &r;

        if grad.norm() < options.gradient_tolerance {
            status = FitStatus::GradientTolerance;
            break;
        }

        // Grow the damping until the normal equations factorize; a Jacobian
        // that stays singular at maximum damping is a breakdown.
        let dx = loop {
            let mut damped = jtj.clone();
            for j in 0..damped.nrows() {
                damped[(j, j)] += lambda * jtj[(j, j)].abs().max(LAMBDA_MIN);
            }
            match damped.cholesky() {
                Some(factorization) => break Some(factorization.solve(&(-&grad))),
                None if lambda >= LAMBDA_MAX => break None,
                None => lambda = (lambda * LAMBDA_UP).min(LAMBDA_MAX),
            }
        };
        let Some(dx) = dx else {
            status = FitStatus::SingularJacobian;
            break;
        };

        let x_trial = &x + &dx;
        let r_trial = problem.residuals(&x_trial);
        n_residual_evals += 1;
        let cost_trial = r_trial.norm_squared();

        if cost_trial < cost {
            let step_converged =
                dx.norm() < options.step_tolerance * (x.norm() + options.step_tolerance);
            let reduction_converged =
                cost - cost_trial <= options.relative_reduction_tolerance * cost;
            x = x_trial;
            r = r_trial;
            cost = cost_trial;
            lambda = (lambda * LAMBDA_DOWN).max(LAMBDA_MIN);
            // re-check here, not only at the loop top: an accepted step on
            // the final allowed iteration still counts as convergence
            if cost < options.residual_tolerance {
                status = FitStatus::ResidualTolerance;
                break;
            }
            if step_converged {
                status = FitStatus::StepTolerance;
                break;
            }
            if reduction_converged {
                status = FitStatus::RelativeReduction;
                break;
            }
        } else {
            lambda = (lambda * LAMBDA_UP).min(LAMBDA_MAX);
        }
    }

    Minimization {
        x,
        status,
        n_residual_evals,
        n_jacobian_evals,
        squared_residual_norm: cost,
    }
}
