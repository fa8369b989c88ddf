//! A small symbolic algebra engine: expressions, simplification,
//! differentiation, Jacobians and linear solves.
//!
//! It covers what the DAE runtime needs to reduce residual equations and
//! linearize the result, nothing more. Simplification is rule based and does
//! not produce a canonical form, so results are best compared numerically
//! with [`Expr::eval`].

mod diff;
pub mod expr;
pub mod matrix;

pub use expr::{apply_function, Expr};
pub use matrix::{empty_matrix, jacobian, rows, solve_linear, SymMatrix};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SymbolicError {
    #[error("function '{0}' cannot be differentiated")]
    NotDifferentiable(String),
    #[error("symbol '{0}' has no value")]
    UnboundSymbol(String),
    #[error("function '{0}' cannot be evaluated")]
    UnknownFunction(String),
    #[error("linear system has no non-zero pivot in column {0}")]
    Singular(usize),
    #[error("linear system is {rows}x{cols} with {rhs} right-hand sides")]
    Shape { rows: usize, cols: usize, rhs: usize },
}
