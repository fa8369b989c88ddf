//! Runtime side of a generated model: the symbolic DAE of a flat class,
//! its reduction to explicit form and its linearization.
//!
//! Lowering uses the same sanitizer and classifier as the generator, so the
//! vectors and residuals here are the ones the generated module declares.

pub mod lower;
pub mod model;


pub use lower::create_dae;
pub use model::{DaeModel, Linearization, OdeModel};

use thiserror::Error;

use crate::s3_symbolic::SymbolicError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DaeError {
    #[error("{equations} equations for {unknowns} unknowns")]
    NotSquare { equations: usize, unknowns: usize },
    #[error("equation {equation} is not linear in the unknowns")]
    Nonlinear { equation: usize },
    #[error("no equation determines '{unknown}'")]
    StructurallySingular { unknown: String },
    #[error("reference to undeclared symbol '{0}'")]
    UnresolvedReference(String),
    #[error("literal '{0}' has no numeric value")]
    UnsupportedLiteral(String),
    #[error(transparent)]
    Symbolic(#[from] SymbolicError),
}
