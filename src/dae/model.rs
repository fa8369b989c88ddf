use std::collections::HashMap;

use anyhow::Result;
use ndarray::Array2;
use ordermap::OrderMap;

use super::lower::create_dae;
use super::DaeError;
use crate::s1_flat::ClassDefinition;
use crate::s3_symbolic::{empty_matrix, jacobian, solve_linear, Expr, SymMatrix, SymbolicError};

/// Symbolic DAE of one flat class.
///
/// The vectors hold sanitized symbols, the `*0` maps hold the default
/// expression of each symbol that has one. `eqs` are residuals, zero when
/// the equation holds.
#[derive(Debug, Clone, PartialEq)]
pub struct DaeModel {
    pub name: String,
    pub t: Expr,
    pub x: Vec<Expr>,
    pub v: Vec<Expr>,
    pub c: Vec<Expr>,
    pub p: Vec<Expr>,
    pub u: Vec<Expr>,
    pub y: Vec<Expr>,
    pub x0: OrderMap<String, Expr>,
    pub c0: OrderMap<String, Expr>,
    pub p0: OrderMap<String, Expr>,
    pub u0: OrderMap<String, Expr>,
    pub eqs: Vec<Expr>,
    pub missing_defaults: Vec<String>,
}

/// State space blocks, `dx = A x + B u`, `y = C x + D u`.
#[derive(Debug, Clone, PartialEq)]
pub struct Linearization {
    pub a: SymMatrix,
    pub b: SymMatrix,
    pub c: SymMatrix,
    pub d: SymMatrix,
}

impl Linearization {
    /// Evaluate every block under `env`.
    pub fn eval(&self, env: &HashMap<String, f64>) -> Result<[Array2<f64>; 4], SymbolicError> {
        let eval_block = |m: &SymMatrix| -> Result<Array2<f64>, SymbolicError> {
            let mut out = Array2::zeros(m.raw_dim());
            for (val, e) in out.iter_mut().zip(m.iter()) {
                *val = e.eval(env)?;
            }
            Ok(out)
        };
        Ok([
            eval_block(&self.a)?,
            eval_block(&self.b)?,
            eval_block(&self.c)?,
            eval_block(&self.d)?,
        ])
    }
}

impl DaeModel {
    pub fn from_class(class: &ClassDefinition) -> Result<Self> {
        create_dae(class)
    }

    /// Unknowns of the residual system: state derivatives, then variables.
    pub fn unknowns(&self) -> Vec<Expr> {
        self.x
            .iter()
            .map(|x| Expr::der(x.clone()))
            .chain(self.v.iter().cloned())
            .collect()
    }

    /// Solve the residuals for the unknowns and return `(f, g)`: the state
    /// derivatives and the outputs in terms of states, inputs, parameters
    /// and constants.
    pub fn reduce(&self) -> Result<(Vec<Expr>, Vec<Expr>), DaeError> {
        let unknowns = self.unknowns();
        if self.eqs.len() != unknowns.len() {
            return Err(DaeError::NotSquare {
                equations: self.eqs.len(),
                unknowns: unknowns.len(),
            });
        }

        let a = jacobian(&self.eqs, &unknowns)?;
        for ((i, _), entry) in a.indexed_iter() {
            if entry.contains_any(&unknowns) {
                return Err(DaeError::Nonlinear { equation: i });
            }
        }

        let zeros: Vec<(Expr, Expr)> = unknowns.iter().map(|u| (u.clone(), Expr::zero())).collect();
        let rhs: Vec<Expr> = self
            .eqs
            .iter()
            .map(|eq| (-eq.subs(&zeros)).simplify())
            .collect();

        let solution = solve_linear(a, rhs).map_err(|err| match err {
            SymbolicError::Singular(k) => DaeError::StructurallySingular {
                unknown: unknowns[k].to_string(),
            },
            other => DaeError::Symbolic(other),
        })?;

        let pairs: Vec<(Expr, Expr)> = unknowns.iter().cloned().zip(solution.iter().cloned()).collect();
        let f = solution[..self.x.len()].to_vec();
        let g = self.y.iter().map(|y| y.subs(&pairs).simplify()).collect();
        log::debug!("{}: reduced {} residuals", self.name, self.eqs.len());
        Ok((f, g))
    }

    /// Jacobians of the reduced model. Blocks whose variable vector is
    /// empty are `0x0`.
    pub fn linearize(&self) -> Result<Linearization, DaeError> {
        let (f, g) = self.reduce()?;
        let (a, c) = if self.x.is_empty() {
            (empty_matrix(), empty_matrix())
        } else {
            (jacobian(&f, &self.x)?, jacobian(&g, &self.x)?)
        };
        let (b, d) = if self.u.is_empty() {
            (empty_matrix(), empty_matrix())
        } else {
            (jacobian(&f, &self.u)?, jacobian(&g, &self.u)?)
        };
        Ok(Linearization { a, b, c, d })
    }

    /// Numeric defaults of constants, parameters, states and inputs, in that
    /// order, each evaluated with the ones before it in scope.
    pub fn default_env(&self) -> Result<HashMap<String, f64>, DaeError> {
        let mut env = HashMap::new();
        for defaults in [&self.c0, &self.p0, &self.x0, &self.u0] {
            for (name, value) in defaults {
                let val = value.eval(&env)?;
                env.insert(name.clone(), val);
            }
        }
        Ok(env)
    }
}

/// A DAE reduced on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct OdeModel {
    pub dae: DaeModel,
    pub f: Vec<Expr>,
    pub g: Vec<Expr>,
}

impl OdeModel {
    pub fn new(dae: DaeModel) -> Result<Self, DaeError> {
        let (f, g) = dae.reduce()?;
        Ok(Self { dae, f, g })
    }

    pub fn from_class(class: &ClassDefinition) -> Result<Self> {
        let dae = create_dae(class)?;
        Ok(Self::new(dae)?)
    }

    pub fn linearize(&self) -> Result<Linearization, DaeError> {
        self.dae.linearize()
    }
}
