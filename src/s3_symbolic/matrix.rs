use ndarray::{Array2, Axis};

use super::expr::Expr;
use super::SymbolicError;

pub type SymMatrix = Array2<Expr>;

/// The `0x0` matrix.
pub fn empty_matrix() -> SymMatrix {
    Array2::from_elem((0, 0), Expr::zero())
}

/// `J[i, j] = d exprs[i] / d vars[j]`.
pub fn jacobian(exprs: &[Expr], vars: &[Expr]) -> Result<SymMatrix, SymbolicError> {
    let mut jac = Array2::from_elem((exprs.len(), vars.len()), Expr::zero());
    for ((i, j), entry) in jac.indexed_iter_mut() {
        *entry = exprs[i].diff(&vars[j])?;
    }
    Ok(jac)
}

/// Solve `a * x = b` by Gaussian elimination, pivoting on the first entry
/// that is not structurally zero.
pub fn solve_linear(mut a: SymMatrix, mut b: Vec<Expr>) -> Result<Vec<Expr>, SymbolicError> {
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return Err(SymbolicError::Shape {
            rows: a.nrows(),
            cols: a.ncols(),
            rhs: n,
        });
    }

    for k in 0..n {
        let pivot = (k..n)
            .find(|&r| !a[[r, k]].is_zero())
            .ok_or(SymbolicError::Singular(k))?;
        if pivot != k {
            for j in 0..n {
                a.swap([k, j], [pivot, j]);
            }
            b.swap(k, pivot);
        }
        for r in (k + 1)..n {
            if a[[r, k]].is_zero() {
                continue;
            }
            let factor = (a[[r, k]].clone() / a[[k, k]].clone()).simplify();
            for j in k..n {
                let reduced = a[[r, j]].clone() - factor.clone() * a[[k, j]].clone();
                a[[r, j]] = reduced.simplify();
            }
            b[r] = (b[r].clone() - factor * b[k].clone()).simplify();
        }
    }

    let mut x = vec![Expr::zero(); n];
    for k in (0..n).rev() {
        let mut acc = b[k].clone();
        for j in (k + 1)..n {
            acc = acc - a[[k, j]].clone() * x[j].clone();
        }
        x[k] = (acc / a[[k, k]].clone()).simplify();
    }
    Ok(x)
}

/// Entries as nested rows, handy for printing and comparisons.
pub fn rows(m: &SymMatrix) -> Vec<Vec<Expr>> {
    m.axis_iter(Axis(0)).map(|row| row.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn sym(name: &str) -> Expr {
        Expr::sym(name)
    }

    #[test]
    fn test_jacobian_shape_and_entries() {
        // f = [x*y, x + 2*y]
        let f = vec![
            sym("x") * sym("y"),
            sym("x") + Expr::num(2.0) * sym("y"),
        ];
        let jac = jacobian(&f, &[sym("x"), sym("y")]).expect("jacobian");
        assert_eq!(jac.dim(), (2, 2));
        assert_eq!(
            rows(&jac),
            vec![
                vec![sym("y"), sym("x")],
                vec![Expr::one(), Expr::num(2.0)]
            ]
        );
    }

    #[test]
    fn test_empty() {
        let jac = jacobian(&[], &[sym("x")]).expect("jacobian");
        assert_eq!(jac.dim(), (0, 1));
        assert_eq!(empty_matrix().dim(), (0, 0));
    }

    #[test]
    fn test_solve_with_pivoting() {
        // [0 1; k 1] [a; b] = [2; 3]  ->  b = 2, a = 1/k
        let a = Array2::from_shape_vec(
            (2, 2),
            vec![Expr::zero(), Expr::one(), sym("k"), Expr::one()],
        )
        .expect("shape");
        let x = solve_linear(a, vec![Expr::num(2.0), Expr::num(3.0)]).expect("solve");
        let env = HashMap::from([("k".to_string(), 4.0)]);
        assert_relative_eq!(x[0].eval(&env).expect("eval"), 0.25);
        assert_relative_eq!(x[1].eval(&env).expect("eval"), 2.0);
    }

    #[test]
    fn test_singular() {
        let a = Array2::from_shape_vec(
            (2, 2),
            vec![Expr::one(), sym("k"), Expr::zero(), Expr::zero()],
        )
        .expect("shape");
        let err = solve_linear(a, vec![Expr::one(), Expr::one()]).unwrap_err();
        assert_eq!(err, SymbolicError::Singular(1));
    }
}
