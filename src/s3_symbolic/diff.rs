use super::expr::Expr;
use super::SymbolicError;

impl Expr {
    /// Partial derivative with respect to an atom: a symbol or the time
    /// derivative of one. Other time derivatives are held constant.
    pub fn diff(&self, var: &Expr) -> Result<Expr, SymbolicError> {
        let leaf = |atom: &Expr| {
            if atom == var {
                Expr::one()
            } else {
                Expr::zero()
            }
        };
        Ok(self.derive(&leaf)?.simplify())
    }

    /// Total derivative with respect to time. Symbols for which `is_dynamic`
    /// holds vary with time, all others are constant.
    pub fn time_derivative(&self, is_dynamic: &dyn Fn(&str) -> bool) -> Result<Expr, SymbolicError> {
        let leaf = |atom: &Expr| match atom {
            Expr::Sym(name) if is_dynamic(name.as_str()) => Expr::der(atom.clone()),
            Expr::Der(_) => Expr::der(atom.clone()),
            _ => Expr::zero(),
        };
        Ok(self.derive(&leaf)?.simplify())
    }

    /// Chain rule over the expression tree, `leaf` gives the derivative of
    /// each atom.
    fn derive(&self, leaf: &dyn Fn(&Expr) -> Expr) -> Result<Expr, SymbolicError> {
        let d = match self {
            Expr::Num(_) => Expr::zero(),
            Expr::Sym(_) | Expr::Der(_) => leaf(self),
            Expr::Neg(a) => -a.derive(leaf)?,
            Expr::Add(a, b) => a.derive(leaf)? + b.derive(leaf)?,
            Expr::Sub(a, b) => a.derive(leaf)? - b.derive(leaf)?,
            Expr::Mul(a, b) => {
                a.derive(leaf)? * (**b).clone() + (**a).clone() * b.derive(leaf)?
            }
            Expr::Div(a, b) => {
                let num = a.derive(leaf)? * (**b).clone() - (**a).clone() * b.derive(leaf)?;
                num / Expr::pow((**b).clone(), Expr::num(2.0))
            }
            Expr::Pow(a, b) => {
                let da = a.derive(leaf)?;
                let db = b.derive(leaf)?.simplify();
                let power_rule = (**b).clone()
                    * Expr::pow((**a).clone(), (**b).clone() - Expr::one())
                    * da.clone();
                if db.is_zero() {
                    power_rule
                } else {
                    // a**b * (b' * log(a) + b * a' / a)
                    self.clone()
                        * (db * Expr::call("log", vec![(**a).clone()])
                            + (**b).clone() * da / (**a).clone())
                }
            }
            Expr::Call(name, args) => {
                let dargs = args
                    .iter()
                    .map(|arg| arg.derive(leaf).map(|d| d.simplify()))
                    .collect::<Result<Vec<Expr>, SymbolicError>>()?;
                if dargs.iter().all(Expr::is_zero) {
                    Expr::zero()
                } else {
                    match (outer_derivative(name, args), dargs.as_slice()) {
                        (Some(outer), [darg]) => outer * darg.clone(),
                        _ => return Err(SymbolicError::NotDifferentiable(name.clone())),
                    }
                }
            }
        };
        Ok(d)
    }
}

/// Derivative of a known single-argument function at its argument.
fn outer_derivative(name: &str, args: &[Expr]) -> Option<Expr> {
    let [a] = args else {
        return None;
    };
    let a = a.clone();
    let call = |f: &str, a: Expr| Expr::call(f, vec![a]);
    let square = |e: Expr| Expr::pow(e, Expr::num(2.0));
    let d = match name {
        "sin" => call("cos", a),
        "cos" => -call("sin", a),
        "tan" => Expr::one() + square(call("tan", a)),
        "exp" => call("exp", a),
        "log" => Expr::one() / a,
        "sqrt" => Expr::one() / (Expr::num(2.0) * call("sqrt", a)),
        "abs" => call("sign", a),
        "asin" => Expr::one() / call("sqrt", Expr::one() - square(a)),
        "acos" => -(Expr::one() / call("sqrt", Expr::one() - square(a))),
        "atan" => Expr::one() / (Expr::one() + square(a)),
        "sinh" => call("cosh", a),
        "cosh" => call("sinh", a),
        "tanh" => Expr::one() - square(call("tanh", a)),
        _ => return None,
    };
    Some(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn x() -> Expr {
        Expr::sym("x")
    }

    fn env(x: f64) -> HashMap<String, f64> {
        HashMap::from([("x".to_string(), x), ("k".to_string(), 3.0)])
    }

    #[test]
    fn test_polynomial() {
        // d/dx (k*x**3 - x) = 3*k*x**2 - 1
        let e = Expr::sym("k") * Expr::pow(x(), Expr::num(3.0)) - x();
        let d = e.diff(&x()).expect("diff");
        assert_relative_eq!(d.eval(&env(2.0)).expect("eval"), 3.0 * 3.0 * 4.0 - 1.0);
    }

    #[test]
    fn test_quotient_and_chain() {
        // d/dx sin(x)/x
        let e = Expr::call("sin", vec![x()]) / x();
        let d = e.diff(&x()).expect("diff");
        let xv: f64 = 0.7;
        let expected = (xv.cos() * xv - xv.sin()) / (xv * xv);
        assert_relative_eq!(d.eval(&env(xv)).expect("eval"), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_derivative_atom_is_independent() {
        let e = Expr::der(x()) + Expr::num(2.0) * x();
        assert_eq!(e.diff(&Expr::der(x())).expect("diff"), Expr::one());
        assert_eq!(e.diff(&x()).expect("diff"), Expr::num(2.0));
    }

    #[test]
    fn test_unknown_function() {
        let e = Expr::call("foo", vec![x()]);
        assert_eq!(
            e.diff(&x()),
            Err(SymbolicError::NotDifferentiable("foo".to_string()))
        );
        // constant with respect to the variable is fine
        assert_eq!(e.diff(&Expr::sym("y")), Ok(Expr::zero()));
    }

    #[test]
    fn test_time_derivative() {
        let is_dynamic = |name: &str| name == "x";
        // d/dt (k*x) = k*der(x), k is fixed
        let e = Expr::sym("k") * x();
        assert_eq!(
            e.time_derivative(&is_dynamic).expect("ddt"),
            Expr::sym("k") * Expr::der(x())
        );
        assert_eq!(
            Expr::sym("k").time_derivative(&is_dynamic).expect("ddt"),
            Expr::zero()
        );
        // second derivative wraps twice
        let dd = x()
            .time_derivative(&is_dynamic)
            .and_then(|d| d.time_derivative(&is_dynamic))
            .expect("ddt");
        assert_eq!(dd, Expr::der(Expr::der(x())));
    }
}
