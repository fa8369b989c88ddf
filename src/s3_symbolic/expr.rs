use std::collections::HashMap;
use std::fmt;

use super::SymbolicError;

/// A symbolic scalar expression.
///
/// `Sym` is any named quantity; whether it varies with time is decided by
/// the caller when taking time derivatives. `Der` is the time derivative of
/// its operand and is treated as an atom of its own by [`Expr::diff`].
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Num(f64),
    Sym(String),
    Der(Box<Expr>),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Num(val) => write!(f, "{}", val),
            Expr::Sym(name) => write!(f, "{}", name),
            Expr::Der(expr) => write!(f, "der({})", expr),
            Expr::Neg(expr) => {
                write!(f, "-")?;
                fmt_operand(f, expr, 3)
            }
            Expr::Add(lhs, rhs) => fmt_infix(f, lhs, " + ", rhs, 1, 1),
            Expr::Sub(lhs, rhs) => fmt_infix(f, lhs, " - ", rhs, 1, 2),
            Expr::Mul(lhs, rhs) => fmt_infix(f, lhs, "*", rhs, 2, 3),
            Expr::Div(lhs, rhs) => fmt_infix(f, lhs, "/", rhs, 2, 3),
            Expr::Pow(base, exp) => fmt_infix(f, base, "**", exp, 5, 4),
            Expr::Call(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn fmt_operand(f: &mut fmt::Formatter, expr: &Expr, min_prec: u8) -> fmt::Result {
    if expr.precedence() < min_prec {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

fn fmt_infix(
    f: &mut fmt::Formatter,
    lhs: &Expr,
    op: &str,
    rhs: &Expr,
    lhs_prec: u8,
    rhs_prec: u8,
) -> fmt::Result {
    fmt_operand(f, lhs, lhs_prec)?;
    write!(f, "{}", op)?;
    fmt_operand(f, rhs, rhs_prec)
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Neg(self.boxed())
    }
}

impl Expr {
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn num(val: f64) -> Self {
        Expr::Num(val)
    }

    pub fn sym(name: &str) -> Self {
        Expr::Sym(name.to_string())
    }

    pub fn der(expr: Expr) -> Self {
        Expr::Der(expr.boxed())
    }

    pub fn pow(base: Expr, exp: Expr) -> Self {
        Expr::Pow(base.boxed(), exp.boxed())
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::Call(name.to_string(), args)
    }

    pub fn zero() -> Self {
        Expr::Num(0.0)
    }

    pub fn one() -> Self {
        Expr::Num(1.0)
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Expr::Num(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_num() == Some(0.0)
    }

    pub fn is_one(&self) -> bool {
        self.as_num() == Some(1.0)
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(..) => 3,
            Expr::Num(v) if *v < 0.0 => 2,
            Expr::Pow(..) => 4,
            _ => 5,
        }
    }

    /// Whether `atom` occurs in the expression. A time derivative is an atom
    /// of its own: `der(x)` does not contain `x`.
    pub fn contains(&self, atom: &Expr) -> bool {
        if self == atom {
            return true;
        }
        match self {
            Expr::Num(_) | Expr::Sym(_) | Expr::Der(_) => false,
            Expr::Neg(a) => a.contains(atom),
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => a.contains(atom) || b.contains(atom),
            Expr::Call(_, args) => args.iter().any(|arg| arg.contains(atom)),
        }
    }

    pub fn contains_any(&self, atoms: &[Expr]) -> bool {
        atoms.iter().any(|atom| self.contains(atom))
    }

    /// Replace every occurrence of each `from` with its `to`, first match wins.
    pub fn subs(&self, pairs: &[(Expr, Expr)]) -> Expr {
        if let Some((_, to)) = pairs.iter().find(|(from, _)| from == self) {
            return to.clone();
        }
        match self {
            Expr::Num(_) | Expr::Sym(_) => self.clone(),
            Expr::Der(a) => Expr::Der(a.subs(pairs).boxed()),
            Expr::Neg(a) => Expr::Neg(a.subs(pairs).boxed()),
            Expr::Add(a, b) => Expr::Add(a.subs(pairs).boxed(), b.subs(pairs).boxed()),
            Expr::Sub(a, b) => Expr::Sub(a.subs(pairs).boxed(), b.subs(pairs).boxed()),
            Expr::Mul(a, b) => Expr::Mul(a.subs(pairs).boxed(), b.subs(pairs).boxed()),
            Expr::Div(a, b) => Expr::Div(a.subs(pairs).boxed(), b.subs(pairs).boxed()),
            Expr::Pow(a, b) => Expr::Pow(a.subs(pairs).boxed(), b.subs(pairs).boxed()),
            Expr::Call(name, args) => {
                Expr::Call(name.clone(), args.iter().map(|a| a.subs(pairs)).collect())
            }
        }
    }

    /// Numeric value under `env`. Symbols are looked up by name, time
    /// derivatives by their printed form, e.g. `der(x)`.
    pub fn eval(&self, env: &HashMap<String, f64>) -> Result<f64, SymbolicError> {
        let val = match self {
            Expr::Num(v) => *v,
            Expr::Sym(name) => *env
                .get(name)
                .ok_or_else(|| SymbolicError::UnboundSymbol(name.clone()))?,
            Expr::Der(_) => {
                let key = self.to_string();
                *env.get(&key).ok_or(SymbolicError::UnboundSymbol(key))?
            }
            Expr::Neg(a) => -a.eval(env)?,
            Expr::Add(a, b) => a.eval(env)? + b.eval(env)?,
            Expr::Sub(a, b) => a.eval(env)? - b.eval(env)?,
            Expr::Mul(a, b) => a.eval(env)? * b.eval(env)?,
            Expr::Div(a, b) => a.eval(env)? / b.eval(env)?,
            Expr::Pow(a, b) => a.eval(env)?.powf(b.eval(env)?),
            Expr::Call(name, args) => {
                let vals = args
                    .iter()
                    .map(|a| a.eval(env))
                    .collect::<Result<Vec<f64>, SymbolicError>>()?;
                apply_function(name, &vals)
                    .ok_or_else(|| SymbolicError::UnknownFunction(name.clone()))?
            }
        };
        Ok(val)
    }

    /// Constant folding and identity rules, bottom-up. This is not a
    /// canonical form: equal values may still print differently.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Num(_) | Expr::Sym(_) => self.clone(),
            Expr::Der(a) => Expr::Der(a.simplify().boxed()),
            Expr::Neg(a) => simplify_neg(a.simplify()),
            Expr::Add(a, b) => simplify_add(a.simplify(), b.simplify()),
            Expr::Sub(a, b) => simplify_sub(a.simplify(), b.simplify()),
            Expr::Mul(a, b) => simplify_mul(a.simplify(), b.simplify()),
            Expr::Div(a, b) => simplify_div(a.simplify(), b.simplify()),
            Expr::Pow(a, b) => simplify_pow(a.simplify(), b.simplify()),
            Expr::Call(name, args) => {
                let args: Vec<Expr> = args.iter().map(|a| a.simplify()).collect();
                let nums: Option<Vec<f64>> = args.iter().map(|a| a.as_num()).collect();
                match nums.and_then(|vals| apply_function(name, &vals)) {
                    Some(v) if v.is_finite() => Expr::Num(v),
                    _ => Expr::Call(name.clone(), args),
                }
            }
        }
    }
}

fn simplify_neg(a: Expr) -> Expr {
    match a {
        Expr::Num(v) => Expr::Num(-v),
        Expr::Neg(inner) => *inner,
        Expr::Sub(x, y) => Expr::Sub(y, x),
        other => Expr::Neg(other.boxed()),
    }
}

fn simplify_add(a: Expr, b: Expr) -> Expr {
    match (a, b) {
        (Expr::Num(x), Expr::Num(y)) => Expr::Num(x + y),
        (a, b) if a.is_zero() => b,
        (a, b) if b.is_zero() => a,
        (a, Expr::Neg(c)) => simplify_sub(a, *c),
        (Expr::Neg(c), b) => simplify_sub(b, *c),
        (a, Expr::Num(y)) if y < 0.0 => simplify_sub(a, Expr::Num(-y)),
        (a, b) if a == b => simplify_mul(Expr::Num(2.0), a),
        (a, b) => Expr::Add(a.boxed(), b.boxed()),
    }
}

fn simplify_sub(a: Expr, b: Expr) -> Expr {
    match (a, b) {
        (Expr::Num(x), Expr::Num(y)) => Expr::Num(x - y),
        (a, b) if b.is_zero() => a,
        (a, b) if a.is_zero() => simplify_neg(b),
        (a, b) if a == b => Expr::zero(),
        (a, Expr::Neg(c)) => simplify_add(a, *c),
        (a, Expr::Num(y)) if y < 0.0 => simplify_add(a, Expr::Num(-y)),
        (a, b) => Expr::Sub(a.boxed(), b.boxed()),
    }
}

fn simplify_mul(a: Expr, b: Expr) -> Expr {
    match (a, b) {
        (Expr::Num(x), Expr::Num(y)) => Expr::Num(x * y),
        (a, b) if a.is_zero() || b.is_zero() => Expr::zero(),
        (a, b) if a.is_one() => b,
        (a, b) if b.is_one() => a,
        (Expr::Num(x), b) if x == -1.0 => simplify_neg(b),
        (a, Expr::Num(y)) if y == -1.0 => simplify_neg(a),
        (Expr::Neg(x), b) => simplify_neg(simplify_mul(*x, b)),
        (a, Expr::Neg(y)) => simplify_neg(simplify_mul(a, *y)),
        // numbers go to the left
        (a, Expr::Num(y)) => simplify_mul(Expr::Num(y), a),
        (Expr::Num(x), Expr::Mul(c, d)) if c.as_num().is_some() => {
            let c = c.as_num().unwrap_or(1.0);
            simplify_mul(Expr::Num(x * c), *d)
        }
        (a, b) => Expr::Mul(a.boxed(), b.boxed()),
    }
}

fn simplify_div(a: Expr, b: Expr) -> Expr {
    match (a, b) {
        (Expr::Num(x), Expr::Num(y)) if y != 0.0 => Expr::Num(x / y),
        (a, b) if a.is_zero() && !b.is_zero() => Expr::zero(),
        (a, b) if b.is_one() => a,
        (a, Expr::Num(y)) if y == -1.0 => simplify_neg(a),
        (a, b) if a == b && !a.is_zero() => Expr::one(),
        (Expr::Neg(x), b) => simplify_neg(simplify_div(*x, b)),
        (a, Expr::Neg(y)) => simplify_neg(simplify_div(a, *y)),
        (a, b) => Expr::Div(a.boxed(), b.boxed()),
    }
}

fn simplify_pow(a: Expr, b: Expr) -> Expr {
    match (a, b) {
        (Expr::Num(x), Expr::Num(y)) if x.powf(y).is_finite() => Expr::Num(x.powf(y)),
        (_, b) if b.is_zero() => Expr::one(),
        (a, b) if b.is_one() => a,
        (a, _) if a.is_one() => Expr::one(),
        (a, b) => Expr::Pow(a.boxed(), b.boxed()),
    }
}

/// Numeric value of a named function, `None` for unknown names or arity.
pub fn apply_function(name: &str, args: &[f64]) -> Option<f64> {
    let val = match (name, args) {
        ("sin", [a]) => a.sin(),
        ("cos", [a]) => a.cos(),
        ("tan", [a]) => a.tan(),
        ("asin", [a]) => a.asin(),
        ("acos", [a]) => a.acos(),
        ("atan", [a]) => a.atan(),
        ("sinh", [a]) => a.sinh(),
        ("cosh", [a]) => a.cosh(),
        ("tanh", [a]) => a.tanh(),
        ("exp", [a]) => a.exp(),
        ("log", [a]) => a.ln(),
        ("sqrt", [a]) => a.sqrt(),
        ("abs", [a]) => a.abs(),
        ("sign", [a]) => {
            if *a == 0.0 {
                0.0
            } else {
                a.signum()
            }
        }
        ("atan2", [a, b]) => a.atan2(*b),
        ("min", [a, b]) => a.min(*b),
        ("max", [a, b]) => a.max(*b),
        _ => return None,
    };
    Some(val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn x() -> Expr {
        Expr::sym("x")
    }

    fn y() -> Expr {
        Expr::sym("y")
    }

    #[test]
    fn test_display_precedence() {
        let e = (x() + y()) * Expr::num(2.0);
        assert_eq!(e.to_string(), "(x + y)*2");
        let e = x() - (y() - Expr::num(1.0));
        assert_eq!(e.to_string(), "x - (y - 1)");
        let e = -(x() * y());
        assert_eq!(e.to_string(), "-(x*y)");
        let e = Expr::der(x()) / Expr::pow(y(), Expr::num(2.0));
        assert_eq!(e.to_string(), "der(x)/y**2");
        assert_eq!(Expr::num(0.5).to_string(), "0.5");
    }

    #[test]
    fn test_simplify_identities() {
        assert_eq!((x() + Expr::zero()).simplify(), x());
        assert_eq!((Expr::one() * x()).simplify(), x());
        assert_eq!((x() * Expr::zero()).simplify(), Expr::zero());
        assert_eq!((x() / Expr::one()).simplify(), x());
        assert_eq!((-(-x())).simplify(), x());
        assert_eq!((x() - x()).simplify(), Expr::zero());
        assert_eq!((Expr::zero() - (-x())).simplify(), x());
        assert_eq!((Expr::num(2.0) * Expr::num(3.0) - Expr::one()).simplify(), Expr::num(5.0));
        assert_eq!(
            (x() * Expr::num(3.0)).simplify(),
            Expr::num(3.0) * x()
        );
        assert_eq!(
            Expr::call("cos", vec![Expr::zero()]).simplify(),
            Expr::one()
        );
    }

    #[test]
    fn test_simplify_keeps_value() {
        let e = (x() - (-y())) * (Expr::num(-1.0) * x()) / (Expr::one() + Expr::one());
        let env = HashMap::from([("x".to_string(), 1.5), ("y".to_string(), -0.25)]);
        let raw = e.eval(&env).expect("eval raw");
        let simple = e.simplify().eval(&env).expect("eval simplified");
        assert_relative_eq!(raw, simple);
    }

    #[test]
    fn test_contains_treats_der_as_atom() {
        let e = Expr::der(x()) + y();
        assert!(e.contains(&Expr::der(x())));
        assert!(!e.contains(&x()));
        assert!(e.contains_any(&[x(), y()]));
    }

    #[test]
    fn test_subs() {
        let e = Expr::der(x()) + x();
        let s = e.subs(&[(Expr::der(x()), -x())]);
        assert_eq!(s, -x() + x());
        assert_eq!(s.simplify(), Expr::zero());
    }

    #[test]
    fn test_eval_errors() {
        let env = HashMap::new();
        assert_eq!(
            x().eval(&env),
            Err(SymbolicError::UnboundSymbol("x".to_string()))
        );
        assert_eq!(
            Expr::call("foo", vec![Expr::one()]).eval(&env),
            Err(SymbolicError::UnknownFunction("foo".to_string()))
        );
        let env = HashMap::from([("der(x)".to_string(), 4.0)]);
        assert_relative_eq!(Expr::der(x()).eval(&env).expect("der"), 4.0);
    }
}
