use std::collections::{HashMap, HashSet};

use anyhow::Result;
use ordermap::OrderMap;

use super::model::DaeModel;
use super::DaeError;
use crate::s1_flat::{ClassDefinition, Expression, Literal, Symbol};
use crate::s2_analyzer::classifier::classify;
use crate::s2_analyzer::sanitizer::sanitize;
use crate::s3_symbolic::Expr;

// =============================================================================
// Scope
// =============================================================================

/// Symbols of one class: dotted name to sanitized identifier, and which
/// identifiers vary with time.
struct Scope {
    idents: HashMap<String, String>,
    dynamic: HashSet<String>,
}

impl Scope {
    fn resolve(&self, name: &str) -> Result<Expr, DaeError> {
        self.idents
            .get(name)
            .map(|ident| Expr::sym(ident))
            .ok_or_else(|| DaeError::UnresolvedReference(name.to_string()))
    }

    fn is_dynamic(&self, ident: &str) -> bool {
        self.dynamic.contains(ident)
    }
}

// =============================================================================
// Expressions
// =============================================================================

fn lower_literal(value: &Literal) -> Result<Expr, DaeError> {
    match value {
        Literal::Boolean(v) => Ok(Expr::num(if *v { 1.0 } else { 0.0 })),
        Literal::Integer(v) => Ok(Expr::num(*v as f64)),
        Literal::Real(v) => Ok(Expr::num(*v)),
        Literal::String(v) => Err(DaeError::UnsupportedLiteral(v.clone())),
    }
}

/// Lower a tree expression to a symbolic one, mirroring the operator
/// dispatch of the generated source.
fn lower_expression(expr: &Expression, scope: &Scope) -> Result<Expr, DaeError> {
    match expr {
        Expression::Primary(p) => lower_literal(&p.value),
        Expression::ComponentReference(r) => scope.resolve(&r.name),
        Expression::Operation(op) => {
            let mut args = op
                .operands
                .iter()
                .map(|o| lower_expression(o, scope))
                .collect::<Result<Vec<Expr>, DaeError>>()?;
            let lowered = match (op.operator.as_str(), args.len()) {
                ("der", 1) => {
                    let dynamic = |ident: &str| scope.is_dynamic(ident);
                    args.remove(0).time_derivative(&dynamic)?
                }
                ("+", 1) => args.remove(0),
                ("-", 1) => -args.remove(0),
                ("+" | "-" | "*" | "/" | "^", 2) => {
                    let rhs = args.remove(1);
                    let lhs = args.remove(0);
                    match op.operator.as_str() {
                        "+" => lhs + rhs,
                        "-" => lhs - rhs,
                        "*" => lhs * rhs,
                        "/" => lhs / rhs,
                        _ => Expr::pow(lhs, rhs),
                    }
                }
                (name, _) => Expr::call(name, args),
            };
            Ok(lowered)
        }
    }
}

fn lower_defaults(
    symbols: &[&Symbol],
    scope: &Scope,
    missing: &mut Vec<String>,
) -> Result<OrderMap<String, Expr>, DaeError> {
    let mut defaults = OrderMap::new();
    for s in symbols {
        match s.default_value() {
            Some(value) => {
                defaults.insert(sanitize(&s.name), lower_expression(value, scope)?);
            }
            None => missing.push(s.name.clone()),
        }
    }
    Ok(defaults)
}

fn symbols_of(symbols: &[&Symbol]) -> Vec<Expr> {
    symbols.iter().map(|s| Expr::sym(&sanitize(&s.name))).collect()
}

// =============================================================================
// Classes
// =============================================================================

/// Lower a flat class into its symbolic DAE, residuals as `left - right`.
pub fn create_dae(class: &ClassDefinition) -> Result<DaeModel> {
    let groups = classify(class.symbols.values());

    let idents: HashMap<String, String> = class
        .symbols
        .keys()
        .map(|name| (name.clone(), sanitize(name)))
        .collect();
    let dynamic = groups
        .states
        .iter()
        .chain(groups.variables.iter())
        .chain(groups.inputs.iter())
        .chain(groups.outputs.iter())
        .map(|s| sanitize(&s.name))
        .collect();
    let scope = Scope { idents, dynamic };

    let mut missing_defaults = Vec::new();
    let x0 = lower_defaults(&groups.states, &scope, &mut missing_defaults)?;
    let c0 = lower_defaults(&groups.constants, &scope, &mut missing_defaults)?;
    let p0 = lower_defaults(&groups.parameters, &scope, &mut missing_defaults)?;
    let u0 = lower_defaults(&groups.inputs, &scope, &mut missing_defaults)?;

    let eqs = class
        .equations
        .iter()
        .map(|eq| {
            let left = lower_expression(&eq.left, &scope)?;
            let right = lower_expression(&eq.right, &scope)?;
            Ok(left - right)
        })
        .collect::<Result<Vec<Expr>, DaeError>>()?;

    log::debug!(
        "{}: lowered {} residuals over {} states and {} variables",
        class.name,
        eqs.len(),
        groups.states.len(),
        groups.variables.len()
    );

    Ok(DaeModel {
        name: class.name.clone(),
        t: Expr::sym("t"),
        x: symbols_of(&groups.states),
        v: symbols_of(&groups.variables),
        c: symbols_of(&groups.constants),
        p: symbols_of(&groups.parameters),
        u: symbols_of(&groups.inputs),
        y: symbols_of(&groups.outputs),
        x0,
        c0,
        p0,
        u0,
        eqs,
        missing_defaults,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s1_flat::Prefix;

    fn scope(dynamic: &[&str], fixed: &[&str]) -> Scope {
        Scope {
            idents: dynamic
                .iter()
                .chain(fixed.iter())
                .map(|n| (n.to_string(), sanitize(n)))
                .collect(),
            dynamic: dynamic.iter().map(|n| sanitize(n)).collect(),
        }
    }

    #[test]
    fn test_der_of_reference() {
        let s = scope(&["x"], &[]);
        let e = lower_expression(&Expression::der(Expression::reference("x")), &s)
            .expect("lowering failed");
        assert_eq!(e, Expr::der(Expr::sym("x")));
    }

    #[test]
    fn test_der_of_product_uses_chain_rule() {
        let s = scope(&["x"], &["k"]);
        let e = lower_expression(
            &Expression::der(Expression::binary(
                "*",
                Expression::reference("k"),
                Expression::reference("x"),
            )),
            &s,
        )
        .expect("lowering failed");
        assert_eq!(e, Expr::sym("k") * Expr::der(Expr::sym("x")));
    }

    #[test]
    fn test_der_of_parameter_is_zero() {
        let s = scope(&[], &["k"]);
        let e = lower_expression(&Expression::der(Expression::reference("k")), &s)
            .expect("lowering failed");
        assert!(e.is_zero());
    }

    #[test]
    fn test_operators() {
        let s = scope(&["x"], &[]);
        let e = lower_expression(
            &Expression::binary("^", Expression::reference("x"), Expression::integer(2)),
            &s,
        )
        .expect("lowering failed");
        assert_eq!(e, Expr::pow(Expr::sym("x"), Expr::num(2.0)));

        let e = lower_expression(&Expression::op("sin", vec![Expression::reference("x")]), &s)
            .expect("lowering failed");
        assert_eq!(e, Expr::call("sin", vec![Expr::sym("x")]));

        let e = lower_expression(&Expression::unary("-", Expression::boolean(true)), &s)
            .expect("lowering failed");
        assert_eq!(e, -Expr::num(1.0));
    }

    #[test]
    fn test_sanitized_identifiers() {
        let s = scope(&["body.v", "sum"], &[]);
        let e = lower_expression(&Expression::reference("body.v"), &s).expect("lowering failed");
        assert_eq!(e, Expr::sym("body__v"));
        let e = lower_expression(&Expression::der(Expression::reference("sum")), &s)
            .expect("lowering failed");
        assert_eq!(e, Expr::der(Expr::sym("sum_")));
    }

    #[test]
    fn test_unresolved_reference() {
        let err = lower_expression(&Expression::reference("z"), &scope(&["x"], &[]))
            .expect_err("should fail");
        assert_eq!(err, DaeError::UnresolvedReference("z".to_string()));
    }

    #[test]
    fn test_string_literal() {
        let class = ClassDefinition::new("Label")
            .with_symbol(Symbol::new("x", 0).prefixed(Prefix::State))
            .with_equation(
                Expression::reference("x"),
                Expression::Primary(crate::s1_flat::Primary::new(Literal::String(
                    "one".to_string(),
                ))),
            );
        let err = create_dae(&class).expect_err("should fail");
        assert_eq!(
            err.downcast_ref::<DaeError>(),
            Some(&DaeError::UnsupportedLiteral("one".to_string()))
        );
    }
}
