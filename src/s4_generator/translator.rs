//! Rendering expressions and equations into Sympy source fragments.
//!
//! Every function here works on the already rendered fragments of the
//! operands, so fragments are produced bottom-up exactly once.

use crate::s1_flat::Literal;

/// Operators that render as `lhs <op> rhs` when given two operands.
pub const BINARY_OPERATORS: &[&str] = &["+", "-", "*", "/"];

/// Operators that render as `<op> operand` when given one operand.
pub const UNARY_OPERATORS: &[&str] = &["+", "-"];

/// Call syntax of operators that are not special cased. Operators missing
/// from this table are called by their own name.
pub const CALL_TABLE: &[(&str, &str)] = &[
    ("^", "sympy.Pow"),
    ("abs", "sympy.Abs"),
    ("acos", "sympy.acos"),
    ("asin", "sympy.asin"),
    ("atan", "sympy.atan"),
    ("atan2", "sympy.atan2"),
    ("cosh", "sympy.cosh"),
    ("exp", "sympy.exp"),
    ("log", "sympy.log"),
    ("max", "sympy.Max"),
    ("min", "sympy.Min"),
    ("sign", "sympy.sign"),
    ("sinh", "sympy.sinh"),
    ("sqrt", "sympy.sqrt"),
    ("tanh", "sympy.tanh"),
];

pub fn call_name(operator: &str) -> &str {
    CALL_TABLE
        .iter()
        .find(|(op, _)| *op == operator)
        .map(|(_, call)| *call)
        .unwrap_or(operator)
}

/// Render an operator applied to rendered operands.
pub fn render_operation(operator: &str, operands: &[&str]) -> String {
    match operands {
        [operand] if operator == "der" => format!("({}).diff(self.t)", operand),
        [lhs, rhs] if BINARY_OPERATORS.contains(&operator) => {
            format!("{} {} {}", lhs, operator, rhs)
        }
        [operand] if UNARY_OPERATORS.contains(&operator) => format!("{} {}", operator, operand),
        _ => format!("{}({})", call_name(operator), operands.join(", ")),
    }
}

pub fn render_primary(value: &Literal) -> String {
    value.to_string()
}

/// Residual form of `left = right`, zero when the equation holds.
pub fn render_equation(left: &str, right: &str) -> String {
    format!("{} - ({})", left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_der() {
        assert_eq!(render_operation("der", &["x"]), "(x).diff(self.t)");
        // wraps compound operands as they are
        assert_eq!(
            render_operation("der", &["x * y + 1"]),
            "(x * y + 1).diff(self.t)"
        );
    }

    #[test]
    fn test_double_der() {
        let inner = render_operation("der", &["x"]);
        let outer = render_operation("der", &[&inner]);
        assert_eq!(outer, "((x).diff(self.t)).diff(self.t)");
    }

    #[test]
    fn test_binary_keeps_operand_text() {
        assert_eq!(render_operation("+", &["a", "b"]), "a + b");
        assert_eq!(render_operation("/", &["a - b", "c"]), "a - b / c");
        assert_eq!(render_operation("*", &["-x", "k"]), "-x * k");
    }

    #[test]
    fn test_unary() {
        assert_eq!(render_operation("-", &["x"]), "- x");
        assert_eq!(render_operation("+", &["x"]), "+ x");
    }

    #[test]
    fn test_fallback_call() {
        assert_eq!(render_operation("sin", &["x"]), "sin(x)");
        assert_eq!(render_operation("sqrt", &["x"]), "sympy.sqrt(x)");
        assert_eq!(render_operation("^", &["x", "2"]), "sympy.Pow(x, 2)");
        // arity outside the special cases falls back to a call as well
        assert_eq!(render_operation("*", &["a", "b", "c"]), "*(a, b, c)");
        assert_eq!(render_operation("der", &["a", "b"]), "der(a, b)");
        assert_eq!(render_operation("myFunc", &[]), "myFunc()");
        assert_eq!(render_operation("-", &[]), "-()");
    }

    #[test]
    fn test_call_table_is_sorted_and_unique() {
        let names: Vec<&str> = CALL_TABLE.iter().map(|(op, _)| *op).collect();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_equation() {
        assert_eq!(render_equation("(x).diff(self.t)", "- x"), "(x).diff(self.t) - (- x)");
    }

    #[test]
    fn test_primary() {
        assert_eq!(render_primary(&Literal::Real(1.0)), "1.0");
        assert_eq!(render_primary(&Literal::Integer(-2)), "-2");
    }
}
