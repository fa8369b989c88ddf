use super::node::Node;
use super::node::NodeRef;
use super::node::Visitor;
use crate::s1_flat as node;
use std::collections::HashMap;

/// Prints a flat tree back in Modelica-like text, for `--verbose` output and
/// debugging of the flattening hand-over.
#[derive(Default)]
pub struct ReprVisitor {
    pub level: usize,
    pub repr: HashMap<usize, String>,
}

impl ReprVisitor {
    fn repr_of(&self, id: usize) -> &str {
        self.repr.get(&id).map(String::as_str).unwrap_or("?")
    }

    /// Operand text, parenthesized when the operand is itself infix.
    fn operand_repr(&self, operand: &node::Expression) -> String {
        let s = self.repr_of(operand.id());
        if is_infix(operand) {
            format!("({})", s)
        } else {
            s.to_string()
        }
    }
}

fn is_infix(expr: &node::Expression) -> bool {
    match expr {
        node::Expression::Operation(op) => {
            matches!(op.operator.as_str(), "+" | "-" | "*" | "/" | "^")
                && matches!(op.operands.len(), 1 | 2)
        }
        _ => false,
    }
}

impl Visitor for ReprVisitor {
    fn enter_any(&mut self, _n: NodeRef, _parent_id: Option<usize>) {
        self.level += 1;
    }

    fn exit_any(&mut self, _n: NodeRef, _parent_id: Option<usize>) {
        self.level -= 1;
    }

    fn exit_stored_definition(&mut self, n: &node::StoredDefinition, _parent_id: Option<usize>) {
        let mut s = String::new();
        n.classes.values().for_each(|cdef| {
            s += &format!("{}\n", self.repr_of(cdef.id()));
        });
        self.repr.insert(n.id(), s);
    }

    fn exit_class_definition(&mut self, n: &node::ClassDefinition, _parent_id: Option<usize>) {
        let mut s = format!("class {}\n", n.name);
        for sym in n.symbols.values() {
            s += &format!("    {}\n", self.repr_of(sym.id()));
        }
        s += "equation\n";
        for eq in n.equations.iter() {
            s += &format!("    {}\n", self.repr_of(eq.id()));
        }
        s += &format!("end {};\n", n.name);
        self.repr.insert(n.id(), s);
    }

    fn exit_symbol(&mut self, n: &node::Symbol, _parent_id: Option<usize>) {
        let mut s = String::new();
        for prefix in &n.prefixes {
            s += &format!("{} ", prefix);
        }
        s += &format!("Real {}", n.name);
        if let Some(start) = &n.start {
            s += &format!("(start = {})", self.repr_of(start.id()));
        }
        if let Some(value) = &n.value {
            s += &format!(" = {}", self.repr_of(value.id()));
        }
        s += ";";
        self.repr.insert(n.id(), s);
    }

    fn exit_equation(&mut self, n: &node::Equation, _parent_id: Option<usize>) {
        self.repr.insert(
            n.id(),
            format!(
                "{} = {};",
                self.repr_of(n.left.id()),
                self.repr_of(n.right.id())
            ),
        );
    }

    fn exit_operation(&mut self, n: &node::Operation, _parent_id: Option<usize>) {
        let op = n.operator.as_str();
        let s = match (op, n.operands.as_slice()) {
            ("+" | "-" | "*" | "/" | "^", [lhs, rhs]) => format!(
                "{} {} {}",
                self.operand_repr(lhs),
                op,
                self.operand_repr(rhs)
            ),
            ("+" | "-", [operand]) => format!("{}{}", op, self.operand_repr(operand)),
            _ => {
                let args: Vec<&str> = n.operands.iter().map(|o| self.repr_of(o.id())).collect();
                format!("{}({})", op, args.join(", "))
            }
        };
        self.repr.insert(n.id(), s);
    }

    fn exit_primary(&mut self, n: &node::Primary, _parent_id: Option<usize>) {
        self.repr.insert(n.id(), n.value.to_string());
    }

    fn exit_component_reference(
        &mut self,
        n: &node::ComponentReference,
        _parent_id: Option<usize>,
    ) {
        self.repr.insert(n.id(), n.name.clone());
    }
}
