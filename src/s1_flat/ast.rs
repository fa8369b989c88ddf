use std::collections::BTreeSet;
use std::fmt;

use anyhow::Result;
use ordermap::OrderMap;
use serde::{Deserialize, Serialize};

/// Per-node bookkeeping shared by every tree node.
///
/// Ids are not part of the serialized tree, they are assigned by
/// [`StoredDefinition::assign_ids`] after loading or building.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeData {
    pub id: usize,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// File Level Nodes

/// A compilation unit: every flattened class, keyed by class name.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDefinition {
    pub classes: OrderMap<String, ClassDefinition>,
    #[serde(skip)]
    pub node_data: NodeData,
}

impl StoredDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a flat unit from JSON and number its nodes.
    pub fn from_json(txt: &str) -> Result<Self> {
        let mut def: StoredDefinition = serde_json::from_str(txt)?;
        def.assign_ids();
        Ok(def)
    }

    pub fn with_class(mut self, class: ClassDefinition) -> Self {
        self.classes.insert(class.name.clone(), class);
        self.assign_ids();
        self
    }

    /// Number every node in post-order, children before parents, starting at
    /// zero. Returns the number of nodes.
    pub fn assign_ids(&mut self) -> usize {
        let mut next = 0;
        for class in self.classes.values_mut() {
            class.number(&mut next);
        }
        self.node_data.id = take_id(&mut next);
        next
    }

    /// Number of nodes in the tree, valid once ids are assigned.
    pub fn node_count(&self) -> usize {
        self.node_data.id + 1
    }
}

fn take_id(next: &mut usize) -> usize {
    let id = *next;
    *next += 1;
    id
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Class Level Nodes

/// A single flattened class: uniquely named symbols and declarative equations.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub name: String,
    #[serde(default)]
    pub symbols: OrderMap<String, Symbol>,
    #[serde(default)]
    pub equations: Vec<Equation>,
    #[serde(skip)]
    pub node_data: NodeData,
}

impl ClassDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbols.insert(symbol.name.clone(), symbol);
        self
    }

    pub fn with_equation(mut self, left: Expression, right: Expression) -> Self {
        self.equations.push(Equation::new(left, right));
        self
    }

    fn number(&mut self, next: &mut usize) {
        for symbol in self.symbols.values_mut() {
            symbol.number(next);
        }
        for eq in self.equations.iter_mut() {
            eq.number(next);
        }
        self.node_data.id = take_id(next);
    }
}

/// Role tag carried by a symbol. A symbol without any prefix is a plain
/// variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prefix {
    State,
    Input,
    Output,
    Constant,
    Parameter,
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Prefix::State => "state",
            Prefix::Input => "input",
            Prefix::Output => "output",
            Prefix::Constant => "constant",
            Prefix::Parameter => "parameter",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Dotted path of the flattened component, e.g. `body.v`.
    pub name: String,
    /// Declaration order, used for every emitted sequence.
    pub order: usize,
    #[serde(default)]
    pub prefixes: BTreeSet<Prefix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Expression>,
    #[serde(skip)]
    pub node_data: NodeData,
}

impl Symbol {
    pub fn new(name: &str, order: usize) -> Self {
        Self {
            name: name.to_string(),
            order,
            ..Default::default()
        }
    }

    pub fn prefixed(mut self, prefix: Prefix) -> Self {
        self.prefixes.insert(prefix);
        self
    }

    pub fn with_value(mut self, value: Expression) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_start(mut self, start: Expression) -> Self {
        self.start = Some(start);
        self
    }

    pub fn is(&self, prefix: Prefix) -> bool {
        self.prefixes.contains(&prefix)
    }

    /// The declared value if present, else the start value.
    pub fn default_value(&self) -> Option<&Expression> {
        self.value.as_ref().or(self.start.as_ref())
    }

    fn number(&mut self, next: &mut usize) {
        if let Some(value) = self.value.as_mut() {
            value.number(next);
        }
        if let Some(start) = self.start.as_mut() {
            start.number(next);
        }
        self.node_data.id = take_id(next);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Equation Nodes

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equation {
    pub left: Expression,
    pub right: Expression,
    #[serde(skip)]
    pub node_data: NodeData,
}

impl Equation {
    pub fn new(left: Expression, right: Expression) -> Self {
        Self {
            left,
            right,
            node_data: NodeData::default(),
        }
    }

    fn number(&mut self, next: &mut usize) {
        self.left.number(next);
        self.right.number(next);
        self.node_data.id = take_id(next);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Expression Nodes

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Primary(Primary),
    ComponentReference(ComponentReference),
    Operation(Operation),
}

impl Default for Expression {
    fn default() -> Self {
        Expression::real(0.0)
    }
}

impl Expression {
    pub fn real(value: f64) -> Self {
        Expression::Primary(Primary::new(Literal::Real(value)))
    }

    pub fn integer(value: i64) -> Self {
        Expression::Primary(Primary::new(Literal::Integer(value)))
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Primary(Primary::new(Literal::Boolean(value)))
    }

    pub fn reference(name: &str) -> Self {
        Expression::ComponentReference(ComponentReference {
            name: name.to_string(),
            node_data: NodeData::default(),
        })
    }

    pub fn op(operator: &str, operands: Vec<Expression>) -> Self {
        Expression::Operation(Operation {
            operator: operator.to_string(),
            operands,
            node_data: NodeData::default(),
        })
    }

    pub fn der(operand: Expression) -> Self {
        Expression::op("der", vec![operand])
    }

    pub fn binary(operator: &str, lhs: Expression, rhs: Expression) -> Self {
        Expression::op(operator, vec![lhs, rhs])
    }

    pub fn unary(operator: &str, operand: Expression) -> Self {
        Expression::op(operator, vec![operand])
    }

    fn number(&mut self, next: &mut usize) {
        match self {
            Expression::Primary(v) => v.node_data.id = take_id(next),
            Expression::ComponentReference(v) => v.node_data.id = take_id(next),
            Expression::Operation(v) => {
                for operand in v.operands.iter_mut() {
                    operand.number(next);
                }
                v.node_data.id = take_id(next);
            }
        }
    }
}

/// A literal leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primary {
    pub value: Literal,
    #[serde(skip)]
    pub node_data: NodeData,
}

impl Primary {
    pub fn new(value: Literal) -> Self {
        Self {
            value,
            node_data: NodeData::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Boolean(true) => write!(f, "True"),
            Literal::Boolean(false) => write!(f, "False"),
            Literal::Integer(v) => write!(f, "{}", v),
            // debug formatting keeps the decimal point, `1.0` rather than `1`
            Literal::Real(v) => write!(f, "{:?}", v),
            Literal::String(v) => write!(f, "{}", v),
        }
    }
}

/// A reference to a symbol of the enclosing class by its dotted name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentReference {
    pub name: String,
    #[serde(skip)]
    pub node_data: NodeData,
}

/// An operator applied to an ordered list of operands: `der`, binary or unary
/// arithmetic, or any named function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub operator: String,
    #[serde(default)]
    pub operands: Vec<Expression>,
    #[serde(skip)]
    pub node_data: NodeData,
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECAY: &str = r#"{
        "classes": {
            "Decay": {
                "name": "Decay",
                "symbols": {
                    "x": {
                        "name": "x",
                        "order": 0,
                        "prefixes": ["state", "state"],
                        "start": { "primary": { "value": 1.0 } }
                    }
                },
                "equations": [
                    {
                        "left": { "operation": { "operator": "der",
                            "operands": [ { "component_reference": { "name": "x" } } ] } },
                        "right": { "operation": { "operator": "-",
                            "operands": [ { "component_reference": { "name": "x" } } ] } }
                    }
                ]
            }
        }
    }"#;

    #[test]
    fn test_from_json() {
        let def = StoredDefinition::from_json(DECAY).expect("failed to load");
        let class = def.classes.get("Decay").expect("Decay class not found");
        let x = class.symbols.get("x").expect("x not found");
        assert_eq!(x.prefixes.len(), 1);
        assert!(x.is(Prefix::State));
        assert!(x.value.is_none());
        assert_eq!(x.default_value(), Some(&Expression::real(1.0)));
        assert_eq!(class.equations.len(), 1);
    }

    #[test]
    fn test_ids_are_dense_and_post_order() {
        let def = StoredDefinition::from_json(DECAY).expect("failed to load");
        // start literal, symbol, ref, der, ref, neg, equation, class, unit
        assert_eq!(def.node_count(), 9);
        let class = &def.classes["Decay"];
        let x = &class.symbols["x"];
        assert_eq!(x.node_data.id, 1);
        assert_eq!(class.equations[0].node_data.id, 6);
        assert_eq!(class.node_data.id, 7);
        assert_eq!(def.node_data.id, 8);
    }

    #[test]
    fn test_builder_matches_json() {
        let built = StoredDefinition::new().with_class(
            ClassDefinition::new("Decay")
                .with_symbol(
                    Symbol::new("x", 0)
                        .prefixed(Prefix::State)
                        .with_start(Expression::real(1.0)),
                )
                .with_equation(
                    Expression::der(Expression::reference("x")),
                    Expression::unary("-", Expression::reference("x")),
                ),
        );
        let loaded = StoredDefinition::from_json(DECAY).expect("failed to load");
        assert_eq!(built, loaded);
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Real(1.0).to_string(), "1.0");
        assert_eq!(Literal::Real(0.25).to_string(), "0.25");
        assert_eq!(Literal::Integer(3).to_string(), "3");
        assert_eq!(Literal::Boolean(true).to_string(), "True");
        assert_eq!(Literal::String("a\"b".to_string()).to_string(), "a\"b");
    }

    #[test]
    fn test_literal_json_kinds() {
        let p: Primary = serde_json::from_str(r#"{ "value": 2 }"#).expect("integer");
        assert_eq!(p.value, Literal::Integer(2));
        let p: Primary = serde_json::from_str(r#"{ "value": 2.5 }"#).expect("real");
        assert_eq!(p.value, Literal::Real(2.5));
        let p: Primary = serde_json::from_str(r#"{ "value": false }"#).expect("boolean");
        assert_eq!(p.value, Literal::Boolean(false));
    }
}
