use crate::s1_flat as node;
use crate::s1_flat::NodeData;
use paste::paste;

pub trait Node {
    fn children(&self) -> Vec<NodeRef> {
        Vec::new()
    }
    fn node_data(&self) -> &NodeData;
    fn id(&self) -> usize {
        self.node_data().id
    }
}

macro_rules! node_data_impl_basic {
    () => {
        fn node_data(&self) -> &NodeData {
            &self.node_data
        }
    };
}

macro_rules! node_macros {
    ($($name:ident),*) => {
        paste! {

            pub trait Visitable {
                fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V, parent: Option<usize>);
            }

            #[derive(Clone, Debug, PartialEq, Default)]
            pub enum NodeRef<'a> {
                #[default]
                Empty,
                $(
                    $name(&'a node::$name),
                )*
            }

            impl <'a> NodeRef<'a> {
                /// Id of the referenced node, `None` for the empty reference.
                pub fn try_id(&self) -> Option<usize> {
                    match self {
                        NodeRef::Empty => None,
                        $(
                            NodeRef::$name(node) => Some(node.id()),
                        )*
                    }
                }
            }

            impl <'a> Node for NodeRef<'a> {

                fn node_data(&self) -> &NodeData {
                    match self {
                        NodeRef::Empty => panic!("empty node"),
                        $(
                            NodeRef::$name(node) => node.node_data(),
                        )*
                    }
                }

                fn children(&self) -> Vec<NodeRef> {
                    match self {
                        NodeRef::Empty => vec![],
                        $(
                            NodeRef::$name(node) => node.children(),
                        )*
                    }
                }
            }

            $(
                impl <'a> From<&'a node::$name> for NodeRef<'a> {
                    fn from(value: &'a node::$name) -> Self {
                        NodeRef::$name(value)
                    }
                }
            )*

            $(
                impl Visitable for node::$name {
                    fn accept<V: Visitor + ?Sized>(& self, visitor: &mut V, parent_id: Option<usize>) {
                        visitor.enter_any(NodeRef::$name(self), parent_id);
                        visitor.[<enter_ $name:snake>](self, parent_id);
                        let own_id = Some(self.node_data().id);
                        let children = self.children();
                        children.iter().for_each(|child| child.accept(visitor, own_id));
                        visitor.[<exit_ $name:snake>](self, parent_id);
                        visitor.exit_any(NodeRef::$name(self), parent_id)
                    }
                }
            )*

            impl <'a> Visitable for NodeRef<'a> {
                fn accept<V: Visitor + ?Sized>(& self, visitor: &mut V, parent_id: Option<usize>) {
                    match self {
                        $(
                            NodeRef::$name(node) => node.accept(visitor, parent_id),
                        )*
                        NodeRef::Empty => {},
                    }
                }
            }

            #[allow(unused_variables)]
            pub trait Visitor {
                fn enter_any(&mut self, n: NodeRef, parent_id: Option<usize>) {}
                fn exit_any(&mut self, n: NodeRef, parent_id: Option<usize>) {}
                $(
                    fn [<enter_ $name:snake>](&mut self, n: & node::$name, parent_id: Option<usize>) {}
                    fn [<exit_ $name:snake>](&mut self, n: & node::$name, parent_id: Option<usize>) {}
                )*
            }
        }
    };
}

node_macros!(
    // File Level Nodes
    StoredDefinition,
    // Class Level Nodes
    ClassDefinition,
    Symbol,
    // Equations
    Equation,
    // Expressions
    Expression,
    Operation,
    Primary,
    ComponentReference
);

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// File Level Nodes

impl Node for node::StoredDefinition {
    fn children(&self) -> Vec<NodeRef> {
        self.classes.values().map(|v| v.into()).collect()
    }
    node_data_impl_basic!();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Class Level Nodes

impl Node for node::ClassDefinition {
    fn children(&self) -> Vec<NodeRef> {
        self.symbols
            .values()
            .map(|sym| sym.into())
            .chain(self.equations.iter().map(|eq| eq.into()))
            .collect()
    }
    node_data_impl_basic!();
}

impl Node for node::Symbol {
    fn children(&self) -> Vec<NodeRef> {
        self.value
            .iter()
            .chain(self.start.iter())
            .map(|expr| expr.into())
            .collect()
    }
    node_data_impl_basic!();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Equation Nodes

impl Node for node::Equation {
    fn children(&self) -> Vec<NodeRef> {
        vec![(&self.left).into(), (&self.right).into()]
    }
    node_data_impl_basic!();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Expression Nodes

impl Node for node::Expression {
    fn children(&self) -> Vec<NodeRef> {
        match &self {
            node::Expression::Primary(v) => vec![v.into()],
            node::Expression::ComponentReference(v) => vec![v.into()],
            node::Expression::Operation(v) => vec![v.into()],
        }
    }
    fn node_data(&self) -> &NodeData {
        match &self {
            node::Expression::Primary(v) => v.node_data(),
            node::Expression::ComponentReference(v) => v.node_data(),
            node::Expression::Operation(v) => v.node_data(),
        }
    }
}

impl Node for node::Operation {
    fn children(&self) -> Vec<NodeRef> {
        self.operands.iter().map(|operand| operand.into()).collect()
    }
    node_data_impl_basic!();
}

impl Node for node::Primary {
    node_data_impl_basic!();
}

impl Node for node::ComponentReference {
    node_data_impl_basic!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s1_flat::{ClassDefinition, Expression, Prefix, StoredDefinition, Symbol};

    /// Records the order in which exit hooks fire.
    #[derive(Default)]
    struct ExitOrder {
        ids: Vec<usize>,
        depth: usize,
    }

    impl Visitor for ExitOrder {
        fn enter_any(&mut self, _n: NodeRef, _parent_id: Option<usize>) {
            self.depth += 1;
        }

        fn exit_any(&mut self, n: NodeRef, _parent_id: Option<usize>) {
            self.depth -= 1;
            // an expression wrapper shares the id of the node it wraps
            if !matches!(n, NodeRef::Expression(_)) {
                self.ids.push(n.id());
            }
        }
    }

    #[test]
    fn test_exit_hooks_are_post_order() {
        let def = StoredDefinition::new().with_class(
            ClassDefinition::new("M")
                .with_symbol(Symbol::new("x", 0).prefixed(Prefix::State))
                .with_equation(
                    Expression::der(Expression::reference("x")),
                    Expression::real(1.0),
                ),
        );
        let mut visitor = ExitOrder::default();
        def.accept(&mut visitor, None);

        // ids are numbered post-order, so exits come out sorted
        let expected: Vec<usize> = (0..def.node_count()).collect();
        assert_eq!(visitor.ids, expected);
        assert_eq!(visitor.depth, 0);
    }

    #[test]
    fn test_symbol_children() {
        let sym = Symbol::new("k", 0)
            .with_value(Expression::real(2.0))
            .with_start(Expression::real(3.0));
        assert_eq!(sym.children().len(), 2);
        assert!(Symbol::new("k", 0).children().is_empty());
        assert_eq!(NodeRef::Empty.try_id(), None);
    }
}
