//! Walking the flat tree: one enter/exit hook per node type, exits in post-order.

pub mod node;
pub mod repr_visitor;
