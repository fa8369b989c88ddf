//! Analysis of the flat tree: traversal, identifier sanitizing and symbol
//! classification.

pub mod classifier;
pub mod sanitizer;
pub mod tree;
