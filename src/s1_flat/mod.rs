//! The flat model tree consumed by the analyzer and generator stages.
//!
//! A flattening pass (not part of this crate) resolves the hierarchical model
//! description into a single scope per class and hands it over as JSON. This
//! module deserializes that tree and assigns every node a dense integer id, so
//! that later stages can keep per-node data in parallel tables instead of
//! keying on object identity.

pub mod ast;

pub use ast::*;
