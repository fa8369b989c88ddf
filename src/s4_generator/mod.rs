//! Generation of Python modules from flat trees.
//!
//! A single post-order walk fills a [`TranslationTable`] and builds a typed
//! [`UnitDef`], which is then rendered through a minijinja template.

pub mod error;
pub mod generator;
pub mod model_def;
pub mod sympy_generator;
pub mod table;
pub mod translator;


pub use error::GenerateError;
pub use generator::{build_unit, generate, render_unit, source_digest};
pub use model_def::{GroupKind, ModelDef, UnitDef};
pub use table::TranslationTable;
