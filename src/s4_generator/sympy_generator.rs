use std::collections::{HashMap, HashSet};

use super::error::GenerateError;
use super::model_def::{ModelDef, UnitDef};
use super::table::TranslationTable;
use super::translator::{render_equation, render_operation, render_primary};
use crate::s1_flat as node;
use crate::s2_analyzer::classifier::classify;
use crate::s2_analyzer::sanitizer::sanitize;
use crate::s2_analyzer::tree::node::{Node, Visitor};

struct ClassScope {
    name: String,
    symbols: HashSet<String>,
}

/// Translates a flat tree in one post-order walk: fragments for expressions,
/// symbols and equations go to the translation table, each class becomes a
/// [`ModelDef`] and the whole tree a [`UnitDef`].
pub struct SympyGenerator {
    pub src: TranslationTable,
    pub models: HashMap<usize, ModelDef>,
    pub unit: Option<UnitDef>,
    pub errors: Vec<GenerateError>,
    source_digest: String,
    scope: Option<ClassScope>,
}

impl SympyGenerator {
    pub fn new(node_count: usize, source_digest: String) -> Self {
        Self {
            src: TranslationTable::with_capacity(node_count),
            models: HashMap::new(),
            unit: None,
            errors: Vec::new(),
            source_digest,
            scope: None,
        }
    }

    fn emit(&mut self, id: usize, fragment: String) {
        if !self.src.insert(id, fragment) {
            self.errors.push(GenerateError::Retranslated(id));
        }
    }

    fn fragment(&mut self, id: usize) -> String {
        match self.src.get(id) {
            Some(s) => s.to_string(),
            None => {
                self.errors.push(GenerateError::MissingFragment(id));
                String::new()
            }
        }
    }
}

impl Visitor for SympyGenerator {
    fn exit_stored_definition(&mut self, n: &node::StoredDefinition, _parent_id: Option<usize>) {
        let mut keys: Vec<&String> = n.classes.keys().collect();
        keys.sort();
        let models = keys
            .into_iter()
            .filter_map(|key| n.classes.get(key))
            .filter_map(|class| self.models.get(&class.id()).cloned())
            .collect();
        self.unit = Some(UnitDef::new(self.source_digest.clone(), models));
    }

    fn enter_class_definition(&mut self, n: &node::ClassDefinition, _parent_id: Option<usize>) {
        self.scope = Some(ClassScope {
            name: n.name.clone(),
            symbols: n.symbols.keys().cloned().collect(),
        });
    }

    fn exit_class_definition(&mut self, n: &node::ClassDefinition, _parent_id: Option<usize>) {
        let groups = classify(n.symbols.values());
        match ModelDef::from_class(n, &groups, &self.src) {
            Ok(model) => {
                for name in &model.missing_defaults {
                    log::warn!("{}: '{}' has neither a value nor a start value", n.name, name);
                }
                self.models.insert(n.id(), model);
            }
            Err(err) => self.errors.push(err),
        }
        self.scope = None;
    }

    fn exit_symbol(&mut self, n: &node::Symbol, _parent_id: Option<usize>) {
        self.emit(n.id(), sanitize(&n.name));
    }

    fn exit_equation(&mut self, n: &node::Equation, _parent_id: Option<usize>) {
        let left = self.fragment(n.left.id());
        let right = self.fragment(n.right.id());
        self.emit(n.id(), render_equation(&left, &right));
    }

    fn exit_operation(&mut self, n: &node::Operation, _parent_id: Option<usize>) {
        let operands: Vec<String> = n.operands.iter().map(|o| self.fragment(o.id())).collect();
        let operands: Vec<&str> = operands.iter().map(String::as_str).collect();
        self.emit(n.id(), render_operation(&n.operator, &operands));
    }

    fn exit_primary(&mut self, n: &node::Primary, _parent_id: Option<usize>) {
        self.emit(n.id(), render_primary(&n.value));
    }

    fn exit_component_reference(
        &mut self,
        n: &node::ComponentReference,
        _parent_id: Option<usize>,
    ) {
        if let Some(scope) = &self.scope {
            if !scope.symbols.contains(&n.name) {
                self.errors.push(GenerateError::UnresolvedReference {
                    class: scope.name.clone(),
                    name: n.name.clone(),
                });
            }
        }
        self.emit(n.id(), sanitize(&n.name));
    }
}
