//! The typed document the generator emits before any text is produced.
//!
//! Every policy decision (group order, which groups get declarations and
//! default maps, how missing defaults show up) is made while building these
//! structures. The template that turns them into text only iterates.

use serde::Serialize;

use super::error::GenerateError;
use super::table::TranslationTable;
use crate::s1_flat::{ClassDefinition, Symbol};
use crate::s2_analyzer::classifier::SymbolGroups;
use crate::s2_analyzer::sanitizer::display_name;
use crate::s2_analyzer::tree::node::Node;

pub const BANNER: &str = "do not edit, generated by flatsym";

/// Capabilities every generated module imports.
pub const IMPORTS: &[&str] = &[
    "from __future__ import print_function, division",
    "import sympy",
    "import sympy.physics.mechanics as mech",
    "from flatsym.runtime import OdeModel",
    "from sympy import sin, cos, tan",
];

pub const TIME_SYMBOL: &str = "t";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitDef {
    pub banner: String,
    pub source_digest: String,
    pub imports: Vec<String>,
    /// One model per class, sorted by class name.
    pub models: Vec<ModelDef>,
}

impl UnitDef {
    pub fn new(source_digest: String, models: Vec<ModelDef>) -> Self {
        Self {
            banner: BANNER.to_string(),
            source_digest,
            imports: IMPORTS.iter().map(|s| s.to_string()).collect(),
            models,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDef {
    pub name: String,
    pub time: String,
    pub groups: Vec<GroupDef>,
    /// Residual equations in declaration order.
    pub equations: Vec<String>,
    /// Dotted names of states, constants, parameters and inputs that have
    /// neither a value nor a start value.
    pub missing_defaults: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    States,
    Variables,
    Constants,
    Parameters,
    Inputs,
    Outputs,
}

impl GroupKind {
    pub const EMISSION_ORDER: [GroupKind; 6] = [
        GroupKind::States,
        GroupKind::Variables,
        GroupKind::Constants,
        GroupKind::Parameters,
        GroupKind::Inputs,
        GroupKind::Outputs,
    ];

    /// Attribute of the model object holding the group's vector.
    pub fn attr(&self) -> &'static str {
        match self {
            GroupKind::States => "x",
            GroupKind::Variables => "v",
            GroupKind::Constants => "c",
            GroupKind::Parameters => "p",
            GroupKind::Inputs => "u",
            GroupKind::Outputs => "y",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GroupKind::States => "states",
            GroupKind::Variables => "variables",
            GroupKind::Constants => "constants",
            GroupKind::Parameters => "parameters",
            GroupKind::Inputs => "inputs",
            GroupKind::Outputs => "outputs",
        }
    }

    /// Whether the group's symbols vary with time.
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, GroupKind::Constants | GroupKind::Parameters)
    }

    pub fn constructor(&self) -> &'static str {
        if self.is_dynamic() {
            "mech.dynamicsymbols"
        } else {
            "sympy.symbols"
        }
    }

    pub fn has_defaults(&self) -> bool {
        !matches!(self, GroupKind::Variables | GroupKind::Outputs)
    }

    pub fn select<'g, 'a>(&self, groups: &'g SymbolGroups<'a>) -> &'g [&'a Symbol] {
        match self {
            GroupKind::States => &groups.states,
            GroupKind::Variables => &groups.variables,
            GroupKind::Constants => &groups.constants,
            GroupKind::Parameters => &groups.parameters,
            GroupKind::Inputs => &groups.inputs,
            GroupKind::Outputs => &groups.outputs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDef {
    pub kind: GroupKind,
    pub label: String,
    pub attr: String,
    /// Absent for an empty group.
    pub declaration: Option<Declaration>,
    pub members: Vec<String>,
    pub has_defaults: bool,
    pub defaults: Vec<DefaultEntry>,
    /// Members without a default, left out of `defaults`.
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    pub targets: String,
    pub constructor: String,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultEntry {
    pub key: String,
    pub value: String,
}

fn fragment(table: &TranslationTable, id: usize) -> Result<String, GenerateError> {
    table
        .get(id)
        .map(str::to_string)
        .ok_or(GenerateError::MissingFragment(id))
}

impl GroupDef {
    pub fn new(
        kind: GroupKind,
        symbols: &[&Symbol],
        table: &TranslationTable,
    ) -> Result<Self, GenerateError> {
        let members = symbols
            .iter()
            .map(|s| fragment(table, s.id()))
            .collect::<Result<Vec<String>, GenerateError>>()?;

        let declaration = if members.is_empty() {
            None
        } else {
            let targets = members.join(", ");
            Some(Declaration {
                display: display_name(&targets),
                targets,
                constructor: kind.constructor().to_string(),
            })
        };

        let mut defaults = Vec::new();
        let mut missing = Vec::new();
        if kind.has_defaults() {
            for (s, key) in symbols.iter().zip(members.iter()) {
                match s.default_value() {
                    Some(value) => defaults.push(DefaultEntry {
                        key: key.clone(),
                        value: fragment(table, value.id())?,
                    }),
                    None => missing.push(s.name.clone()),
                }
            }
        }

        Ok(Self {
            kind,
            label: kind.label().to_string(),
            attr: kind.attr().to_string(),
            declaration,
            members,
            has_defaults: kind.has_defaults(),
            defaults,
            missing,
        })
    }
}

impl ModelDef {
    pub fn from_class(
        class: &ClassDefinition,
        groups: &SymbolGroups,
        table: &TranslationTable,
    ) -> Result<Self, GenerateError> {
        let groups = GroupKind::EMISSION_ORDER
            .iter()
            .map(|kind| GroupDef::new(*kind, kind.select(groups), table))
            .collect::<Result<Vec<GroupDef>, GenerateError>>()?;
        let equations = class
            .equations
            .iter()
            .map(|eq| fragment(table, eq.id()))
            .collect::<Result<Vec<String>, GenerateError>>()?;
        let missing_defaults = groups
            .iter()
            .flat_map(|g| g.missing.iter().cloned())
            .collect();
        Ok(Self {
            name: class.name.clone(),
            time: TIME_SYMBOL.to_string(),
            groups,
            equations,
            missing_defaults,
        })
    }

    pub fn group(&self, kind: GroupKind) -> Option<&GroupDef> {
        self.groups.iter().find(|g| g.kind == kind)
    }
}
