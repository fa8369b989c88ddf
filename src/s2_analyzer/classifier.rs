//! Partitioning the symbols of a flat class by role.
//!
//! Every symbol goes into the group of each prefix it carries, symbols without
//! prefixes are variables. Outputs that are not states additionally get a
//! variable slot after the plain variables, so an algebraic output is always
//! solved for.

use crate::s1_flat::{Prefix, Symbol};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SymbolGroups<'a> {
    pub states: Vec<&'a Symbol>,
    pub inputs: Vec<&'a Symbol>,
    pub outputs: Vec<&'a Symbol>,
    pub constants: Vec<&'a Symbol>,
    pub parameters: Vec<&'a Symbol>,
    pub variables: Vec<&'a Symbol>,
}

impl<'a> SymbolGroups<'a> {
    fn group_mut(&mut self, prefix: Prefix) -> &mut Vec<&'a Symbol> {
        match prefix {
            Prefix::State => &mut self.states,
            Prefix::Input => &mut self.inputs,
            Prefix::Output => &mut self.outputs,
            Prefix::Constant => &mut self.constants,
            Prefix::Parameter => &mut self.parameters,
        }
    }
}

/// Classify symbols, each group in declaration `order`. Non-state outputs are
/// appended to the variables.
pub fn classify<'a, I>(symbols: I) -> SymbolGroups<'a>
where
    I: IntoIterator<Item = &'a Symbol>,
{
    let mut sorted: Vec<&Symbol> = symbols.into_iter().collect();
    sorted.sort_by_key(|s| s.order);

    let mut groups = SymbolGroups::default();
    for s in sorted {
        if s.prefixes.is_empty() {
            groups.variables.push(s);
        } else {
            for prefix in &s.prefixes {
                groups.group_mut(*prefix).push(s);
            }
        }
    }

    let extra: Vec<&Symbol> = groups
        .outputs
        .iter()
        .filter(|s| !s.is(Prefix::State))
        .copied()
        .collect();
    // appended after every plain variable, each part in declaration order
    groups.variables.extend(extra);

    log::debug!(
        "classified {} states, {} inputs, {} outputs, {} constants, {} parameters, {} variables",
        groups.states.len(),
        groups.inputs.len(),
        groups.outputs.len(),
        groups.constants.len(),
        groups.parameters.len(),
        groups.variables.len()
    );
    groups
}
