use anyhow::Result;
use minijinja::{context, Environment};

use super::error::GenerateError;
use super::model_def::UnitDef;
use super::sympy_generator::SympyGenerator;
use super::table::TranslationTable;
use crate::s1_flat::StoredDefinition;
use crate::s2_analyzer::tree::node::Visitable;

/// Template used when no user template is given.
pub const SYMPY_TEMPLATE: &str = include_str!("templates/sympy.py.jinja");

/// Copy of the tree with classes sorted by name and symbols by `order`, so
/// map insertion order does not reach the output.
fn canonical(def: &StoredDefinition) -> StoredDefinition {
    let mut def = def.clone();
    def.classes.sort_keys();
    for class in def.classes.values_mut() {
        class
            .symbols
            .sort_by(|_, a, _, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
    }
    def
}

/// Hex md5 digest of the serialized flat tree in canonical order.
pub fn source_digest(def: &StoredDefinition) -> Result<String> {
    let txt = serde_json::to_string(&canonical(def))?;
    Ok(format!("{:x}", md5::compute(txt)))
}

/// Translate every class of the flat tree into a typed unit document.
///
/// Works on a renumbered copy, so the ids of `def` do not need to be
/// current.
pub fn build_unit(def: &StoredDefinition) -> Result<(UnitDef, TranslationTable)> {
    let mut def = def.clone();
    let node_count = def.assign_ids();
    let digest = source_digest(&def)?;
    log::debug!("translating {} nodes, source digest {}", node_count, digest);

    let mut generator = SympyGenerator::new(node_count, digest);
    def.accept(&mut generator, None);

    if let Some((first, rest)) = generator.errors.split_first() {
        for err in rest {
            log::error!("{}", err);
        }
        return Err(first.clone().into());
    }
    let unit = generator
        .unit
        .ok_or(GenerateError::MissingFragment(def.node_data.id))?;
    Ok((unit, generator.src))
}

/// Render a unit with the built-in template, or with the template file at
/// `template_file`.
pub fn render_unit(unit: &UnitDef, template_file: Option<&str>) -> Result<String> {
    let template_txt = match template_file {
        Some(path) => std::fs::read_to_string(path)?,
        None => SYMPY_TEMPLATE.to_string(),
    };
    let mut env = Environment::new();
    env.add_template("template", &template_txt)?;
    let tmpl = env.get_template("template")?;
    let txt = tmpl.render(context!(unit => unit))?;
    Ok(txt)
}

/// Generate the Python source of the unit containing `model_name`.
pub fn generate(
    def: &StoredDefinition,
    model_name: &str,
    template_file: Option<&str>,
) -> Result<String> {
    if !def.classes.contains_key(model_name) {
        return Err(GenerateError::UnknownModel(model_name.to_string()).into());
    }
    let (unit, _) = build_unit(def)?;
    render_unit(&unit, template_file)
}
