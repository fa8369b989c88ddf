use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error("model '{0}' is not a class of the flat tree")]
    UnknownModel(String),
    #[error("class '{class}' references undeclared symbol '{name}'")]
    UnresolvedReference { class: String, name: String },
    #[error("node {0} has no translation")]
    MissingFragment(usize),
    #[error("node {0} was translated twice")]
    Retranslated(usize),
}
