use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("scope is empty")]
    EmptyScope,
    #[error("variable {0:?} is not present in this scope")]
    VariableNotInScope(crate::var::VarId),
    #[error("box and scope sizes disagree: box has {box_len} slots, scope has {scope_len} variables")]
    BoxScopeMismatch { box_len: usize, scope_len: usize },
    #[error("domain is empty, cannot compute {0}")]
    EmptyDomain(&'static str),
}

pub type ModelResult<T> = Result<T, ModelError>;
