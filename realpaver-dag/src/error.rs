use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DagError {
    #[error("node index {0} is out of range")]
    BadNodeIndex(usize),
    #[error("function has no root node")]
    NoRoot,
    #[error("Pow exponent {0} is not supported (must be nonzero)")]
    BadExponent(i32),
    #[error("attempted to relax a non-equality constraint")]
    RelaxNonEquality,
    #[error("relaxation parameter must be positive, got {0}")]
    NonPositiveRelaxation(f64),
}

pub type DagResult<T> = Result<T, DagError>;
