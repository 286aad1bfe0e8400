use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContractorError {
    #[error(transparent)]
    Dag(#[from] realpaver_dag::DagError),
    #[error("slicer requires at least 2 parts, got {0}")]
    BadSliceCount(u32),
    #[error("peel factor must be in (0, 100), got {0}")]
    BadPeelFactor(f64),
    #[error("empty scope is not a valid contractor scope")]
    EmptyScope,
}

pub type ContractorResult<T> = Result<T, ContractorError>;
