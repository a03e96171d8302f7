use thiserror::Error;

#[derive(Error,Debug,Clone,PartialEq)]
pub enum CsError {
    /// Grid or acceleration parameters that no mask can satisfy.
    #[error("parameter error: {0}")]
    Parameter(String),

    /// Random draws requested from a density with too little support.
    #[error("sampling error: {0}")]
    Sampling(String),

    /// A reordering policy changed the set of acquisitions instead of permuting it.
    #[error("reordering policy violation: {0}")]
    PolicyViolation(String),
}

pub type CsResult<T> = Result<T,CsError>;
