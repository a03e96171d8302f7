use thiserror::Error;
use cs_table::CsError;
use seq_tools::GradientError;

/// Any failure aborts the whole plan build; nothing partial is returned.
#[derive(Error,Debug)]
pub enum PlanError {
    #[error(transparent)]
    Mask(#[from] CsError),

    #[error(transparent)]
    Gradient(#[from] GradientError),

    #[error("encoding configuration error: {0}")]
    EncodingConfiguration(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type PlanResult<T> = Result<T,PlanError>;
