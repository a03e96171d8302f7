use thiserror::Error;

#[derive(Error,Debug,Clone,PartialEq)]
pub enum GradientError {
    /// A moment or event that cannot be realized within the hardware limits,
    /// or limits that cannot describe real hardware.
    #[error("gradient limit error: {0}")]
    Limit(String),
}

pub type GradientResult<T> = Result<T,GradientError>;
