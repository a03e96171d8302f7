pub mod error;
pub mod grad_cal;
pub mod system_limits;
pub mod venc;
pub mod pulse;
pub mod gradient_event;
pub mod utils;

pub use error::GradientError;
