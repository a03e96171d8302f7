pub mod error;
pub mod flow_encoding;
pub mod protocol;
pub mod scan_plan;

pub use error::PlanError;
