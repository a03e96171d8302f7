pub mod error;
pub mod mask;
pub mod recar;
pub mod cs_table;

pub use error::CsError;
