// Utility functions
pub mod error;
pub mod validation;
pub mod verification_code;

pub use error::*;
pub use verification_code::*;
