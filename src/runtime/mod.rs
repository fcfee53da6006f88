//! # Runtime Module
//!
//! Runtime components for the rotation job: initialization, the rotation run
//! itself, and fatal error reporting.

pub mod error_policy;
pub mod initialization;
pub mod rotation;

pub use error_policy::*;
pub use initialization::*;
pub use rotation::*;
