//! Domain models for the dental records system.

mod visit;

pub use visit::*;
