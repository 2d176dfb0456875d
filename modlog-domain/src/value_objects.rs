// Domain value objects
pub mod action;
pub mod identifiers;

pub use action::*;
pub use identifiers::*;
