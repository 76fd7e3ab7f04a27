//! Domain models for lab request intake.

mod lab;
mod patient;

pub use lab::*;
pub use patient::*;
