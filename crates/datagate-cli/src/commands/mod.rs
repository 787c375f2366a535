//! CLI command implementations for datagate.

pub mod aggregate;
pub mod check;
pub mod describe;
pub mod tools;
