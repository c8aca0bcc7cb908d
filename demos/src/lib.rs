//! Shared setup for the candela demo programs.
pub mod common;
