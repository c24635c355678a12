//! Subcommand modules for the `gcalign` binary.

pub mod align;
pub mod matrix;
pub mod order;
pub mod show;
