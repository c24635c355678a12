//! Gene cluster alignment, synteny scoring and cluster ordering.

pub mod libs;

pub use crate::libs::io::*;
