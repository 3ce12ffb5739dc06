//! HTTP handlers for entity listing and reads.

pub mod entity;
pub use entity::*;
