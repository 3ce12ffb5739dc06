//! Safe SQL builder: identifiers validated against allow-lists, values as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
