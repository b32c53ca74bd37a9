//! Sparse epoch tables and the policies that map a timeline position onto them.

pub mod label;
pub mod manifest;
pub mod preset;
pub mod resolver;
pub mod slider;
pub mod table;

pub use label::*;
pub use manifest::*;
pub use preset::*;
pub use resolver::*;
pub use slider::*;
pub use table::*;
