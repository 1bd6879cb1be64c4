//! Schema module - Parameter spaces, configuration, and evolution records.

mod config;
mod evolution;
mod space;

pub use config::*;
pub use evolution::*;
pub use space::*;
