//! Type definitions

pub mod geo;
pub mod progress;
pub mod stop;
pub mod vehicle;

pub use geo::*;
pub use progress::*;
pub use stop::*;
pub use vehicle::*;
