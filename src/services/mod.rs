//! Engine services

pub mod geo;
pub mod routing;
pub mod solver;
