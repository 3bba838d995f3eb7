mod error;
mod heuristic;
mod opt;
mod runs;
mod topology;

pub mod chart;
pub mod format;
pub mod map;
pub mod table;

#[cfg(test)]
mod tests;

pub use error::*;
pub use heuristic::*;
pub use opt::*;
pub use runs::*;
pub use topology::*;
