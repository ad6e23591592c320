pub mod input;
pub mod metrics;
pub mod output;
pub mod pdf;

#[cfg(test)]
pub(crate) mod fixtures;

pub use input::*;
pub use output::*;
pub use pdf::{PageGeometry, ReportLayout};
