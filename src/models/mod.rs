pub mod document;
pub mod report;
pub mod transaction;

pub use document::*;
pub use report::*;
pub use transaction::*;
