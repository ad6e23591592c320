pub mod keywords;
pub mod ledger;

pub use keywords::*;
pub use ledger::*;
