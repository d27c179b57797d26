mod ledger;
mod repository;
mod root;

pub use ledger::*;
pub use root::*;
