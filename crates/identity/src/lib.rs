mod repository;
mod root;

pub use root::*;
