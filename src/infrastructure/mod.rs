// Infrastructure implementations for srcequiv.

pub mod concurrency;
pub mod config;
pub mod failure;
pub mod loader;
pub mod syn_parser;

pub use failure::{HardFailure, VerifyingFailure};
pub use syn_parser::SynSourceParser;
