// Domain model: source trees, comparison and diagnostics.

pub mod ast;
pub mod equivalence;
pub mod error;
pub mod report;
pub mod source_file;
