//! Command implementations for the fernt CLI.

pub mod parse;
pub mod repl;
pub mod run;

pub use parse::run_parse;
pub use repl::run_repl;
pub use run::{run_eval, run_script};
