//! Read and expand a file without evaluating it.

use std::path::Path;

use crate::config::Config;
use crate::error::Result;

/// Print the expanded core-form tree of a program.
///
/// Uses a reader-only context: no primitives are installed, which is
/// all that reading and expansion need.
pub fn run_parse(path: &Path, config: &Config) -> Result<()> {
    tracing::debug!("parsing {}", path.display());
    let mut ctx = fern::Context::reader(config.interpreter_config());
    let program = ctx.read_path(path)?;
    let program = ctx.expand(program)?;
    println!("{}", ctx.display(program));
    Ok(())
}
