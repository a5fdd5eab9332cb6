//! Evaluate a script file or a single expression.

use std::path::Path;

use crate::config::Config;
use crate::error::Result;

/// Evaluate a script file and print its result (unless null).
pub fn run_script(path: &Path, config: &Config) -> Result<()> {
    tracing::debug!("evaluating script {}", path.display());
    let mut ctx = fern::init_with_config(config.interpreter_config());
    let program = ctx.read_path(path)?;
    let program = ctx.expand(program)?;
    let env = ctx.global_env();
    let result = ctx.eval(program, env)?;
    if !result.is_null() {
        println!("{}", ctx.display(result));
    }
    Ok(())
}

/// Evaluate one expression from the command line and print its result.
pub fn run_eval(text: &str, config: &Config) -> Result<()> {
    let mut ctx = fern::init_with_config(config.interpreter_config());
    let program = ctx.read(text)?;
    let program = ctx.expand(program)?;
    let env = ctx.global_env();
    let result = ctx.eval(program, env)?;
    println!("{}", ctx.display(result));
    Ok(())
}
