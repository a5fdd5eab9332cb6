//! The interactive read-expand-eval loop.

use std::io::{self, BufRead, Write};

use fern::{Context, Value};

use crate::config::Config;
use crate::error::Result;

/// Run the REPL until end of input.
///
/// Each line is read, expanded, evaluated, and printed. The heap is
/// collected between inputs; the globals survive as implicit collection
/// roots, so definitions persist across lines.
pub fn run_repl(config: &Config) -> Result<()> {
    tracing::debug!("starting interactive session");
    let mut ctx = fern::init_with_config(config.interpreter_config());
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}", config.prompt);
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match eval_line(&mut ctx, text) {
            Ok(value) => {
                println!("{}", ctx.display(value));
                ctx.collect(Value::Null);
            }
            Err(err) => eprintln!("error: {err}"),
        }
    }
    Ok(())
}

fn eval_line(ctx: &mut Context, text: &str) -> fern::Result<Value> {
    let value = ctx.read(text)?;
    let value = ctx.expand(value)?;
    let env = ctx.global_env();
    ctx.eval(value, env)
}
