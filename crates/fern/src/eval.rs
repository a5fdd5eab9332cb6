//! The evaluator.
//!
//! One loop over an expression register and an environment register.
//! Tail positions (`if` arms, the last `begin` step, a lambda body)
//! update the registers and continue the loop, so tail calls cost no
//! host stack. Non-tail positions (predicates, earlier `begin` steps,
//! argument expressions) recurse; their depth is bounded by the nesting
//! of those constructs in the program text.
//!
//! The evaluator expects core forms (see the expander); surface sugar
//! that was never expanded shows up here as an ordinary application and
//! fails accordingly.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::list::ListBuilder;
use crate::object;
use crate::value::Value;

impl Context {
    /// Evaluate an expression against an environment.
    ///
    /// The environment is a frame chain as produced by
    /// [`Context::global_env`] or [`Context::env_extend`].
    pub fn eval(&mut self, expr: Value, env: Value) -> Result<Value> {
        self.eval_expr(expr, env)
    }

    fn eval_expr(&mut self, mut expr: Value, mut env: Value) -> Result<Value> {
        loop {
            match expr {
                // self-evaluating
                Value::Null
                | Value::Int(_)
                | Value::Float(_)
                | Value::String(_)
                | Value::Lambda(_) => return Ok(expr),

                // variable reference
                Value::Symbol(_) => {
                    let entry = self.env_lookup(env, expr);
                    if entry.is_null() {
                        log::warn!("cannot find variable: {}", self.display(expr));
                        return Err(Error::UnknownVar);
                    }
                    return Ok(self.cdr(entry));
                }

                Value::Pair(_) => {
                    let op = self.car(expr);
                    if self.symbol_is(op, b"IF") {
                        let predicate = self.at_index(expr, 1);
                        let conseq = self.at_index(expr, 2);
                        let alt = self.at_index(expr, 3);
                        let test = self.eval_expr(predicate, env)?;
                        // a missing alternative arm is null, which
                        // self-evaluates to null
                        expr = if test.as_int() != 0 { conseq } else { alt };
                    } else if self.symbol_is(op, b"BEGIN") {
                        let mut it = self.cdr(expr);
                        if it.is_null() {
                            return Ok(it);
                        }
                        // evaluate all but the last in order
                        while !self.cdr(it).is_null() {
                            let step = self.car(it);
                            self.eval_expr(step, env)?;
                            it = self.cdr(it);
                        }
                        expr = self.car(it);
                    } else if self.symbol_is(op, b"QUOTE") {
                        return Ok(self.at_index(expr, 1));
                    } else if self.symbol_is(op, b"DEFINE") {
                        let symbol = self.at_index(expr, 1);
                        let value_expr = self.at_index(expr, 2);
                        let value = self.eval_expr(value_expr, env)?;
                        self.env_define(env, symbol, value)?;
                        return Ok(Value::Null);
                    } else if self.symbol_is(op, b"SET!") {
                        let symbol = self.at_index(expr, 1);
                        let value_expr = self.at_index(expr, 2);
                        let value = self.eval_expr(value_expr, env)?;
                        self.env_set(env, symbol, value);
                        return Ok(Value::Null);
                    } else if self.symbol_is(op, b"LAMBDA") {
                        let args = self.at_index(expr, 1);
                        let body = self.at_index(expr, 2);
                        return Ok(self.make_lambda(args, body, env));
                    } else {
                        // application: operator first, then arguments
                        // left to right
                        let operator = self.eval_expr(op, env)?;
                        let mut args = ListBuilder::new();
                        let mut it = self.cdr(expr);
                        while !it.is_null() {
                            let arg_expr = self.car(it);
                            let arg = self.eval_expr(arg_expr, env)?;
                            args.push(self, arg);
                            it = self.cdr(it);
                        }
                        let args = args.finish();

                        match operator {
                            Value::Lambda(block) => {
                                let parts = object::lambda_parts(&self.heap, block);
                                let frame = self.make_table(self.config.frame_capacity);
                                // bind formals to actuals positionally;
                                // missing actuals bind null
                                let mut keys = parts.args;
                                let mut vals = args;
                                while keys.is_pair() {
                                    let key = self.car(keys);
                                    let val = self.car(vals);
                                    self.table_set(frame, key, val)?;
                                    keys = self.cdr(keys);
                                    vals = self.cdr(vals);
                                }
                                env = self.env_extend(parts.env, frame);
                                expr = parts.body;
                            }
                            Value::Func(index) => {
                                let func = self
                                    .primitives
                                    .get(index as usize)
                                    .copied()
                                    .ok_or(Error::BadOp)?;
                                return func(args, self);
                            }
                            _ => {
                                log::warn!(
                                    "apply error: not an operator: {}",
                                    self.display(operator)
                                );
                                return Err(Error::BadOp);
                            }
                        }
                    }
                }

                Value::Func(_) | Value::Table(_) => return Err(Error::UnknownEval),
            }
        }
    }
}
