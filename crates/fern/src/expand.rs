//! The expander: surface syntax to core forms.
//!
//! Lowers `cond`, `and`, `or`, `let`, function-form `define`, and
//! multi-expression `lambda` bodies so that the evaluator only ever
//! sees `quote`, `if`, `define`, `set!`, `lambda`, `begin`, and
//! application. Quoted data is never entered; everything else is
//! rewritten bottom-up, in place where the original did so.
//!
//! Each malformed form reports its own error code, and any error
//! returns straight to the `expand` entry point.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::list::ListBuilder;
use crate::value::Value;

impl Context {
    /// Expand a value tree into core forms.
    pub fn expand(&mut self, expr: Value) -> Result<Value> {
        self.expand_form(expr)
    }

    fn expand_form(&mut self, expr: Value) -> Result<Value> {
        if !expr.is_pair() {
            return Ok(expr);
        }
        let op = self.car(expr);
        if self.symbol_is(op, b"QUOTE") {
            if self.length(expr) != 2 {
                return Err(Error::BadQuote);
            }
            Ok(expr)
        } else if self.symbol_is(op, b"DEFINE") {
            self.expand_define(expr)
        } else if self.symbol_is(op, b"SET!") {
            self.expand_set(expr)
        } else if self.symbol_is(op, b"COND") {
            self.expand_cond(expr)
        } else if self.symbol_is(op, b"AND") {
            self.expand_and(expr)
        } else if self.symbol_is(op, b"OR") {
            self.expand_or(expr)
        } else if self.symbol_is(op, b"LET") {
            self.expand_let(expr)
        } else if self.symbol_is(op, b"LAMBDA") {
            self.expand_lambda(expr)
        } else if self.symbol_is(op, b"ASSERT") {
            self.expand_assert(expr)
        } else {
            self.expand_elements(expr)?;
            Ok(expr)
        }
    }

    /// Expand every element of a list in place.
    fn expand_elements(&mut self, list: Value) -> Result<()> {
        let mut it = list;
        while it.is_pair() {
            let element = self.car(it);
            let expanded = self.expand_form(element)?;
            self.set_car(it, expanded);
            it = self.cdr(it);
        }
        Ok(())
    }

    /// `(define (f a ...) body ...)` becomes
    /// `(define f (lambda (a ...) body ...))`; the plain form just
    /// expands its value expression.
    fn expand_define(&mut self, expr: Value) -> Result<Value> {
        if self.length(expr) < 3 {
            return Err(Error::BadDefine);
        }
        let head = self.car(expr);
        let signature = self.at_index(expr, 1);
        match signature {
            Value::Pair(_) => {
                let name = self.car(signature);
                if !matches!(name, Value::Symbol(_)) {
                    return Err(Error::BadDefine);
                }
                let args = self.cdr(signature);
                let body = self.cdr(self.cdr(expr));
                let lambda_sym = self.make_symbol("LAMBDA");
                let tail = self.cons(args, body);
                let lambda = self.cons(lambda_sym, tail);
                let lambda = self.expand_form(lambda)?;
                Ok(self.list_from(&[head, name, lambda]))
            }
            Value::Symbol(_) => {
                let value = self.at_index(expr, 2);
                let value = self.expand_form(value)?;
                Ok(self.list_from(&[head, signature, value]))
            }
            _ => Err(Error::BadDefine),
        }
    }

    fn expand_set(&mut self, expr: Value) -> Result<Value> {
        if self.length(expr) != 3 {
            return Err(Error::BadSet);
        }
        let target = self.at_index(expr, 1);
        if !matches!(target, Value::Symbol(_)) {
            return Err(Error::BadSet);
        }
        let value = self.at_index(expr, 2);
        let value = self.expand_form(value)?;
        let head = self.car(expr);
        Ok(self.list_from(&[head, target, value]))
    }

    /// `(cond (p e) ... [(else e)])` right-folds into nested `if`s.
    /// With no `else`, the innermost `if` has no alternative arm and
    /// the evaluator reads the missing arm as null.
    fn expand_cond(&mut self, expr: Value) -> Result<Value> {
        let rest = self.cdr(expr);
        if !rest.is_pair() {
            return Err(Error::BadCond);
        }
        let mut clauses = self.reverse_inplace(rest);

        let last = self.car(clauses);
        self.check_cond_clause(last)?;
        let mut outer: Option<Value> = None;
        let last_pred = self.car(last);
        if self.symbol_is(last_pred, b"ELSE") {
            let body = self.at_index(last, 1);
            outer = Some(self.expand_form(body)?);
            clauses = self.cdr(clauses);
        }

        let mut it = clauses;
        while it.is_pair() {
            let clause = self.car(it);
            self.check_cond_clause(clause)?;
            let pred = self.expand_form(self.car(clause))?;
            let body = self.at_index(clause, 1);
            let body = self.expand_form(body)?;
            let if_sym = self.make_symbol("IF");
            let form = match outer {
                Some(alt) => self.list_from(&[if_sym, pred, body, alt]),
                None => self.list_from(&[if_sym, pred, body]),
            };
            outer = Some(form);
            it = self.cdr(it);
        }
        outer.ok_or(Error::BadCond)
    }

    fn check_cond_clause(&self, clause: Value) -> Result<()> {
        if !clause.is_pair() || self.length(clause) != 2 {
            return Err(Error::BadCond);
        }
        Ok(())
    }

    /// `(and a b c)` right-folds to `(if a (if b (if c 1 0) 0) 0)`.
    fn expand_and(&mut self, expr: Value) -> Result<Value> {
        if self.length(expr) < 2 {
            return Err(Error::BadAnd);
        }
        let rest = self.cdr(expr);
        let mut it = self.reverse_inplace(rest);
        let last = self.expand_form(self.car(it))?;
        let if_sym = self.make_symbol("IF");
        let mut outer = self.list_from(&[if_sym, last, Value::Int(1), Value::Int(0)]);
        it = self.cdr(it);
        while it.is_pair() {
            let pred = self.expand_form(self.car(it))?;
            let if_sym = self.make_symbol("IF");
            outer = self.list_from(&[if_sym, pred, outer, Value::Int(0)]);
            it = self.cdr(it);
        }
        Ok(outer)
    }

    /// `(or a b c)` right-folds to `(if a 1 (if b 1 (if c 1 0)))`.
    fn expand_or(&mut self, expr: Value) -> Result<Value> {
        if self.length(expr) < 2 {
            return Err(Error::BadOr);
        }
        let rest = self.cdr(expr);
        let mut it = self.reverse_inplace(rest);
        let last = self.expand_form(self.car(it))?;
        let if_sym = self.make_symbol("IF");
        let mut outer = self.list_from(&[if_sym, last, Value::Int(1), Value::Int(0)]);
        it = self.cdr(it);
        while it.is_pair() {
            let pred = self.expand_form(self.car(it))?;
            let if_sym = self.make_symbol("IF");
            outer = self.list_from(&[if_sym, pred, Value::Int(1), outer]);
            it = self.cdr(it);
        }
        Ok(outer)
    }

    /// `(let ((v x) ...) body ...)` becomes
    /// `((lambda (v ...) body ...) x ...)`.
    fn expand_let(&mut self, expr: Value) -> Result<Value> {
        let bindings = self.at_index(expr, 1);
        if !bindings.is_pair() {
            return Err(Error::BadLet);
        }
        let body = self.cdr(self.cdr(expr));

        let mut vars = ListBuilder::new();
        let mut inits = ListBuilder::new();
        let mut it = bindings;
        while it.is_pair() {
            let binding = self.car(it);
            if !binding.is_pair() {
                return Err(Error::BadLet);
            }
            let var = self.at_index(binding, 0);
            if !matches!(var, Value::Symbol(_)) {
                return Err(Error::BadLet);
            }
            vars.push(self, var);
            let init = self.at_index(binding, 1);
            let init = self.expand_form(init)?;
            inits.push(self, init);
            it = self.cdr(it);
        }

        let lambda_sym = self.make_symbol("LAMBDA");
        let tail = self.cons(vars.finish(), body);
        let lambda = self.cons(lambda_sym, tail);
        let lambda = self.expand_form(lambda)?;
        Ok(self.cons(lambda, inits.finish()))
    }

    /// A lambda with more than one body expression gets its body
    /// wrapped in `begin`; afterwards every lambda body is a single
    /// expression.
    fn expand_lambda(&mut self, expr: Value) -> Result<Value> {
        if self.length(expr) > 3 {
            let vars = self.at_index(expr, 1);
            if !vars.is_pair() {
                return Err(Error::BadLambda);
            }
            let head = self.car(expr);
            let body = self.cdr(self.cdr(expr));
            self.expand_elements(body)?;
            let begin_sym = self.make_symbol("BEGIN");
            let begin = self.cons(begin_sym, body);
            Ok(self.list_from(&[head, vars, begin]))
        } else {
            let body = self.cdr(self.cdr(expr));
            self.expand_elements(body)?;
            Ok(expr)
        }
    }

    /// `(assert e)` becomes `(assert e' '(e))` so the primitive can
    /// report the source form verbatim on failure.
    fn expand_assert(&mut self, expr: Value) -> Result<Value> {
        let head = self.car(expr);
        let statement = self.at_index(expr, 1);
        let quote_sym = self.make_symbol("QUOTE");
        let quoted = self.list_from(&[quote_sym, statement]);
        let expanded = self.expand_form(statement)?;
        Ok(self.list_from(&[head, expanded, quoted]))
    }
}
