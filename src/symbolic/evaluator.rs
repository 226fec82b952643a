//! # Evaluator Module
//!
//! Normalization of an expression to a fixed point.
//!
//! ## Main Structures and Methods
//!
//! - **`EvalOutcome`**: `Normal(ex)` for an ordinary result, `Return(ex)` for the
//!   escape value produced by `Return[...]`, which bypasses further evaluation on its
//!   way up
//! - `EvalState::evaluate(ex)` - evaluates and unwraps a `Return`
//! - `EvalState::eval_outcome(ex)` - evaluates and reports a `Return`
//!
//! ## Evaluation of a compound term (one step)
//!
//! 1. evaluate the head
//! 2. evaluate the operands left to right, skipping the positions held by
//!    `HoldFirst`/`HoldRest`/`HoldAll`/`HoldAllComplete`
//! 3. splice `Sequence[...]` operands (unless `SequenceHold`/`HoldAllComplete`),
//!    flatten nested terms of a `Flat` head, thread a `Listable` head over `List`
//!    operands, sort the operands of an `Orderless` head canonically
//! 4. `Return[x]` becomes the escape outcome
//! 5. the registered built-in of the head, if any
//! 6. the down values of the head in declaration order (whole term first, then
//!    operand subsets for `Orderless`/`Flat` heads)
//!
//! Steps are repeated until a step returns its input unchanged, or the iteration
//! limit of the session is reached.

use crate::symbolic::eval_state::EvalState;
use crate::symbolic::rewrite::apply_rule;
use crate::symbolic::symbolic_engine::{Ex, Expression, Symbol, canonical_order};
use log::{trace, warn};

/// Result of an evaluation
#[derive(Clone, Debug, PartialEq)]
pub enum EvalOutcome {
    Normal(Ex),
    Return(Ex),
}

impl EvalOutcome {
    pub fn into_ex(self) -> Ex {
        match self {
            EvalOutcome::Normal(ex) | EvalOutcome::Return(ex) => ex,
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, EvalOutcome::Return(_))
    }
}

impl EvalState {
    /// Evaluates `ex` to its normal form. A `Return[x]` escaping to this level yields `x`.
    pub fn evaluate(&mut self, ex: &Ex) -> Ex {
        self.eval_outcome(ex).into_ex()
    }

    pub fn eval_outcome(&mut self, ex: &Ex) -> EvalOutcome {
        if let Ex::Number(_) = ex {
            return EvalOutcome::Normal(ex.clone());
        }
        if !self.enter() {
            warn!(
                "recursion depth {} exceeded, returning {} unevaluated",
                self.config().max_recursion_depth,
                ex
            );
            return EvalOutcome::Normal(ex.clone());
        }
        let outcome = match ex {
            Ex::Symbol(s) => self.eval_symbol(s),
            Ex::Expr(e) => self.eval_expression(e),
            Ex::Number(_) => EvalOutcome::Normal(ex.clone()),
        };
        self.leave();
        outcome
    }

    /// Own value of the symbol, evaluated. A symbol bound to itself and an unbound
    /// symbol are fixed points. A `Return[x]` raised by the own value stops at the
    /// symbol, which evaluates to `x`.
    fn eval_symbol(&mut self, s: &Symbol) -> EvalOutcome {
        match self.own_value(s.name()) {
            Some(Ex::Symbol(bound)) if bound == *s => EvalOutcome::Normal(Ex::Symbol(bound)),
            Some(value) => {
                trace!("{}{} -> {}", self.pre(), s.name(), value);
                EvalOutcome::Normal(self.eval_outcome(&value).into_ex())
            }
            None => EvalOutcome::Normal(Ex::Symbol(s.clone())),
        }
    }

    fn eval_expression(&mut self, e: &Expression) -> EvalOutcome {
        let mut current = e.clone();
        let max_iterations = self.config().max_iterations;
        for _ in 0..max_iterations {
            trace!("{}Evaluating {}", self.pre(), current);
            let next = match self.eval_step(&current) {
                EvalOutcome::Return(x) => return EvalOutcome::Return(x),
                EvalOutcome::Normal(x) => x,
            };
            match next {
                Ex::Expr(next) => {
                    if next == current {
                        return EvalOutcome::Normal(Ex::Expr(next));
                    }
                    current = next;
                }
                atom => return self.eval_outcome(&atom),
            }
        }
        warn!(
            "evaluation of {} stopped after {} iterations",
            e, max_iterations
        );
        EvalOutcome::Normal(Ex::Expr(current))
    } // fn eval_expression

    fn eval_step(&mut self, e: &Expression) -> EvalOutcome {
        let head = match self.eval_outcome(e.head()) {
            EvalOutcome::Return(x) => return EvalOutcome::Return(x),
            EvalOutcome::Normal(h) => h,
        };
        let attrs = self.head_attributes(&head);

        let mut args = Vec::with_capacity(e.arity());
        for (i, arg) in e.args().iter().enumerate() {
            if attrs.holds_operand(i + 1) {
                args.push(arg.clone());
                continue;
            }
            match self.eval_outcome(arg) {
                EvalOutcome::Return(x) => return EvalOutcome::Return(x),
                EvalOutcome::Normal(x) => args.push(x),
            }
        }
        if !attrs.keeps_sequences() {
            args = splice_sequences(args);
        }
        if attrs.flat {
            args = flatten_head(&head, args);
        }
        if attrs.listable {
            if let Some(threaded) = thread_listable(&head, &args) {
                return EvalOutcome::Normal(threaded);
            }
        }
        if attrs.orderless {
            args.sort_by(canonical_order);
        }
        let current = Expression::new(head, args);

        if current.has_head("Return") && current.arity() <= 1 {
            let value = current
                .args()
                .first()
                .cloned()
                .unwrap_or_else(|| Ex::system("Null"));
            return EvalOutcome::Return(value);
        }

        let Some(name) = current.head_name().map(str::to_string) else {
            return EvalOutcome::Normal(Ex::Expr(current));
        };
        if let Some(builtin) = self.builtin(&name) {
            let result = builtin(&current, self);
            match &result {
                Ex::Expr(r) if *r == current => {}
                _ => return EvalOutcome::Normal(result),
            }
        }
        for rule in self.down_values(&name) {
            if let Some(result) = apply_rule(self, &current, &rule, attrs) {
                return EvalOutcome::Normal(result);
            }
        }
        EvalOutcome::Normal(Ex::Expr(current))
    } // fn eval_step
}

fn splice_sequences(args: Vec<Ex>) -> Vec<Ex> {
    if !args.iter().any(|arg| arg.is_call("Sequence")) {
        return args;
    }
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Ex::Expr(e) if e.has_head("Sequence") => out.extend(e.into_parts().1),
            other => out.push(other),
        }
    }
    out
}

fn flatten_head(head: &Ex, args: Vec<Ex>) -> Vec<Ex> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Ex::Expr(e) if e.head() == head => {
                let (_, inner) = e.into_parts();
                out.extend(flatten_head(head, inner));
            }
            other => out.push(other),
        }
    }
    out
}

/// `h[{a1, a2}, b, {c1, c2}]` → `{h[a1, b, c1], h[a2, b, c2]}`. `None` when no
/// operand is a list or when the lists differ in length.
fn thread_listable(head: &Ex, args: &[Ex]) -> Option<Ex> {
    let lengths: Vec<usize> = args
        .iter()
        .filter_map(|arg| arg.as_expr().filter(|e| e.has_head("List")).map(Expression::arity))
        .collect();
    let first = *lengths.first()?;
    if lengths.iter().any(|len| *len != first) {
        warn!(
            "{}: lists of unequal length {:?} cannot be combined",
            head, lengths
        );
        return None;
    }
    let items = (0..first)
        .map(|i| {
            let operands = args
                .iter()
                .map(|arg| match arg.as_expr() {
                    Some(list) if list.has_head("List") => list.args()[i].clone(),
                    _ => arg.clone(),
                })
                .collect();
            Ex::apply(head.clone(), operands)
        })
        .collect();
    Some(Ex::list(items))
}
