//! # Rewrite Module
//!
//! Rules and their application.
//!
//! ## Main Structures and Functions
//!
//! - **`Rule`**: pattern, replacement and an optional applicability condition
//! - `substitute(ex, bindings)` - instantiates a replacement; a sequence binding is
//!   spliced into the surrounding operand list
//! - `replace(state, ex, rule)` - the rule against the whole expression
//! - `commutative_replace(state, e, rule, attrs)` - the rule against sub-multisets
//!   (`Orderless`) or contiguous runs (`Flat`) of the operands
//! - `apply_rule` - whole expression first, then the commutative/associative variant
//! - `replace_all`, `replace_repeated` - top-down application of a rule list
//!
//! Every rule attempt runs inside a snapshot of the definitions table: whatever a
//! condition or a replacement assigns while being tried is rolled back.

use crate::symbolic::attributes::Attributes;
use crate::symbolic::eval_state::EvalState;
use crate::symbolic::pattern_matcher::{
    Binding, Bindings, condition_holds, match_with, optional_spec, sequence_spec,
    strip_hold_pattern,
};
use crate::symbolic::symbolic_engine::{Ex, Expression};
use itertools::Itertools;
use log::{debug, warn};
use std::fmt;

/// `lhs -> rhs` (optionally `/; condition`)
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub lhs: Ex,
    pub rhs: Ex,
    pub condition: Option<Ex>,
}

impl Rule {
    pub fn new(lhs: Ex, rhs: Ex) -> Rule {
        Rule {
            lhs,
            rhs,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Ex) -> Rule {
        self.condition = Some(condition);
        self
    }

    /// Reads `Rule[lhs, rhs]` or `RuleDelayed[lhs, rhs]`. A `Condition[rhs, test]`
    /// on the right of a delayed rule becomes the rule's condition.
    pub fn from_ex(ex: &Ex) -> Option<Rule> {
        let e = ex.as_expr()?;
        let [lhs, rhs] = e.args() else {
            return None;
        };
        if e.has_head("Rule") {
            return Some(Rule::new(lhs.clone(), rhs.clone()));
        }
        if !e.has_head("RuleDelayed") {
            return None;
        }
        match rhs.as_expr() {
            Some(c) if c.has_head("Condition") && c.arity() == 2 => {
                Some(Rule::new(lhs.clone(), c.args()[0].clone()).with_condition(c.args()[1].clone()))
            }
            _ => Some(Rule::new(lhs.clone(), rhs.clone())),
        }
    }

    /// `RuleDelayed[lhs, rhs]`, the condition folded back into the right-hand side
    pub fn to_ex(&self) -> Ex {
        let rhs = match &self.condition {
            Some(test) => Ex::call("Condition", vec![self.rhs.clone(), test.clone()]),
            None => self.rhs.clone(),
        };
        Ex::call("RuleDelayed", vec![self.lhs.clone(), rhs])
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_ex())
    }
}

/// A single rule or a `List` of rules.
pub fn rules_from_ex(ex: &Ex) -> Option<Vec<Rule>> {
    match ex.as_expr() {
        Some(list) if list.has_head("List") => list.args().iter().map(Rule::from_ex).collect(),
        _ => Rule::from_ex(ex).map(|rule| vec![rule]),
    }
}

////////////////////////////////////////SUBSTITUTION////////////////////////////////////////

/// Replaces every bound symbol in `ex` by its binding.
pub fn substitute(ex: &Ex, bindings: &Bindings) -> Ex {
    if bindings.is_empty() {
        return ex.clone();
    }
    match ex {
        Ex::Symbol(s) => match bindings.get(s.name()) {
            Some(binding) => binding.to_ex(),
            None => ex.clone(),
        },
        Ex::Number(_) => ex.clone(),
        Ex::Expr(e) => {
            let head = substitute(e.head(), bindings);
            let mut args = Vec::with_capacity(e.arity());
            for arg in e.args() {
                substitute_into(arg, bindings, &mut args);
            }
            Ex::apply(head, args)
        }
    }
}

fn substitute_into(ex: &Ex, bindings: &Bindings, out: &mut Vec<Ex>) {
    if let Ex::Symbol(s) = ex {
        if let Some(Binding::Sequence(items)) = bindings.get(s.name()) {
            out.extend(items.iter().cloned());
            return;
        }
    }
    out.push(substitute(ex, bindings));
}

////////////////////////////////////////SINGLE RULE////////////////////////////////////////

/// Instantiated (not evaluated) replacement of the first match of `rule` on `ex`
/// whose condition holds.
fn instantiate(state: &mut EvalState, ex: &Ex, rule: &Rule) -> Option<Ex> {
    let mut replacement = None;
    match_with(state, ex, &rule.lhs, &Bindings::new(), &mut |st, b| {
        if let Some(test) = &rule.condition {
            if !condition_holds(st, test, b) {
                return false;
            }
        }
        replacement = Some(substitute(&rule.rhs, b));
        true
    });
    replacement
}

/// Tries `rule` on the whole of `ex`; on success the replacement is evaluated.
/// Matching and evaluation run inside a snapshot of the definitions table.
pub fn replace(state: &mut EvalState, ex: &Ex, rule: &Rule) -> Option<Ex> {
    let mut guard = state.snapshot();
    let replacement = instantiate(&mut guard, ex, rule)?;
    debug!("{}rule {} matched {}", guard.pre(), rule, ex);
    Some(guard.evaluate(&replacement))
}

/// Applies `rule` to a part of the operands of an `Orderless` or `Flat` term and
/// splices the replacement among the untouched operands.
///
/// ## Algorithm
/// Operand subsets are enumerated by increasing size, from the number of required
/// pattern operands up to `arity - 1` (the whole term was tried already). Without
/// sequence or optional pattern operands only the size equal to the pattern arity is
/// tried. `Orderless` terms try every combination of operand positions and append the
/// replacement after the remaining operands; `Flat` terms try contiguous windows and
/// put the replacement in place of the window.
pub fn commutative_replace(
    state: &mut EvalState,
    e: &Expression,
    rule: &Rule,
    attrs: Attributes,
) -> Option<Ex> {
    if !attrs.orderless && !attrs.flat {
        return None;
    }
    let lhs = strip_hold_pattern(&rule.lhs).as_expr()?;
    if lhs.head() != e.head() {
        return None;
    }
    let n = e.arity();
    let patterns = lhs.args();
    let variable = patterns
        .iter()
        .any(|p| sequence_spec(p).is_some() || optional_spec(p).is_some());
    let required = patterns
        .iter()
        .filter(|p| sequence_spec(p).is_none() && optional_spec(p).is_none())
        .count()
        .max(1);
    let sizes: Vec<usize> = if variable {
        (required..n).collect()
    } else if patterns.len() < n && !patterns.is_empty() {
        vec![patterns.len()]
    } else {
        vec![]
    };
    debug!(
        "{}commutative replace of {} in {} (sizes {:?})",
        state.pre(),
        rule,
        e,
        sizes
    );
    for size in sizes {
        let windows: Vec<Vec<usize>> = if attrs.orderless {
            (0..n).combinations(size).collect()
        } else {
            (0..=n - size).map(|start| (start..start + size).collect()).collect()
        };
        for chosen in windows {
            let picked: Vec<Ex> = chosen.iter().map(|i| e.args()[*i].clone()).collect();
            let sub = Ex::Expr(e.with_args(picked));
            let Some(replacement) = replace(state, &sub, rule) else {
                continue;
            };
            debug!("{}matched operands {:?} of {}", state.pre(), chosen, e);
            let mut operands = Vec::with_capacity(n - size + 1);
            if attrs.orderless {
                operands.extend(
                    e.args()
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| !chosen.contains(i))
                        .map(|(_, arg)| arg.clone()),
                );
                operands.push(replacement);
            } else {
                let start = chosen[0];
                operands.extend(e.args()[..start].iter().cloned());
                operands.push(replacement);
                operands.extend(e.args()[start + size..].iter().cloned());
            }
            return Some(Ex::Expr(e.with_args(operands)));
        }
    }
    None
} // fn commutative_replace

/// Whole-expression match first; for `Orderless`/`Flat` heads then the
/// operand-subset variant.
pub fn apply_rule(state: &mut EvalState, e: &Expression, rule: &Rule, attrs: Attributes) -> Option<Ex> {
    let whole = Ex::Expr(e.clone());
    replace(state, &whole, rule).or_else(|| commutative_replace(state, e, rule, attrs))
}

////////////////////////////////////////RULE LISTS////////////////////////////////////////

/// One top-down pass: the first rule matching a sub-expression replaces it and the
/// replacement is not visited again. Replacements are not evaluated.
pub fn replace_all(state: &mut EvalState, ex: &Ex, rules: &[Rule]) -> Ex {
    for rule in rules {
        let found = {
            let mut guard = state.snapshot();
            instantiate(&mut guard, ex, rule)
        };
        if let Some(replacement) = found {
            return replacement;
        }
    }
    match ex {
        Ex::Expr(e) => {
            let head = replace_all(state, e.head(), rules);
            let args = e
                .args()
                .iter()
                .map(|arg| replace_all(state, arg, rules))
                .collect();
            Ex::apply(head, args)
        }
        _ => ex.clone(),
    }
}

/// `replace_all` until nothing changes, at most `max_iterations` passes.
pub fn replace_repeated(state: &mut EvalState, ex: &Ex, rules: &[Rule]) -> Ex {
    let mut current = ex.clone();
    for _ in 0..state.config().max_iterations {
        let next = replace_all(state, &current, rules);
        if next == current {
            return current;
        }
        current = next;
    }
    warn!(
        "ReplaceRepeated stopped after {} iterations",
        state.config().max_iterations
    );
    current
}
