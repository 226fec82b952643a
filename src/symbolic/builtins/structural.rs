//! Structural heads: lists and sequences, the Hold family, pattern and rule heads,
//! rule application (`ReplaceAll`, `ReplaceRepeated`, `MatchQ`), attribute queries,
//! and the assignment heads (`Set`, `SetDelayed`, `Clear`) with `CompoundExpression`.
use crate::symbolic::attributes::Attribute::*;
use crate::symbolic::eval_errors::EvalError;
use crate::symbolic::eval_state::{BuiltinDefinition, EvalState};
use crate::symbolic::evaluator::EvalOutcome;
use crate::symbolic::pattern_matcher::{match_q, strip_hold_pattern};
use crate::symbolic::rewrite::{Rule, replace_all, replace_repeated, rules_from_ex};
use crate::symbolic::symbolic_engine::{Ex, Expression};
use log::warn;

pub fn definitions() -> Vec<BuiltinDefinition> {
    vec![
        BuiltinDefinition::new("List", &[Locked, Protected]),
        BuiltinDefinition::new("Sequence", &[Protected]),
        BuiltinDefinition::new("Null", &[Protected]),
        BuiltinDefinition::new("$Failed", &[Protected]),
        BuiltinDefinition::new("Indeterminate", &[Protected]),
        BuiltinDefinition::new("DirectedInfinity", &[Protected]),
        // Hold family
        BuiltinDefinition::new("Hold", &[HoldAll, Protected]),
        BuiltinDefinition::new("HoldComplete", &[HoldAllComplete, Protected]),
        BuiltinDefinition::new("HoldForm", &[HoldAll, Protected]),
        BuiltinDefinition::new("Return", &[Protected]),
        // patterns
        BuiltinDefinition::new("Blank", &[Protected]),
        BuiltinDefinition::new("BlankSequence", &[Protected]),
        BuiltinDefinition::new("BlankNullSequence", &[Protected]),
        BuiltinDefinition::new("Pattern", &[HoldFirst, Protected]),
        BuiltinDefinition::new("Optional", &[Protected]),
        BuiltinDefinition::new("Alternatives", &[Protected]),
        BuiltinDefinition::new("Condition", &[HoldAll, Protected]),
        BuiltinDefinition::new("HoldPattern", &[HoldAll, Protected]),
        // rules
        BuiltinDefinition::new("Rule", &[SequenceHold, Protected]),
        BuiltinDefinition::new("RuleDelayed", &[HoldRest, SequenceHold, Protected]),
        BuiltinDefinition::new("ReplaceAll", &[Protected]).with_evaluator(eval_replace_all),
        BuiltinDefinition::new("ReplaceRepeated", &[Protected])
            .with_evaluator(eval_replace_repeated),
        BuiltinDefinition::new("MatchQ", &[Protected]).with_evaluator(eval_match_q),
        BuiltinDefinition::new("Attributes", &[HoldAll, Listable, Protected])
            .with_evaluator(eval_attributes),
        // assignment
        BuiltinDefinition::new("Set", &[HoldFirst, SequenceHold, Protected]).with_evaluator(eval_set),
        BuiltinDefinition::new("SetDelayed", &[HoldAll, SequenceHold, Protected])
            .with_evaluator(eval_set_delayed),
        BuiltinDefinition::new("Clear", &[HoldAll, Protected]).with_evaluator(eval_clear),
        BuiltinDefinition::new("CompoundExpression", &[HoldAll, Protected])
            .with_evaluator(eval_compound_expression),
    ]
}

pub fn eval_replace_all(e: &Expression, state: &mut EvalState) -> Ex {
    match e.args() {
        [expr, rules] => match rules_from_ex(rules) {
            Some(rules) => replace_all(state, expr, &rules),
            None => Ex::Expr(e.clone()),
        },
        _ => Ex::Expr(e.clone()),
    }
}

pub fn eval_replace_repeated(e: &Expression, state: &mut EvalState) -> Ex {
    match e.args() {
        [expr, rules] => match rules_from_ex(rules) {
            Some(rules) => replace_repeated(state, expr, &rules),
            None => Ex::Expr(e.clone()),
        },
        _ => Ex::Expr(e.clone()),
    }
}

pub fn eval_match_q(e: &Expression, state: &mut EvalState) -> Ex {
    match e.args() {
        [expr, pattern] => Ex::bool(match_q(state, expr, pattern)),
        _ => Ex::Expr(e.clone()),
    }
}

/// `Attributes[sym]` → `{attr1, attr2, ...}` (sorted by name)
pub fn eval_attributes(e: &Expression, state: &mut EvalState) -> Ex {
    match e.args() {
        [Ex::Symbol(s)] => {
            let names = state.attributes_of(s.name()).to_names();
            Ex::list(names.iter().map(|name| Ex::system(name)).collect())
        }
        _ => Ex::Expr(e.clone()),
    }
}

/// Stores `rule` as own value (symbol lhs) or down value (compound lhs with a
/// symbol head). `Ok(false)` for a left-hand side that cannot carry definitions.
fn assign(state: &mut EvalState, rule: Rule) -> Result<bool, EvalError> {
    match strip_hold_pattern(&rule.lhs) {
        Ex::Symbol(s) => {
            let name = s.name().to_string();
            state.set_own_value(&name, rule.rhs)?;
            Ok(true)
        }
        Ex::Expr(lhs) => match lhs.head().symbol_name() {
            Some(name) => {
                let name = name.to_string();
                state.add_down_value(&name, rule)?;
                Ok(true)
            }
            None => Ok(false),
        },
        Ex::Number(_) => Ok(false),
    }
}

fn assignment_result(e: &Expression, result: Result<bool, EvalError>, value: Ex) -> Ex {
    match result {
        Ok(true) => value,
        Ok(false) => Ex::Expr(e.clone()),
        Err(err) => {
            warn!("{}: {}", e, err);
            Ex::system("$Failed")
        }
    }
}

/// `lhs = rhs`, the right-hand side evaluated before it is stored
pub fn eval_set(e: &Expression, state: &mut EvalState) -> Ex {
    let [lhs, rhs] = e.args() else {
        return Ex::Expr(e.clone());
    };
    let result = assign(state, Rule::new(lhs.clone(), rhs.clone()));
    assignment_result(e, result, rhs.clone())
}

/// `lhs := rhs`, stored unevaluated; `rhs /; test` becomes the rule condition
pub fn eval_set_delayed(e: &Expression, state: &mut EvalState) -> Ex {
    let [lhs, rhs] = e.args() else {
        return Ex::Expr(e.clone());
    };
    let Some(rule) = Rule::from_ex(&Ex::call("RuleDelayed", vec![lhs.clone(), rhs.clone()])) else {
        return Ex::Expr(e.clone());
    };
    let result = assign(state, rule);
    assignment_result(e, result, Ex::system("Null"))
}

pub fn eval_clear(e: &Expression, state: &mut EvalState) -> Ex {
    for arg in e.args() {
        if let Some(name) = arg.symbol_name() {
            if let Err(err) = state.clear(name) {
                warn!("{}", err);
            }
        }
    }
    Ex::system("Null")
}

/// Evaluates the operands in order and yields the last one. A `Return` inside
/// stops the sequence and is re-raised as `Return[x]`.
pub fn eval_compound_expression(e: &Expression, state: &mut EvalState) -> Ex {
    let mut last = Ex::system("Null");
    for arg in e.args() {
        match state.eval_outcome(arg) {
            EvalOutcome::Normal(x) => last = x,
            EvalOutcome::Return(x) => return Ex::call("Return", vec![x]),
        }
    }
    last
}
