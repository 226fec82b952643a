//! Boolean core: the `True`/`False` literals, identity tests and the connectives.
use crate::symbolic::attributes::Attribute::*;
use crate::symbolic::eval_state::{BuiltinDefinition, EvalState};
use crate::symbolic::pattern_matcher::{EqualResult, flatten_same_head, is_equal};
use crate::symbolic::symbolic_engine::{Ex, Expression};

pub fn definitions() -> Vec<BuiltinDefinition> {
    vec![
        BuiltinDefinition::new("True", &[Locked, Protected]),
        BuiltinDefinition::new("False", &[Locked, Protected]),
        BuiltinDefinition::new("SameQ", &[Protected]).with_evaluator(eval_same_q),
        BuiltinDefinition::new("UnsameQ", &[Protected]).with_evaluator(eval_unsame_q),
        BuiltinDefinition::new("Equal", &[Protected]).with_evaluator(eval_equal),
        BuiltinDefinition::new("Not", &[Protected]).with_evaluator(eval_not),
        BuiltinDefinition::new("And", &[Flat, OneIdentity, Orderless, Protected])
            .with_evaluator(eval_and),
        BuiltinDefinition::new("Or", &[Flat, OneIdentity, Orderless, Protected])
            .with_evaluator(eval_or),
    ]
}

/// structural identity of all operands
pub fn eval_same_q(e: &Expression, _state: &mut EvalState) -> Ex {
    let args = e.args();
    Ex::bool(args.windows(2).all(|w| w[0] == w[1]))
}

/// no two operands structurally identical
pub fn eval_unsame_q(e: &Expression, _state: &mut EvalState) -> Ex {
    let args = e.args();
    let distinct = args
        .iter()
        .enumerate()
        .all(|(i, a)| args[i + 1..].iter().all(|b| a != b));
    Ex::bool(distinct)
}

/// `True` when every neighbouring pair is equal, `False` when some pair is
/// unequal, unevaluated otherwise.
pub fn eval_equal(e: &Expression, state: &mut EvalState) -> Ex {
    let args = e.args();
    let mut all_true = true;
    for pair in args.windows(2) {
        match is_equal(state, &pair[0], &pair[1]) {
            EqualResult::False => return Ex::bool(false),
            EqualResult::Unknown => all_true = false,
            EqualResult::True => {}
        }
    }
    if all_true {
        Ex::bool(true)
    } else {
        Ex::Expr(e.clone())
    }
}

pub fn eval_not(e: &Expression, _state: &mut EvalState) -> Ex {
    match e.args() {
        [x] if x.is_true() => Ex::bool(false),
        [x] if x.is_false() => Ex::bool(true),
        [Ex::Expr(inner)] if inner.has_head("Not") && inner.arity() == 1 => inner.args()[0].clone(),
        _ => Ex::Expr(e.clone()),
    }
}

/// `identity` operands are dropped, an `absorbing` operand decides the result.
fn connective(e: &Expression, identity: bool, absorbing: bool) -> Ex {
    let operands = flatten_same_head(e);
    if operands
        .iter()
        .any(|op| if absorbing { op.is_true() } else { op.is_false() })
    {
        return Ex::bool(absorbing);
    }
    let mut rest: Vec<Ex> = operands
        .into_iter()
        .filter(|op| if identity { !op.is_true() } else { !op.is_false() })
        .collect();
    match rest.len() {
        0 => Ex::bool(identity),
        1 => rest.remove(0),
        _ => Ex::Expr(e.with_args(rest)),
    }
}

pub fn eval_and(e: &Expression, _state: &mut EvalState) -> Ex {
    connective(e, true, false)
}

pub fn eval_or(e: &Expression, _state: &mut EvalState) -> Ex {
    connective(e, false, true)
}
