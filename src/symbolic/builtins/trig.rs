//! Elementary numeric functions. They apply only to a single floating operand whose
//! conversion to a machine float is exact; integers and rationals are never promoted.
use crate::symbolic::attributes::Attribute::*;
use crate::symbolic::eval_state::{BuiltinDefinition, EvalState};
use crate::symbolic::numeric_tower::Value;
use crate::symbolic::symbolic_engine::{Ex, Expression};

pub fn definitions() -> Vec<BuiltinDefinition> {
    vec![
        BuiltinDefinition::new("Sin", &[Listable, NumericFunction, Protected]).with_evaluator(eval_sin),
        BuiltinDefinition::new("Cos", &[Listable, NumericFunction, Protected]).with_evaluator(eval_cos),
        BuiltinDefinition::new("Tan", &[Listable, NumericFunction, Protected]).with_evaluator(eval_tan),
    ]
}

fn math_fn_one_param(e: &Expression, f: fn(f64) -> f64) -> Ex {
    match e.args() {
        [Ex::Number(Value::Float(x))] => match x.to_exact_f64() {
            Some(v) => Ex::float(f(v)),
            None => Ex::Expr(e.clone()),
        },
        _ => Ex::Expr(e.clone()),
    }
}

pub fn eval_sin(e: &Expression, _state: &mut EvalState) -> Ex {
    math_fn_one_param(e, f64::sin)
}

pub fn eval_cos(e: &Expression, _state: &mut EvalState) -> Ex {
    math_fn_one_param(e, f64::cos)
}

pub fn eval_tan(e: &Expression, _state: &mut EvalState) -> Ex {
    math_fn_one_param(e, f64::tan)
}
