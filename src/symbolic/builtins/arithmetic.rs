//! # Arithmetic built-ins
//!
//! Structural simplification of `Plus`, `Times`, `Power` and `Factorial`. Every
//! evaluator returns its input unchanged when nothing applies.
//!
//! ## Interesting Code Features
//!
//! 1. **Folding over the whole operand list**: flattening can separate numeric
//!    operands, so all of them are folded into one accumulated value, not just
//!    neighbours. Float contagion comes from `Value::mul`/`Value::add`
//! 2. **Sign normal form**: `(-1) * (a + b)` is always expanded to `-a - b`
//! 3. **Rational construction**: `n * b^-1` with integers `n`, `b` is the one shape that
//!    builds a `Rational`; `b^-1` alone stays symbolic so this rule can see it

use crate::symbolic::attributes::Attribute::*;
use crate::symbolic::eval_state::{BuiltinDefinition, EvalState};
use crate::symbolic::numeric_tower::{BigFloat, Value, factorial};
use crate::symbolic::pattern_matcher::flatten_same_head;
use crate::symbolic::symbolic_engine::{Ex, Expression};
use num::{One, Signed, Zero};

pub fn definitions() -> Vec<BuiltinDefinition> {
    vec![
        BuiltinDefinition::new(
            "Plus",
            &[Flat, Listable, NumericFunction, OneIdentity, Orderless, Protected],
        )
        .with_evaluator(eval_plus)
        .with_default(Ex::int(0)),
        BuiltinDefinition::new(
            "Times",
            &[Flat, Listable, NumericFunction, OneIdentity, Orderless, Protected],
        )
        .with_evaluator(eval_times)
        .with_default(Ex::int(1)),
        BuiltinDefinition::new("Power", &[Listable, NumericFunction, OneIdentity, Protected])
            .with_evaluator(eval_power)
            .with_default(Ex::int(1)),
        BuiltinDefinition::new("Factorial", &[Listable, NumericFunction, Protected])
            .with_evaluator(eval_factorial),
    ]
}

/// Splits operands into the numeric leaves and everything else, order kept.
fn split_numbers(operands: Vec<Ex>) -> (Vec<Value>, Vec<Ex>) {
    let mut numbers = Vec::new();
    let mut rest = Vec::new();
    for op in operands {
        match op {
            Ex::Number(v) => numbers.push(v),
            other => rest.push(other),
        }
    }
    (numbers, rest)
}

/// `Times[...]`
///
/// ## Algorithm
/// 1. flatten nested products
/// 2. a zero operand (float zero or exact zero) makes the product `0`, or `0.` when
///    any operand is floating
/// 3. fold every numeric operand into one value; one float among them makes the
///    value floating
/// 4. drop a resulting exact `1` unless it is the only operand left
/// 5. `Times[]` is `1`, a single operand is the product itself
/// 6. two operands: `-1 * Plus[...]` distributes over the addends,
///    `n * Power[b, -1]` with integers `n`, `b` becomes the rational `n/b`
pub fn eval_times(e: &Expression, _state: &mut EvalState) -> Ex {
    let operands = flatten_same_head(e);
    let any_float = operands
        .iter()
        .any(|op| matches!(op, Ex::Number(v) if v.is_float()));
    if operands
        .iter()
        .any(|op| matches!(op, Ex::Number(v) if v.is_zero()))
    {
        return if any_float {
            Ex::Number(Value::Float(BigFloat::zero()))
        } else {
            Ex::int(0)
        };
    }

    let (numbers, rest) = split_numbers(operands);
    let folded = numbers.iter().skip(1).fold(numbers.first().cloned(), |acc, v| {
        acc.map(|a| a.mul(v))
    });
    let mut out = Vec::with_capacity(rest.len() + 1);
    if let Some(value) = folded {
        if !(value.is_one() && !rest.is_empty()) {
            out.push(Ex::Number(value));
        }
    }
    out.extend(rest);

    match out.len() {
        0 => return Ex::int(1),
        1 => return out.remove(0),
        _ => {}
    }
    if out.len() == 2 {
        if let Some(distributed) =
            distribute_negation(&out[0], &out[1]).or_else(|| distribute_negation(&out[1], &out[0]))
        {
            return distributed;
        }
        if let Some(rational) =
            rational_from_division(&out[0], &out[1]).or_else(|| rational_from_division(&out[1], &out[0]))
        {
            return rational;
        }
    }
    Ex::Expr(e.with_args(out))
} // fn eval_times

/// `(-1) * Plus[a, b, ...]` → `Plus[Times[a, -1], Times[b, -1], ...]`
fn distribute_negation(factor: &Ex, sum: &Ex) -> Option<Ex> {
    let minus_one = factor.as_number().filter(|v| v.is_minus_one())?;
    let sum = sum.as_expr().filter(|s| s.has_head("Plus"))?;
    let addends = sum
        .args()
        .iter()
        .map(|addend| Ex::call("Times", vec![addend.clone(), Ex::Number(minus_one.clone())]))
        .collect();
    Some(Ex::call("Plus", addends))
}

/// `n * Power[b, -1]` → `n/b` for integers `n` and `b != 0`
fn rational_from_division(numerator: &Ex, reciprocal: &Ex) -> Option<Ex> {
    let n = numerator.as_number()?.as_integer()?;
    let power = reciprocal.as_expr().filter(|p| p.has_head("Power"))?;
    let [base, exponent] = power.args() else {
        return None;
    };
    let b = base.as_number()?.as_integer()?;
    if !exponent.as_number()?.is_minus_one() {
        return None;
    }
    Value::rational(n.clone(), b.clone()).ok().map(Ex::Number)
}

/// `Plus[...]`: flatten, fold every numeric operand (float contagion), drop a
/// resulting exact `0` unless it is the only operand left, `Plus[]` is `0`, a single
/// operand is the sum itself.
pub fn eval_plus(e: &Expression, _state: &mut EvalState) -> Ex {
    let operands = flatten_same_head(e);
    let (numbers, rest) = split_numbers(operands);
    let folded = numbers.iter().skip(1).fold(numbers.first().cloned(), |acc, v| {
        acc.map(|a| a.add(v))
    });
    let mut out = Vec::with_capacity(rest.len() + 1);
    if let Some(value) = folded {
        let exact_zero = value.is_exact() && value.is_zero();
        if !(exact_zero && !rest.is_empty()) {
            out.push(Ex::Number(value));
        }
    }
    out.extend(rest);
    match out.len() {
        0 => Ex::int(0),
        1 => out.remove(0),
        _ => Ex::Expr(e.with_args(out)),
    }
}

/// `Power[base, exponent]`
///
/// - `x^1` → `x`
/// - float base, integer exponent: floating power
/// - `x^0` → `1` for a nonzero number or a non-numeric `x`; `0^0` stays
/// - exact base, non-negative integer exponent: exact power
/// - everything else, `b^-1` in particular, stays unevaluated
pub fn eval_power(e: &Expression, _state: &mut EvalState) -> Ex {
    let unchanged = || Ex::Expr(e.clone());
    let [base, exponent] = e.args() else {
        return unchanged();
    };
    let Some(Value::Integer(n)) = exponent.as_number() else {
        return unchanged();
    };
    if n.is_one() {
        return base.clone();
    }
    match base {
        Ex::Number(v) if v.is_float() => v.pow(n).map(Ex::Number).unwrap_or_else(unchanged),
        Ex::Number(v) if n.is_zero() => {
            if v.is_zero() {
                unchanged()
            } else {
                Ex::int(1)
            }
        }
        _ if n.is_zero() => Ex::int(1),
        Ex::Number(v) if !n.is_negative() => v.pow(n).map(Ex::Number).unwrap_or_else(unchanged),
        _ => unchanged(),
    }
}

/// `Factorial[n]` for an integer `n` (`1` when `n <= 0`); anything else stays.
pub fn eval_factorial(e: &Expression, _state: &mut EvalState) -> Ex {
    match e.args() {
        [Ex::Number(Value::Integer(n))] => Ex::big_int(factorial(n)),
        _ => Ex::Expr(e.clone()),
    }
}
