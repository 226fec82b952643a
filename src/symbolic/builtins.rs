//! Default built-in catalogues. Each submodule exposes `definitions()`, the list of
//! heads it installs; `install_default_builtins` registers all of them.
use crate::symbolic::eval_state::{BuiltinDefinition, EvalState};

/// Plus, Times, Power, Factorial
pub mod arithmetic;
/// True/False, SameQ, UnsameQ, Equal, Not, And, Or
pub mod logic;
/// List, Sequence, the Hold family, pattern heads, rules and rule application, assignment
pub mod structural;
/// Sin, Cos, Tan on exactly representable floats
pub mod trig;

pub fn default_definitions() -> Vec<BuiltinDefinition> {
    let mut all = arithmetic::definitions();
    all.extend(logic::definitions());
    all.extend(structural::definitions());
    all.extend(trig::definitions());
    all
}

pub fn install_default_builtins(state: &mut EvalState) {
    for builtin in default_definitions() {
        state.register(builtin);
    }
}
