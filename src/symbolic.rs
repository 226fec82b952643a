#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// the expression tree: numbers, symbols and compound terms `head[args...]`, with
/// canonical ordering and string forms
///# Example#
/// ```
/// use RustedReduce::symbolic::symbolic_engine::Ex;
/// let x = Ex::global("x");
/// let product = Ex::call("Times", vec![Ex::int(2), x]);
/// assert_eq!(product.to_string(), "(2 * x)");
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
/// exact integers, exact rationals and big floats with promotion and normalization
pub mod numeric_tower;
/// per-symbol attribute flags (Orderless, Flat, OneIdentity, Hold family, ...)
pub mod attributes;
/// error type of the fallible surfaces (construction, assignment, configuration)
pub mod eval_errors;
/// session configuration read from a task document
pub mod eval_config;
///______________________________________________________________________________________________________________________________________________
/// # Evaluation session
/// definitions table, built-in registry, snapshots of the definitions
///# Example#
/// ```
/// use RustedReduce::symbolic::eval_state::EvalState;
/// use RustedReduce::symbolic::symbolic_engine::Ex;
/// let mut state = EvalState::new();
/// // 2 * 3.0 is a float: float contagion
/// let product = Ex::call("Times", vec![Ex::int(2), Ex::float(3.0)]);
/// assert_eq!(state.evaluate(&product).to_string(), "6.");
/// ```
/// ______________________________________________________________________________________________________________________________________________
pub mod eval_state;
/// pattern matching with positional, commutative and associative search
pub mod pattern_matcher;
/// rules, substitution and rule application
///# Example#
/// ```
/// use RustedReduce::symbolic::eval_state::EvalState;
/// use RustedReduce::symbolic::pattern_matcher::pattern;
/// use RustedReduce::symbolic::rewrite::{Rule, replace_all};
/// use RustedReduce::symbolic::symbolic_engine::Ex;
/// let mut state = EvalState::new();
/// let f = |arg: Ex| Ex::apply(Ex::global("f"), vec![arg]);
/// let g = |arg: Ex| Ex::apply(Ex::global("g"), vec![arg]);
/// let rule = Rule::new(f(pattern("a")), g(Ex::global("a")));
/// let result = replace_all(&mut state, &f(Ex::int(1)), &[rule]);
/// assert_eq!(result, g(Ex::int(1)));
/// ```
pub mod rewrite;
/// fixed-point evaluation loop
pub mod evaluator;
/// default built-in catalogues: arithmetic, logic, structural, trigonometric
pub mod builtins;

#[cfg(test)]
mod attributes_tests;
#[cfg(test)]
mod pattern_matcher_tests;
#[cfg(test)]
mod rewrite_tests;
