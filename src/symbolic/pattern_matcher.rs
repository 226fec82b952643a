//! # Pattern Matcher Module
//!
//! Decides whether a candidate expression satisfies a pattern and produces the
//! variable bindings of every way it does.
//!
//! ## Main Structures and Functions
//!
//! - **`Binding`**: a named blank binds one expression, a sequence blank a run of operands
//! - **`Bindings`**: name → `Binding`, ordered so that debugging output is stable
//! - `match_with(state, ex, pat, bindings, k)` - continuation-passing search, calls `k`
//!   on every solution until `k` accepts one
//! - `matches(state, ex, pat, bindings)` - first solution, run inside a snapshot of the
//!   definitions table
//! - `is_equal(state, a, b)` - semantic equality with a three-valued answer
//!
//! ## Pattern Forms
//!
//! `Blank[]`/`Blank[h]` (`_`, `_h`), `BlankSequence` (`__`, one or more operands),
//! `BlankNullSequence` (`___`, zero or more), `Pattern[name, p]`, `Condition[p, test]`,
//! `Alternatives[p1, p2, ...]`, `HoldPattern[p]`, `Optional[p]`/`Optional[p, default]`.
//!
//! ## Interesting Code Features
//!
//! 1. **Search, not comparison**: a sequence blank may absorb any number of consecutive
//!    operands, so the matcher backtracks over run lengths when a later operand fails.
//!    Solutions are delivered to a continuation; returning `false` from it asks for the
//!    next solution, which is how an enclosing pattern or a rule condition rejects a
//!    partial match
//! 2. **Commutative matching**: under an `Orderless` head the candidate operands form a
//!    multiset; each pattern operand is tried against every still unused candidate
//!    operand (sequence blanks against every subset), backtracking across assignments
//! 3. **Associative matching**: under a `Flat` head nested terms with the same head are
//!    flattened into the operand list before matching
//! 4. **OneIdentity**: a pattern like `Times[c_., x_]` matches a lone `y` with the
//!    optional operands bound to the head's default value

use crate::symbolic::eval_state::EvalState;
use crate::symbolic::rewrite::substitute;
use crate::symbolic::symbolic_engine::{Ex, Expression};
use itertools::Itertools;
use log::trace;
use std::collections::BTreeMap;

/// Value bound to a pattern name
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    Single(Ex),
    Sequence(Vec<Ex>),
}

impl Binding {
    /// The bound value as one expression; a sequence becomes `Sequence[...]`.
    pub fn to_ex(&self) -> Ex {
        match self {
            Binding::Single(ex) => ex.clone(),
            Binding::Sequence(items) => Ex::call("Sequence", items.clone()),
        }
    }
}

pub type Bindings = BTreeMap<String, Binding>;

/// Continuation receiving each solution; `true` accepts it and stops the search.
pub type MatchCont<'a> = dyn FnMut(&mut EvalState, &Bindings) -> bool + 'a;

////////////////////////////////////////PATTERN BUILDERS////////////////////////////////////////

/// `_`
pub fn blank() -> Ex {
    Ex::call("Blank", vec![])
}

/// `_h`
pub fn typed_blank(head: Ex) -> Ex {
    Ex::call("Blank", vec![head])
}

/// `__`
pub fn blank_seq() -> Ex {
    Ex::call("BlankSequence", vec![])
}

/// `___`
pub fn blank_null_seq() -> Ex {
    Ex::call("BlankNullSequence", vec![])
}

/// `Pattern[Global`name, pat]`
pub fn named(name: &str, pat: Ex) -> Ex {
    Ex::call("Pattern", vec![Ex::global(name), pat])
}

/// `name_`
pub fn pattern(name: &str) -> Ex {
    named(name, blank())
}

/// `name__`
pub fn pattern_seq(name: &str) -> Ex {
    named(name, blank_seq())
}

/// `name___`
pub fn pattern_null_seq(name: &str) -> Ex {
    named(name, blank_null_seq())
}

/// `pat.` - the operand may be absent
pub fn optional(pat: Ex) -> Ex {
    Ex::call("Optional", vec![pat])
}

/// `pat /; test`
pub fn condition(pat: Ex, test: Ex) -> Ex {
    Ex::call("Condition", vec![pat, test])
}

////////////////////////////////////////PATTERN ANALYSIS////////////////////////////////////////

/// Operand pattern able to absorb a run of operands
pub(crate) struct SequenceSpec<'p> {
    name: Option<&'p str>,
    head: Option<&'p Ex>,
    min: usize,
}

pub(crate) fn sequence_spec(pat: &Ex) -> Option<SequenceSpec<'_>> {
    let e = pat.as_expr()?;
    if e.has_head("Pattern") && e.arity() == 2 {
        let name = e.args()[0].symbol_name()?;
        let inner = sequence_spec(&e.args()[1])?;
        if inner.name.is_some() {
            return None;
        }
        return Some(SequenceSpec {
            name: Some(name),
            ..inner
        });
    }
    let min = if e.has_head("BlankSequence") {
        1
    } else if e.has_head("BlankNullSequence") {
        0
    } else {
        return None;
    };
    let head = match e.args() {
        [] => None,
        [h] => Some(h),
        _ => return None,
    };
    Some(SequenceSpec {
        name: None,
        head,
        min,
    })
}

/// Operand pattern that may be absent
pub(crate) struct OptionalSpec<'p> {
    inner: &'p Ex,
    default: Option<&'p Ex>,
}

pub(crate) fn optional_spec(pat: &Ex) -> Option<OptionalSpec<'_>> {
    let e = pat.as_expr()?;
    if !e.has_head("Optional") {
        return None;
    }
    match e.args() {
        [inner] => Some(OptionalSpec {
            inner,
            default: None,
        }),
        [inner, default] => Some(OptionalSpec {
            inner,
            default: Some(default),
        }),
        _ => None,
    }
}

fn pattern_name(pat: &Ex) -> Option<&str> {
    let e = pat.as_expr()?;
    if e.has_head("Pattern") && e.arity() == 2 {
        e.args()[0].symbol_name()
    } else {
        None
    }
}

/// `HoldPattern[p]` → `p`
pub(crate) fn strip_hold_pattern(pat: &Ex) -> &Ex {
    match pat.as_expr() {
        Some(e) if e.has_head("HoldPattern") && e.arity() == 1 => strip_hold_pattern(&e.args()[0]),
        _ => pat,
    }
}

fn head_matches(ex: &Ex, head: &Ex) -> bool {
    match ex {
        Ex::Expr(e) => e.head() == head,
        _ => head
            .symbol_name()
            .is_some_and(|name| ex.head_type_name().as_deref() == Some(name)),
    }
}

fn bind(bindings: &Bindings, name: &str, value: Binding) -> Option<Bindings> {
    match bindings.get(name) {
        // a repeated name must bind identical values
        Some(old) if *old == value => Some(bindings.clone()),
        Some(_) => None,
        None => {
            let mut extended = bindings.clone();
            extended.insert(name.to_string(), value);
            Some(extended)
        }
    }
}

fn bind_optional_default(
    opt: &OptionalSpec,
    head_default: Option<&Ex>,
    bindings: &Bindings,
) -> Option<Bindings> {
    let value = opt.default.or(head_default)?.clone();
    match pattern_name(opt.inner) {
        Some(name) => bind(bindings, name, Binding::Single(value)),
        None => Some(bindings.clone()),
    }
}

/// Substitutes the bindings into `test` and evaluates it.
pub(crate) fn condition_holds(state: &mut EvalState, test: &Ex, bindings: &Bindings) -> bool {
    let instantiated = substitute(test, bindings);
    state.evaluate(&instantiated).is_true()
}

////////////////////////////////////////MATCHING////////////////////////////////////////

/// Continuation-passing matcher: calls `k` with every set of bindings (extending
/// `bindings`) under which `ex` matches `pat`, until `k` returns `true`.
/// Returns whether some solution was accepted.
pub fn match_with(
    state: &mut EvalState,
    ex: &Ex,
    pat: &Ex,
    bindings: &Bindings,
    k: &mut MatchCont<'_>,
) -> bool {
    let p = match pat {
        Ex::Expr(p) => p,
        _ => return ex == pat && k(state, bindings),
    };
    if let Some(spec) = sequence_spec(pat) {
        // a sequence pattern standing for a single expression binds a one-element run
        return bind_run(state, &spec, std::slice::from_ref(ex), bindings, k);
    }
    if p.has_head("Pattern") && p.arity() == 2 {
        if let Some(name) = p.args()[0].symbol_name() {
            return match_with(state, ex, &p.args()[1], bindings, &mut |st, b| {
                match bind(b, name, Binding::Single(ex.clone())) {
                    Some(extended) => k(st, &extended),
                    None => false,
                }
            });
        }
    }
    if p.has_head("Blank") {
        return match p.args() {
            [] => k(state, bindings),
            [head] => head_matches(ex, head) && k(state, bindings),
            _ => false,
        };
    }
    if p.has_head("Condition") && p.arity() == 2 {
        let test = &p.args()[1];
        return match_with(state, ex, &p.args()[0], bindings, &mut |st, b| {
            condition_holds(st, test, b) && k(st, b)
        });
    }
    if p.has_head("Alternatives") {
        for alternative in p.args() {
            if match_with(state, ex, alternative, bindings, k) {
                return true;
            }
        }
        return false;
    }
    if (p.has_head("HoldPattern") && p.arity() == 1) || optional_spec(pat).is_some() {
        return match_with(state, ex, &p.args()[0], bindings, k);
    }

    let structural = match ex {
        Ex::Expr(e) => match_compound(state, e, p, bindings, k),
        _ => false,
    };
    structural || match_one_identity(state, ex, p, bindings, k)
} // fn match_with

fn bind_run(
    state: &mut EvalState,
    spec: &SequenceSpec,
    run: &[Ex],
    bindings: &Bindings,
    k: &mut MatchCont<'_>,
) -> bool {
    if run.len() < spec.min {
        return false;
    }
    if let Some(head) = spec.head {
        if !run.iter().all(|item| head_matches(item, head)) {
            return false;
        }
    }
    match spec.name {
        Some(name) => match bind(bindings, name, Binding::Sequence(run.to_vec())) {
            Some(extended) => k(state, &extended),
            None => false,
        },
        None => k(state, bindings),
    }
}

/// Operands of `e` with nested terms of the same head spliced in.
pub(crate) fn flatten_same_head(e: &Expression) -> Vec<Ex> {
    let mut out = Vec::with_capacity(e.arity());
    for arg in e.args() {
        match arg {
            Ex::Expr(inner) if inner.head() == e.head() => out.extend(flatten_same_head(inner)),
            _ => out.push(arg.clone()),
        }
    }
    out
}

fn match_compound(
    state: &mut EvalState,
    e: &Expression,
    p: &Expression,
    bindings: &Bindings,
    k: &mut MatchCont<'_>,
) -> bool {
    let attrs = state.head_attributes(p.head());
    let head_default = p.head().symbol_name().and_then(|n| state.default_value_of(n));
    let candidates = if attrs.flat && e.head() == p.head() {
        flatten_same_head(e)
    } else {
        e.args().to_vec()
    };
    let patterns = p.args();
    trace!(
        "{}matching {} against {} (orderless: {})",
        state.pre(),
        e,
        p,
        attrs.orderless
    );
    match_with(state, e.head(), p.head(), bindings, &mut |st, b| {
        if attrs.orderless {
            let order = orderless_pattern_order(patterns);
            let mut used = vec![false; candidates.len()];
            match_orderless(st, &candidates, &mut used, &order, head_default.as_ref(), b, k)
        } else {
            match_positional(st, &candidates, patterns, head_default.as_ref(), b, k)
        }
    })
}

/// Left-to-right operand matching with backtracking over sequence run lengths
/// and over the presence of optional operands.
fn match_positional(
    state: &mut EvalState,
    candidates: &[Ex],
    patterns: &[Ex],
    head_default: Option<&Ex>,
    bindings: &Bindings,
    k: &mut MatchCont<'_>,
) -> bool {
    let Some((first, rest)) = patterns.split_first() else {
        return candidates.is_empty() && k(state, bindings);
    };
    if let Some(spec) = sequence_spec(first) {
        for n in spec.min..=candidates.len() {
            let (run, tail) = candidates.split_at(n);
            if bind_run(state, &spec, run, bindings, &mut |st, b| {
                match_positional(st, tail, rest, head_default, b, k)
            }) {
                return true;
            }
        }
        return false;
    }
    if let Some(opt) = optional_spec(first) {
        if let Some((candidate, tail)) = candidates.split_first() {
            if match_with(state, candidate, opt.inner, bindings, &mut |st, b| {
                match_positional(st, tail, rest, head_default, b, k)
            }) {
                return true;
            }
        }
        return match bind_optional_default(&opt, head_default, bindings) {
            Some(b) => match_positional(state, candidates, rest, head_default, &b, k),
            None => false,
        };
    }
    let Some((candidate, tail)) = candidates.split_first() else {
        return false;
    };
    match_with(state, candidate, first, bindings, &mut |st, b| {
        match_positional(st, tail, rest, head_default, b, k)
    })
}

/// Single operand patterns first, then optionals, sequence patterns last.
fn orderless_pattern_order(patterns: &[Ex]) -> Vec<&Ex> {
    let is_seq = |p: &&Ex| sequence_spec(p).is_some();
    let is_opt = |p: &&Ex| optional_spec(p).is_some();
    let mut order: Vec<&Ex> = patterns
        .iter()
        .filter(|p| !is_seq(p) && !is_opt(p))
        .collect();
    order.extend(patterns.iter().filter(is_opt));
    order.extend(patterns.iter().filter(is_seq));
    order
}

/// Multiset matching of `candidates` against `patterns`.
///
/// ## Algorithm
/// `used` marks the candidate operands already consumed. Each single pattern is
/// tried against every unused candidate, each optional pattern against every
/// unused candidate and then as absent, each sequence pattern against every subset
/// of the unused candidates (the last one takes all of them). A solution is complete
/// when all patterns are consumed and no candidate is left over.
fn match_orderless(
    state: &mut EvalState,
    candidates: &[Ex],
    used: &mut Vec<bool>,
    patterns: &[&Ex],
    head_default: Option<&Ex>,
    bindings: &Bindings,
    k: &mut MatchCont<'_>,
) -> bool {
    let Some((first, rest)) = patterns.split_first() else {
        return used.iter().all(|u| *u) && k(state, bindings);
    };
    if let Some(spec) = sequence_spec(first) {
        let free: Vec<usize> = (0..candidates.len()).filter(|i| !used[*i]).collect();
        let sizes: Vec<usize> = if rest.is_empty() {
            vec![free.len()]
        } else {
            (spec.min..=free.len()).collect()
        };
        for size in sizes {
            for chosen in free.iter().copied().combinations(size) {
                let run: Vec<Ex> = chosen.iter().map(|i| candidates[*i].clone()).collect();
                for i in &chosen {
                    used[*i] = true;
                }
                let accepted = bind_run(state, &spec, &run, bindings, &mut |st, b| {
                    match_orderless(st, candidates, used, rest, head_default, b, k)
                });
                for i in &chosen {
                    used[*i] = false;
                }
                if accepted {
                    return true;
                }
            }
        }
        return false;
    }
    let opt = optional_spec(first);
    let inner = opt.as_ref().map(|o| o.inner).unwrap_or(first);
    for i in 0..candidates.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let accepted = match_with(state, &candidates[i], inner, bindings, &mut |st, b| {
            match_orderless(st, candidates, used, rest, head_default, b, k)
        });
        used[i] = false;
        if accepted {
            return true;
        }
    }
    match opt {
        Some(opt) => match bind_optional_default(&opt, head_default, bindings) {
            Some(b) => match_orderless(state, candidates, used, rest, head_default, &b, k),
            None => false,
        },
        None => false,
    }
} // fn match_orderless

/// `OneIdentity` head whose pattern has optional operands and exactly one required
/// operand: the candidate matches the required operand, optionals take defaults.
fn match_one_identity(
    state: &mut EvalState,
    ex: &Ex,
    p: &Expression,
    bindings: &Bindings,
    k: &mut MatchCont<'_>,
) -> bool {
    let Some(name) = p.head().symbol_name() else {
        return false;
    };
    if !state.attributes_of(name).one_identity {
        return false;
    }
    let (optionals, required): (Vec<&Ex>, Vec<&Ex>) =
        p.args().iter().partition(|arg| optional_spec(arg).is_some());
    if optionals.is_empty() || required.len() != 1 {
        return false;
    }
    let head_default = state.default_value_of(name);
    let mut extended = bindings.clone();
    for opt in optionals.iter().filter_map(|o| optional_spec(o)) {
        extended = match bind_optional_default(&opt, head_default.as_ref(), &extended) {
            Some(b) => b,
            None => return false,
        };
    }
    match_with(state, ex, required[0], &extended, k)
}

////////////////////////////////////////ENTRY POINTS////////////////////////////////////////

/// First set of bindings (extending `bindings`) under which `ex` matches `pat`.
/// The search runs inside a snapshot of the definitions table.
pub fn matches(state: &mut EvalState, ex: &Ex, pat: &Ex, bindings: &Bindings) -> Option<Bindings> {
    let mut guard = state.snapshot();
    let mut found = None;
    match_with(&mut guard, ex, pat, bindings, &mut |_, b| {
        found = Some(b.clone());
        true
    });
    found
}

/// Every distinct set of bindings under which `ex` matches `pat`.
pub fn all_matches(state: &mut EvalState, ex: &Ex, pat: &Ex) -> Vec<Bindings> {
    let mut guard = state.snapshot();
    let mut found: Vec<Bindings> = Vec::new();
    match_with(&mut guard, ex, pat, &Bindings::new(), &mut |_, b| {
        if !found.contains(b) {
            found.push(b.clone());
        }
        false
    });
    found
}

pub fn match_q(state: &mut EvalState, ex: &Ex, pat: &Ex) -> bool {
    matches(state, ex, pat, &Bindings::new()).is_some()
}

////////////////////////////////////////SEMANTIC EQUALITY////////////////////////////////////////

/// Three-valued answer of `is_equal`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EqualResult {
    True,
    False,
    Unknown,
}

/// Semantic equality: both sides are evaluated first, numbers compare by value,
/// `True` and `False` exclude each other, operands of an `Orderless` head compare
/// as multisets.
pub fn is_equal(state: &mut EvalState, a: &Ex, b: &Ex) -> EqualResult {
    let a = state.evaluate(a);
    let b = state.evaluate(b);
    equal_evaluated(state, &a, &b)
}

fn equal_evaluated(state: &EvalState, a: &Ex, b: &Ex) -> EqualResult {
    match (a, b) {
        (Ex::Number(x), Ex::Number(y)) => {
            if x.numeric_eq(y) {
                EqualResult::True
            } else {
                EqualResult::False
            }
        }
        (Ex::Symbol(x), Ex::Symbol(y)) => {
            if x == y {
                EqualResult::True
            } else if (a.is_true() && b.is_false()) || (a.is_false() && b.is_true()) {
                EqualResult::False
            } else {
                EqualResult::Unknown
            }
        }
        (Ex::Expr(x), Ex::Expr(y)) => {
            if x.arity() != y.arity() || equal_evaluated(state, x.head(), y.head()) != EqualResult::True {
                return EqualResult::Unknown;
            }
            let all_equal = if state.head_attributes(x.head()).orderless {
                let mut used = vec![false; y.arity()];
                bijection(state, x.args(), y.args(), &mut used)
            } else {
                x.args()
                    .iter()
                    .zip(y.args())
                    .all(|(p, q)| equal_evaluated(state, p, q) == EqualResult::True)
            };
            if all_equal {
                EqualResult::True
            } else {
                EqualResult::Unknown
            }
        }
        _ => EqualResult::Unknown,
    }
}

fn bijection(state: &EvalState, xs: &[Ex], ys: &[Ex], used: &mut Vec<bool>) -> bool {
    let Some((x, rest)) = xs.split_first() else {
        return true;
    };
    for j in 0..ys.len() {
        if used[j] || equal_evaluated(state, x, &ys[j]) != EqualResult::True {
            continue;
        }
        used[j] = true;
        if bijection(state, rest, ys, used) {
            return true;
        }
        used[j] = false;
    }
    false
}
