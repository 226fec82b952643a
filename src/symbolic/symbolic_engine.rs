//! # Symbolic Engine Module
//!
//! This module provides the expression tree every other part of the rewriting core works on:
//! numeric leaves, interned-by-name symbols and compound terms headed by an arbitrary
//! sub-expression.
//!
//! ## Main Structures and Methods
//!
//! ### `Ex` Enum
//! The core symbolic expression type:
//! - **Symbols**: `Symbol` - fully qualified names like ``Global`x`` or ``System`Times``
//! - **Numbers**: `Number(Value)` - exact integers, exact rationals and big floats
//! - **Compound terms**: `Expr(Expression)` - `head[arg1, arg2, ...]`
//!
//! ### Key Methods
//! - `Ex::global(name)`, `Ex::system(name)` - create symbols in the user/system context
//! - `Ex::call(head, args)` - create `System` headed compound terms, e.g. `Times[a, b]`
//! - `hash_value()` - structural hash (symbols cache theirs)
//! - `string_form(params)` - `InputForm`/`FullForm` rendering with context shortening
//! - `canonical_order(a, b)` - total order used to sort Orderless operands
//!
//! ## Interesting Code Features
//!
//! 1. **Owned trees**: every node is uniquely owned by its parent, so `Clone` is the
//!    deep copy taken whenever a sub-tree is spliced into a rule replacement
//!
//! 2. **Non-empty compound terms**: an `Expression` always has a head, enforced by its
//!    constructors (`Expression::from_parts` rejects an empty part list)
//!
//! 3. **Lazy symbol hash**: a symbol hashes (salt ++ name) at most once per instance

use crate::symbolic::eval_errors::EvalError;
use crate::symbolic::numeric_tower::Value;
use itertools::Itertools;
use num::BigInt;
use rustc_hash::FxHasher;
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// context of built-in symbols
pub const SYSTEM_CONTEXT: &str = "System`";
/// context of user symbols
pub const GLOBAL_CONTEXT: &str = "Global`";

const SYMBOL_SALT: [u8; 8] = [61, 19, 211, 7, 150, 42, 88, 233];

/// Symbol identified by its fully qualified name.
///
/// The name is immutable after construction, so the cached hash is never invalidated.
#[derive(Clone, Debug)]
pub struct Symbol {
    name: Rc<str>,
    cached_hash: OnceCell<u64>,
}

impl Symbol {
    pub fn new(name: &str) -> Symbol {
        Symbol {
            name: Rc::from(name),
            cached_hash: OnceCell::new(),
        }
    }

    /// Symbol in the ``System` `` context
    pub fn system(name: &str) -> Symbol {
        Symbol::new(&format!("{}{}", SYSTEM_CONTEXT, name))
    }

    /// Symbol in the ``Global` `` context
    pub fn global(name: &str) -> Symbol {
        Symbol::new(&format!("{}{}", GLOBAL_CONTEXT, name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// name without its context prefix
    pub fn short_name(&self) -> &str {
        match self.name.rfind('`') {
            Some(pos) => &self.name[pos + 1..],
            None => &self.name,
        }
    }

    pub fn hash_value(&self) -> u64 {
        *self.cached_hash.get_or_init(|| {
            let mut h = FxHasher::default();
            h.write(&SYMBOL_SALT);
            h.write(self.name.as_bytes());
            h.finish()
        })
    }

    /// Rendering of the name, shortened by the active context or by the first
    /// matching entry of the context path.
    pub fn string_form(&self, params: &StringFormParams) -> String {
        if self.name.is_empty() {
            return "<EMPTYSYM>".to_string();
        }
        if let Some(rest) = self.name.strip_prefix(params.context) {
            return rest.to_string();
        }
        for path in params.context_path {
            if let Some(rest) = self.name.strip_prefix(path.as_str()) {
                return rest.to_string();
            }
        }
        self.name.to_string()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

/// Compound term `head[args...]`. Part 0 is the head and always exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Expression {
    parts: Vec<Ex>,
}

impl Expression {
    pub fn new(head: Ex, args: Vec<Ex>) -> Expression {
        let mut parts = Vec::with_capacity(args.len() + 1);
        parts.push(head);
        parts.extend(args);
        Expression { parts }
    }

    /// Builds a term from its raw part list; the list must contain the head.
    pub fn from_parts(parts: Vec<Ex>) -> Result<Expression, EvalError> {
        if parts.is_empty() {
            return Err(EvalError::EmptyExpression);
        }
        Ok(Expression { parts })
    }

    pub fn head(&self) -> &Ex {
        &self.parts[0]
    }

    pub fn args(&self) -> &[Ex] {
        &self.parts[1..]
    }

    pub fn parts(&self) -> &[Ex] {
        &self.parts
    }

    /// number of operands (the head is not counted)
    pub fn arity(&self) -> usize {
        self.parts.len() - 1
    }

    /// Splits the term into its head and operand list.
    pub fn into_parts(self) -> (Ex, Vec<Ex>) {
        let mut iter = self.parts.into_iter();
        // construction guarantees the head
        let head = iter.next().unwrap_or_else(|| Ex::system("Null"));
        (head, iter.collect())
    }

    /// full name of the head when the head is a symbol
    pub fn head_name(&self) -> Option<&str> {
        self.head().symbol_name()
    }

    /// true when the head is the ``System` `` symbol `name`
    pub fn has_head(&self, name: &str) -> bool {
        match self.head() {
            Ex::Symbol(s) => s.name().strip_prefix(SYSTEM_CONTEXT) == Some(name),
            _ => false,
        }
    }

    /// same head, new operands
    pub fn with_args(&self, args: Vec<Ex>) -> Expression {
        Expression::new(self.head().clone(), args)
    }
}

/// Core symbolic expression enum
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ex {
    /// symbol such as ``Global`x``
    Symbol(Symbol),
    /// exact or floating numeric leaf
    Number(Value),
    /// compound term `head[args...]`
    Expr(Expression),
}

impl Ex {
    /// BASIC FEATURES

    /// Symbol with a fully qualified name.
    pub fn sym(name: &str) -> Ex {
        Ex::Symbol(Symbol::new(name))
    }

    pub fn system(name: &str) -> Ex {
        Ex::Symbol(Symbol::system(name))
    }

    pub fn global(name: &str) -> Ex {
        Ex::Symbol(Symbol::global(name))
    }

    pub fn int(n: i64) -> Ex {
        Ex::Number(Value::int(n))
    }

    pub fn big_int(n: BigInt) -> Ex {
        Ex::Number(Value::Integer(n))
    }

    /// Float leaf. Non-finite machine values map to the symbolic
    /// `Indeterminate` / `DirectedInfinity[±1]`.
    pub fn float(v: f64) -> Ex {
        match Value::float(v) {
            Some(value) => Ex::Number(value),
            None if v.is_nan() => Ex::system("Indeterminate"),
            None => {
                let direction = if v > 0.0 { 1 } else { -1 };
                Ex::call("DirectedInfinity", vec![Ex::int(direction)])
            }
        }
    }

    /// Normalized rational leaf `n/d` (collapses to an integer when `d | n`).
    pub fn rational(n: i64, d: i64) -> Result<Ex, EvalError> {
        Value::rational(BigInt::from(n), BigInt::from(d)).map(Ex::Number)
    }

    /// `System` headed compound term
    pub fn call(head: &str, args: Vec<Ex>) -> Ex {
        Ex::Expr(Expression::new(Ex::system(head), args))
    }

    /// compound term with an arbitrary head
    pub fn apply(head: Ex, args: Vec<Ex>) -> Ex {
        Ex::Expr(Expression::new(head, args))
    }

    pub fn list(items: Vec<Ex>) -> Ex {
        Ex::call("List", items)
    }

    pub fn bool(value: bool) -> Ex {
        if value { Ex::system("True") } else { Ex::system("False") }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Ex::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Value> {
        match self {
            Ex::Number(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_expr(&self) -> Option<&Expression> {
        match self {
            Ex::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn symbol_name(&self) -> Option<&str> {
        self.as_symbol().map(Symbol::name)
    }

    /// compound term with the ``System` `` head `name`
    pub fn is_call(&self, name: &str) -> bool {
        matches!(self, Ex::Expr(e) if e.has_head(name))
    }

    /// ``System` `` symbol `name`
    pub fn is_system_symbol(&self, name: &str) -> bool {
        matches!(self, Ex::Symbol(s) if s.name().strip_prefix(SYSTEM_CONTEXT) == Some(name))
    }

    pub fn is_true(&self) -> bool {
        self.is_system_symbol("True")
    }

    pub fn is_false(&self) -> bool {
        self.is_system_symbol("False")
    }

    pub fn is_atom(&self) -> bool {
        !matches!(self, Ex::Expr(_))
    }

    /// Full name of the head this node reports to head-typed blanks:
    /// ``System`Integer``/``Rational``/``Real`` for numbers, ``System`Symbol`` for
    /// symbols, the head symbol's name for compound terms.
    pub fn head_type_name(&self) -> Option<String> {
        match self {
            Ex::Number(v) => Some(format!("{}{}", SYSTEM_CONTEXT, v.head_name())),
            Ex::Symbol(_) => Some(format!("{}Symbol", SYSTEM_CONTEXT)),
            Ex::Expr(e) => e.head_name().map(str::to_string),
        }
    }

    /// Structural hash of the whole tree.
    pub fn hash_value(&self) -> u64 {
        let mut h = FxHasher::default();
        self.hash(&mut h);
        h.finish()
    }

    pub fn string_form(&self, params: &StringFormParams) -> String {
        match self {
            Ex::Symbol(s) => s.string_form(params),
            Ex::Number(v) => number_string_form(v, params.form),
            Ex::Expr(e) => expression_string_form(e, params),
        }
    }
}

/// True when `name` occurs anywhere in `ex` as a symbol.
pub fn contains_symbol(ex: &Ex, name: &str) -> bool {
    match ex {
        Ex::Symbol(s) => s.name() == name,
        Ex::Number(_) => false,
        Ex::Expr(e) => e.parts().iter().any(|part| contains_symbol(part, name)),
    }
}

////////////////////////////////////////CANONICAL ORDER////////////////////////////////////////

fn kind_rank(ex: &Ex) -> u8 {
    match ex {
        Ex::Number(_) => 0,
        Ex::Symbol(_) => 1,
        Ex::Expr(_) => 2,
    }
}

/// Total order on expressions: numbers by value (exact before float on ties), then
/// symbols by short name, then compound terms by head, operand count and operands.
pub fn canonical_order(a: &Ex, b: &Ex) -> Ordering {
    match (a, b) {
        (Ex::Number(x), Ex::Number(y)) => x
            .cmp_numeric(y)
            .then_with(|| x.rank().cmp(&y.rank()))
            .then_with(|| x.to_string().cmp(&y.to_string())),
        (Ex::Symbol(x), Ex::Symbol(y)) => x
            .short_name()
            .cmp(y.short_name())
            .then_with(|| x.name().cmp(y.name())),
        (Ex::Expr(x), Ex::Expr(y)) => canonical_order(x.head(), y.head())
            .then_with(|| x.arity().cmp(&y.arity()))
            .then_with(|| {
                x.args()
                    .iter()
                    .zip(y.args())
                    .map(|(p, q)| canonical_order(p, q))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            }),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

////////////////////////////////////////STRING FORMS////////////////////////////////////////

/// Display form of the canonical string rendering
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString)]
pub enum Form {
    InputForm,
    FullForm,
}

/// Parameters of `string_form`: the form, the active context and the context search path.
#[derive(Clone, Copy, Debug)]
pub struct StringFormParams<'a> {
    pub form: Form,
    pub context: &'a str,
    pub context_path: &'a [String],
}

fn number_string_form(v: &Value, form: Form) -> String {
    match (v, form) {
        (Value::Rational(r), Form::FullForm) => format!("Rational[{}, {}]", r.numer(), r.denom()),
        _ => v.to_string(),
    }
}

fn join_args(args: &[Ex], params: &StringFormParams, sep: &str) -> String {
    args.iter().map(|a| a.string_form(params)).join(sep)
}

fn blank_suffix(blank: &Ex, params: &StringFormParams) -> Option<String> {
    let e = blank.as_expr()?;
    let underscores = if e.has_head("Blank") {
        "_"
    } else if e.has_head("BlankSequence") {
        "__"
    } else if e.has_head("BlankNullSequence") {
        "___"
    } else {
        return None;
    };
    match e.args() {
        [] => Some(underscores.to_string()),
        [h] => Some(format!("{}{}", underscores, h.string_form(params))),
        _ => None,
    }
}

fn expression_string_form(e: &Expression, params: &StringFormParams) -> String {
    if params.form == Form::InputForm {
        let args = e.args();
        if (e.has_head("Plus") || e.has_head("Times")) && args.len() > 1 {
            let sep = if e.has_head("Plus") { " + " } else { " * " };
            return format!("({})", join_args(args, params, sep));
        }
        if e.has_head("Power") && args.len() == 2 {
            return format!("{}^{}", args[0].string_form(params), args[1].string_form(params));
        }
        if e.has_head("Rule") && args.len() == 2 {
            return format!("{} -> {}", args[0].string_form(params), args[1].string_form(params));
        }
        if e.has_head("RuleDelayed") && args.len() == 2 {
            return format!("{} :> {}", args[0].string_form(params), args[1].string_form(params));
        }
        if e.has_head("List") {
            return format!("{{{}}}", join_args(args, params, ", "));
        }
        if let Some(suffix) = blank_suffix(&Ex::Expr(e.clone()), params) {
            return suffix;
        }
        if e.has_head("Pattern") && args.len() == 2 {
            if let (Ex::Symbol(name), Some(suffix)) = (&args[0], blank_suffix(&args[1], params)) {
                return format!("{}{}", name.string_form(params), suffix);
            }
        }
    }
    format!(
        "{}[{}]",
        e.head().string_form(params),
        join_args(e.args(), params, ", ")
    )
}

impl fmt::Display for Ex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let context_path = vec![SYSTEM_CONTEXT.to_string()];
        let params = StringFormParams {
            form: Form::InputForm,
            context: GLOBAL_CONTEXT,
            context_path: &context_path,
        };
        write!(f, "{}", self.string_form(&params))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", Ex::Expr(self.clone()))
    }
}

impl From<Value> for Ex {
    fn from(v: Value) -> Self {
        Ex::Number(v)
    }
}

impl From<Symbol> for Ex {
    fn from(s: Symbol) -> Self {
        Ex::Symbol(s)
    }
}

impl From<Expression> for Ex {
    fn from(e: Expression) -> Self {
        Ex::Expr(e)
    }
}

/// Macro creating `Global` symbols named after the identifiers
/// Usage: let (x, y) = globals!(x, y);
#[macro_export]
macro_rules! globals {
    ($($var:ident),+ $(,)?) => {
        ($($crate::symbolic::symbolic_engine::Ex::global(stringify!($var))),+)
    };
}
