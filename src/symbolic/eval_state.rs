//! # Evaluation State Module
//!
//! The session object every evaluation call receives by `&mut` reference.
//!
//! ## Main Structures
//!
//! - **`EvalState`**: symbol definitions table (own value, down values, attributes,
//!   default value per fully qualified name), the registry of native built-in
//!   evaluators keyed by head name, the session configuration and the current
//!   evaluation depth
//! - **`Definition`**: everything the session knows about one symbol
//! - **`BuiltinDefinition`**: what an external catalogue installs for a head
//! - **`SnapshotGuard`**: scoped snapshot of the definitions table, restored on drop
//!
//! ## Interesting Code Features
//!
//! 1. **Copy-on-write table**: definitions live behind an `Rc`; taking a snapshot is a
//!    reference-count bump and the first write after it copies the table
//!    (`Rc::make_mut`)
//! 2. **Guaranteed restore**: `SnapshotGuard` restores the saved table in `Drop`, so
//!    every exit path of a speculative match (success, failure, early return) rolls
//!    back whatever was assigned meanwhile
//! 3. **Open dispatch**: built-in evaluators are plain `fn` pointers looked up by the
//!    head's name, so catalogues outside this module extend the engine by registering

use crate::symbolic::attributes::{Attribute, Attributes};
use crate::symbolic::eval_config::EvalConfig;
use crate::symbolic::eval_errors::EvalError;
use crate::symbolic::rewrite::Rule;
use crate::symbolic::symbolic_engine::{Ex, Expression, Form, SYSTEM_CONTEXT, StringFormParams};
use log::debug;
use rustc_hash::FxHashMap;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// Native evaluator of a head. Returns its argument unchanged when no rule applies.
pub type BuiltinFn = fn(&Expression, &mut EvalState) -> Ex;

/// Definitions attached to one symbol
#[derive(Clone, Debug, Default)]
pub struct Definition {
    pub own_value: Option<Ex>,
    pub down_values: Vec<Rule>,
    pub attributes: Attributes,
    /// value bound by `Optional` patterns under this head
    pub default_expr: Option<Ex>,
}

type DefMap = FxHashMap<String, Definition>;

/// What a built-in catalogue installs for one ``System` `` head.
#[derive(Clone, Debug)]
pub struct BuiltinDefinition {
    /// short name, the ``System` `` context is added on registration
    pub name: &'static str,
    pub attributes: Vec<Attribute>,
    pub default_expr: Option<Ex>,
    pub evaluator: Option<BuiltinFn>,
}

impl BuiltinDefinition {
    pub fn new(name: &'static str, attributes: &[Attribute]) -> BuiltinDefinition {
        BuiltinDefinition {
            name,
            attributes: attributes.to_vec(),
            default_expr: None,
            evaluator: None,
        }
    }

    pub fn with_evaluator(mut self, evaluator: BuiltinFn) -> BuiltinDefinition {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn with_default(mut self, default_expr: Ex) -> BuiltinDefinition {
        self.default_expr = Some(default_expr);
        self
    }
}

pub struct EvalState {
    defs: Rc<DefMap>,
    builtins: FxHashMap<String, BuiltinFn>,
    config: EvalConfig,
    depth: usize,
}

impl EvalState {
    /// Session with the default configuration and the default built-in catalogues.
    pub fn new() -> EvalState {
        EvalState::with_config(EvalConfig::default())
    }

    pub fn with_config(config: EvalConfig) -> EvalState {
        let mut state = EvalState::empty(config);
        crate::symbolic::builtins::install_default_builtins(&mut state);
        state
    }

    /// Session without any built-in definitions.
    pub fn empty(config: EvalConfig) -> EvalState {
        EvalState {
            defs: Rc::new(DefMap::default()),
            builtins: FxHashMap::default(),
            config,
            depth: 0,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    ////////////////////////////////////////REGISTRATION////////////////////////////////////////

    /// Installs a built-in head. Registration bypasses `Protected`/`Locked`.
    pub fn register(&mut self, builtin: BuiltinDefinition) {
        let name = format!("{}{}", SYSTEM_CONTEXT, builtin.name);
        debug!("registering built-in {}", name);
        if let Some(evaluator) = builtin.evaluator {
            self.builtins.insert(name.clone(), evaluator);
        }
        let def = self.definition_mut(&name);
        def.attributes = Attributes::new(&builtin.attributes);
        def.default_expr = builtin.default_expr;
    }

    pub fn builtin(&self, name: &str) -> Option<BuiltinFn> {
        self.builtins.get(name).copied()
    }

    ////////////////////////////////////////LOOKUP////////////////////////////////////////

    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.defs.get(name)
    }

    /// All flags off for an unknown symbol.
    pub fn attributes_of(&self, name: &str) -> Attributes {
        self.defs
            .get(name)
            .map(|def| def.attributes)
            .unwrap_or_default()
    }

    /// Attributes of a head; a non-symbol head has none.
    pub fn head_attributes(&self, head: &Ex) -> Attributes {
        match head.symbol_name() {
            Some(name) => self.attributes_of(name),
            None => Attributes::default(),
        }
    }

    pub fn default_value_of(&self, name: &str) -> Option<Ex> {
        self.defs.get(name).and_then(|def| def.default_expr.clone())
    }

    pub fn own_value(&self, name: &str) -> Option<Ex> {
        self.defs.get(name).and_then(|def| def.own_value.clone())
    }

    pub fn down_values(&self, name: &str) -> Vec<Rule> {
        self.defs
            .get(name)
            .map(|def| def.down_values.clone())
            .unwrap_or_default()
    }

    /// true when the symbol carries an own value or rules
    pub fn is_defined(&self, name: &str) -> bool {
        self.defs
            .get(name)
            .map(|def| def.own_value.is_some() || !def.down_values.is_empty())
            .unwrap_or(false)
    }

    ////////////////////////////////////////ASSIGNMENT////////////////////////////////////////

    fn definition_mut(&mut self, name: &str) -> &mut Definition {
        Rc::make_mut(&mut self.defs)
            .entry(name.to_string())
            .or_default()
    }

    fn check_writable(&self, name: &str) -> Result<(), EvalError> {
        if self.attributes_of(name).protected {
            return Err(EvalError::ProtectedSymbol(name.to_string()));
        }
        Ok(())
    }

    /// `name = value`
    pub fn set_own_value(&mut self, name: &str, value: Ex) -> Result<(), EvalError> {
        self.check_writable(name)?;
        self.definition_mut(name).own_value = Some(value);
        Ok(())
    }

    /// Appends a rule to `name`'s down values; a rule with an identical left-hand
    /// side and condition replaces the old one in place.
    pub fn add_down_value(&mut self, name: &str, rule: Rule) -> Result<(), EvalError> {
        self.check_writable(name)?;
        let def = self.definition_mut(name);
        match def
            .down_values
            .iter_mut()
            .find(|old| old.lhs == rule.lhs && old.condition == rule.condition)
        {
            Some(old) => *old = rule,
            None => def.down_values.push(rule),
        }
        Ok(())
    }

    pub fn set_attributes(&mut self, name: &str, attributes: Attributes) -> Result<(), EvalError> {
        if self.attributes_of(name).locked {
            return Err(EvalError::LockedSymbol(name.to_string()));
        }
        self.definition_mut(name).attributes = attributes;
        Ok(())
    }

    pub fn set_default_value(&mut self, name: &str, value: Ex) -> Result<(), EvalError> {
        self.check_writable(name)?;
        self.definition_mut(name).default_expr = Some(value);
        Ok(())
    }

    /// Removes the own value and the rules of `name`; attributes stay.
    pub fn clear(&mut self, name: &str) -> Result<(), EvalError> {
        self.check_writable(name)?;
        if self.defs.contains_key(name) {
            let def = self.definition_mut(name);
            def.own_value = None;
            def.down_values.clear();
        }
        Ok(())
    }

    ////////////////////////////////////////SNAPSHOTS////////////////////////////////////////

    /// Takes a snapshot of the definitions table; it is restored when the guard drops.
    pub fn snapshot(&mut self) -> SnapshotGuard<'_> {
        let saved = Rc::clone(&self.defs);
        SnapshotGuard { state: self, saved }
    }

    ////////////////////////////////////////DEPTH & PRINTING////////////////////////////////////////

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enters one nesting level; `false` when the recursion limit is reached.
    pub(crate) fn enter(&mut self) -> bool {
        if self.depth >= self.config.max_recursion_depth {
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// indentation prefix for trace output
    pub fn pre(&self) -> String {
        " ".repeat(self.depth * 2)
    }

    /// Rendering with the session's context and context path.
    pub fn string_form(&self, ex: &Ex, form: Form) -> String {
        let params = StringFormParams {
            form,
            context: &self.config.context,
            context_path: &self.config.context_path,
        };
        ex.string_form(&params)
    }
}

impl Default for EvalState {
    fn default() -> Self {
        EvalState::new()
    }
}

/// Scoped snapshot of the definitions table. Dereferences to the session, so
/// speculative work runs through the guard.
pub struct SnapshotGuard<'a> {
    state: &'a mut EvalState,
    saved: Rc<DefMap>,
}

impl Deref for SnapshotGuard<'_> {
    type Target = EvalState;
    fn deref(&self) -> &EvalState {
        self.state
    }
}

impl DerefMut for SnapshotGuard<'_> {
    fn deref_mut(&mut self) -> &mut EvalState {
        self.state
    }
}

impl Drop for SnapshotGuard<'_> {
    fn drop(&mut self) {
        self.state.defs = Rc::clone(&self.saved);
    }
}
