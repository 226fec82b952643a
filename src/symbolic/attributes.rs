//! Per-symbol attribute flags.
//!
//! Attributes parameterize how evaluation and matching treat a head: `Orderless`
//! (commutative operands), `Flat` (associative flattening), `OneIdentity`, the
//! `Hold*` family suppressing operand evaluation, and so on. Names convert to and
//! from strings through `strum`.
use crate::symbolic::eval_errors::EvalError;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// One attribute flag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum Attribute {
    Orderless,
    Flat,
    OneIdentity,
    Listable,
    Constant,
    NumericFunction,
    Protected,
    Locked,
    ReadProtected,
    HoldFirst,
    HoldRest,
    HoldAll,
    HoldAllComplete,
    NHoldFirst,
    NHoldRest,
    NHoldAll,
    SequenceHold,
    Temporary,
    Stub,
}

/// Attribute record of a symbol. The default is all flags off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    pub orderless: bool,
    pub flat: bool,
    pub one_identity: bool,
    pub listable: bool,
    pub constant: bool,
    pub numeric_function: bool,
    pub protected: bool,
    pub locked: bool,
    pub read_protected: bool,
    pub hold_first: bool,
    pub hold_rest: bool,
    pub hold_all: bool,
    pub hold_all_complete: bool,
    pub n_hold_first: bool,
    pub n_hold_rest: bool,
    pub n_hold_all: bool,
    pub sequence_hold: bool,
    pub temporary: bool,
    pub stub: bool,
}

impl Attributes {
    pub fn new(flags: &[Attribute]) -> Attributes {
        let mut attrs = Attributes::default();
        for flag in flags {
            attrs.set(*flag, true);
        }
        attrs
    }

    fn slot(&mut self, attribute: Attribute) -> &mut bool {
        match attribute {
            Attribute::Orderless => &mut self.orderless,
            Attribute::Flat => &mut self.flat,
            Attribute::OneIdentity => &mut self.one_identity,
            Attribute::Listable => &mut self.listable,
            Attribute::Constant => &mut self.constant,
            Attribute::NumericFunction => &mut self.numeric_function,
            Attribute::Protected => &mut self.protected,
            Attribute::Locked => &mut self.locked,
            Attribute::ReadProtected => &mut self.read_protected,
            Attribute::HoldFirst => &mut self.hold_first,
            Attribute::HoldRest => &mut self.hold_rest,
            Attribute::HoldAll => &mut self.hold_all,
            Attribute::HoldAllComplete => &mut self.hold_all_complete,
            Attribute::NHoldFirst => &mut self.n_hold_first,
            Attribute::NHoldRest => &mut self.n_hold_rest,
            Attribute::NHoldAll => &mut self.n_hold_all,
            Attribute::SequenceHold => &mut self.sequence_hold,
            Attribute::Temporary => &mut self.temporary,
            Attribute::Stub => &mut self.stub,
        }
    }

    pub fn get(&self, attribute: Attribute) -> bool {
        let mut copy = *self;
        *copy.slot(attribute)
    }

    pub fn set(&mut self, attribute: Attribute, value: bool) {
        *self.slot(attribute) = value;
    }

    /// Parses attribute names; an unknown name is an error.
    pub fn from_names(names: &[&str]) -> Result<Attributes, EvalError> {
        let mut attrs = Attributes::default();
        for name in names {
            let flag = Attribute::from_str(name)
                .map_err(|_| EvalError::UnknownAttribute(name.to_string()))?;
            attrs.set(flag, true);
        }
        Ok(attrs)
    }

    /// Names of the flags that are on, sorted.
    pub fn to_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Attribute::iter()
            .filter(|a| self.get(*a))
            .map(|a| a.to_string())
            .collect();
        names.sort();
        names
    }

    /// Whether operand `index` (1-based) is held from evaluation.
    pub fn holds_operand(&self, index: usize) -> bool {
        if self.hold_all || self.hold_all_complete {
            return true;
        }
        if index == 1 { self.hold_first } else { self.hold_rest }
    }

    /// `Sequence[...]` operands are left in place instead of being spliced
    pub fn keeps_sequences(&self) -> bool {
        self.sequence_hold || self.hold_all_complete
    }
}
