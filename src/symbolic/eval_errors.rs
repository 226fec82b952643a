//! Error type for the fallible surfaces around the rewriting core.
//!
//! Normalization itself never fails: a rule that does not apply, or a numeric
//! built-in that receives an operand it cannot handle, simply returns its input
//! unevaluated. Errors are reserved for construction-time invariants, the
//! assignment interface, configuration and logger set-up.
use std::fmt;

/// Error types for expression construction, assignment and session set-up
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// a compound term must carry at least its head
    EmptyExpression,
    /// rational with a zero denominator
    ZeroDenominator,
    /// attempt to change the definitions of a `Protected` symbol
    ProtectedSymbol(String),
    /// attempt to change the attributes of a `Locked` symbol
    LockedSymbol(String),
    /// attribute name that is not one of the known flags
    UnknownAttribute(String),
    /// malformed configuration document or value
    Config(String),
    /// logger could not be installed
    Logger(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalError::EmptyExpression => write!(f, "Expression must have a head"),
            EvalError::ZeroDenominator => write!(f, "Rational with zero denominator"),
            EvalError::ProtectedSymbol(name) => write!(f, "Symbol {} is Protected", name),
            EvalError::LockedSymbol(name) => write!(f, "Symbol {} is Locked", name),
            EvalError::UnknownAttribute(name) => write!(f, "Unknown attribute: {}", name),
            EvalError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            EvalError::Logger(msg) => write!(f, "Logger initialisation failed: {}", msg),
        }
    }
}

impl std::error::Error for EvalError {}
