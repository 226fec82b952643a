//! # Numeric Tower Module
//!
//! Exact and arbitrary-precision numeric leaves of the expression tree.
//!
//! ## Main Structures
//!
//! - **`Value`**: `Integer` (arbitrary-precision, `num::BigInt`), `Rational`
//!   (`num::BigRational`), `Float` (`BigFloat`, a binary arbitrary-precision float)
//! - **`BigFloat`**: wrapper around `dashu::float::FBig` which records whether the
//!   value converts to a machine `f64` exactly (`Accuracy`)
//!
//! ## Promotion Rules
//!
//! `Integer` < `Rational` < `Float`. Integer arithmetic is exact and never
//! overflows. As soon as a `Float` takes part in an operation the other operand is
//! converted to `Float` (exact for integers, lossy for rationals) and the result
//! stays floating even when it is numerically integral ("float contagion").
//!
//! A `Rational` is never reduced implicitly on construction through
//! `Value::rational_raw`, but every arithmetic result is normalized: the fraction is
//! reduced and a fraction with unit denominator collapses to `Integer`.

use crate::symbolic::eval_errors::EvalError;
use dashu::base::Approximation;
use dashu::float::FBig;
use dashu::integer::{IBig, UBig};
use num::bigint::Sign;
use num::{BigInt, BigRational};
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Working precision (bits) used when an exact value is promoted to a float.
pub const FLOAT_PRECISION_BITS: usize = 64;

/// Largest result, in bits, an exact power is expanded to. Beyond it the power
/// stays symbolic.
pub const MAX_POWER_BITS: u64 = 1 << 24;

/// Whether a float converts to a machine `f64` without rounding
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accuracy {
    Exact,
    Inexact,
}

/// Arbitrary-precision binary floating value.
#[derive(Clone, Debug)]
pub struct BigFloat {
    repr: FBig,
}

fn to_ibig(n: &BigInt) -> IBig {
    let (sign, bytes) = n.to_bytes_le();
    let magnitude = IBig::from(UBig::from_le_bytes(&bytes));
    if sign == Sign::Minus { -magnitude } else { magnitude }
}

impl BigFloat {
    /// Exact conversion of a machine float. Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<BigFloat> {
        if !value.is_finite() {
            return None;
        }
        FBig::try_from(value).ok().map(|repr| BigFloat { repr })
    }

    /// Exact conversion of an integer; the precision grows with the integer.
    pub fn from_integer(n: &BigInt) -> BigFloat {
        let bits = (n.bits() as usize).max(FLOAT_PRECISION_BITS);
        let repr = FBig::from(to_ibig(n)).with_precision(bits).value();
        BigFloat { repr }
    }

    /// Lossy conversion of a fraction at working precision.
    pub fn from_rational(r: &BigRational) -> BigFloat {
        let numer = BigFloat::from_integer(r.numer());
        let denom = BigFloat::from_integer(r.denom());
        BigFloat {
            repr: &numer.repr / &denom.repr,
        }
    }

    pub fn zero() -> BigFloat {
        BigFloat { repr: FBig::ZERO }
    }

    pub fn add(&self, other: &BigFloat) -> BigFloat {
        BigFloat {
            repr: &self.repr + &other.repr,
        }
    }

    pub fn mul(&self, other: &BigFloat) -> BigFloat {
        BigFloat {
            repr: &self.repr * &other.repr,
        }
    }

    /// `1/self`, `None` for zero
    pub fn recip(&self) -> Option<BigFloat> {
        if self.is_zero() {
            return None;
        }
        let one = BigFloat::from_integer(&BigInt::one());
        Some(BigFloat {
            repr: &one.repr / &self.repr,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.repr.repr().is_zero()
    }

    pub fn precision(&self) -> usize {
        self.repr.precision()
    }

    /// Nearest machine float (rounded when the value is not representable).
    pub fn to_f64(&self) -> f64 {
        self.repr.to_f64().value()
    }

    /// The machine float only when the conversion loses nothing.
    pub fn to_exact_f64(&self) -> Option<f64> {
        match self.repr.to_f64() {
            Approximation::Exact(v) => Some(v),
            Approximation::Inexact(..) => None,
        }
    }

    pub fn accuracy(&self) -> Accuracy {
        match self.to_exact_f64() {
            Some(_) => Accuracy::Exact,
            None => Accuracy::Inexact,
        }
    }

    /// `self^exp` for a non-negative integer exponent, by repeated squaring.
    pub fn powu(&self, exp: u32) -> BigFloat {
        let mut result = BigFloat::from_integer(&BigInt::one());
        let mut base = self.clone();
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result = result.mul(&base);
            }
            base = base.mul(&base);
            e >>= 1;
        }
        result
    }
}

impl PartialEq for BigFloat {
    fn eq(&self, other: &Self) -> bool {
        self.repr == other.repr
    }
}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.repr.partial_cmp(&other.repr)
    }
}

impl Hash for BigFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let repr = self.repr.repr();
        repr.significand().hash(state);
        repr.exponent().hash(state);
    }
}

impl fmt::Display for BigFloat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let v = self.to_f64();
        if !v.is_finite() {
            // outside the f64 range: print the decimal expansion of the value itself
            return write!(f, "{}", self.repr.clone().with_base::<10>().value());
        }
        // integral floats keep a trailing dot so they never read as integers
        if v.fract() == 0.0 && v.abs() < 1e16 {
            write!(f, "{}.", v)
        } else {
            write!(f, "{}", v)
        }
    }
}

/// Numeric leaf of the expression tree
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// arbitrary-precision signed integer
    Integer(BigInt),
    /// numerator/denominator pair, denominator never zero
    Rational(BigRational),
    /// arbitrary-precision binary float
    Float(BigFloat),
}

impl Value {
    pub fn int(n: i64) -> Value {
        Value::Integer(BigInt::from(n))
    }

    pub fn float(v: f64) -> Option<Value> {
        BigFloat::from_f64(v).map(Value::Float)
    }

    /// Stores `numerator/denominator` as given, without reduction.
    pub fn rational_raw(numerator: BigInt, denominator: BigInt) -> Result<Value, EvalError> {
        if denominator.is_zero() {
            return Err(EvalError::ZeroDenominator);
        }
        Ok(Value::Rational(BigRational::new_raw(numerator, denominator)))
    }

    /// Builds a normalized rational: reduced, and collapsed to `Integer`
    /// when the denominator divides the numerator.
    pub fn rational(numerator: BigInt, denominator: BigInt) -> Result<Value, EvalError> {
        Value::rational_raw(numerator, denominator).map(Value::normalize)
    }

    /// Tightest representation of the value. Only rationals change.
    pub fn normalize(self) -> Value {
        match self {
            Value::Rational(r) => {
                let reduced = BigRational::new(r.numer().clone(), r.denom().clone());
                from_ratio(reduced)
            }
            other => other,
        }
    }

    /// position in the promotion order `Integer < Rational < Float`
    pub fn rank(&self) -> u8 {
        match self {
            Value::Integer(_) => 0,
            Value::Rational(_) => 1,
            Value::Float(_) => 2,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_exact(&self) -> bool {
        !self.is_float()
    }

    /// Numerically zero, in any representation.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Integer(n) => n.is_zero(),
            Value::Rational(r) => r.is_zero(),
            Value::Float(f) => f.is_zero(),
        }
    }

    /// literal exact integer `1`
    pub fn is_one(&self) -> bool {
        matches!(self, Value::Integer(n) if n.is_one())
    }

    /// literal exact integer `-1`
    pub fn is_minus_one(&self) -> bool {
        matches!(self, Value::Integer(n) if *n == -BigInt::one())
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Floating image of the value: exact for integers, lossy for rationals.
    pub fn to_float(&self) -> BigFloat {
        match self {
            Value::Integer(n) => BigFloat::from_integer(n),
            Value::Rational(r) => BigFloat::from_rational(r),
            Value::Float(f) => f.clone(),
        }
    }

    fn to_ratio(&self) -> Option<BigRational> {
        match self {
            Value::Integer(n) => Some(BigRational::from_integer(n.clone())),
            Value::Rational(r) => Some(r.clone()),
            Value::Float(_) => None,
        }
    }

    /// Sum of two values in the tightest representation.
    pub fn add(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Value::Integer(a + b),
            _ => match (self.to_ratio(), other.to_ratio()) {
                (Some(a), Some(b)) => from_ratio(a + b),
                _ => Value::Float(self.to_float().add(&other.to_float())),
            },
        }
    }

    /// Product of two values in the tightest representation.
    pub fn mul(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Value::Integer(a * b),
            _ => match (self.to_ratio(), other.to_ratio()) {
                (Some(a), Some(b)) => from_ratio(a * b),
                _ => Value::Float(self.to_float().mul(&other.to_float())),
            },
        }
    }

    /// `self^exp` for an integer exponent. Exact values only take non-negative
    /// exponents; floats also take negative ones. `None` when the power is left
    /// symbolic or the exact result would exceed `MAX_POWER_BITS`.
    pub fn pow(&self, exp: &BigInt) -> Option<Value> {
        if exp.is_negative() {
            return match self {
                Value::Float(f) => {
                    let e = (-exp).to_u32()?;
                    f.powu(e).recip().map(Value::Float)
                }
                _ => None,
            };
        }
        let e = exp.to_u32()?;
        let base_bits = match self {
            Value::Integer(n) => n.bits(),
            Value::Rational(r) => r.numer().bits().max(r.denom().bits()),
            Value::Float(_) => 0,
        };
        if base_bits.saturating_mul(u64::from(e)) > MAX_POWER_BITS {
            return None;
        }
        match self {
            Value::Integer(n) => Some(Value::Integer(n.pow(e))),
            Value::Rational(r) => {
                let numer = r.numer().pow(e);
                let denom = r.denom().pow(e);
                Some(from_ratio(BigRational::new(numer, denom)))
            }
            Value::Float(f) => Some(Value::Float(f.powu(e))),
        }
    }

    /// Numeric comparison across representations.
    pub fn cmp_numeric(&self, other: &Value) -> Ordering {
        match (self.to_ratio(), other.to_ratio()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self
                .to_float()
                .partial_cmp(&other.to_float())
                .unwrap_or(Ordering::Equal),
        }
    }

    pub fn numeric_eq(&self, other: &Value) -> bool {
        self.cmp_numeric(other) == Ordering::Equal
    }

    /// Name of the head a numeric leaf reports to typed blanks.
    pub fn head_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Rational(_) => "Rational",
            Value::Float(_) => "Real",
        }
    }
}

fn from_ratio(r: BigRational) -> Value {
    if r.is_integer() {
        Value::Integer(r.to_integer())
    } else {
        Value::Rational(r)
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Integer(n) => n.hash(state),
            Value::Rational(r) => {
                r.numer().hash(state);
                r.denom().hash(state);
            }
            Value::Float(f) => f.hash(state),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::int(n)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Integer(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Value::Float(x) => write!(f, "{}", x),
        }
    }
}

/// `n!` with the convention `n! = 1` for `n <= 0`.
pub fn factorial(n: &BigInt) -> BigInt {
    let mut acc = BigInt::one();
    if !n.is_positive() {
        return acc;
    }
    let mut k = BigInt::from(2);
    while &k <= n {
        acc *= &k;
        k += BigInt::one();
    }
    acc
}

impl Eq for BigFloat {}
impl Eq for Value {}
