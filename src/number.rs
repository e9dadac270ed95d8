use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::{Error, KelpValue};

/// The numeric tower: machine integers, arbitrary-precision integers and
/// floats.  Integer arithmetic overflows into `Bignum`, and a `Bignum` that
/// fits an `i64` is always stored as a `Fixnum`.
#[derive(Debug, Clone)]
pub enum Number {
    Fixnum(i64),
    Bignum(BigInt),
    Flonum(f64),
}

impl Number {
    pub fn from_bigint(value: BigInt) -> Number {
        match value.to_i64() {
            Some(fixnum) => Number::Fixnum(fixnum),
            None => Number::Bignum(value),
        }
    }

    /// The name `type-of` reports for this number.
    pub fn type_name(&self) -> &'static str {
        match self {
            Number::Fixnum(_) => "fixnum",
            Number::Bignum(_) => "bignum",
            Number::Flonum(_) => "flonum",
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self, Number::Flonum(_))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Fixnum(value) => *value as f64,
            Number::Bignum(value) => value.to_f64().unwrap_or(f64::NAN),
            Number::Flonum(value) => *value,
        }
    }

    fn to_bigint(&self) -> Option<BigInt> {
        match self {
            Number::Fixnum(value) => Some(BigInt::from(*value)),
            Number::Bignum(value) => Some(value.clone()),
            Number::Flonum(_) => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Fixnum(value) => *value == 0,
            Number::Bignum(value) => value.is_zero(),
            Number::Flonum(value) => *value == 0.0,
        }
    }

    pub fn add(&self, other: &Number) -> Number {
        self.combine(other, i64::checked_add, |a, b| a + b, |a, b| a + b)
    }

    pub fn sub(&self, other: &Number) -> Number {
        self.combine(other, i64::checked_sub, |a, b| a - b, |a, b| a - b)
    }

    pub fn mul(&self, other: &Number) -> Number {
        self.combine(other, i64::checked_mul, |a, b| a * b, |a, b| a * b)
    }

    pub fn neg(&self) -> Number {
        Number::Fixnum(0).sub(self)
    }

    /// Division.  Integer operands that do not divide evenly produce a float.
    pub fn div(&self, other: &Number) -> Result<Number, Error> {
        if other.is_zero() {
            return Err(Error::lisp_error("divide by zero"));
        }
        match (self.to_bigint(), other.to_bigint()) {
            (Some(a), Some(b)) => {
                if (&a % &b).is_zero() {
                    Ok(Number::from_bigint(a / b))
                } else {
                    Ok(Number::Flonum(self.to_f64() / other.to_f64()))
                }
            }
            _ => Ok(Number::Flonum(self.to_f64() / other.to_f64())),
        }
    }

    /// Integer division truncating towards zero.
    pub fn quotient(&self, other: &Number) -> Result<Number, Error> {
        let (a, b) = Self::integer_operands(self, other)?;
        Ok(Number::from_bigint(a / b))
    }

    /// Remainder with the sign of the divisor.
    pub fn modulo(&self, other: &Number) -> Result<Number, Error> {
        let (a, b) = Self::integer_operands(self, other)?;
        let remainder = a % &b;
        if !remainder.is_zero() && (remainder < BigInt::zero()) != (b < BigInt::zero()) {
            Ok(Number::from_bigint(remainder + b))
        } else {
            Ok(Number::from_bigint(remainder))
        }
    }

    fn integer_operands(a: &Number, b: &Number) -> Result<(BigInt, BigInt), Error> {
        let Some(x) = a.to_bigint() else {
            return Err(Error::type_error("integer", &a.clone().into()));
        };
        let Some(y) = b.to_bigint() else {
            return Err(Error::type_error("integer", &b.clone().into()));
        };
        if y.is_zero() {
            return Err(Error::lisp_error("divide by zero"));
        }
        Ok((x, y))
    }

    fn combine(
        &self,
        other: &Number,
        fixnum_op: fn(i64, i64) -> Option<i64>,
        bignum_op: fn(BigInt, BigInt) -> BigInt,
        flonum_op: fn(f64, f64) -> f64,
    ) -> Number {
        match (self, other) {
            (Number::Fixnum(a), Number::Fixnum(b)) => match fixnum_op(*a, *b) {
                Some(value) => Number::Fixnum(value),
                None => Number::from_bigint(bignum_op(BigInt::from(*a), BigInt::from(*b))),
            },
            (Number::Flonum(_), _) | (_, Number::Flonum(_)) => {
                Number::Flonum(flonum_op(self.to_f64(), other.to_f64()))
            }
            _ => match (self.to_bigint(), other.to_bigint()) {
                (Some(a), Some(b)) => Number::from_bigint(bignum_op(a, b)),
                _ => Number::Flonum(flonum_op(self.to_f64(), other.to_f64())),
            },
        }
    }

    /// Numeric comparison.  Exact integers compare exactly; anything involving
    /// a float compares as floats.
    pub fn compare(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Fixnum(a), Number::Fixnum(b)) => Some(a.cmp(b)),
            (Number::Flonum(_), _) | (_, Number::Flonum(_)) => {
                self.to_f64().partial_cmp(&other.to_f64())
            }
            _ => match (self.to_bigint(), other.to_bigint()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => None,
            },
        }
    }

    /// Same exactness and same value.
    pub fn eqv(&self, other: &Number) -> bool {
        match (self, other) {
            (Number::Fixnum(a), Number::Fixnum(b)) => a == b,
            (Number::Bignum(a), Number::Bignum(b)) => a == b,
            (Number::Flonum(a), Number::Flonum(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Fixnum(value) => write!(f, "{}", value),
            Number::Bignum(value) => write!(f, "{}", value),
            Number::Flonum(value) => {
                let text = value.to_string();
                if value.is_finite() && !text.contains('.') {
                    write!(f, "{}.0", text)
                } else {
                    f.write_str(&text)
                }
            }
        }
    }
}

impl From<Number> for KelpValue {
    fn from(value: Number) -> Self {
        KelpValue::Number(value)
    }
}

impl From<i64> for KelpValue {
    fn from(value: i64) -> Self {
        KelpValue::Number(Number::Fixnum(value))
    }
}

impl From<i32> for KelpValue {
    fn from(value: i32) -> Self {
        KelpValue::Number(Number::Fixnum(value.into()))
    }
}

impl From<usize> for KelpValue {
    fn from(value: usize) -> Self {
        match i64::try_from(value) {
            Ok(value) => value.into(),
            Err(_) => Number::from_bigint(BigInt::from(value)).into(),
        }
    }
}

impl From<f64> for KelpValue {
    fn from(value: f64) -> Self {
        KelpValue::Number(Number::Flonum(value))
    }
}

impl From<BigInt> for KelpValue {
    fn from(value: BigInt) -> Self {
        KelpValue::Number(Number::from_bigint(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_promotes() {
        let max = Number::Fixnum(i64::MAX);
        let sum = max.add(&Number::Fixnum(1));
        assert_eq!(sum.type_name(), "bignum");
        assert_eq!(sum.to_string(), "9223372036854775808");

        let back = sum.sub(&Number::Fixnum(1));
        assert_eq!(back.type_name(), "fixnum");
    }

    #[test]
    fn test_division() {
        let six = Number::Fixnum(6);
        assert!(six.div(&Number::Fixnum(3)).unwrap().eqv(&Number::Fixnum(2)));
        assert!(six.div(&Number::Fixnum(4)).unwrap().eqv(&Number::Flonum(1.5)));
        assert_eq!(
            six.div(&Number::Fixnum(0)).unwrap_err().to_string(),
            "error: divide by zero"
        );
    }

    #[test]
    fn test_modulo() {
        let m = |a, b| Number::Fixnum(a).modulo(&Number::Fixnum(b)).unwrap().to_string();
        assert_eq!(m(7, 3), "1");
        assert_eq!(m(-7, 3), "2");
        assert_eq!(m(7, -3), "-2");
    }

    #[test]
    fn test_float_display() {
        assert_eq!(Number::Flonum(1.0).to_string(), "1.0");
        assert_eq!(Number::Flonum(2.5).to_string(), "2.5");
    }
}
