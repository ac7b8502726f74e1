use std::fmt;
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Mul, Neg};
use std::str::FromStr;

use num::rational::BigRational;
use num::{BigInt, Integer, One, Signed, Zero};

use crate::error::ParseErrorKind;

/// Beyond this many decimals a value is not a decimal anymore and it is rounded for display
const MAX_EXACT_DECIMALS: usize = 32;

/// An exact decimal quantity
///
/// Calculations are never done with floats, the value is a rational number. Every amount comes
/// from a decimal literal and is only ever added, negated or multiplied, so its denominator
/// always divides a power of ten and it can be written back exactly.
///
/// # Examples
/// ```rust
/// # use tally::models::Amount;
/// let rent: Amount = "$1200".parse().unwrap();
/// let rate: Amount = "0.075".parse().unwrap();
/// assert_eq!(format!("{}", &rent * &rate), "90");
/// assert_eq!("-12.50".parse::<Amount>().unwrap().to_string(), "-12.5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigRational);

impl Amount {
    pub fn new() -> Self {
        Amount(BigRational::zero())
    }
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }
    pub fn get_value(&self) -> &BigRational {
        &self.0
    }

    /// Rounds to a fixed number of decimals, ties go to the even neighbour
    pub fn to_fixed(&self, decimals: usize) -> String {
        let scaled = &self.0 * BigRational::from_integer(pow10(decimals));
        let floor = scaled.floor();
        let fraction = &scaled - &floor;
        let half = BigRational::new(BigInt::one(), BigInt::from(2));
        let mut integer = floor.to_integer();
        if fraction > half || (fraction == half && integer.is_odd()) {
            integer += BigInt::one();
        }
        format_scaled(&integer, decimals)
    }

    /// Number of decimals needed to write the value exactly
    fn scale(&self) -> Option<usize> {
        let denominator = self.0.denom();
        let mut power = BigInt::one();
        for scale in 0..=MAX_EXACT_DECIMALS {
            if (&power % denominator).is_zero() {
                return Some(scale);
            }
            power *= 10;
        }
        None
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::new()
    }
}

fn pow10(exponent: usize) -> BigInt {
    num::pow(BigInt::from(10), exponent)
}

/// Writes `integer / 10^decimals` as a decimal string
fn format_scaled(integer: &BigInt, decimals: usize) -> String {
    let digits = integer.abs().to_string();
    let sign = if integer.is_negative() { "-" } else { "" };
    if decimals == 0 {
        return format!("{}{}", sign, digits);
    }
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    format!("{}{}.{}", sign, whole, fraction)
}

impl From<BigRational> for Amount {
    fn from(value: BigRational) -> Self {
        Amount(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(BigRational::from_integer(BigInt::from(value)))
    }
}

impl FromStr for Amount {
    type Err = ParseErrorKind;

    /// Accepts an optional sign and an optional `$` in any order, then digits with an
    /// optional fraction
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseErrorKind::InvalidAmount(s.to_string());
        let mut rest = s.trim();
        let mut negative = false;
        let mut signed = false;
        let mut dollar = false;
        loop {
            match rest.chars().next() {
                Some('-') | Some('+') if !signed => {
                    negative = rest.starts_with('-');
                    signed = true;
                }
                Some('$') if !dollar => dollar = true,
                _ => break,
            }
            rest = &rest[1..];
        }

        let (whole, fraction) = match rest.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (rest, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let numerator =
            BigInt::from_str(format!("0{}{}", whole, fraction).as_str()).map_err(|_| invalid())?;
        let value = BigRational::new(numerator, pow10(fraction.len()));
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.scale() {
            Some(scale) => {
                let integer = (&self.0 * BigRational::from_integer(pow10(scale))).to_integer();
                write!(f, "{}", format_scaled(&integer, scale))
            }
            None => write!(f, "{}", self.to_fixed(MAX_EXACT_DECIMALS)),
        }
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Amount> for Amount {
    type Output = Amount;

    fn add(self, rhs: &'a Amount) -> Self::Output {
        Amount(self.0 + &rhs.0)
    }
}

impl<'a> Mul<&'a Amount> for &'a Amount {
    type Output = Amount;

    fn mul(self, rhs: &'a Amount) -> Self::Output {
        Amount(&self.0 * &rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::new(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Amount::new(), |acc, x| acc + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn parse_literals() {
        assert_eq!(amount("1000"), Amount::from(1000));
        assert_eq!(amount("$1000"), Amount::from(1000));
        assert_eq!(amount("-$5"), Amount::from(-5));
        assert_eq!(amount("$-5"), Amount::from(-5));
        assert_eq!(amount("+2"), Amount::from(2));
        assert_eq!(amount(".5").to_string(), "0.5");
        assert_eq!(amount("7.").to_string(), "7");
    }

    #[test]
    fn reject_garbage() {
        for bad in &["", "$", "-", "1.2.3", "12a", "1,000", "--1", "$$1", "1 000"] {
            assert!(Amount::from_str(bad).is_err(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn exact_display() {
        assert_eq!(amount("-12.50").to_string(), "-12.5");
        assert_eq!(amount("0.075").to_string(), "0.075");
        assert_eq!(amount("-0.001").to_string(), "-0.001");
        assert_eq!((amount("0.1") + amount("0.2")).to_string(), "0.3");
        assert_eq!((&amount("1200") * &amount("0.075")).to_string(), "90");
        assert_eq!(Amount::new().to_string(), "0");
    }

    #[test]
    fn bankers_rounding() {
        assert_eq!(amount("2.345").to_fixed(2), "2.34");
        assert_eq!(amount("2.355").to_fixed(2), "2.36");
        assert_eq!(amount("-2.345").to_fixed(2), "-2.34");
        assert_eq!(amount("1000").to_fixed(2), "1000.00");
        assert_eq!(amount("-0.004").to_fixed(2), "0.00");
    }

    #[test]
    fn sums() {
        let total: Amount = vec![amount("10"), amount("-2.5"), amount("-7.5")]
            .into_iter()
            .sum();
        assert!(total.is_zero());
    }
}
