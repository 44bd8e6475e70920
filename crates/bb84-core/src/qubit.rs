//! Qubit primitives.
//!
//! [`Bit`] and [`Basis`] use the backend's wire encoding directly: bits as
//! integers `0`/`1`, bases as the strings `"+"` and `"x"`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A classical bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Bit {
    /// Binary zero.
    Zero,
    /// Binary one.
    One,
}

impl Bit {
    /// The opposite bit value.
    pub fn flipped(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
        }
    }
}

impl From<Bit> for u8 {
    fn from(bit: Bit) -> Self {
        match bit {
            Bit::Zero => 0,
            Bit::One => 1,
        }
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value { Self::One } else { Self::Zero }
    }
}

impl TryFrom<u8> for Bit {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            other => Err(format!("bit must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// A measurement basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Basis {
    /// Rectilinear basis, wire symbol `+`.
    #[serde(rename = "+")]
    Rectilinear,
    /// Diagonal basis, wire symbol `x`.
    #[serde(rename = "x")]
    Diagonal,
}

impl Basis {
    /// Wire symbol for this basis.
    pub fn symbol(self) -> char {
        match self {
            Self::Rectilinear => '+',
            Self::Diagonal => 'x',
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A prepared qubit: one bit encoded in one basis.
///
/// Immutable once created for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qubit {
    /// Encoded bit value.
    pub bit: Bit,
    /// Preparation basis.
    pub basis: Basis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_round_trips_through_u8() {
        assert_eq!(Bit::try_from(u8::from(Bit::Zero)), Ok(Bit::Zero));
        assert_eq!(Bit::try_from(u8::from(Bit::One)), Ok(Bit::One));
        assert!(Bit::try_from(2).is_err());
    }

    #[test]
    fn basis_symbols_match_wire_format() {
        assert_eq!(Basis::Rectilinear.symbol(), '+');
        assert_eq!(Basis::Diagonal.symbol(), 'x');
    }

    #[test]
    fn bit_flip_is_involutive() {
        assert_eq!(Bit::Zero.flipped(), Bit::One);
        assert_eq!(Bit::One.flipped().flipped(), Bit::One);
    }
}
