use std::fmt::Display;
use std::fmt::Formatter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signedness {
    /// `iN`: no sign semantics, like in LLVM.
    Signless,
    /// `siN`
    Signed,
    /// `uiN`
    Unsigned,
}

/// Represent an integer type such as `i32`, `si8`, or `ui64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntegerType {
    num_bits: u32,
    signedness: Signedness,
}

impl IntegerType {
    pub const MAX_BITS: u32 = 64;
    pub const I32: IntegerType = IntegerType {
        num_bits: 32,
        signedness: Signedness::Signless,
    };
    pub const I64: IntegerType = IntegerType {
        num_bits: 64,
        signedness: Signedness::Signless,
    };

    /// Returns `None` for widths outside `1..=64`.
    pub fn new(num_bits: u32, signedness: Signedness) -> Option<Self> {
        if (1..=Self::MAX_BITS).contains(&num_bits) {
            Some(Self {
                num_bits,
                signedness,
            })
        } else {
            None
        }
    }
    pub fn signless(num_bits: u32) -> Option<Self> {
        Self::new(num_bits, Signedness::Signless)
    }
    pub fn signed(num_bits: u32) -> Option<Self> {
        Self::new(num_bits, Signedness::Signed)
    }
    pub fn unsigned(num_bits: u32) -> Option<Self> {
        Self::new(num_bits, Signedness::Unsigned)
    }
    pub fn from_str(s: &str) -> Option<Self> {
        let (signedness, digits) = if let Some(digits) = s.strip_prefix("si") {
            (Signedness::Signed, digits)
        } else if let Some(digits) = s.strip_prefix("ui") {
            (Signedness::Unsigned, digits)
        } else {
            (Signedness::Signless, s.strip_prefix('i')?)
        };
        let num_bits = digits.parse::<u32>().ok()?;
        Self::new(num_bits, signedness)
    }
    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }
    pub fn signedness(&self) -> Signedness {
        self.signedness
    }
    // `i1` is a boolean-like flag, so it is treated as zero-extended.
    fn is_sign_extended(&self) -> bool {
        match self.signedness {
            Signedness::Signed => true,
            Signedness::Signless => self.num_bits > 1,
            Signedness::Unsigned => false,
        }
    }
    /// Smallest literal that can be written for this type.
    pub fn min_value(&self) -> i128 {
        match self.signedness {
            Signedness::Unsigned => 0,
            _ => -(1i128 << (self.num_bits - 1)),
        }
    }
    /// Largest literal that can be written for this type.
    ///
    /// Signless integers accept both the signed and the unsigned range.
    pub fn max_value(&self) -> i128 {
        match self.signedness {
            Signedness::Signed => (1i128 << (self.num_bits - 1)) - 1,
            _ => (1i128 << self.num_bits) - 1,
        }
    }
    pub fn contains(&self, value: i128) -> bool {
        self.min_value() <= value && value <= self.max_value()
    }
    /// Truncate `value` to the width of the type (two's complement).
    pub fn wrap(&self, value: i128) -> i128 {
        let modulus = 1i128 << self.num_bits;
        let masked = value.rem_euclid(modulus);
        if self.is_sign_extended() && masked >= 1i128 << (self.num_bits - 1) {
            masked - modulus
        } else {
            masked
        }
    }
}

impl Display for IntegerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.signedness {
            Signedness::Signless => "i",
            Signedness::Signed => "si",
            Signedness::Unsigned => "ui",
        };
        write!(f, "{prefix}{}", self.num_bits)
    }
}
