// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{ensure, Result};
use serde::Deserialize;

/// A packed bitfield inside a 32-bit register word.
///
/// A zero width describes a factor the hardware does not have: it always
/// extracts as 0 and only accepts 0 on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "(u8, u8)")]
pub struct Field {
    pub shift: u8,
    pub width: u8,
}

impl From<(u8, u8)> for Field {
    fn from((shift, width): (u8, u8)) -> Self {
        Self { shift, width }
    }
}

impl Field {
    pub const fn new(shift: u8, width: u8) -> Self {
        Self { shift, width }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.shift as u32 + self.width as u32 <= 32,
            "Field shift={} width={} does not fit a 32-bit register", self.shift, self.width);
        Ok(())
    }

    /// Right-aligned mask. Width 32 must not go through `1 << 32`.
    pub const fn mask(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }

    /// Mask in register position
    pub fn reg_mask(&self) -> u32 {
        self.mask().checked_shl(self.shift as u32).unwrap_or(0)
    }

    pub fn extract(&self, word: u32) -> u32 {
        word.checked_shr(self.shift as u32).unwrap_or(0) & self.mask()
    }

    /// Values wider than the field are masked so neighbours stay intact.
    /// Callers that care about truncation check `fits()` first.
    pub fn insert(&self, word: u32, value: u32) -> u32 {
        let value = (value & self.mask()).checked_shl(self.shift as u32).unwrap_or(0);
        (word & !self.reg_mask()) | value
    }

    pub fn fits(&self, value: u32) -> bool {
        value & !self.mask() == 0
    }

    pub fn overlaps(&self, other: &Field) -> bool {
        self.reg_mask() & other.reg_mask() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_and_insert() {
        let f = Field::new(8, 5);
        assert_eq!(f.extract(0x0000_1f00), 0x1f);
        assert_eq!(f.extract(0xffff_e0ff), 0);
        assert_eq!(f.insert(0xffff_ffff, 0), 0xffff_e0ff);
        assert_eq!(f.insert(0, 0x12), 0x1200);
    }

    #[test]
    fn full_width_field() {
        let f = Field::new(0, 32);
        f.validate().unwrap();
        assert_eq!(f.mask(), u32::MAX);
        assert_eq!(f.extract(0xdead_beef), 0xdead_beef);
        assert_eq!(f.insert(0x1234_5678, 0xdead_beef), 0xdead_beef);
        assert!(f.fits(u32::MAX));
    }

    #[test]
    fn zero_width_field() {
        let f = Field::new(32, 0);
        f.validate().unwrap();
        assert_eq!(f.reg_mask(), 0);
        assert_eq!(f.extract(u32::MAX), 0);
        assert_eq!(f.insert(0xabcd, 7), 0xabcd);
        assert!(f.fits(0));
        assert!(!f.fits(1));
    }

    #[test]
    fn oversized_value_is_masked() {
        let f = Field::new(4, 2);
        assert!(!f.fits(0b111));
        assert_eq!(f.insert(0xffff_ff0f, 0b111), 0xffff_ff3f);
    }

    #[test]
    fn rejects_fields_past_the_word() {
        assert!(Field::new(30, 3).validate().is_err());
        assert!(Field::new(16, 16).validate().is_ok());
    }

    #[test]
    fn overlap() {
        assert!(Field::new(0, 4).overlaps(&Field::new(3, 2)));
        assert!(!Field::new(0, 4).overlaps(&Field::new(4, 2)));
        assert!(!Field::new(0, 0).overlaps(&Field::new(0, 4)));
    }

    #[test]
    fn fields_are_isolated() {
        let fields = [Field::new(8, 5), Field::new(4, 2), Field::new(0, 2), Field::new(16, 2)];
        for base in [0u32, u32::MAX, 0xa5a5_a5a5] {
            for (i, f) in fields.iter().enumerate() {
                for v in 0..=f.mask() {
                    let word = f.insert(base, v);
                    assert_eq!(f.extract(word), v);
                    for (j, other) in fields.iter().enumerate() {
                        if i != j {
                            assert_eq!(other.extract(word), other.extract(base));
                        }
                    }
                    assert_eq!(word & !f.reg_mask(), base & !f.reg_mask());
                }
            }
        }
    }

    #[test]
    fn deserializes_from_pair() {
        let f: Field = serde_yaml::from_str("[16, 2]").unwrap();
        assert_eq!(f, Field::new(16, 2));
    }
}
