// SPDX-License-Identifier: GPL-3.0-or-later

//! Simple integer divider: rate = parent / (v + 1), or parent >> v when
//! the field holds a power of two.

use anyhow::Result;

use super::Clock;
use crate::regs::{Field, SharedReg};

pub struct Divider {
    reg: SharedReg,
    field: Field,
    power_of_two: bool,
}

impl Divider {
    pub fn new(reg: SharedReg, field: Field, power_of_two: bool) -> Result<Self> {
        field.validate()?;
        Ok(Self { reg, field, power_of_two })
    }

    fn max_value(&self) -> u32 {
        if self.power_of_two {
            self.field.mask().min(63)
        } else {
            self.field.mask()
        }
    }

    fn divisor(&self, value: u32) -> u64 {
        if self.power_of_two {
            1u64.checked_shl(value).unwrap_or(u64::MAX)
        } else {
            value as u64 + 1
        }
    }

    /// Smallest divisor not overshooting `rate`, or the largest one.
    fn best_value(&self, rate: u64, parent_rate: u64) -> u32 {
        let max = self.max_value();
        if rate == 0 {
            return max;
        }

        let div = parent_rate / rate + (parent_rate % rate != 0) as u64;
        let value = if self.power_of_two {
            match div {
                0 | 1 => 0,
                d => 64 - (d - 1).leading_zeros() as u64,
            }
        } else {
            div.saturating_sub(1)
        };

        value.min(max as u64) as u32
    }
}

impl Clock for Divider {
    fn kind(&self) -> &'static str {
        "divider"
    }

    fn recalc_rate(&self, parent_rate: u64) -> u64 {
        let value = self.field.extract(self.reg.read());
        parent_rate / self.divisor(value)
    }

    fn round_rate(&self, rate: u64, parent_rate: u64) -> u64 {
        parent_rate / self.divisor(self.best_value(rate, parent_rate))
    }

    fn set_rate(&self, rate: u64, parent_rate: u64) -> Result<u64> {
        let value = self.best_value(rate, parent_rate);
        let reg = self.reg.modify(|v| self.field.insert(v, value));
        debug!("divider reg=0x{:08x} value=0x{:08x} div={}", self.reg.addr(), reg, self.divisor(value));
        Ok(parent_rate / self.divisor(value))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::regs::MemoryBus;

    const MHZ: u64 = 1_000_000;

    fn divider(bus: &Arc<MemoryBus>, field: Field, pow2: bool) -> Divider {
        Divider::new(SharedReg::new(bus.clone(), 0x54, None), field, pow2).unwrap()
    }

    #[test]
    fn linear_divider() {
        let bus = Arc::new(MemoryBus::new());
        let axi = divider(&bus, Field::new(0, 2), false);

        assert_eq!(axi.recalc_rate(1008 * MHZ), 1008 * MHZ);
        assert_eq!(axi.round_rate(400 * MHZ, 1008 * MHZ), 336 * MHZ);
        assert_eq!(axi.round_rate(504 * MHZ, 1008 * MHZ), 504 * MHZ);
        assert_eq!(axi.round_rate(MHZ, 1008 * MHZ), 252 * MHZ);
        assert_eq!(axi.round_rate(0, 1008 * MHZ), 252 * MHZ);

        assert_eq!(axi.set_rate(400 * MHZ, 1008 * MHZ).unwrap(), 336 * MHZ);
        assert_eq!(bus.peek(0x54), 2);
        assert_eq!(axi.recalc_rate(1008 * MHZ), 336 * MHZ);
    }

    #[test]
    fn power_of_two_divider() {
        let bus = Arc::new(MemoryBus::new());
        bus.poke(0x54, 0x3);
        let ahb = divider(&bus, Field::new(4, 2), true);

        assert_eq!(ahb.round_rate(300 * MHZ, 336 * MHZ), 168 * MHZ);
        assert_eq!(ahb.round_rate(336 * MHZ, 336 * MHZ), 336 * MHZ);
        assert_eq!(ahb.round_rate(50 * MHZ, 336 * MHZ), 42 * MHZ);
        assert_eq!(ahb.round_rate(1, 336 * MHZ), 42 * MHZ);

        assert_eq!(ahb.set_rate(100 * MHZ, 336 * MHZ).unwrap(), 84 * MHZ);
        assert_eq!(bus.peek(0x54), 0x23);
        assert_eq!(ahb.recalc_rate(336 * MHZ), 84 * MHZ);
    }

    #[test]
    fn wide_divider() {
        let bus = Arc::new(MemoryBus::new());
        let apb2 = divider(&bus, Field::new(0, 4), false);
        assert_eq!(apb2.round_rate(2 * MHZ, 24 * MHZ), 2 * MHZ);
        assert_eq!(apb2.round_rate(7 * MHZ, 24 * MHZ), 6 * MHZ);
        assert_eq!(apb2.round_rate(1, 24 * MHZ), 24 * MHZ / 16);
    }
}
