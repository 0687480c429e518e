// SPDX-License-Identifier: GPL-3.0-or-later

//! Fixed rate clocks, with or without a gate bit.

use anyhow::{ensure, Result};

use super::Clock;
use crate::regs::SharedReg;

/// Fixed rate clock that can gate and ungate its output.
/// The rate never changes and there is no parent to switch to.
pub struct FixedGate {
    reg: SharedReg,
    bit: u8,
    rate: u64,
}

impl FixedGate {
    pub fn new(reg: SharedReg, bit: u8, rate: u64) -> Result<Self> {
        ensure!(bit < 32, "Gate bit={} is outside the register", bit);
        Ok(Self { reg, bit, rate })
    }

    fn endisable(&self, enable: bool) {
        let mask = 1u32 << self.bit;
        let value = self.reg.modify(|v| if enable { v | mask } else { v & !mask });
        debug!("gate reg=0x{:08x} bit={} value=0x{:08x} enabled={}",
            self.reg.addr(), self.bit, value, enable);
    }

    pub fn enable(&self) {
        self.endisable(true)
    }

    pub fn disable(&self) {
        self.endisable(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.reg.read() & (1 << self.bit) != 0
    }

    pub fn get_rate(&self) -> u64 {
        self.rate
    }
}

impl Clock for FixedGate {
    fn kind(&self) -> &'static str {
        "fixed-gate"
    }

    fn recalc_rate(&self, _parent_rate: u64) -> u64 {
        self.rate
    }

    fn enable(&self) -> Result<()> {
        FixedGate::enable(self);
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        FixedGate::disable(self);
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        FixedGate::is_enabled(self)
    }
}

/// Root clock with no register at all
pub struct FixedRate {
    rate: u64,
}

impl FixedRate {
    pub fn new(rate: u64) -> Self {
        Self { rate }
    }
}

impl Clock for FixedRate {
    fn kind(&self) -> &'static str {
        "fixed-rate"
    }

    fn recalc_rate(&self, _parent_rate: u64) -> u64 {
        self.rate
    }
}
