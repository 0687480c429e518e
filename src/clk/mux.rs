// SPDX-License-Identifier: GPL-3.0-or-later

//! Parent selector. The output rate is the selected parent's rate.
//! Selection happens at setup time only.

use anyhow::{ensure, Result};

use super::Clock;
use crate::regs::{Field, SharedReg};

/// Maximum number of parents our clocks have
pub const MAX_PARENTS: usize = 5;

pub struct Mux {
    reg: SharedReg,
    field: Field,
    num_parents: usize,
}

impl Mux {
    pub fn new(reg: SharedReg, field: Field, num_parents: usize) -> Result<Self> {
        field.validate()?;
        ensure!(num_parents > 0 && num_parents <= MAX_PARENTS,
            "Mux needs 1 to {} parents, got {}", MAX_PARENTS, num_parents);
        Ok(Self { reg, field, num_parents })
    }

    pub fn selected(&self) -> usize {
        self.field.extract(self.reg.read()) as usize
    }

    pub fn select(&self, index: usize) -> Result<()> {
        ensure!(index < self.num_parents,
            "Parent index={} out of range ({} parents)", index, self.num_parents);
        ensure!(self.field.fits(index as u32), "Parent index={} does not fit the mux field", index);
        let value = self.reg.modify(|v| self.field.insert(v, index as u32));
        debug!("mux reg=0x{:08x} value=0x{:08x} parent={}", self.reg.addr(), value, index);
        Ok(())
    }
}

impl Clock for Mux {
    fn kind(&self) -> &'static str {
        "mux"
    }

    fn recalc_rate(&self, parent_rate: u64) -> u64 {
        parent_rate
    }

    fn parent_index(&self) -> Option<usize> {
        Some(self.selected())
    }
}
