// SPDX-License-Identifier: GPL-3.0-or-later

//! Adjustable factor-based clock that cannot gate.
//!
//! rate = (parent * N * (K + 1) >> P) / (M + 1)
//!
//! Parent is fixed. Enabling only ensures the parent is enabled, which is
//! the clock tree's business, so enable and disable do nothing here.

use std::sync::Arc;

use anyhow::{ensure, Context, Result};

use super::table::FactorTable;
use super::Clock;
use crate::delay::Delay;
use crate::regs::{Field, SharedReg};

/// PLL settling time in delay loops per 2^20 Hz of output.
pub const SETTLE_LOOPS: u64 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Factors {
    pub n: u32,
    pub k: u32,
    pub m: u32,
    pub p: u32,
}

impl Factors {
    pub fn rate(&self, parent_rate: u64) -> u64 {
        let rate = parent_rate
            .saturating_mul(self.n as u64)
            .saturating_mul(self.k as u64 + 1);
        rate.checked_shr(self.p).unwrap_or(0) / (self.m as u64 + 1)
    }
}

/// Position of the four factors in the control register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorsConfig {
    pub n: Field,
    pub k: Field,
    pub m: Field,
    pub p: Field,
}

impl FactorsConfig {
    fn fields(&self) -> [(char, Field); 4] {
        [('n', self.n), ('k', self.k), ('m', self.m), ('p', self.p)]
    }

    pub fn validate(&self) -> Result<()> {
        let fields = self.fields();
        for (name, field) in &fields {
            field.validate().with_context(|| format!("Invalid {} factor", name))?;
        }
        for (i, (a, fa)) in fields.iter().enumerate() {
            for (b, fb) in &fields[i + 1..] {
                ensure!(!fa.overlaps(fb), "Factors {} and {} overlap", a, b);
            }
        }
        Ok(())
    }

    /// Fails if a factor does not fit its field instead of truncating it.
    pub fn check(&self, factors: &Factors) -> Result<()> {
        let values = [factors.n, factors.k, factors.m, factors.p];
        for ((name, field), value) in self.fields().iter().zip(values) {
            ensure!(field.fits(value),
                "Factor {}={} does not fit in {} bits", name, value, field.width);
        }
        Ok(())
    }

    pub fn decode(&self, word: u32) -> Factors {
        Factors {
            n: self.n.extract(word),
            k: self.k.extract(word),
            m: self.m.extract(word),
            p: self.p.extract(word),
        }
    }

    pub fn encode(&self, word: u32, factors: &Factors) -> u32 {
        let word = self.m.insert(word, factors.m);
        let word = self.k.insert(word, factors.k);
        let word = self.n.insert(word, factors.n);
        self.p.insert(word, factors.p)
    }
}

/// Takes (parent rate, requested rate), returns the rate actually reachable
/// and the factors reaching it.
pub type FactorsFn = fn(u64, u64) -> (u64, Factors);

/// How a factors clock turns a requested rate into factors.
pub enum Resolver {
    Table(FactorTable),
    Derive(FactorsFn),
}

impl Resolver {
    pub fn resolve(&self, rate: u64, parent_rate: u64) -> (u64, Factors) {
        match self {
            Resolver::Table(table) => {
                let entry = table.resolve_floor(rate);
                (entry.val, entry.factors())
            }
            Resolver::Derive(f) => f(parent_rate, rate),
        }
    }
}

pub struct FactorsClock {
    reg: SharedReg,
    config: FactorsConfig,
    resolver: Resolver,
    delay: Arc<dyn Delay>,
}

impl FactorsClock {
    pub fn new(reg: SharedReg, config: FactorsConfig, resolver: Resolver, delay: Arc<dyn Delay>) -> Result<Self> {
        config.validate()?;

        if let Resolver::Table(table) = &resolver {
            for entry in table.entries() {
                config.check(&entry.factors())
                    .with_context(|| format!("Factor table entry for rate={} is invalid", entry.val))?;
            }
        }

        Ok(Self { reg, config, resolver, delay })
    }

    pub fn factors(&self) -> Factors {
        self.config.decode(self.reg.read())
    }

    pub fn recalc_rate(&self, parent_rate: u64) -> u64 {
        self.factors().rate(parent_rate)
    }

    pub fn round_rate(&self, rate: u64, parent_rate: u64) -> u64 {
        self.resolver.resolve(rate, parent_rate).0
    }

    /// Programs the factors closest to `rate` and waits for the PLL to lock.
    /// Returns the rate the programmed factors produce from `parent_rate`.
    pub fn set_rate(&self, rate: u64, parent_rate: u64) -> Result<u64> {
        let (_, factors) = self.resolver.resolve(rate, parent_rate);
        self.config.check(&factors)
            .with_context(|| format!("Cannot program rate={} at reg=0x{:08x}", rate, self.reg.addr()))?;

        let new_rate = factors.rate(parent_rate);

        self.reg.locked(|r| {
            let value = self.config.encode(r.read(), &factors);
            r.write(value);

            debug!("factors reg=0x{:08x} value=0x{:08x} {:?} rate={}",
                self.reg.addr(), value, factors, new_rate);

            // the PLL must settle before anyone else touches the register
            self.delay.delay((new_rate >> 20) * SETTLE_LOOPS);
        });

        Ok(new_rate)
    }
}

impl Clock for FactorsClock {
    fn kind(&self) -> &'static str {
        "factors"
    }

    fn recalc_rate(&self, parent_rate: u64) -> u64 {
        FactorsClock::recalc_rate(self, parent_rate)
    }

    fn round_rate(&self, rate: u64, parent_rate: u64) -> u64 {
        FactorsClock::round_rate(self, rate, parent_rate)
    }

    fn set_rate(&self, rate: u64, parent_rate: u64) -> Result<u64> {
        FactorsClock::set_rate(self, rate, parent_rate)
    }
}
