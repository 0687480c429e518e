// SPDX-License-Identifier: GPL-3.0-or-later

pub mod divider;
pub mod factors;
pub mod fixed_gate;
pub mod mux;
pub mod pll1;
pub mod table;

pub use divider::Divider;
pub use factors::{Factors, FactorsClock, FactorsConfig, Resolver};
pub use fixed_gate::{FixedGate, FixedRate};
pub use mux::Mux;
pub use table::{FactorEntry, FactorTable};

use anyhow::{bail, Result};

/// What the clock tree can ask of a clock. Rates are in Hz, the parent rate
/// is always provided by the caller.
pub trait Clock: Send + Sync {
    fn kind(&self) -> &'static str;

    fn recalc_rate(&self, parent_rate: u64) -> u64;

    fn round_rate(&self, _rate: u64, parent_rate: u64) -> u64 {
        self.recalc_rate(parent_rate)
    }

    fn set_rate(&self, _rate: u64, _parent_rate: u64) -> Result<u64> {
        bail!("{} clock rate cannot be changed", self.kind())
    }

    // Ungated clocks follow their parent and are always on.

    fn enable(&self) -> Result<()> {
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        true
    }

    /// Index of the currently selected parent, for clocks with several
    fn parent_index(&self) -> Option<usize> {
        None
    }
}
