// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{ensure, Result};
use serde::Deserialize;

use super::factors::Factors;

/// A factor set and the rate it produces from the table's parent rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FactorEntry {
    #[serde(default)]
    pub n: u32,
    #[serde(default)]
    pub k: u32,
    #[serde(default)]
    pub m: u32,
    #[serde(default)]
    pub p: u32,
    pub val: u64,
}

impl FactorEntry {
    pub const fn new(n: u32, k: u32, m: u32, p: u32, val: u64) -> Self {
        Self { n, k, m, p, val }
    }

    pub fn factors(&self) -> Factors {
        Factors { n: self.n, k: self.k, m: self.m, p: self.p }
    }
}

/// Non-empty list of entries sorted by strictly increasing rate.
#[derive(Debug, Clone)]
pub struct FactorTable {
    entries: Vec<FactorEntry>,
}

impl FactorTable {
    pub fn new(entries: Vec<FactorEntry>) -> Result<Self> {
        ensure!(!entries.is_empty(), "Factor table is empty");
        ensure!(entries.iter().all(|e| e.val != 0), "Factor table has an entry with a zero rate");
        for w in entries.windows(2) {
            ensure!(w[0].val < w[1].val,
                "Factor table is not strictly ascending ({} then {})", w[0].val, w[1].val);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[FactorEntry] {
        &self.entries
    }

    /// Highest entry not above `rate`. Rates below the table get the first
    /// entry, rates above it get the last one.
    pub fn resolve_floor(&self, rate: u64) -> &FactorEntry {
        let above = self.entries.partition_point(|e| e.val <= rate);
        &self.entries[above.saturating_sub(1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MHZ: u64 = 1_000_000;

    fn table() -> FactorTable {
        FactorTable::new(vec![
            FactorEntry::new(1, 0, 0, 2, 6 * MHZ),
            FactorEntry::new(1, 0, 0, 1, 12 * MHZ),
            FactorEntry::new(1, 0, 0, 0, 24 * MHZ),
        ]).unwrap()
    }

    #[test]
    fn floor_and_clamp() {
        let t = table();
        assert_eq!(t.resolve_floor(6 * MHZ).val, 6 * MHZ);
        assert_eq!(t.resolve_floor(10 * MHZ).val, 6 * MHZ);
        assert_eq!(t.resolve_floor(12 * MHZ).val, 12 * MHZ);
        assert_eq!(t.resolve_floor(24 * MHZ).val, 24 * MHZ);
        assert_eq!(t.resolve_floor(100 * MHZ).val, 24 * MHZ);
    }

    #[test]
    fn below_first_entry() {
        let t = table();
        assert_eq!(t.resolve_floor(0).val, 6 * MHZ);
        assert_eq!(t.resolve_floor(5 * MHZ).val, 6 * MHZ);
    }

    #[test]
    fn single_entry() {
        let t = FactorTable::new(vec![FactorEntry::new(4, 0, 0, 0, 96 * MHZ)]).unwrap();
        assert_eq!(t.resolve_floor(1).n, 4);
        assert_eq!(t.resolve_floor(u64::MAX).n, 4);
    }

    #[test]
    fn rejects_bad_tables() {
        assert!(FactorTable::new(vec![]).is_err());
        assert!(FactorTable::new(vec![
            FactorEntry::new(1, 0, 0, 0, 12 * MHZ),
            FactorEntry::new(1, 0, 0, 0, 12 * MHZ),
        ]).is_err());
        assert!(FactorTable::new(vec![
            FactorEntry::new(1, 0, 0, 0, 24 * MHZ),
            FactorEntry::new(1, 0, 0, 0, 12 * MHZ),
        ]).is_err());
        assert!(FactorTable::new(vec![FactorEntry::new(0, 0, 0, 0, 0)]).is_err());
    }

    #[test]
    fn entry_from_yaml() {
        let e: FactorEntry = serde_yaml::from_str("{ n: 16, k: 1, val: 768000000 }").unwrap();
        assert_eq!(e, FactorEntry::new(16, 1, 0, 0, 768 * MHZ));
    }
}
