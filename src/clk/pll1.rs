// SPDX-License-Identifier: GPL-3.0-or-later

//! PLL1 (CPU PLL) of the sun4i family.
//!
//! rate = (parent * n * (k + 1) >> p) / (m + 1), parent is the 24MHz oscillator.

use super::factors::{Factors, FactorsConfig};
use crate::regs::Field;

/// Every PLL1 rate is a multiple of this.
pub const PLL1_STEP: u64 = 6_000_000;

/// Largest grid divisor whose factors fit the PLL1 fields (n=31, k=1).
pub const PLL1_MAX_DIV: u64 = 255;

pub const SUN4I_PLL1: FactorsConfig = FactorsConfig {
    n: Field::new(8, 5),
    k: Field::new(4, 2),
    m: Field::new(0, 2),
    p: Field::new(16, 2),
};

/// Rounds `rate` down to the 6MHz grid and picks n, k, m, p for it.
/// Rates above the grid clamp to the fastest setting the fields can hold.
pub fn sun4i_pll1_factors(_parent_rate: u64, rate: u64) -> (u64, Factors) {
    let div = (rate / PLL1_STEP).min(PLL1_MAX_DIV);
    let rate = PLL1_STEP * div;

    // m has no effect on pll1
    let m = 0;

    let k = if rate >= 768_000_000 || rate == 42_000_000 || rate == 54_000_000 {
        1
    } else {
        0
    };

    let p = if div < 10 {
        3
    } else if div < 20 || (div < 32 && div & 1 != 0) {
        2
    } else if div < 40 || (div < 64 && div & 2 != 0) {
        1
    } else {
        0
    };

    // shift first, each division truncates
    let n = (div << p) / (k + 1) / 4;
    let n = u32::try_from(n).unwrap_or(u32::MAX);

    (rate, Factors { n, k: k as u32, m, p: p as u32 })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OSC24M: u64 = 24_000_000;

    #[test]
    fn one_gigahertz() {
        let (rate, f) = sun4i_pll1_factors(OSC24M, 1_000_000_000);
        assert_eq!(rate, 996_000_000);
        assert_eq!(f, Factors { n: 20, k: 1, m: 0, p: 0 });
        assert!(SUN4I_PLL1.check(&f).is_ok());
    }

    #[test]
    fn rounds_down_to_grid() {
        assert_eq!(sun4i_pll1_factors(OSC24M, 5_999_999).0, 0);
        assert_eq!(sun4i_pll1_factors(OSC24M, 6_000_000).0, 6_000_000);
        assert_eq!(sun4i_pll1_factors(OSC24M, 59_999_999).0, 54_000_000);
        assert_eq!(sun4i_pll1_factors(OSC24M, 1_008_000_001).0, 1_008_000_000);
    }

    #[test]
    fn k_exceptions() {
        assert_eq!(sun4i_pll1_factors(OSC24M, 42_000_000).1.k, 1);
        assert_eq!(sun4i_pll1_factors(OSC24M, 54_000_000).1.k, 1);
        assert_eq!(sun4i_pll1_factors(OSC24M, 48_000_000).1.k, 0);
        assert_eq!(sun4i_pll1_factors(OSC24M, 762_000_000).1.k, 0);
        assert_eq!(sun4i_pll1_factors(OSC24M, 768_000_000).1.k, 1);
    }

    #[test]
    fn p_by_divisor() {
        let p = |div: u64| sun4i_pll1_factors(OSC24M, div * PLL1_STEP).1.p;
        assert_eq!(p(1), 3);
        assert_eq!(p(9), 3);
        assert_eq!(p(10), 2);
        assert_eq!(p(19), 2);
        assert_eq!(p(20), 1);
        assert_eq!(p(21), 2);
        assert_eq!(p(31), 2);
        assert_eq!(p(32), 1);
        assert_eq!(p(39), 1);
        assert_eq!(p(40), 0);
        assert_eq!(p(42), 1);
        assert_eq!(p(43), 1);
        assert_eq!(p(44), 0);
        assert_eq!(p(62), 1);
        assert_eq!(p(64), 0);
        assert_eq!(p(166), 0);
    }

    #[test]
    fn grid_rates_are_exact_where_hardware_allows() {
        for rate in [42_000_000, 54_000_000, 60_000_000, 384_000_000, 768_000_000, 960_000_000] {
            let (rounded, f) = sun4i_pll1_factors(OSC24M, rate);
            assert_eq!(rounded, rate);
            assert_eq!(f.rate(OSC24M), rate, "rate={} factors={:?}", rate, f);
        }
    }

    #[test]
    fn too_fast_clamps_to_max() {
        let (rate, f) = sun4i_pll1_factors(OSC24M, 3_000_000_000);
        assert_eq!(rate, PLL1_MAX_DIV * PLL1_STEP);
        assert_eq!(f, Factors { n: 31, k: 1, m: 0, p: 0 });
        assert!(SUN4I_PLL1.check(&f).is_ok());
        assert_eq!(sun4i_pll1_factors(OSC24M, 1_600_000_000).0, 1_530_000_000);
    }

    #[test]
    fn every_grid_divisor_fits() {
        for div in 0..=PLL1_MAX_DIV + 10 {
            let (_, f) = sun4i_pll1_factors(OSC24M, div * PLL1_STEP);
            assert!(SUN4I_PLL1.check(&f).is_ok(), "div={} factors={:?}", div, f);
        }
    }
}
