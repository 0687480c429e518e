// SPDX-License-Identifier: GPL-3.0-or-later

//! Allwinner sunxi clock drivers: factor-based PLLs, fixed-rate gates,
//! dividers and muxes programmed through 32-bit control registers.

#[macro_use]
extern crate log;

pub mod clk;
pub mod config;
pub mod delay;
pub mod regs;
pub mod sunxi;
pub mod tree;
pub mod util;
