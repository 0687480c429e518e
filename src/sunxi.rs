// SPDX-License-Identifier: GPL-3.0-or-later

//! Allwinner (sunxi) clock controller setup.
//!
//! All the clocks of one controller share a single register lock.

use std::sync::Arc;

use anyhow::{ensure, Context, Result};

use crate::clk::pll1::{sun4i_pll1_factors, SUN4I_PLL1};
use crate::clk::{Clock, Divider, FactorTable, FactorsClock, FactorsConfig, FixedGate, FixedRate, Mux, Resolver};
use crate::config::{ClockConfig, ClockType};
use crate::delay::Delay;
use crate::regs::{new_lock, Field, RegLock, RegisterBus, SharedReg};
use crate::tree::ClockTree;

pub const SUNXI_OSC24M_GATE: u8 = 0;
pub const SUNXI_MUX_GATE_WIDTH: u8 = 2;

pub struct DivData {
    pub shift: u8,
    pub pow: bool,
    pub width: u8,
}

pub const SUN4I_AXI_DATA: DivData = DivData { shift: 0, pow: false, width: 2 };
pub const SUN4I_AHB_DATA: DivData = DivData { shift: 4, pow: true, width: 2 };
pub const SUN4I_APB0_DATA: DivData = DivData { shift: 8, pow: true, width: 2 };
pub const SUN6I_A31_APB2_DIV_DATA: DivData = DivData { shift: 0, pow: false, width: 4 };

pub struct MuxData {
    pub shift: u8,
}

pub const SUN4I_CPU_MUX_DATA: MuxData = MuxData { shift: 16 };
pub const SUN6I_A31_AHB1_MUX_DATA: MuxData = MuxData { shift: 12 };
pub const SUN4I_APB1_MUX_DATA: MuxData = MuxData { shift: 24 };

struct Setup<'a> {
    bus: &'a Arc<dyn RegisterBus>,
    lock: &'a RegLock,
    delay: &'a Arc<dyn Delay>,
}

impl Setup<'_> {
    fn reg(&self, config: &ClockConfig) -> Result<SharedReg> {
        Ok(SharedReg::new(self.bus.clone(), config.addr()?, Some(self.lock.clone())))
    }

    fn osc(&self, config: &ClockConfig) -> Result<Box<dyn Clock>> {
        let gate = FixedGate::new(self.reg(config)?, SUNXI_OSC24M_GATE, config.rate()?)?;
        Ok(Box::new(gate))
    }

    fn pll1(&self, config: &ClockConfig) -> Result<Box<dyn Clock>> {
        let clk = FactorsClock::new(self.reg(config)?, SUN4I_PLL1,
            Resolver::Derive(sun4i_pll1_factors), self.delay.clone())?;
        Ok(Box::new(clk))
    }

    fn factors(&self, config: &ClockConfig) -> Result<Box<dyn Clock>> {
        let factors = FactorsConfig {
            n: config.n.unwrap_or_default(),
            k: config.k.unwrap_or_default(),
            m: config.m.unwrap_or_default(),
            p: config.p.unwrap_or_default(),
        };
        let entries = config.table.clone().context("Factors clock needs a table")?;
        let table = FactorTable::new(entries)?;
        let clk = FactorsClock::new(self.reg(config)?, factors, Resolver::Table(table), self.delay.clone())?;
        Ok(Box::new(clk))
    }

    fn mux(&self, config: &ClockConfig, data: &MuxData) -> Result<Box<dyn Clock>> {
        let num_parents = config.parent_names().len();
        let mux = Mux::new(self.reg(config)?, Field::new(data.shift, SUNXI_MUX_GATE_WIDTH), num_parents)?;
        if let Some(index) = config.select {
            mux.select(index)?;
        }
        Ok(Box::new(mux))
    }

    fn divider(&self, config: &ClockConfig, data: &DivData) -> Result<Box<dyn Clock>> {
        let div = Divider::new(self.reg(config)?, Field::new(data.shift, data.width), data.pow)?;
        Ok(Box::new(div))
    }

    fn clock(&self, config: &ClockConfig) -> Result<Box<dyn Clock>> {
        match config.kind {
            ClockType::Fixed => Ok(Box::new(FixedRate::new(config.rate()?))),
            ClockType::Osc => self.osc(config),
            ClockType::Pll1 => self.pll1(config),
            ClockType::Factors => self.factors(config),
            ClockType::CpuMux => self.mux(config, &SUN4I_CPU_MUX_DATA),
            ClockType::Apb1Mux => self.mux(config, &SUN4I_APB1_MUX_DATA),
            ClockType::Ahb1Mux => self.mux(config, &SUN6I_A31_AHB1_MUX_DATA),
            ClockType::AxiDiv => self.divider(config, &SUN4I_AXI_DATA),
            ClockType::AhbDiv => self.divider(config, &SUN4I_AHB_DATA),
            ClockType::Apb0Div => self.divider(config, &SUN4I_APB0_DATA),
            ClockType::Apb2Div => self.divider(config, &SUN6I_A31_APB2_DIV_DATA),
        }
    }
}

fn check_parents(config: &ClockConfig) -> Result<()> {
    let n = config.parent_names().len();
    match config.kind {
        ClockType::Fixed | ClockType::Osc => ensure!(n == 0, "Root clock cannot have a parent"),
        ClockType::CpuMux | ClockType::Apb1Mux | ClockType::Ahb1Mux => {}
        _ => ensure!(n == 1, "Clock needs exactly one parent, got {}", n),
    }
    Ok(())
}

/// Builds every clock described in `clocks`, in order.
pub fn init_clocks(clocks: &[ClockConfig], bus: Arc<dyn RegisterBus>, delay: Arc<dyn Delay>) -> Result<ClockTree> {
    let lock = new_lock();
    let setup = Setup { bus: &bus, lock: &lock, delay: &delay };
    let mut tree = ClockTree::new();

    for config in clocks {
        check_parents(config)
            .and_then(|_| setup.clock(config))
            .and_then(|clk| tree.register(&config.name, config.parent_names(), clk))
            .with_context(|| format!("Failed to set up clock {}", config.name))?;
    }

    info!("Registered {} clocks", clocks.len());

    Ok(tree)
}
