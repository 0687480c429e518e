// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::clk::FactorEntry;
use crate::regs::{Field, MemoryBus};

#[derive(Debug, Deserialize)]
pub struct RegisterInit {
    pub addr: u32,
    pub value: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ClockType {
    Fixed,
    Osc,
    Pll1,
    Factors,
    CpuMux,
    Apb1Mux,
    Ahb1Mux,
    AxiDiv,
    AhbDiv,
    Apb0Div,
    Apb2Div,
}

/// One clock node, the way device-tree would describe it.
#[derive(Debug, Deserialize)]
pub struct ClockConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ClockType,
    pub addr: Option<u32>,
    pub rate: Option<u64>,
    pub parent: Option<String>,
    pub parents: Option<Vec<String>>,
    /// Initial mux selection
    pub select: Option<usize>,
    pub n: Option<Field>,
    pub k: Option<Field>,
    pub m: Option<Field>,
    pub p: Option<Field>,
    pub table: Option<Vec<FactorEntry>>,
}

impl ClockConfig {
    pub fn addr(&self) -> Result<u32> {
        self.addr.ok_or_else(|| anyhow!("Missing addr"))
    }

    pub fn rate(&self) -> Result<u64> {
        self.rate.ok_or_else(|| anyhow!("Missing rate"))
    }

    pub fn parent_names(&self) -> Vec<String> {
        match (&self.parents, &self.parent) {
            (Some(parents), _) => parents.clone(),
            (None, Some(parent)) => vec![parent.clone()],
            (None, None) => vec![],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub registers: Option<Vec<RegisterInit>>,
    pub clocks: Vec<ClockConfig>,
}

impl Config {
    /// In-memory register bank holding the initial register values
    pub fn register_bank(&self) -> MemoryBus {
        let words = self.registers.iter().flatten().map(|r| (r.addr, r.value));
        MemoryBus::with_words(words)
    }
}
