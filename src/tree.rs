// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{anyhow, ensure, Context, Result};

use crate::clk::Clock;

pub struct ClockSlot {
    pub name: String,
    pub parents: Vec<String>,
    pub clock: Box<dyn Clock>,
}

/// Clocks by name, in registration order. Parents must be registered
/// before their children, which also keeps the tree acyclic.
#[derive(Default)]
pub struct ClockTree {
    clocks: Vec<ClockSlot>,
}

impl ClockTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, parents: Vec<String>, clock: Box<dyn Clock>) -> Result<()> {
        ensure!(self.find(name).is_none(), "Clock {} is already registered", name);
        for parent in &parents {
            ensure!(self.find(parent).is_some(), "Clock {} has unknown parent {}", name, parent);
        }

        debug!("Clock name={} kind={} parents={:?}", name, clock.kind(), parents);

        self.clocks.push(ClockSlot { name: name.to_string(), parents, clock });
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&ClockSlot> {
        self.clocks.iter().find(|c| c.name == name)
    }

    pub fn get(&self, name: &str) -> Result<&ClockSlot> {
        self.find(name).ok_or_else(|| anyhow!("No clock named {}", name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClockSlot> {
        self.clocks.iter()
    }

    pub fn parent(&self, slot: &ClockSlot) -> Result<Option<&ClockSlot>> {
        let index = slot.clock.parent_index().unwrap_or(0);
        if slot.parents.is_empty() {
            return Ok(None);
        }
        let name = slot.parents.get(index)
            .with_context(|| format!("Clock {} selects missing parent index={}", slot.name, index))?;
        self.get(name).map(Some)
    }

    fn parent_rate(&self, slot: &ClockSlot) -> Result<u64> {
        match self.parent(slot)? {
            Some(parent) => self.slot_rate(parent),
            None => Ok(0),
        }
    }

    fn slot_rate(&self, slot: &ClockSlot) -> Result<u64> {
        Ok(slot.clock.recalc_rate(self.parent_rate(slot)?))
    }

    pub fn rate(&self, name: &str) -> Result<u64> {
        self.slot_rate(self.get(name)?)
    }

    pub fn round_rate(&self, name: &str, rate: u64) -> Result<u64> {
        let slot = self.get(name)?;
        Ok(slot.clock.round_rate(rate, self.parent_rate(slot)?))
    }

    pub fn set_rate(&self, name: &str, rate: u64) -> Result<u64> {
        let slot = self.get(name)?;
        let new_rate = slot.clock.set_rate(rate, self.parent_rate(slot)?)
            .with_context(|| format!("Failed to set rate of clock {}", name))?;
        debug!("Clock name={} requested={} rate={}", name, rate, new_rate);
        Ok(new_rate)
    }

    pub fn enable(&self, name: &str) -> Result<()> {
        self.get(name)?.clock.enable()
    }

    pub fn disable(&self, name: &str) -> Result<()> {
        self.get(name)?.clock.disable()
    }

    pub fn is_enabled(&self, name: &str) -> Result<bool> {
        Ok(self.get(name)?.clock.is_enabled())
    }
}
