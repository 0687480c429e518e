// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeMap;

use anyhow::{ensure, Result};
use parking_lot::Mutex;

/// 32-bit register access at absolute bus addresses.
pub trait RegisterBus: Send + Sync {
    fn read32(&self, addr: u32) -> u32;
    fn write32(&self, addr: u32, value: u32);
}

/// Volatile access to a memory-mapped register window.
pub struct Mmio {
    base: u32,
    ptr: *mut u32,
    len: u32,
}

// The window is plain device memory, access is word-sized and volatile.
unsafe impl Send for Mmio {}
unsafe impl Sync for Mmio {}

impl Mmio {
    /// # Safety
    ///
    /// `ptr` must point to `len` bytes of mapped device memory that stays
    /// mapped for the lifetime of the returned value, and `base` is the bus
    /// address that `ptr` corresponds to.
    pub unsafe fn new(base: u32, ptr: *mut u32, len: u32) -> Result<Self> {
        ensure!(base % 4 == 0 && len % 4 == 0,
            "MMIO window base=0x{:08x} len=0x{:x} is not word aligned", base, len);
        Ok(Self { base, ptr, len })
    }

    fn word(&self, addr: u32) -> Option<*mut u32> {
        let offset = addr.checked_sub(self.base).filter(|o| *o < self.len && o % 4 == 0)?;
        // SAFETY: offset is inside the window given to `new`.
        Some(unsafe { self.ptr.add((offset / 4) as usize) })
    }
}

impl RegisterBus for Mmio {
    fn read32(&self, addr: u32) -> u32 {
        match self.word(addr) {
            Some(p) => {
                // SAFETY: see `Mmio::new`.
                let value = unsafe { p.read_volatile() };
                trace!("read:  addr=0x{:08x} value=0x{:08x}", addr, value);
                value
            }
            None => {
                warn!("MMIO read outside window addr=0x{:08x}", addr);
                0
            }
        }
    }

    fn write32(&self, addr: u32, value: u32) {
        match self.word(addr) {
            Some(p) => {
                trace!("write: addr=0x{:08x} value=0x{:08x}", addr, value);
                // SAFETY: see `Mmio::new`.
                unsafe { p.write_volatile(value) }
            }
            None => warn!("MMIO write outside window addr=0x{:08x} value=0x{:08x}", addr, value),
        }
    }
}

/// Register bank backed by host memory. Every write is also appended to a
/// log so tests can check what reached the "hardware".
#[derive(Default)]
pub struct MemoryBus {
    inner: Mutex<MemoryBusInner>,
}

#[derive(Default)]
struct MemoryBusInner {
    words: BTreeMap<u32, u32>,
    writes: Vec<(u32, u32)>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_words(words: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let words = words.into_iter().collect();
        Self { inner: Mutex::new(MemoryBusInner { words, writes: vec![] }) }
    }

    /// Sets a word without logging it as a write
    pub fn poke(&self, addr: u32, value: u32) {
        self.inner.lock().words.insert(addr, value);
    }

    pub fn peek(&self, addr: u32) -> u32 {
        self.inner.lock().words.get(&addr).copied().unwrap_or(0)
    }

    pub fn words(&self) -> Vec<(u32, u32)> {
        self.inner.lock().words.iter().map(|(a, v)| (*a, *v)).collect()
    }

    pub fn writes(&self) -> Vec<(u32, u32)> {
        self.inner.lock().writes.clone()
    }

    pub fn take_writes(&self) -> Vec<(u32, u32)> {
        std::mem::take(&mut self.inner.lock().writes)
    }
}

impl RegisterBus for MemoryBus {
    fn read32(&self, addr: u32) -> u32 {
        if addr % 4 != 0 {
            warn!("Unaligned register read addr=0x{:08x}", addr);
        }
        let value = self.peek(addr);
        trace!("read:  addr=0x{:08x} value=0x{:08x}", addr, value);
        value
    }

    fn write32(&self, addr: u32, value: u32) {
        if addr % 4 != 0 {
            warn!("Unaligned register write addr=0x{:08x}", addr);
        }
        trace!("write: addr=0x{:08x} value=0x{:08x}", addr, value);
        let mut inner = self.inner.lock();
        inner.words.insert(addr, value);
        inner.writes.push((addr, value));
    }
}
