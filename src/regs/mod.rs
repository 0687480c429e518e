// SPDX-License-Identifier: GPL-3.0-or-later

mod bus;
mod field;

pub use bus::{MemoryBus, Mmio, RegisterBus};
pub use field::Field;

use std::sync::Arc;

use parking_lot::Mutex;

/// Lock shared by every clock living in the same control register(s).
pub type RegLock = Arc<Mutex<()>>;

pub fn new_lock() -> RegLock {
    Arc::new(Mutex::new(()))
}

/// One control word on a bus, plus the lock serializing its users.
///
/// Without a lock the caller is responsible for serializing accesses.
#[derive(Clone)]
pub struct SharedReg {
    bus: Arc<dyn RegisterBus>,
    addr: u32,
    lock: Option<RegLock>,
}

impl SharedReg {
    pub fn new(bus: Arc<dyn RegisterBus>, addr: u32, lock: Option<RegLock>) -> Self {
        Self { bus, addr, lock }
    }

    pub fn addr(&self) -> u32 {
        self.addr
    }

    /// Runs `f` with the lock held (if any). Everything `f` does to the
    /// register, including waiting, is one critical section.
    pub fn locked<R>(&self, f: impl FnOnce(&RawReg) -> R) -> R {
        let _guard = self.lock.as_ref().map(|l| l.lock());
        f(&RawReg { bus: &*self.bus, addr: self.addr })
    }

    pub fn read(&self) -> u32 {
        self.locked(|r| r.read())
    }

    /// Read-modify-write under the lock. Returns the written value.
    pub fn modify(&self, f: impl FnOnce(u32) -> u32) -> u32 {
        self.locked(|r| {
            let value = f(r.read());
            r.write(value);
            value
        })
    }
}

/// Register access from inside a critical section.
pub struct RawReg<'a> {
    bus: &'a dyn RegisterBus,
    addr: u32,
}

impl RawReg<'_> {
    pub fn read(&self) -> u32 {
        self.bus.read32(self.addr)
    }

    pub fn write(&self, value: u32) {
        self.bus.write32(self.addr, value)
    }
}
