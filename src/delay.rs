// SPDX-License-Identifier: GPL-3.0-or-later

use parking_lot::Mutex;

/// Busy-wait capability. `loops` is a calibrated spin count, not wall time.
pub trait Delay: Send + Sync {
    fn delay(&self, loops: u64);
}

/// Spins on the calling thread. Not interruptible.
#[derive(Default, Clone, Copy)]
pub struct SpinDelay;

impl Delay for SpinDelay {
    fn delay(&self, loops: u64) {
        for _ in 0..loops {
            std::hint::spin_loop();
        }
    }
}

/// Records requested delays instead of waiting.
#[derive(Default)]
pub struct RecordingDelay {
    calls: Mutex<Vec<u64>>,
}

impl RecordingDelay {
    pub fn calls(&self) -> Vec<u64> {
        self.calls.lock().clone()
    }
}

impl Delay for RecordingDelay {
    fn delay(&self, loops: u64) {
        self.calls.lock().push(loops);
    }
}
