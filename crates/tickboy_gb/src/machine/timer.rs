use super::{io, Mmu, M_CYCLE};
use crate::interrupts::{Interrupt, InterruptControl};

/// DIV/TIMA/TMA/TAC.
///
/// DIV is the upper byte of a free-running 16-bit counter. TIMA increments
/// on the falling edge of the counter bit selected by TAC, gated by the TAC
/// enable bit, so writes to DIV or TAC can clock TIMA the same way they do
/// on hardware.
#[derive(Clone, Debug, Default)]
pub struct Timer {
    counter: u16,
    /// TIMA wrapped on the previous tick; the reload happens on this one.
    overflow_pending: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the counter so DIV reads 0xAB at $0100.
    pub fn reset(&mut self) {
        self.counter = 0xABCC;
        self.overflow_pending = false;
    }

    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// Advance by one M-cycle.
    pub fn tick(&mut self, mmu: &mut Mmu) {
        let tac = mmu.peek(io::TAC);

        if mmu.take_div_reset() {
            let was_high = Self::input(self.counter, tac);
            self.counter = 0;
            if was_high {
                self.increment_tima(mmu);
            }
        }

        if self.overflow_pending {
            self.overflow_pending = false;
            let tma = mmu.peek(io::TMA);
            mmu.poke(io::TIMA, tma);
            mmu.request(Interrupt::TIMER);
        }

        let before = Self::input(self.counter, tac);
        self.counter = self.counter.wrapping_add(M_CYCLE as u16);
        if before && !Self::input(self.counter, tac) {
            self.increment_tima(mmu);
        }

        mmu.poke(io::DIV, (self.counter >> 8) as u8);
    }

    /// Timer input signal: the TAC-selected counter bit, gated by TAC bit 2.
    fn input(counter: u16, tac: u8) -> bool {
        if tac & 0x04 == 0 {
            return false;
        }
        let bit = match tac & 0x03 {
            0b00 => 9, // 4096 Hz
            0b01 => 3, // 262144 Hz
            0b10 => 5, // 65536 Hz
            _ => 7,    // 16384 Hz
        };
        counter & (1 << bit) != 0
    }

    fn increment_tima(&mut self, mmu: &mut Mmu) {
        let (next, overflow) = mmu.peek(io::TIMA).overflowing_add(1);
        mmu.poke(io::TIMA, next);
        if overflow {
            // TIMA reads 0x00 for one M-cycle before the reload.
            self.overflow_pending = true;
        }
    }
}
