use super::Mmu;
use crate::machine::io;

impl Mmu {
    /// CPU-visible read.
    pub(super) fn read8_mmio(&self, addr: u16) -> u8 {
        if self.dma.blocks(addr) {
            return 0xFF;
        }
        self.read_unblocked(addr)
    }

    /// Read with register semantics but without DMA contention.
    pub(super) fn read_unblocked(&self, addr: u16) -> u8 {
        match addr {
            io::JOYP => self.read_joyp(),
            // Upper three bits of IF are unused and read as 1.
            io::IF => self.peek(io::IF) | 0xE0,
            io::STAT => self.peek(io::STAT) | 0x80,
            // Echo RAM mirrors C000-DDFF.
            0xE000..=0xFDFF => self.peek(addr - 0x2000),
            // Prohibited area.
            0xFEA0..=0xFEFF => 0x00,
            _ => self.peek(addr),
        }
    }
}
