use super::Mmu;
use crate::machine::io;

/// T-cycles the CPU is locked out of the DMA source and OAM.
pub(super) const DMA_CYCLES: u32 = 640;

const OAM_START: u16 = 0xFE00;
const OAM_LEN: u16 = 0xA0;

/// Countdown state for an OAM DMA transfer.
///
/// The copy itself happens in one go when the transfer starts; only the bus
/// contention is modelled over time.
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct OamDma {
    source: u16,
    remaining: u32,
}

impl OamDma {
    pub(super) fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub(super) fn tick(&mut self, cycles: u32) {
        self.remaining = self.remaining.saturating_sub(cycles);
    }

    /// Whether a CPU access to `addr` collides with the running transfer.
    pub(super) fn blocks(&self, addr: u16) -> bool {
        if !self.is_active() {
            return false;
        }
        let in_source = addr.wrapping_sub(self.source) < OAM_LEN;
        let in_oam = addr.wrapping_sub(OAM_START) < OAM_LEN;
        in_source || in_oam
    }
}

impl Mmu {
    pub(super) fn start_oam_dma(&mut self, value: u8) {
        let source = u16::from(value) << 8;
        log::trace!("GB MMU: OAM DMA from 0x{:04X}", source);

        for i in 0..OAM_LEN {
            let byte = self.read_unblocked(source.wrapping_add(i));
            self.poke(OAM_START + i, byte);
        }

        self.poke(io::DMA, value);
        self.dma = OamDma {
            source,
            remaining: DMA_CYCLES,
        };
    }
}
