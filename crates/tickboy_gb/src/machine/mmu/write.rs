use super::Mmu;
use crate::machine::io;

/// NRx1 register of each channel, paired with its length counter ceiling.
const LENGTH_REGISTERS: [(u16, u16, u8); 4] = [
    (0xFF11, 64, 0x3F),
    (0xFF16, 64, 0x3F),
    (0xFF1B, 256, 0xFF),
    (0xFF20, 64, 0x3F),
];

/// NRx4 register of each channel; bit 7 triggers.
const TRIGGER_REGISTERS: [u16; 4] = [0xFF14, 0xFF19, 0xFF1E, 0xFF23];

impl Mmu {
    /// CPU-visible write.
    pub(super) fn write8_mmio(&mut self, addr: u16, value: u8) {
        if self.dma.blocks(addr) {
            log::trace!("GB MMU: write to 0x{:04X} dropped during OAM DMA", addr);
            return;
        }

        match addr {
            // ROM: no memory bank controller is emulated.
            0x0000..=0x7FFF => {}
            io::JOYP => self.write_joyp(value),
            // Any write resets the divider.
            io::DIV => {
                self.poke(io::DIV, 0);
                self.div_reset = true;
            }
            io::IF => self.poke(io::IF, value & 0x1F),
            io::NR10..=0xFF25 => {
                // Channel registers are read-only while the APU is off,
                // except that length loads still reach the counters.
                if self.apu_enabled() {
                    self.write_apu_register(addr, value);
                } else {
                    self.reload_length(addr, value);
                }
            }
            io::NR52 => self.write_nr52(value),
            io::STAT => {
                // Mode and coincidence bits belong to the PPU.
                let stat = self.peek(io::STAT);
                self.poke(io::STAT, (stat & 0x87) | (value & 0x78));
            }
            io::LYC => {
                self.poke(io::LYC, value);
                self.update_coincidence();
            }
            io::DMA => self.start_oam_dma(value),
            0xE000..=0xFDFF => self.poke(addr - 0x2000, value),
            0xFEA0..=0xFEFF => {}
            _ => self.poke(addr, value),
        }
    }

    pub(crate) fn apu_enabled(&self) -> bool {
        self.peek(io::NR52) & 0x80 != 0
    }

    fn write_apu_register(&mut self, addr: u16, value: u8) {
        self.poke(addr, value);
        self.reload_length(addr, value);

        if let Some(channel) = TRIGGER_REGISTERS.iter().position(|&reg| reg == addr) {
            if value & 0x80 != 0 {
                self.channel_triggers |= 1 << channel;
            }
        }
    }

    fn reload_length(&mut self, addr: u16, value: u8) {
        if let Some(channel) = LENGTH_REGISTERS.iter().position(|&(reg, _, _)| reg == addr) {
            let (_, ceiling, mask) = LENGTH_REGISTERS[channel];
            self.length_timers[channel] = ceiling - u16::from(value & mask);
        }
    }

    fn write_nr52(&mut self, value: u8) {
        // Only bit 7 is writable. Turning audio off clears every channel
        // register and the status bits.
        let was_on = self.apu_enabled();
        let now_on = value & 0x80 != 0;

        if was_on && !now_on {
            for addr in io::NR10..=io::NR51 {
                self.poke(addr, 0x00);
            }
            self.length_timers = [0; 4];
            self.poke(io::NR52, 0x00);
        }

        let status = self.peek(io::NR52) & 0x0F;
        self.poke(io::NR52, if now_on { status | 0x80 } else { status });
    }
}
