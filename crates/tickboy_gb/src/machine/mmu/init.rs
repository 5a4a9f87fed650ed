use super::Mmu;
use crate::machine::io;

impl Mmu {
    /// IO registers as the DMG boot ROM leaves them at $0100.
    pub fn apply_power_on_state(&mut self) {
        self.ime = false;
        self.dma = Default::default();
        self.div_reset = false;
        self.channel_triggers = 0;
        self.joypad_select = 0x30;

        self.poke(io::JOYP, 0xCF);
        self.poke(io::DIV, 0xAB);
        self.poke(io::TIMA, 0x00);
        self.poke(io::TMA, 0x00);
        self.poke(io::TAC, 0xF8);
        self.poke(io::IF, 0x01);

        // Sound.
        self.poke(0xFF10, 0x80);
        self.poke(0xFF11, 0xBF);
        self.poke(0xFF12, 0xF3);
        self.poke(0xFF13, 0xFF);
        self.poke(0xFF14, 0xBF);
        self.poke(0xFF16, 0x3F);
        self.poke(0xFF17, 0x00);
        self.poke(0xFF18, 0xFF);
        self.poke(0xFF19, 0xBF);
        self.poke(0xFF1A, 0x7F);
        self.poke(0xFF1B, 0xFF);
        self.poke(0xFF1C, 0x9F);
        self.poke(0xFF1D, 0xFF);
        self.poke(0xFF1E, 0xBF);
        self.poke(0xFF20, 0xFF);
        self.poke(0xFF21, 0x00);
        self.poke(0xFF22, 0x00);
        self.poke(0xFF23, 0xBF);
        self.poke(io::NR50, 0x77);
        self.poke(io::NR51, 0xF3);
        self.poke(io::NR52, 0xF1);

        // LCD.
        self.poke(io::LCDC, 0x91);
        self.poke(io::STAT, 0x85);
        self.poke(io::SCY, 0x00);
        self.poke(io::SCX, 0x00);
        self.poke(io::LY, 0x00);
        self.poke(io::LYC, 0x00);
        self.poke(io::DMA, 0xFF);
        self.poke(io::BGP, 0xFC);
        self.poke(io::OBP0, 0xFF);
        self.poke(io::OBP1, 0xFF);
        self.poke(io::WY, 0x00);
        self.poke(io::WX, 0x00);

        self.poke(io::IE, 0x00);
    }
}
