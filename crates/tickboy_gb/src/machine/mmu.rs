//! The memory bus: one flat 64 KiB array plus the address ranges that
//! behave differently from plain RAM.

mod dma;
mod init;
mod joypad;
mod read;
mod write;

use self::dma::OamDma;
use super::io;
use super::{Cartridge, MEMORY_SIZE, M_CYCLE};
use crate::cpu::Bus;
use crate::interrupts::InterruptControl;

pub struct Mmu {
    memory: Box<[u8]>,
    /// Interrupt master enable; owned here so the CPU and PPU share one view.
    ime: bool,
    dma: OamDma,
    /// Length counters for channels 1-4, reloaded by NRx1 writes and
    /// clocked by the APU.
    length_timers: [u16; 4],
    joypad_select: u8,
    /// Active-low nibble for A/B/Select/Start.
    joypad_action: u8,
    /// Active-low nibble for Right/Left/Up/Down.
    joypad_dpad: u8,
    /// Set by any DIV write; consumed by the timer.
    div_reset: bool,
    /// One bit per channel whose NRx4 trigger bit was written.
    channel_triggers: u8,
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}

impl Mmu {
    pub fn new() -> Self {
        Self {
            memory: vec![0; MEMORY_SIZE].into_boxed_slice(),
            ime: false,
            dma: OamDma::default(),
            length_timers: [0; 4],
            joypad_select: 0x30,
            joypad_action: 0x0F,
            joypad_dpad: 0x0F,
            div_reset: false,
            channel_triggers: 0,
        }
    }

    /// Copy bank 0 and the first switchable bank into $0000-$7FFF.
    ///
    /// Bank switching is not implemented: writes to the ROM area are ignored,
    /// so only the first 32 KiB of a larger ROM is ever visible.
    pub fn load_cartridge(&mut self, cartridge: &Cartridge) {
        let rom = cartridge.rom();
        let len = rom.len().min(0x8000);
        self.memory[..len].copy_from_slice(&rom[..len]);
        if cartridge.header().rom_banks > 2 {
            log::warn!(
                "GB MMU: cartridge has {} ROM banks; only banks 0-1 are mapped",
                cartridge.header().rom_banks
            );
        }
    }

    /// Advance the OAM DMA countdown by one M-cycle.
    pub fn tick(&mut self) {
        self.dma.tick(M_CYCLE as u32);
    }

    pub fn dma_active(&self) -> bool {
        self.dma.is_active()
    }

    /// Raw read that ignores DMA contention and register side effects.
    ///
    /// Used by the PPU, timer and APU, which sit on their own side of the bus.
    #[inline]
    pub fn peek(&self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    /// Raw write that ignores DMA contention and register side effects.
    #[inline]
    pub fn poke(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    /// Re-evaluate LY == LYC and update STAT bit 2. Returns the result.
    pub fn update_coincidence(&mut self) -> bool {
        let coincident = self.peek(io::LY) == self.peek(io::LYC);
        let stat = self.peek(io::STAT);
        let stat = if coincident { stat | 0x04 } else { stat & !0x04 };
        self.poke(io::STAT, stat);
        coincident
    }

    pub fn take_div_reset(&mut self) -> bool {
        std::mem::take(&mut self.div_reset)
    }

    pub fn take_channel_triggers(&mut self) -> u8 {
        std::mem::take(&mut self.channel_triggers)
    }

    pub fn length_timer(&self, channel: usize) -> u16 {
        self.length_timers[channel]
    }

    pub fn set_length_timer(&mut self, channel: usize, value: u16) {
        self.length_timers[channel] = value;
    }

    /// Latch the two active-low button nibbles read through $FF00.
    pub fn set_joypad_state(&mut self, action: u8, dpad: u8) {
        self.joypad_action = action & 0x0F;
        self.joypad_dpad = dpad & 0x0F;
    }
}

impl Bus for Mmu {
    fn read8(&mut self, addr: u16) -> u8 {
        self.read8_mmio(addr)
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.write8_mmio(addr, value);
    }
}

impl InterruptControl for Mmu {
    fn ime(&self) -> bool {
        self.ime
    }

    fn set_ime(&mut self, enabled: bool) {
        self.ime = enabled;
    }

    fn interrupt_enable(&self) -> u8 {
        self.peek(io::IE)
    }

    fn set_interrupt_enable(&mut self, value: u8) {
        self.poke(io::IE, value);
    }

    fn interrupt_flags(&self) -> u8 {
        self.peek(io::IF) & 0x1F
    }

    fn set_interrupt_flags(&mut self, value: u8) {
        self.poke(io::IF, value & 0x1F);
    }
}
