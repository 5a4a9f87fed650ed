mod apu;
mod cartridge;
mod config;
mod joypad;
mod mmu;
mod motherboard;
mod ppu;
mod timer;

pub use apu::{Apu, Channel};
pub use cartridge::{Cartridge, CartridgeHeader};
pub use config::{MachineConfig, DMG_PALETTE};
pub use joypad::{Button, JoyPad};
pub use mmu::Mmu;
pub use motherboard::Motherboard;
pub use ppu::{Ppu, PpuMode};
pub use timer::Timer;

/// Total addressable memory for the Game Boy (64 KiB).
///
/// The whole map lives in one flat array; address ranges with special
/// behaviour are handled by the MMU before falling through to it.
const MEMORY_SIZE: usize = 0x10000;

/// T-cycles the driving loop advances per iteration (one M-cycle).
pub const M_CYCLE: u64 = 4;

/// T-cycles in one scanline.
pub const CYCLES_PER_LINE: u64 = 456;

/// Scanlines per frame, including the ten VBlank lines.
pub const LINES_PER_FRAME: u64 = 154;

/// T-cycles in one full frame.
pub const CYCLES_PER_FRAME: u64 = CYCLES_PER_LINE * LINES_PER_FRAME;

/// IO register addresses shared by several components.
pub(crate) mod io {
    pub const JOYP: u16 = 0xFF00;
    pub const DIV: u16 = 0xFF04;
    pub const TIMA: u16 = 0xFF05;
    pub const TMA: u16 = 0xFF06;
    pub const TAC: u16 = 0xFF07;
    pub const IF: u16 = 0xFF0F;
    pub const NR10: u16 = 0xFF10;
    pub const NR50: u16 = 0xFF24;
    pub const NR51: u16 = 0xFF25;
    pub const NR52: u16 = 0xFF26;
    pub const WAVE_RAM: u16 = 0xFF30;
    pub const LCDC: u16 = 0xFF40;
    pub const STAT: u16 = 0xFF41;
    pub const SCY: u16 = 0xFF42;
    pub const SCX: u16 = 0xFF43;
    pub const LY: u16 = 0xFF44;
    pub const LYC: u16 = 0xFF45;
    pub const DMA: u16 = 0xFF46;
    pub const BGP: u16 = 0xFF47;
    pub const OBP0: u16 = 0xFF48;
    pub const OBP1: u16 = 0xFF49;
    pub const WY: u16 = 0xFF4A;
    pub const WX: u16 = 0xFF4B;
    pub const IE: u16 = 0xFFFF;
}

#[cfg(test)]
mod tests;
