use bitflags::bitflags;

bitflags! {
    /// Interrupt sources as laid out in IE ($FFFF) and IF ($FF0F).
    ///
    /// Lower bits have higher dispatch priority.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Interrupt: u8 {
        const VBLANK = 0x01;
        const LCD_STAT = 0x02;
        const TIMER = 0x04;
        const SERIAL = 0x08;
        const JOYPAD = 0x10;
    }
}

impl Interrupt {
    /// Sources in the order the CPU services them.
    pub const PRIORITY: [Interrupt; 5] = [
        Interrupt::VBLANK,
        Interrupt::LCD_STAT,
        Interrupt::TIMER,
        Interrupt::SERIAL,
        Interrupt::JOYPAD,
    ];

    /// Handler address for a single source: $40, $48, $50, $58, $60.
    pub fn vector(self) -> u16 {
        0x0040 + (self.bits().trailing_zeros() as u16) * 8
    }
}

/// Narrow interface over IME/IE/IF shared by the CPU and the PPU.
///
/// IE and IF live in the memory map; IME is a latch inside the CPU on real
/// hardware but is kept next to the registers so every consumer sees the
/// same state.
pub trait InterruptControl {
    fn ime(&self) -> bool;
    fn set_ime(&mut self, enabled: bool);

    fn interrupt_enable(&self) -> u8;
    fn set_interrupt_enable(&mut self, value: u8);

    /// IF, masked to the five defined sources.
    fn interrupt_flags(&self) -> u8;
    fn set_interrupt_flags(&mut self, value: u8);

    fn request(&mut self, interrupt: Interrupt) {
        let flags = self.interrupt_flags();
        self.set_interrupt_flags(flags | interrupt.bits());
    }

    fn clear_request(&mut self, interrupt: Interrupt) {
        let flags = self.interrupt_flags();
        self.set_interrupt_flags(flags & !interrupt.bits());
    }

    fn is_requested(&self, interrupt: Interrupt) -> bool {
        self.interrupt_flags() & interrupt.bits() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::Interrupt;

    #[test]
    fn vectors_follow_bit_positions() {
        let vectors: Vec<u16> = Interrupt::PRIORITY.iter().map(|i| i.vector()).collect();
        assert_eq!(vectors, vec![0x40, 0x48, 0x50, 0x58, 0x60]);
    }
}
