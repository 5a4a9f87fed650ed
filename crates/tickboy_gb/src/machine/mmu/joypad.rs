use super::Mmu;

impl Mmu {
    pub(super) fn read_joyp(&self) -> u8 {
        // Bits 7-6 always read as 1.
        let select = self.joypad_select & 0x30;

        // A selected group is observed through its active-low nibble.
        let mut low = 0x0F;
        if select & 0x10 == 0 {
            low &= self.joypad_dpad;
        }
        if select & 0x20 == 0 {
            low &= self.joypad_action;
        }
        0xC0 | select | low
    }

    pub(super) fn write_joyp(&mut self, value: u8) {
        // Only the two select bits are writable.
        self.joypad_select = value & 0x30;
    }
}
