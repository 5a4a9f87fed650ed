use super::{Cpu, Flag};

impl Cpu {
    /// Core 8-bit ADD/ADC operation on A.
    ///
    /// `use_carry` selects between ADD (false) and ADC (true).
    pub(super) fn alu_add(&mut self, value: u8, use_carry: bool) {
        let a = self.regs.a;
        let carry_in = u8::from(use_carry && self.regs.is_flag_set(Flag::C));

        let half = (a & 0x0F) + (value & 0x0F) + carry_in;
        let full = u16::from(a) + u16::from(value) + u16::from(carry_in);
        let result = full as u8;

        self.regs.a = result;
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.clear_flag(Flag::N);
        self.regs.set_flag(Flag::H, half > 0x0F);
        self.regs.set_flag(Flag::C, full > 0xFF);
    }

    /// Core 8-bit SUB/SBC operation on A.
    ///
    /// `use_carry` selects between SUB (false) and SBC (true).
    pub(super) fn alu_sub(&mut self, value: u8, use_carry: bool) {
        self.regs.a = self.compare(value, use_carry);
    }

    /// Compare A with `value`, setting flags as if `A - value` was performed.
    /// A itself is not modified.
    #[inline]
    pub(super) fn alu_cp(&mut self, value: u8) {
        self.compare(value, false);
    }

    fn compare(&mut self, value: u8, use_carry: bool) -> u8 {
        let a = self.regs.a;
        let carry_in = i16::from(use_carry && self.regs.is_flag_set(Flag::C));

        let half = i16::from(a & 0x0F) - i16::from(value & 0x0F) - carry_in;
        let full = i16::from(a) - i16::from(value) - carry_in;
        let result = full as u8;

        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.raise_flag(Flag::N);
        self.regs.set_flag(Flag::H, half < 0);
        self.regs.set_flag(Flag::C, full < 0);
        result
    }

    #[inline]
    pub(super) fn alu_and(&mut self, value: u8) {
        let result = self.regs.a & value;
        self.regs.a = result;
        self.regs.set_f(0);
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.raise_flag(Flag::H);
    }

    #[inline]
    pub(super) fn alu_or(&mut self, value: u8) {
        let result = self.regs.a | value;
        self.regs.a = result;
        self.regs.set_f(0);
        self.regs.set_flag(Flag::Z, result == 0);
    }

    #[inline]
    pub(super) fn alu_xor(&mut self, value: u8) {
        let result = self.regs.a ^ value;
        self.regs.a = result;
        self.regs.set_f(0);
        self.regs.set_flag(Flag::Z, result == 0);
    }

    /// Decimal adjust accumulator after BCD addition/subtraction.
    ///
    /// Updates A, Z, H, C; leaves N unchanged.
    pub(super) fn alu_daa(&mut self) {
        let mut a = self.regs.a;
        let mut adjust: u8 = if self.regs.is_flag_set(Flag::C) {
            0x60
        } else {
            0x00
        };
        if self.regs.is_flag_set(Flag::H) {
            adjust |= 0x06;
        }

        if !self.regs.is_flag_set(Flag::N) {
            // After an addition.
            if (a & 0x0F) > 0x09 {
                adjust |= 0x06;
            }
            if a > 0x99 {
                adjust |= 0x60;
            }
            a = a.wrapping_add(adjust);
        } else {
            a = a.wrapping_sub(adjust);
        }

        self.regs.set_flag(Flag::C, adjust >= 0x60);
        self.regs.clear_flag(Flag::H);
        self.regs.set_flag(Flag::Z, a == 0);
        self.regs.a = a;
    }

    /// 8-bit increment used by INC r and INC (HL). C is left alone.
    #[inline]
    pub(super) fn alu_inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.clear_flag(Flag::N);
        self.regs.set_flag(Flag::H, (value & 0x0F) == 0x0F);
        result
    }

    /// 8-bit decrement used by DEC r and DEC (HL). C is left alone.
    #[inline]
    pub(super) fn alu_dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.raise_flag(Flag::N);
        self.regs.set_flag(Flag::H, (value & 0x0F) == 0);
        result
    }

    /// `ADD HL,rr`: Z is unaffected, N cleared, H from bit 11 and C from bit 15.
    #[inline]
    pub(super) fn alu_add16_hl(&mut self, value: u16) {
        let hl = self.regs.hl();
        let result = hl.wrapping_add(value);

        self.regs.clear_flag(Flag::N);
        self.regs.set_flag(Flag::H, (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
        self.regs.set_flag(Flag::C, u32::from(hl) + u32::from(value) > 0xFFFF);

        self.regs.set_hl(result);
    }

    /// Signed 8-bit offset added to a 16-bit base, as used by `ADD SP,r8` and
    /// `LD HL,SP+r8`.
    ///
    /// Z and N are cleared; H and C come from the low byte only.
    #[inline]
    pub(super) fn alu_add16_signed(&mut self, base: u16, imm8: u8) -> u16 {
        let offset = imm8 as i8 as i16 as u16;
        self.regs.clear_flag(Flag::Z);
        self.regs.clear_flag(Flag::N);
        self.regs
            .set_flag(Flag::H, (base & 0x000F) + (offset & 0x000F) > 0x000F);
        self.regs
            .set_flag(Flag::C, (base & 0x00FF) + (offset & 0x00FF) > 0x00FF);
        base.wrapping_add(offset)
    }

    /// Shared rotate/shift kernel for the CB table and the accumulator forms.
    ///
    /// Sets C from the bit shifted out, clears N and H, and sets Z from the
    /// result.
    pub(super) fn alu_shift(&mut self, kind: Shift, value: u8) -> u8 {
        let carry_in = self.regs.is_flag_set(Flag::C);
        let (result, carry_out) = match kind {
            Shift::Rlc => (value.rotate_left(1), value & 0x80 != 0),
            Shift::Rrc => (value.rotate_right(1), value & 0x01 != 0),
            Shift::Rl => ((value << 1) | u8::from(carry_in), value & 0x80 != 0),
            Shift::Rr => ((value >> 1) | (u8::from(carry_in) << 7), value & 0x01 != 0),
            Shift::Sla => (value << 1, value & 0x80 != 0),
            Shift::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            Shift::Swap => (value.rotate_left(4), false),
            Shift::Srl => (value >> 1, value & 0x01 != 0),
        };

        self.regs.set_f(0);
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.set_flag(Flag::C, carry_out);
        result
    }
}

/// Rotate and shift kinds, in CB-table row order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Shift {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl Shift {
    pub(super) const fn from_row(row: u8) -> Shift {
        match row & 0x07 {
            0 => Shift::Rlc,
            1 => Shift::Rrc,
            2 => Shift::Rl,
            3 => Shift::Rr,
            4 => Shift::Sla,
            5 => Shift::Sra,
            6 => Shift::Swap,
            _ => Shift::Srl,
        }
    }
}
