use std::fmt;

/// Registers for the Game Boy CPU (LR35902).
///
/// The eight 8-bit registers pair up as AF, BC, DE and HL. F only keeps its
/// upper nibble; it is private so every write goes through a masking setter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    /// Post-boot register state handed to cartridge code at $0100.
    ///
    /// The boot ROM leaves H and C set when the header checksum byte is
    /// non-zero, a side effect of its checksum verification loop.
    pub fn reset(&mut self, header_checksum: u8) {
        self.a = 0x01;
        self.f = 0x80;
        self.b = 0x00;
        self.c = 0x13;
        self.d = 0x00;
        self.e = 0xD8;
        self.h = 0x01;
        self.l = 0x4D;
        self.sp = 0xFFFE;
        self.pc = 0x0100;

        let checksum_nonzero = header_checksum != 0;
        self.set_flag(Flag::H, checksum_nonzero);
        self.set_flag(Flag::C, checksum_nonzero);
    }

    #[inline]
    pub fn f(&self) -> u8 {
        self.f
    }

    #[inline]
    pub fn set_f(&mut self, value: u8) {
        // Lower 4 bits of F are always zero.
        self.f = value & 0xF0;
    }

    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        self.set_f(f);
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }

    #[inline]
    pub fn is_flag_set(&self, flag: Flag) -> bool {
        self.f & flag.mask() != 0
    }

    #[inline]
    pub fn raise_flag(&mut self, flag: Flag) {
        self.f |= flag.mask();
    }

    #[inline]
    pub fn clear_flag(&mut self, flag: Flag) {
        self.f &= !flag.mask();
    }

    /// Raise `flag` when `condition` holds, clear it otherwise.
    #[inline]
    pub fn set_flag(&mut self, flag: Flag, condition: bool) {
        if condition {
            self.raise_flag(flag);
        } else {
            self.clear_flag(flag);
        }
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |flag: Flag, name: char| {
            if self.is_flag_set(flag) {
                name
            } else {
                '-'
            }
        };
        write!(
            f,
            "AF=0x{:04X} BC=0x{:04X} DE=0x{:04X} HL=0x{:04X} SP=0x{:04X} PC=0x{:04X} [{}{}{}{}]",
            self.af(),
            self.bc(),
            self.de(),
            self.hl(),
            self.sp,
            self.pc,
            flag(Flag::Z, 'Z'),
            flag(Flag::N, 'N'),
            flag(Flag::H, 'H'),
            flag(Flag::C, 'C'),
        )
    }
}

/// Flag bits in the F register.
///
/// Layout (bit index in the byte, from MSB to LSB):
/// - bit 7: Z (zero)
/// - bit 6: N (subtract)
/// - bit 5: H (half carry)
/// - bit 4: C (carry)
/// - bits 0–3 are always zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Z = 7,
    N = 6,
    H = 5,
    C = 4,
}

impl Flag {
    #[inline]
    const fn mask(self) -> u8 {
        1 << self as u8
    }
}
