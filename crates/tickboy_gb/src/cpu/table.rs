//! Opcode descriptors and the two 256-entry dispatch tables.
//!
//! Both tables are built once on first use and then indexed directly by the
//! opcode byte. Cycle counts are base T-cycles; taken branches add their
//! overhead at execution time.

use std::fmt;

use lazy_static::lazy_static;

use super::cb::{bit, res, set, shift};
use super::cond::*;
use super::exec::*;
use super::r16::{AF, BC, DE, HL, SP};
use super::r8::{A, B, C, D, E, H, HLI, L};
use super::{Cpu, CpuBus};

/// What the CPU does with an opcode once it has been fetched.
#[derive(Clone, Copy)]
pub enum Operation {
    /// No immediate operand.
    Implied(fn(&mut Cpu, &mut dyn CpuBus)),
    /// One immediate byte follows the opcode.
    Byte(fn(&mut Cpu, &mut dyn CpuBus, u8)),
    /// One little-endian immediate word follows the opcode.
    Word(fn(&mut Cpu, &mut dyn CpuBus, u16)),
    /// $CB: the next byte indexes the extended table.
    Prefix,
    /// No instruction is defined for this opcode; executing it panics the CPU.
    Unsupported,
}

impl Operation {
    /// Instruction length in bytes implied by the operand shape.
    pub const fn length(&self) -> u8 {
        match self {
            Operation::Byte(_) => 2,
            Operation::Word(_) => 3,
            Operation::Implied(_) | Operation::Prefix | Operation::Unsupported => 1,
        }
    }
}

#[derive(Clone, Copy)]
pub struct Instruction {
    pub opcode: u8,
    pub length: u8,
    pub name: &'static str,
    pub cycles: u32,
    pub operation: Operation,
}

impl Instruction {
    fn new(name: &'static str, cycles: u32, operation: Operation) -> Self {
        Self {
            opcode: 0,
            length: operation.length(),
            name,
            cycles,
            operation,
        }
    }

    fn unsupported() -> Self {
        Self::new("UNSUPPORTED", 0, Operation::Unsupported)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self.operation, Operation::Unsupported)
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("opcode", &format_args!("0x{:02X}", self.opcode))
            .field("name", &self.name)
            .field("length", &self.length)
            .field("cycles", &self.cycles)
            .finish()
    }
}

lazy_static! {
    /// Unprefixed opcodes.
    pub static ref STANDARD: [Instruction; 256] = build_standard();
    /// Opcodes following a $CB prefix.
    pub static ref EXTENDED: [Instruction; 256] = build_extended();
}

fn number(table: &mut [Instruction; 256]) {
    for (opcode, entry) in (0u8..=0xFF).zip(table.iter_mut()) {
        entry.opcode = opcode;
    }
}

macro_rules! define {
    ($table:ident { $($opcode:literal => $name:literal, $cycles:literal, $kind:ident($handler:expr);)* }) => {
        $(
            $table[$opcode] = Instruction::new($name, $cycles, Operation::$kind($handler));
        )*
    };
}

/// `LD r,r'` row for one destination register.
macro_rules! ld_row {
    ($table:ident, $base:literal, $dst:ident, $dst_name:literal) => {
        ld_row!(@each $table, $base, $dst, $dst_name,
            0 B "B", 1 C "C", 2 D "D", 3 E "E", 4 H "H", 5 L "L", 6 HLI "(HL)", 7 A "A");
    };
    (@each $table:ident, $base:literal, $dst:ident, $dst_name:literal, $($idx:literal $src:ident $src_name:literal),*) => {
        $(
            $table[$base + $idx] = Instruction::new(
                concat!("LD ", $dst_name, ",", $src_name),
                if $dst == HLI || $src == HLI { 8 } else { 4 },
                Operation::Implied(ld_r_r::<$dst, $src>),
            );
        )*
    };
}

/// Eight-entry ALU row ($80-$BF), one per source register.
macro_rules! alu_row {
    ($table:ident, $base:literal, $op:ident, $op_name:literal) => {
        alu_row!(@each $table, $base, $op, $op_name,
            0 B "B", 1 C "C", 2 D "D", 3 E "E", 4 H "H", 5 L "L", 6 HLI "(HL)", 7 A "A");
    };
    (@each $table:ident, $base:literal, $op:ident, $op_name:literal, $($idx:literal $src:ident $src_name:literal),*) => {
        $(
            $table[$base + $idx] = Instruction::new(
                concat!($op_name, $src_name),
                if $src == HLI { 8 } else { 4 },
                Operation::Implied(alu_r::<$op, $src>),
            );
        )*
    };
}

/// Eight-entry CB row, one per target register.
macro_rules! cb_row {
    ($table:ident, $base:literal, $handler:ident::<$n:literal>, $name:literal, $hl_cycles:literal) => {
        cb_row!(@each $table, $base, $handler, $n, $name, $hl_cycles,
            0 B "B", 1 C "C", 2 D "D", 3 E "E", 4 H "H", 5 L "L", 6 HLI "(HL)", 7 A "A");
    };
    (@each $table:ident, $base:literal, $handler:ident, $n:literal, $name:literal, $hl_cycles:literal, $($idx:literal $reg:ident $reg_name:literal),*) => {
        $(
            $table[$base + $idx] = Instruction::new(
                concat!($name, $reg_name),
                if $reg == HLI { $hl_cycles } else { 8 },
                Operation::Implied($handler::<$n, $reg>),
            );
        )*
    };
}

fn build_standard() -> [Instruction; 256] {
    let mut table = [Instruction::unsupported(); 256];

    define!(table {
        0x00 => "NOP", 4, Implied(nop);
        0x01 => "LD BC,d16", 12, Word(ld_rr_d16::<BC>);
        0x02 => "LD (BC),A", 8, Implied(ld_rri_a::<BC>);
        0x03 => "INC BC", 8, Implied(inc_rr::<BC>);
        0x04 => "INC B", 4, Implied(inc_r::<B>);
        0x05 => "DEC B", 4, Implied(dec_r::<B>);
        0x06 => "LD B,d8", 8, Byte(ld_r_d8::<B>);
        0x07 => "RLCA", 4, Implied(rlca);
        0x08 => "LD (a16),SP", 20, Word(ld_a16_sp);
        0x09 => "ADD HL,BC", 8, Implied(add_hl_rr::<BC>);
        0x0A => "LD A,(BC)", 8, Implied(ld_a_rri::<BC>);
        0x0B => "DEC BC", 8, Implied(dec_rr::<BC>);
        0x0C => "INC C", 4, Implied(inc_r::<C>);
        0x0D => "DEC C", 4, Implied(dec_r::<C>);
        0x0E => "LD C,d8", 8, Byte(ld_r_d8::<C>);
        0x0F => "RRCA", 4, Implied(rrca);

        0x10 => "STOP", 4, Byte(stop);
        0x11 => "LD DE,d16", 12, Word(ld_rr_d16::<DE>);
        0x12 => "LD (DE),A", 8, Implied(ld_rri_a::<DE>);
        0x13 => "INC DE", 8, Implied(inc_rr::<DE>);
        0x14 => "INC D", 4, Implied(inc_r::<D>);
        0x15 => "DEC D", 4, Implied(dec_r::<D>);
        0x16 => "LD D,d8", 8, Byte(ld_r_d8::<D>);
        0x17 => "RLA", 4, Implied(rla);
        0x18 => "JR r8", 8, Byte(jr::<ALWAYS>);
        0x19 => "ADD HL,DE", 8, Implied(add_hl_rr::<DE>);
        0x1A => "LD A,(DE)", 8, Implied(ld_a_rri::<DE>);
        0x1B => "DEC DE", 8, Implied(dec_rr::<DE>);
        0x1C => "INC E", 4, Implied(inc_r::<E>);
        0x1D => "DEC E", 4, Implied(dec_r::<E>);
        0x1E => "LD E,d8", 8, Byte(ld_r_d8::<E>);
        0x1F => "RRA", 4, Implied(rra);

        0x20 => "JR NZ,r8", 8, Byte(jr::<NZ>);
        0x21 => "LD HL,d16", 12, Word(ld_rr_d16::<HL>);
        0x22 => "LD (HL+),A", 8, Implied(ld_hli_a);
        0x23 => "INC HL", 8, Implied(inc_rr::<HL>);
        0x24 => "INC H", 4, Implied(inc_r::<H>);
        0x25 => "DEC H", 4, Implied(dec_r::<H>);
        0x26 => "LD H,d8", 8, Byte(ld_r_d8::<H>);
        0x27 => "DAA", 4, Implied(daa);
        0x28 => "JR Z,r8", 8, Byte(jr::<Z>);
        0x29 => "ADD HL,HL", 8, Implied(add_hl_rr::<HL>);
        0x2A => "LD A,(HL+)", 8, Implied(ld_a_hli);
        0x2B => "DEC HL", 8, Implied(dec_rr::<HL>);
        0x2C => "INC L", 4, Implied(inc_r::<L>);
        0x2D => "DEC L", 4, Implied(dec_r::<L>);
        0x2E => "LD L,d8", 8, Byte(ld_r_d8::<L>);
        0x2F => "CPL", 4, Implied(cpl);

        0x30 => "JR NC,r8", 8, Byte(jr::<NC>);
        0x31 => "LD SP,d16", 12, Word(ld_rr_d16::<SP>);
        0x32 => "LD (HL-),A", 8, Implied(ld_hld_a);
        0x33 => "INC SP", 8, Implied(inc_rr::<SP>);
        0x34 => "INC (HL)", 12, Implied(inc_r::<HLI>);
        0x35 => "DEC (HL)", 12, Implied(dec_r::<HLI>);
        0x36 => "LD (HL),d8", 12, Byte(ld_r_d8::<HLI>);
        0x37 => "SCF", 4, Implied(scf);
        0x38 => "JR C,r8", 8, Byte(jr::<CY>);
        0x39 => "ADD HL,SP", 8, Implied(add_hl_rr::<SP>);
        0x3A => "LD A,(HL-)", 8, Implied(ld_a_hld);
        0x3B => "DEC SP", 8, Implied(dec_rr::<SP>);
        0x3C => "INC A", 4, Implied(inc_r::<A>);
        0x3D => "DEC A", 4, Implied(dec_r::<A>);
        0x3E => "LD A,d8", 8, Byte(ld_r_d8::<A>);
        0x3F => "CCF", 4, Implied(ccf);
    });

    ld_row!(table, 0x40, B, "B");
    ld_row!(table, 0x48, C, "C");
    ld_row!(table, 0x50, D, "D");
    ld_row!(table, 0x58, E, "E");
    ld_row!(table, 0x60, H, "H");
    ld_row!(table, 0x68, L, "L");
    ld_row!(table, 0x70, HLI, "(HL)");
    ld_row!(table, 0x78, A, "A");

    alu_row!(table, 0x80, ADD, "ADD A,");
    alu_row!(table, 0x88, ADC, "ADC A,");
    alu_row!(table, 0x90, SUB, "SUB ");
    alu_row!(table, 0x98, SBC, "SBC A,");
    alu_row!(table, 0xA0, AND, "AND ");
    alu_row!(table, 0xA8, XOR, "XOR ");
    alu_row!(table, 0xB0, OR, "OR ");
    alu_row!(table, 0xB8, CP, "CP ");

    define!(table {
        // `LD (HL),(HL)` slot.
        0x76 => "HALT", 4, Implied(halt);

        0xC0 => "RET NZ", 8, Implied(ret::<NZ>);
        0xC1 => "POP BC", 12, Implied(pop::<BC>);
        0xC2 => "JP NZ,a16", 12, Word(jp::<NZ>);
        0xC3 => "JP a16", 12, Word(jp::<ALWAYS>);
        0xC4 => "CALL NZ,a16", 12, Word(call::<NZ>);
        0xC5 => "PUSH BC", 16, Implied(push::<BC>);
        0xC6 => "ADD A,d8", 8, Byte(alu_d8::<ADD>);
        0xC7 => "RST 00H", 4, Implied(rst::<0x00>);
        0xC8 => "RET Z", 8, Implied(ret::<Z>);
        0xC9 => "RET", 4, Implied(ret::<ALWAYS>);
        0xCA => "JP Z,a16", 12, Word(jp::<Z>);
        0xCC => "CALL Z,a16", 12, Word(call::<Z>);
        0xCD => "CALL a16", 12, Word(call::<ALWAYS>);
        0xCE => "ADC A,d8", 8, Byte(alu_d8::<ADC>);
        0xCF => "RST 08H", 4, Implied(rst::<0x08>);

        0xD0 => "RET NC", 8, Implied(ret::<NC>);
        0xD1 => "POP DE", 12, Implied(pop::<DE>);
        0xD2 => "JP NC,a16", 12, Word(jp::<NC>);
        0xD4 => "CALL NC,a16", 12, Word(call::<NC>);
        0xD5 => "PUSH DE", 16, Implied(push::<DE>);
        0xD6 => "SUB d8", 8, Byte(alu_d8::<SUB>);
        0xD7 => "RST 10H", 4, Implied(rst::<0x10>);
        0xD8 => "RET C", 8, Implied(ret::<CY>);
        0xD9 => "RETI", 4, Implied(reti);
        0xDA => "JP C,a16", 12, Word(jp::<CY>);
        0xDC => "CALL C,a16", 12, Word(call::<CY>);
        0xDE => "SBC A,d8", 8, Byte(alu_d8::<SBC>);
        0xDF => "RST 18H", 4, Implied(rst::<0x18>);

        0xE0 => "LDH (a8),A", 12, Byte(ldh_a8_a);
        0xE1 => "POP HL", 12, Implied(pop::<HL>);
        0xE2 => "LD (C),A", 8, Implied(ldh_c_a);
        0xE5 => "PUSH HL", 16, Implied(push::<HL>);
        0xE6 => "AND d8", 8, Byte(alu_d8::<AND>);
        0xE7 => "RST 20H", 4, Implied(rst::<0x20>);
        0xE8 => "ADD SP,r8", 16, Byte(add_sp_r8);
        0xE9 => "JP (HL)", 4, Implied(jp_hl);
        0xEA => "LD (a16),A", 16, Word(ld_a16_a);
        0xEE => "XOR d8", 8, Byte(alu_d8::<XOR>);
        0xEF => "RST 28H", 4, Implied(rst::<0x28>);

        0xF0 => "LDH A,(a8)", 12, Byte(ldh_a_a8);
        0xF1 => "POP AF", 12, Implied(pop::<AF>);
        0xF2 => "LD A,(C)", 8, Implied(ldh_a_c);
        0xF3 => "DI", 4, Implied(di);
        0xF5 => "PUSH AF", 16, Implied(push::<AF>);
        0xF6 => "OR d8", 8, Byte(alu_d8::<OR>);
        0xF7 => "RST 30H", 4, Implied(rst::<0x30>);
        0xF8 => "LD HL,SP+r8", 12, Byte(ld_hl_sp_r8);
        0xF9 => "LD SP,HL", 8, Implied(ld_sp_hl);
        0xFA => "LD A,(a16)", 16, Word(ld_a_a16);
        0xFB => "EI", 4, Implied(ei);
        0xFE => "CP d8", 8, Byte(alu_d8::<CP>);
        0xFF => "RST 38H", 4, Implied(rst::<0x38>);
    });

    table[0xCB] = Instruction::new("PREFIX CB", 4, Operation::Prefix);

    number(&mut table);
    table
}

fn build_extended() -> [Instruction; 256] {
    let mut table = [Instruction::unsupported(); 256];

    cb_row!(table, 0x00, shift::<0>, "RLC ", 16);
    cb_row!(table, 0x08, shift::<1>, "RRC ", 16);
    cb_row!(table, 0x10, shift::<2>, "RL ", 16);
    cb_row!(table, 0x18, shift::<3>, "RR ", 16);
    cb_row!(table, 0x20, shift::<4>, "SLA ", 16);
    cb_row!(table, 0x28, shift::<5>, "SRA ", 16);
    cb_row!(table, 0x30, shift::<6>, "SWAP ", 16);
    cb_row!(table, 0x38, shift::<7>, "SRL ", 16);

    cb_row!(table, 0x40, bit::<0>, "BIT 0,", 12);
    cb_row!(table, 0x48, bit::<1>, "BIT 1,", 12);
    cb_row!(table, 0x50, bit::<2>, "BIT 2,", 12);
    cb_row!(table, 0x58, bit::<3>, "BIT 3,", 12);
    cb_row!(table, 0x60, bit::<4>, "BIT 4,", 12);
    cb_row!(table, 0x68, bit::<5>, "BIT 5,", 12);
    cb_row!(table, 0x70, bit::<6>, "BIT 6,", 12);
    cb_row!(table, 0x78, bit::<7>, "BIT 7,", 12);

    cb_row!(table, 0x80, res::<0>, "RES 0,", 16);
    cb_row!(table, 0x88, res::<1>, "RES 1,", 16);
    cb_row!(table, 0x90, res::<2>, "RES 2,", 16);
    cb_row!(table, 0x98, res::<3>, "RES 3,", 16);
    cb_row!(table, 0xA0, res::<4>, "RES 4,", 16);
    cb_row!(table, 0xA8, res::<5>, "RES 5,", 16);
    cb_row!(table, 0xB0, res::<6>, "RES 6,", 16);
    cb_row!(table, 0xB8, res::<7>, "RES 7,", 16);

    cb_row!(table, 0xC0, set::<0>, "SET 0,", 16);
    cb_row!(table, 0xC8, set::<1>, "SET 1,", 16);
    cb_row!(table, 0xD0, set::<2>, "SET 2,", 16);
    cb_row!(table, 0xD8, set::<3>, "SET 3,", 16);
    cb_row!(table, 0xE0, set::<4>, "SET 4,", 16);
    cb_row!(table, 0xE8, set::<5>, "SET 5,", 16);
    cb_row!(table, 0xF0, set::<6>, "SET 6,", 16);
    cb_row!(table, 0xF8, set::<7>, "SET 7,", 16);

    // Lengths count the $CB prefix byte.
    for entry in table.iter_mut() {
        entry.length = 2;
    }

    number(&mut table);
    table
}
